//! Two-thread demonstration driver.
//!
//! Not part of the core (spec.md §1 excludes the demonstration driver as an
//! external collaborator). Reproduces the scenario from
//! `examples/original_source/main.c` using `std::thread` in place of raw
//! `pthread_create`/`pthread_join`.

use std::thread;
use tls_region::{clone, create, current_thread, destroy, read, write};

fn run(
  thread_index: u32,
  announce: std::sync::mpsc::Sender<tls_region::ThreadId>,
  other: std::sync::mpsc::Receiver<tls_region::ThreadId>,
) {
  if create(1024) != 0 {
    eprintln!("thread {thread_index}: failed to create region");
    return;
  }

  // Only announce this thread's id once its region exists, so the peer's
  // blocking `recv()` below can never observe an id that has nothing to
  // clone from yet.
  announce.send(current_thread()).ok();

  let message = b"Hello, Thread!\0";
  if write(0, message.len(), message) != 0 {
    eprintln!("thread {thread_index}: failed to write to region");
    return;
  }

  let mut buffer = [0u8; 1024];
  if read(0, buffer.len(), &mut buffer) != 0 {
    eprintln!("thread {thread_index}: failed to read from region");
    return;
  }

  let text = std::str::from_utf8(&buffer[..message.len()]).unwrap_or("<invalid utf8>");
  println!("thread {thread_index}: read from region: {text}");

  if let Ok(other_id) = other.recv() {
    if clone(other_id) != 0 {
      eprintln!("thread {thread_index}: failed to clone the other thread's region");
    }
  }

  if destroy() != 0 {
    eprintln!("thread {thread_index}: failed to destroy region");
  }
}

fn main() {
  let (tx0, rx0) = std::sync::mpsc::channel();
  let (tx1, rx1) = std::sync::mpsc::channel();

  let t0 = thread::spawn(move || run(0, tx1, rx0));
  let t1 = thread::spawn(move || run(1, tx0, rx1));

  t0.join().expect("thread 0 panicked");
  t1.join().expect("thread 1 panicked");
}
