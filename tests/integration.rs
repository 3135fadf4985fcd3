//! Cross-thread, black-box scenarios from the public API only.
//!
//! The isolation scenario (a non-owning thread touching a managed page) is
//! exercised as a crate-internal test instead (`src/registry.rs`), since it
//! needs a raw page address that isn't part of the public surface.

use std::sync::mpsc;
use std::thread;
use tls_region::{clone, create, current_thread, destroy, page_size, read, write};

/// Scenario 1 (spec §8): create, write, read round-trips on one thread.
#[test]
fn create_write_read_round_trip() {
  thread::spawn(|| {
    assert_eq!(create(1024), 0);

    let message = b"Hello, Thread!\0";
    assert_eq!(write(0, message.len(), message), 0);

    let mut out = [0u8; 15];
    assert_eq!(read(0, out.len(), &mut out), 0);
    assert_eq!(&out, message);

    assert_eq!(destroy(), 0);
  })
  .join()
  .unwrap();
}

/// Scenario 2 (spec §8): cloning once a thread already owns a region fails.
#[test]
fn clone_fails_when_caller_already_owns_a_region() {
  let (tid_tx, tid_rx) = mpsc::channel();
  let (done_tx, done_rx) = mpsc::channel::<()>();

  let t1 = thread::spawn(move || {
    assert_eq!(create(8), 0);
    tid_tx.send(current_thread()).unwrap();
    done_rx.recv().unwrap();
    destroy();
  });

  let other = tid_rx.recv().unwrap();

  thread::spawn(move || {
    assert_eq!(create(8), 0);
    // This thread already has a region: cloning must fail, regardless of
    // whether the source thread's region is otherwise valid.
    assert_eq!(clone(other), -1);
    assert_eq!(destroy(), 0);
  })
  .join()
  .unwrap();

  done_tx.send(()).unwrap();
  t1.join().unwrap();
}

/// Scenarios 3 & 4 (spec §8): clone aliasing, and copy-on-write divergence
/// that leaves an untouched shared page still aliased.
#[test]
fn clone_aliases_then_diverges_only_on_the_written_page() {
  let page = page_size();
  let (tid_tx, tid_rx) = mpsc::channel();
  let (clone_ready_tx, clone_ready_rx) = mpsc::channel::<()>();
  let (after_diverge_tx, after_diverge_rx) = mpsc::channel::<()>();

  let t0 = thread::spawn(move || {
    assert_eq!(create(3 * page), 0);
    assert_eq!(write(0, 1, b"A"), 0);
    assert_eq!(write(2 * page, 1, b"B"), 0);
    tid_tx.send(current_thread()).unwrap();

    clone_ready_rx.recv().unwrap();

    // T0 writes "Z" over its own first byte; T1 (the clone) must not see it.
    assert_eq!(write(0, 1, b"Z"), 0);
    after_diverge_tx.send(()).unwrap();

    destroy();
  });

  let t0_id = tid_rx.recv().unwrap();

  let t1 = thread::spawn(move || {
    assert_eq!(clone(t0_id), 0);

    let mut out = [0u8; 1];
    assert_eq!(read(0, 1, &mut out), 0);
    assert_eq!(&out, b"A");
    assert_eq!(read(2 * page, 1, &mut out), 0);
    assert_eq!(&out, b"B");

    clone_ready_tx.send(()).unwrap();
    after_diverge_rx.recv().unwrap();

    // T0's later write must not have changed what T1 sees.
    assert_eq!(read(0, 1, &mut out), 0);
    assert_eq!(&out, b"A");
    // The page T0 never wrote is still shared and still reads "B".
    assert_eq!(read(2 * page, 1, &mut out), 0);
    assert_eq!(&out, b"B");

    assert_eq!(destroy(), 0);
  });

  t0.join().unwrap();
  t1.join().unwrap();
}

/// Scenario 6 (spec §8): an out-of-bounds write fails and leaves the region
/// untouched; subsequent in-bounds operations still work.
#[test]
fn out_of_bounds_write_leaves_region_untouched() {
  thread::spawn(|| {
    assert_eq!(create(10), 0);

    let buf = [1u8; 10];
    assert_eq!(write(5, 10, &buf), -1);

    let mut out = [0xFFu8; 10];
    assert_eq!(read(0, 10, &mut out), 0);
    assert_eq!(out, [0u8; 10]);

    assert_eq!(destroy(), 0);
  })
  .join()
  .unwrap();
}

/// Size validity (spec §8): `create(0)` fails, and bounds checks reject
/// ranges that would overflow `offset + length` rather than wrapping.
#[test]
fn create_zero_and_overflowing_bounds_are_rejected() {
  thread::spawn(|| {
    assert_eq!(create(0), -1);
    assert_eq!(create(16), 0);

    let mut out = [0u8; 1];
    assert_eq!(read(usize::MAX - 4, 10, &mut out), -1);

    assert_eq!(destroy(), 0);
  })
  .join()
  .unwrap();
}

/// Idempotence (spec §8): a second `destroy` on the same thread fails.
#[test]
fn destroy_twice_fails_the_second_time() {
  thread::spawn(|| {
    assert_eq!(create(4), 0);
    assert_eq!(destroy(), 0);
    assert_eq!(destroy(), -1);
  })
  .join()
  .unwrap();
}
