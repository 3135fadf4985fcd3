//! Process-wide registry of thread → region bindings, and the synchronous
//! fault handler that polices them (spec.md §4.3).

use crate::os::{self, ThreadId};
use crate::region::Region;
use crate::Error;
use libc::{c_int, c_void, siginfo_t};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

type Table = Mutex<HashMap<ThreadId, Region>>;

static REGISTRY: OnceLock<Table> = OnceLock::new();

/// Returns the process-wide table, installing the fault handler on first
/// use.
///
/// `OnceLock::get_or_init` guarantees the initialisation closure runs
/// exactly once even if multiple threads race to call a registry operation
/// for the first time — this is spec.md §4.3's "observed exactly once
/// across threads" requirement, for free, without a hand-rolled guard flag.
fn table() -> &'static Table {
  REGISTRY.get_or_init(|| {
    os::install_fault_handler(handle_fault);
    Mutex::new(HashMap::new())
  })
}

/// A poisoned registry mutex means some other thread panicked while holding
/// it, leaving the table in an unknown state. That is a kernel-level
/// anomaly the design notes treat the same as an OS call that cannot
/// legitimately fail: fatal, not recoverable.
fn lock(table: &'static Table) -> std::sync::MutexGuard<'static, HashMap<ThreadId, Region>> {
  match table.lock() {
    Ok(guard) => guard,
    Err(_) => {
      eprintln!("tls_region: registry mutex poisoned; aborting");
      std::process::abort();
    }
  }
}

/// Creates a region of `size` bytes for the calling thread.
pub(crate) fn create(size: usize) -> Result<(), Error> {
  let table = table();
  let mut entries = lock(table);
  let thread = os::current_thread();

  if entries.contains_key(&thread) {
    return Err(Error::AlreadyExists);
  }

  let region = Region::create(size)?;
  entries.insert(thread, region);
  Ok(())
}

/// Removes and tears down the calling thread's region.
pub(crate) fn destroy() -> Result<(), Error> {
  let table = table();
  let mut entries = lock(table);
  let thread = os::current_thread();

  match entries.remove(&thread) {
    // Dropping `region` here releases every page whose refcount reaches
    // zero as a consequence (spec.md §4.2 "Destroy").
    Some(_region) => Ok(()),
    None => Err(Error::NotFound),
  }
}

/// Reads from the calling thread's region.
pub(crate) fn read(offset: usize, length: usize, out: &mut [u8]) -> Result<(), Error> {
  let table = table();
  let entries = lock(table);
  let thread = os::current_thread();

  match entries.get(&thread) {
    Some(region) => region.read(offset, length, out),
    None => Err(Error::NotFound),
  }
}

/// Writes to the calling thread's region.
pub(crate) fn write(offset: usize, length: usize, data: &[u8]) -> Result<(), Error> {
  let table = table();
  let mut entries = lock(table);
  let thread = os::current_thread();

  match entries.get_mut(&thread) {
    Some(region) => region.write(offset, length, data),
    None => Err(Error::NotFound),
  }
}

/// Makes the calling thread's region an alias of `source`'s region.
pub(crate) fn clone(source: ThreadId) -> Result<(), Error> {
  let table = table();
  let mut entries = lock(table);
  let thread = os::current_thread();

  if entries.contains_key(&thread) {
    return Err(Error::AlreadyExists);
  }

  let cloned = match entries.get(&source) {
    Some(region) => Region::clone_from(region),
    None => return Err(Error::NotFound),
  };

  entries.insert(thread, cloned);
  Ok(())
}

/// The installed `SIGSEGV`/`SIGBUS` handler.
///
/// Locks the same mutex the five operations above use, then scans every
/// entry's pages for the faulting address. A thread can only reach this
/// handler via a fault — it never went through `create`/`destroy`/`read`/
/// `write`/`clone` to get here, so it cannot already hold `table()`'s lock;
/// taking it here is therefore safe, and is the simplest correct design per
/// spec.md §5 and §9 ("Global mutable table + signal handler"). No
/// lock-free snapshot structure is needed.
///
/// If the address belongs to some region, the faulting thread is
/// terminated immediately and the process continues. Otherwise both fault
/// kinds are restored to their default disposition and the signal is
/// re-raised, so the OS produces its usual, unmanaged behaviour.
extern "C" fn handle_fault(sig: c_int, info: *mut siginfo_t, _context: *mut c_void) {
  let faulting_page = os::page_floor(os::fault_address(info));

  let belongs_to_a_region = {
    let entries = lock(table());
    entries
      .values()
      .any(|region| region.owns_page_base(faulting_page))
  };

  if belongs_to_a_region {
    os::exit_current_thread();
  }

  os::reraise_with_default_handling(sig);
}
