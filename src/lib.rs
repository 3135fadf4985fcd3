#![deny(unused, nonstandard_style)]
//! Per-thread local storage backed by protected OS virtual memory.
//!
//! Every thread that calls [`create`] gets a byte-addressable region of its
//! own, backed by whole pages that sit in the "no access" protection state
//! except during the exact window of a [`read`] or [`write`] call made by
//! the owning thread. Any other thread that touches one of those pages
//! directly — not through this crate's API — takes a page fault that this
//! crate's installed signal handler turns into termination of that one
//! thread; the rest of the process keeps running.
//!
//! Regions can also be shared with [`clone`]: the calling thread starts out
//! seeing exactly the bytes of another thread's region, with physical pages
//! aliased until either side writes, at which point the writer's page is
//! transparently duplicated (copy-on-write).
//!
//! ```no_run
//! use tls_region::{create, write, read, destroy};
//!
//! assert_eq!(create(64), 0);
//! assert_eq!(write(0, 5, b"hello"), 0);
//!
//! let mut out = [0u8; 5];
//! assert_eq!(read(0, 5, &mut out), 0);
//! assert_eq!(&out, b"hello");
//!
//! assert_eq!(destroy(), 0);
//! ```
//!
//! # Platform support
//!
//! This crate is `unix`-only. A thread can only be safely terminated from
//! inside a synchronous fault handler using `pthread_exit`, which has no
//! portable equivalent outside POSIX; see `DESIGN.md` for the tradeoff.
//!
//! # Non-goals
//!
//! Durability across process restarts, inter-process sharing, resizing an
//! existing region, and fairness between concurrent operations on the same
//! region are all out of scope. A region is byte-addressable but always
//! backed by whole pages; there is no partial-page addressing below the
//! page granularity.

#[macro_use]
extern crate bitflags;

mod error;
mod os;
mod page;
mod protection;
mod region;
mod registry;

pub use error::{Error, Result};
pub use os::{current_thread, ThreadId};
pub use protection::Protection;

/// Returns the operating system's page size, in bytes.
///
/// Every region is backed by whole pages of this size; a region's byte size
/// is rounded up to the next multiple of it.
#[inline]
pub fn page_size() -> usize {
  os::page_size()
}

/// Creates a region of `size` bytes for the calling thread.
///
/// Fails with [`Error::InvalidArgument`] if `size` is zero, or
/// [`Error::AlreadyExists`] if the calling thread already owns a region.
pub fn try_create(size: usize) -> Result<()> {
  registry::create(size)
}

/// Destroys the calling thread's region.
///
/// Fails with [`Error::NotFound`] if the calling thread has no region.
pub fn try_destroy() -> Result<()> {
  registry::destroy()
}

/// Reads `out.len()` bytes starting at `offset` from the calling thread's
/// region into `out`.
///
/// Fails with [`Error::NotFound`] if the calling thread has no region, or
/// [`Error::OutOfBounds`] if `offset + out.len()` exceeds the region's size.
pub fn try_read(offset: usize, out: &mut [u8]) -> Result<()> {
  registry::read(offset, out.len(), out)
}

/// Writes `data` starting at `offset` into the calling thread's region.
///
/// Fails with [`Error::NotFound`] if the calling thread has no region, or
/// [`Error::OutOfBounds`] if `offset + data.len()` exceeds the region's
/// size.
pub fn try_write(offset: usize, data: &[u8]) -> Result<()> {
  registry::write(offset, data.len(), data)
}

/// Makes the calling thread's region an alias of `source`'s region.
///
/// Fails with [`Error::AlreadyExists`] if the calling thread already owns a
/// region, or [`Error::NotFound`] if `source` has none.
pub fn try_clone(source: ThreadId) -> Result<()> {
  registry::clone(source)
}

/// Maps a `Result<(), Error>` to this crate's external `0`/`-1` contract.
#[inline]
fn as_status(result: Result<()>) -> i32 {
  match result {
    Ok(()) => 0,
    Err(_) => -1,
  }
}

/// Creates a region of `size` bytes for the calling thread.
///
/// Returns `0` on success, `-1` on failure. See [`try_create`] for the
/// specific failure reasons.
pub fn create(size: usize) -> i32 {
  as_status(try_create(size))
}

/// Destroys the calling thread's region. Returns `0` on success, `-1` on
/// failure. See [`try_destroy`].
pub fn destroy() -> i32 {
  as_status(try_destroy())
}

/// Reads `length` bytes starting at `offset` into `out`. `out` must hold at
/// least `length` bytes. Returns `0` on success, `-1` on failure. See
/// [`try_read`].
pub fn read(offset: usize, length: usize, out: &mut [u8]) -> i32 {
  as_status(registry::read(offset, length, out))
}

/// Writes `length` bytes from `data` starting at `offset`. `data` must hold
/// at least `length` bytes. Returns `0` on success, `-1` on failure. See
/// [`try_write`].
pub fn write(offset: usize, length: usize, data: &[u8]) -> i32 {
  as_status(registry::write(offset, length, data))
}

/// Makes the calling thread's region an alias of `source_thread`'s region.
/// Returns `0` on success, `-1` on failure. See [`try_clone`].
pub fn clone(source_thread: ThreadId) -> i32 {
  as_status(try_clone(source_thread))
}
