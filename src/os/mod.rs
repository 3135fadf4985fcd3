//! Platform glue for the page store: anonymous mappings, protection
//! changes, unmapping, the page size, thread identity and the synchronous
//! fault handler.
//!
//! Everything above this module talks to these functions only; nothing
//! above knows it is calling `mmap`/`mprotect`/`sigaction` underneath.

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::*;

use std::sync::OnceLock;

/// Returns the operating system's page size, in bytes.
///
/// Queried once per process and cached; repeated calls are free.
#[inline]
pub fn page_size() -> usize {
  static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
  *PAGE_SIZE.get_or_init(query_page_size)
}

/// Rounds `size` up to the nearest multiple of the page size, then divides
/// by the page size: the number of pages needed to hold `size` bytes.
#[inline]
pub fn page_count(size: usize) -> usize {
  let page_size = page_size();
  (size + page_size - 1) / page_size
}

/// Rounds `address` down to its containing page's base address.
#[inline]
pub fn page_floor(address: usize) -> usize {
  address & !(page_size() - 1)
}
