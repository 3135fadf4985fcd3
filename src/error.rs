//! Error types and utilities.

use std::fmt;

/// The result type used by this crate's `try_*` API.
pub type Result<T> = ::std::result::Result<T, Error>;

/// A recoverable failure from one of the five region operations.
///
/// Every variant here corresponds to a check spelled out for the calling
/// thread's operation; none of them leave the registry or the calling
/// thread's region in a different state than before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// `create` was called with a size of zero.
  InvalidArgument,
  /// `create` or `clone` was called by a thread that already owns a region.
  AlreadyExists,
  /// The calling thread (or, for `clone`, the source thread) has no region.
  NotFound,
  /// `offset + length` exceeds the region's size, or overflows `usize`.
  OutOfBounds,
  /// The OS refused a page reservation.
  AllocationFailed,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let message = match self {
      Error::InvalidArgument => "size must be greater than zero",
      Error::AlreadyExists => "the calling thread already owns a region",
      Error::NotFound => "the thread has no region",
      Error::OutOfBounds => "offset + length exceeds the region size",
      Error::AllocationFailed => "the operating system refused a page reservation",
    };
    f.write_str(message)
  }
}

impl std::error::Error for Error {}
