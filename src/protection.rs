//! Page protection flags.

bitflags! {
  /// The protection state of a page, as understood by the page store.
  ///
  /// Only the three states the spec actually uses are represented: a page
  /// is quiescent (`NONE`), open for reading (`READ`), or open for writing
  /// (`WRITE`, which also permits reading — there is no write-only state on
  /// the platforms this crate targets).
  #[derive(Default)]
  pub struct Protection: u8 {
    /// Any access faults.
    const NONE = 0;
    /// Read-only.
    const READ = 1 << 0;
    /// Write-enabled (and implicitly readable).
    const WRITE = 1 << 1;
  }
}

impl Protection {
  /// Maps to the `PROT_*` flags `mmap`/`mprotect` expect.
  pub(crate) fn to_native(self) -> libc::c_int {
    if self.contains(Protection::WRITE) {
      libc::PROT_READ | libc::PROT_WRITE
    } else if self.contains(Protection::READ) {
      libc::PROT_READ
    } else {
      libc::PROT_NONE
    }
  }
}
