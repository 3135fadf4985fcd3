//! The page store: one reference-counted OS page, shared by reference
//! across every `Region` slot that aliases it.
//!
//! This is the bottom layer of the design (spec.md §4.1's "Page Store"):
//! it knows how to reserve, protect and release a page, and nothing about
//! threads or regions. The refcount the data model calls for
//! (spec.md §3, "Page handle") is `Arc`'s strong count — there is no
//! separate counter field to keep in sync by hand.

use crate::os;
use crate::protection::Protection;
use crate::Error;
use std::cell::Cell;
use std::sync::Arc;

/// A single OS page, owned jointly by every slot that holds a clone of its
/// [`PageHandle`].
///
/// `protection` tracks the page's current protection state. It is a shared
/// property of the physical page, not of any one slot (spec.md §3): whichever
/// `Region` last called [`PageHandle::unprotect`] determines what every
/// other slot aliasing this page sees.
pub(crate) struct Page {
  base: *mut u8,
  protection: Cell<Protection>,
}

// Safety: every access to a `Page`'s fields happens while the caller holds
// the registry's mutex (see registry.rs) — reads and writes of `base` and
// `protection` are never concurrent. The teacher's `Region` type makes the
// identical claim for its raw pointer field (see `region-rs`'s
// `unsafe impl Send for Region {}` / `unsafe impl Sync for Region {}`).
unsafe impl Send for Page {}
unsafe impl Sync for Page {}

impl Drop for Page {
  fn drop(&mut self) {
    os::release(self.base);
  }
}

/// A shared, owning reference to one [`Page`].
///
/// `PageHandle::clone` is the "refcount++" of spec.md's clone-aliasing rule;
/// dropping the last handle is the "refcount reaches zero, release the
/// backing mapping" rule.
pub(crate) type PageHandle = Arc<Page>;

/// Reserves a fresh page with protection `NONE` and a refcount of one.
///
/// Corresponds to spec.md §4.1's `reserve`: fails with
/// [`Error::AllocationFailed`] if the OS refuses.
pub(crate) fn reserve() -> Result<PageHandle, Error> {
  let base = os::reserve(Protection::NONE)?;
  Ok(Arc::new(Page {
    base,
    protection: Cell::new(Protection::NONE),
  }))
}

impl Page {
  /// Returns the page's base address, used by the fault interceptor to
  /// match a faulting address against a managed page.
  pub(crate) fn base(&self) -> *mut u8 {
    self.base
  }

  /// Returns this page's current protection state.
  pub(crate) fn protection(&self) -> Protection {
    self.protection.get()
  }

  /// Changes this page's protection.
  ///
  /// A failure here is a programming invariant violation per spec.md §4.1
  /// ("this is fatal to the process") — the page was either just reserved
  /// or is still mapped and owned by us. We abort rather than propagate a
  /// `Result`, mirroring the original `tls_protect`/`tls_unprotect`'s
  /// `fprintf(stderr, ...); exit(1)`.
  pub(crate) fn set_protection(&self, protection: Protection) {
    if os::protect(self.base, protection).is_err() {
      eprintln!(
        "tls_region: mprotect failed on a page this process owns (address {:p}); aborting",
        self.base
      );
      std::process::abort();
    }
    self.protection.set(protection);
  }

  /// Copies this page's full contents into a byte-for-byte duplicate,
  /// reserved fresh with protection `NONE`.
  ///
  /// Used by the copy-on-write path in `Region::write`: the duplicate
  /// becomes the private page for the writing region; this page's own
  /// refcount is decremented by dropping the `Arc` that used to sit in the
  /// writer's slot.
  pub(crate) fn duplicate(&self) -> Result<PageHandle, Error> {
    let fresh = reserve()?;
    self.set_protection(Protection::READ);
    fresh.set_protection(Protection::WRITE);
    unsafe {
      std::ptr::copy_nonoverlapping(self.base, fresh.base, os::page_size());
    }
    fresh.set_protection(Protection::NONE);
    self.set_protection(Protection::NONE);
    Ok(fresh)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reserve_starts_quiescent() {
    let page = reserve().unwrap();
    assert_eq!(page.protection(), Protection::NONE);
  }

  #[test]
  fn reserve_gives_a_page_aligned_address() {
    let page = reserve().unwrap();
    assert_eq!(page.base() as usize % os::page_size(), 0);
  }

  #[test]
  fn clone_shares_the_same_base_and_bumps_the_refcount() {
    let page = reserve().unwrap();
    let alias = page.clone();
    assert_eq!(page.base(), alias.base());
    assert_eq!(Arc::strong_count(&page), 2);
    drop(alias);
    assert_eq!(Arc::strong_count(&page), 1);
  }

  #[test]
  fn duplicate_copies_bytes_and_is_independent() {
    let page = reserve().unwrap();
    page.set_protection(Protection::WRITE);
    unsafe {
      *page.base() = 0xAB;
    }
    page.set_protection(Protection::NONE);

    let copy = page.duplicate().unwrap();
    assert_ne!(page.base(), copy.base());

    copy.set_protection(Protection::READ);
    let byte = unsafe { *copy.base() };
    copy.set_protection(Protection::NONE);
    assert_eq!(byte, 0xAB);
  }
}
