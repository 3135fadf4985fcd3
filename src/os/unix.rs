//! `mmap`/`mprotect`/`munmap`/`sigaction`/pthread glue.

use crate::protection::Protection;
use crate::Error;
use libc::{c_int, c_void, siginfo_t};
use std::ptr;

/// The identity the registry keys on: the calling thread's `pthread_t`.
pub type ThreadId = libc::pthread_t;

/// Returns the calling thread's identity.
#[inline]
pub fn current_thread() -> ThreadId {
  unsafe { libc::pthread_self() }
}

pub(crate) fn query_page_size() -> usize {
  unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

/// Reserves one fresh, anonymous, zero-initialised, private page with the
/// given protection, at an OS-chosen address.
pub(crate) fn reserve(protection: Protection) -> Result<*mut u8, Error> {
  let size = super::page_size();
  unsafe {
    let ptr = libc::mmap(
      ptr::null_mut(),
      size,
      protection.to_native(),
      libc::MAP_ANON | libc::MAP_PRIVATE,
      -1,
      0,
    );
    if ptr == libc::MAP_FAILED {
      Err(Error::AllocationFailed)
    } else {
      Ok(ptr as *mut u8)
    }
  }
}

/// Changes the protection of a single, already-reserved page.
///
/// A failure here means the OS refused to change the protection of a page
/// this process still owns — a programming invariant violation, not a
/// recoverable error. The caller is expected to treat `Err` as fatal.
pub(crate) fn protect(address: *mut u8, protection: Protection) -> Result<(), ()> {
  let size = super::page_size();
  let result = unsafe { libc::mprotect(address as *mut c_void, size, protection.to_native()) };
  if result == 0 {
    Ok(())
  } else {
    Err(())
  }
}

/// Unmaps a single page previously obtained from [`reserve`].
pub(crate) fn release(address: *mut u8) {
  let size = super::page_size();
  unsafe {
    libc::munmap(address as *mut c_void, size);
  }
}

/// Installs `handler` as the synchronous fault handler for both
/// segmentation-violation and bus-error fault kinds.
pub(crate) fn install_fault_handler(
  handler: extern "C" fn(c_int, *mut siginfo_t, *mut c_void),
) {
  unsafe {
    let mut action: libc::sigaction = std::mem::zeroed();
    action.sa_sigaction = handler as usize;
    action.sa_flags = libc::SA_SIGINFO;
    libc::sigemptyset(&mut action.sa_mask);
    libc::sigaction(libc::SIGSEGV, &action, ptr::null_mut());
    libc::sigaction(libc::SIGBUS, &action, ptr::null_mut());
  }
}

/// Returns the faulting address carried by a `siginfo_t`.
#[inline]
pub(crate) fn fault_address(info: *const siginfo_t) -> usize {
  unsafe { (*info).si_addr() as usize }
}

/// Restores both fault kinds to their default disposition and re-raises
/// `sig`, so the OS produces its usual, unmanaged behaviour.
///
/// Does not return: either the re-raised signal terminates the process (the
/// default action for SIGSEGV/SIGBUS), or something has gone sufficiently
/// wrong that there is nothing sensible left to do but exit the thread.
pub(crate) fn reraise_with_default_handling(sig: c_int) -> ! {
  unsafe {
    libc::signal(libc::SIGSEGV, libc::SIG_DFL);
    libc::signal(libc::SIGBUS, libc::SIG_DFL);
    libc::raise(sig);
  }
  exit_current_thread()
}

/// Terminates the calling thread immediately. Used by the fault interceptor
/// to end a thread that touched a managed page without going through the
/// region API, and as the fallback if re-raising a signal somehow returns.
pub(crate) fn exit_current_thread() -> ! {
  unsafe { libc::pthread_exit(ptr::null_mut()) }
}
