//! SIGINT/SIGTERM turn into a flag the event loop polls, so the loop can
//! return normally and drop its grab on the touch device.
//!
//! A signal that arrives after the flag check but before the device read
//! starts is not lost: reads wait on `poll` with a short timeout, so the
//! loop sees the flag within one timeout period.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Installed without `SA_RESTART`: a read blocked on the device fails with
/// `EINTR` instead of resuming.
pub fn install() -> io::Result<()> {
    for signal in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: the handler only touches an atomic, and the struct is
        // fully initialised before being passed to the kernel.
        let rc = unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = 0;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(signal, &action, std::ptr::null_mut())
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
