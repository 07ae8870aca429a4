//! Retrying blocking calls that were interrupted by signal delivery.
//!
//! Interrupted calls are retried silently; every other failure is handed back to
//! the caller unchanged.

use nix::errno::Errno;
use std::io;
use tracing::debug;

/// An error that can tell whether the failed call was cut short by a signal.
pub trait Interruptible {
    /// `true` when the call should simply be issued again.
    fn is_interrupted(&self) -> bool;
}

impl Interruptible for Errno {
    fn is_interrupted(&self) -> bool {
        *self == Errno::EINTR
    }
}

impl Interruptible for io::Error {
    fn is_interrupted(&self) -> bool {
        self.kind() == io::ErrorKind::Interrupted
    }
}

/// Run `call` until it returns something other than an interrupted error.
pub fn retry_interrupted<T, E, F>(mut call: F) -> Result<T, E>
where
    E: Interruptible,
    F: FnMut() -> Result<T, E>,
{
    loop {
        match call() {
            Err(e) if e.is_interrupted() => debug!("interrupted by signal, retrying"),
            other => return other,
        }
    }
}

/// Human-readable OS description of an IO error, the way `strerror` words it.
pub fn os_reason(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => Errno::from_raw(code).desc().to_string(),
        None => err.to_string(),
    }
}
