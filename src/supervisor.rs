//! Running external programs as synchronous children.
//!
//! Each external command goes `Idle -> Forked -> {executing | exec failed} ->
//! Reaped -> Idle`: exactly one child exists at a time and it is always reaped
//! before control returns to the shell loop.

use crate::resolver::{SearchPath, candidates};
use crate::retry::retry_interrupted;
use anyhow::{Context, Result, anyhow};
use nix::errno::Errno;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::libc::{self, c_char};
use nix::unistd::{ForkResult, Pid, fork};
use std::ffi::CString;
use std::os::unix::ffi::OsStringExt;
use std::ptr;
use tracing::debug;

/// Status a child exits with when none of its candidates could be executed.
pub const EXEC_FAILED_STATUS: i32 = 127;

/// Command that is not a builtin.
///
/// The C strings and the null-terminated pointer array handed to `execv` are
/// all built before forking, so the child never allocates: it only calls
/// `execv`, `write` and `_exit` straight through libc.
#[derive(Debug)]
pub struct ExternalCommand {
    argv: Vec<CString>,
    /// Points into `argv`'s heap buffers, which never move; ends with null.
    argv_ptrs: Vec<*const c_char>,
    candidates: Vec<CString>,
}

impl ExternalCommand {
    /// Prepare `argv` (name first) for execution, resolving the name against
    /// `search`.
    pub fn new(argv: &[&str], search: &SearchPath) -> Result<Self> {
        let name = *argv.first().ok_or_else(|| anyhow!("empty argument vector"))?;
        let args = argv
            .iter()
            .map(|arg| CString::new(*arg))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("{name}: argument contains a NUL byte"))?;
        let paths = candidates(name, search)
            .map(|path| CString::new(path.into_os_string().into_vec()))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("{name}: program name contains a NUL byte"))?;
        let argv_ptrs = args
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();
        Ok(Self {
            argv: args,
            argv_ptrs,
            candidates: paths,
        })
    }

    /// Fork, exec the first working candidate in the child and wait for it.
    ///
    /// Returns once the child has been reaped. Errors mean the child could not be
    /// created or waited for; a child that failed to exec is not an error, it
    /// shows up as an exit with [`EXEC_FAILED_STATUS`].
    pub fn execute(self) -> Result<WaitStatus> {
        // SAFETY: the child branch only calls execv, write and _exit, which are
        // async-signal-safe, and never returns.
        match unsafe { fork() } {
            Err(errno) => Err(anyhow!("fork failed: {}", errno.desc())),
            Ok(ForkResult::Child) => self.exec_child(),
            Ok(ForkResult::Parent { child }) => {
                debug!(
                    pid = child.as_raw(),
                    program = ?self.argv[0],
                    candidates = ?self.candidates,
                    "spawned child"
                );
                reap(child)
            }
        }
    }

    fn exec_child(&self) -> ! {
        let mut last = Errno::ENOENT;
        for path in &self.candidates {
            // SAFETY: `path` and every entry of `argv_ptrs` are NUL-terminated
            // strings owned by `self`, and `argv_ptrs` ends with a null pointer.
            unsafe { libc::execv(path.as_ptr(), self.argv_ptrs.as_ptr()) };
            last = Errno::last();
        }
        write_stderr(b"exec failed: ");
        write_stderr(last.desc().as_bytes());
        write_stderr(b"\n");
        // SAFETY: _exit skips atexit handlers and stdio flushing, which belong
        // to the parent's copy of the process.
        unsafe { libc::_exit(EXEC_FAILED_STATUS) }
    }
}

/// Raw `write(2)` to stderr, usable between fork and exec.
fn write_stderr(bytes: &[u8]) {
    // SAFETY: `bytes` is a valid buffer of `bytes.len()` bytes.
    let _ = unsafe {
        libc::write(
            libc::STDERR_FILENO,
            bytes.as_ptr().cast(),
            bytes.len(),
        )
    };
}

/// Block until `child` terminates, retrying waits cut short by a signal.
fn reap(child: Pid) -> Result<WaitStatus> {
    let status = retry_interrupted(|| waitpid(child, None))
        .map_err(|errno| anyhow!("waitpid failed: {}", errno.desc()))?;
    debug!(pid = child.as_raw(), ?status, "child reaped");
    Ok(status)
}
