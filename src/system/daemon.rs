//! Detaches the process from its controlling terminal.
//!
//! Must run before the tokio runtime exists: `fork` only carries the calling
//! thread into the child.

use std::io;

use crate::error::SystemError;

const DEV_NULL: &std::ffi::CStr = c"/dev/null";
const ROOT_DIR: &std::ffi::CStr = c"/";

fn check(step: &'static str, result: libc::c_int) -> Result<libc::c_int, SystemError> {
    if result == -1 {
        return Err(SystemError::Daemonize {
            step,
            source: io::Error::last_os_error(),
        });
    }
    Ok(result)
}

fn fork_and_exit_parent(step: &'static str) -> Result<(), SystemError> {
    // SAFETY: called while the process is single threaded.
    let pid = check(step, unsafe { libc::fork() })?;
    if pid > 0 {
        // SAFETY: the parent leaves immediately without running destructors.
        unsafe { libc::_exit(0) };
    }
    Ok(())
}

/// Classic double fork, new session, `/` as cwd, stdio on `/dev/null`.
///
/// Only the grandchild returns. File descriptors opened beforehand (such as
/// the log file) stay valid.
///
/// # Errors
///
/// Returns an error naming the step that failed.
pub fn daemonize() -> Result<(), SystemError> {
    fork_and_exit_parent("fork")?;

    // SAFETY: plain syscall with no pointer arguments.
    check("setsid", unsafe { libc::setsid() })?;

    fork_and_exit_parent("second fork")?;

    // SAFETY: the path is a valid NUL-terminated string.
    check("chdir", unsafe { libc::chdir(ROOT_DIR.as_ptr()) })?;
    // SAFETY: plain syscall with no pointer arguments.
    unsafe { libc::umask(0o022) };

    // SAFETY: the path is a valid NUL-terminated string.
    let null_fd = check("open /dev/null", unsafe {
        libc::open(DEV_NULL.as_ptr(), libc::O_RDWR)
    })?;
    for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        // SAFETY: both descriptors are open.
        check("dup2", unsafe { libc::dup2(null_fd, fd) })?;
    }
    if null_fd > libc::STDERR_FILENO {
        // SAFETY: `null_fd` is open and no longer needed.
        unsafe { libc::close(null_fd) };
    }
    Ok(())
}
