//! Points the process's stdout and stderr at a log file, so panics and
//! stray prints from other code end up next to the log records.

use std::fs::File;
use std::io;

#[cfg(unix)]
pub fn redirect_std_streams(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    for target in [libc::STDERR_FILENO, libc::STDOUT_FILENO] {
        // SAFETY: `fd` is an open descriptor owned by `file` for the duration
        // of the call; dup2 only duplicates it.
        if unsafe { libc::dup2(fd, target) } == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(windows)]
pub fn redirect_std_streams(file: &File) -> io::Result<()> {
    use std::os::windows::io::AsRawHandle;
    use windows_sys::Win32::System::Console::{SetStdHandle, STD_ERROR_HANDLE, STD_OUTPUT_HANDLE};

    let handle = file.as_raw_handle() as windows_sys::Win32::Foundation::HANDLE;
    for target in [STD_ERROR_HANDLE, STD_OUTPUT_HANDLE] {
        // SAFETY: the handle belongs to `file`, which outlives the call.
        if unsafe { SetStdHandle(target, handle) } == 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
pub fn redirect_std_streams(_file: &File) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "stream redirection is not supported on this platform",
    ))
}
