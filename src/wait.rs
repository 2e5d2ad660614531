//! Bounded waiting for sysfs entries to become accessible.
//!
//! Exporting a GPIO pin is asynchronous: the kernel creates the per-pin
//! control files (and udev fixes their permissions) some time after the
//! `export` write returns. [`wait_until_access`] bridges that gap.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// The access right to wait for, mirroring `R_OK`/`W_OK` of access(2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    fn flag(self) -> libc::c_int {
        match self {
            AccessMode::Read => libc::R_OK,
            AccessMode::Write => libc::W_OK,
        }
    }
}

/// Polls access(2) on `path` until the requested right is granted or
/// `timeout` has elapsed since the call started.
///
/// Fails with [`Error::AccessTimeout`] naming the path once the deadline
/// passes. The loop busy-polls with no sleep between checks: the wait is
/// typically sub-second and latency matters more than the CPU it burns.
/// Blocks the calling thread for up to the full timeout.
pub fn wait_until_access(path: &Path, mode: AccessMode, timeout: Duration) -> Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if unsafe { libc::access(c_path.as_ptr(), mode.flag()) } == 0 {
            return Ok(());
        }
    }
    Err(Error::AccessTimeout {
        path: path.to_path_buf(),
    })
}
