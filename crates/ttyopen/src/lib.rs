//! ttyopen: bootstrap the first process on a console
//!
//! Picks a console device, makes it standard input/output/error of a fresh
//! session with a sane line discipline and `TERM`, then replaces the process
//! image with the requested command.

pub mod cli;
pub mod launcher;

pub use launcher::{Invocation, Launcher};

use nix::errno::Errno;
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;
use ttyopen_tty::TtyError;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("{0}")]
    Usage(String),

    #[error("argument contains a NUL byte: {0:?}")]
    NulByte(OsString),

    #[error(transparent)]
    Tty(#[from] TtyError),

    #[error("exec error: {}: {}", .command.display(), .errno.desc())]
    Exec { command: PathBuf, errno: Errno },
}

impl LaunchError {
    /// Status the process exits with: 1 for usage errors, the errno otherwise
    pub fn exit_code(&self) -> i32 {
        let code = match self {
            LaunchError::Usage(_) => 1,
            LaunchError::NulByte(_) => Errno::EINVAL as i32,
            LaunchError::Tty(e) => e.errno() as i32,
            LaunchError::Exec { errno, .. } => *errno as i32,
        };
        if code == 0 {
            1
        } else {
            code
        }
    }
}
