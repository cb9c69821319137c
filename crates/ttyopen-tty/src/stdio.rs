//! Standard descriptor sanitizing
//!
//! Guarantees 0, 1 and 2 are open before anything else gets a chance to
//! allocate them. `/dev/null` may legitimately not exist yet when running as
//! early as init, so any open descriptor will do.

use crate::session::detach;
use crate::TtyError;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup, dup2};
use std::os::fd::RawFd;
use tracing::{debug, info, warn};

const NULL_DEVICE: &str = "/dev/null";
const ROOT_DIR: &str = "/";

/// Device the standard descriptors were pointed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// `/dev/null`, opened read-write
    NullDevice,

    /// The filesystem root, opened read-only
    Root,
}

/// Point 0, 1 and 2 at a harmless device and start a new session
pub fn sanitize_stdio() -> Result<Fallback, TtyError> {
    let (mut fd, fallback) = match open(NULL_DEVICE, OFlag::O_RDWR, Mode::empty()) {
        Ok(fd) => (fd, Fallback::NullDevice),
        Err(e) => {
            info!("cannot open {}: {}, falling back to {}", NULL_DEVICE, e, ROOT_DIR);
            let fd = open(ROOT_DIR, OFlag::O_RDONLY, Mode::empty())
                .map_err(TtyError::NoFallbackDevice)?;
            (fd, Fallback::Root)
        }
    };

    // Duplicating upward fills any free slot below 2 along the way.
    while fd < 2 {
        fd = dup(fd).map_err(TtyError::Duplicate)?;
    }

    detach();

    for slot in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        dup2(fd, slot).map_err(TtyError::Duplicate)?;
    }
    release(fd);

    debug!("Standard descriptors sanitized to {:?}", fallback);
    Ok(fallback)
}

/// Close `fd` unless it is one of the standard slots
pub(crate) fn release(fd: RawFd) {
    if fd > libc::STDERR_FILENO {
        if let Err(e) = close(fd) {
            warn!("close({}) failed: {}", fd, e);
        }
    }
}
