//! Session leadership
//!
//! `setsid` drops any previous controlling terminal. It is called once by the
//! sanitizer and again right before exec, so repeated calls must be harmless.

use crate::TtyError;
use nix::errno::Errno;
use nix::unistd::{getpid, getsid, setsid, Pid};
use std::os::fd::{AsRawFd, BorrowedFd};
use tracing::{debug, warn};

/// Result of asking for a new session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A fresh session was created with this process as leader
    NewSession(Pid),

    /// The process already leads its session
    AlreadyLeader,

    /// The process leads a process group in a foreign session and the kernel
    /// refused to move it
    GroupLeader,
}

impl SessionState {
    /// Whether the process ends up leading its own session
    pub fn is_leader(&self) -> bool {
        !matches!(self, SessionState::GroupLeader)
    }
}

/// Become the leader of a new session, detaching from any controlling terminal
pub fn detach() -> SessionState {
    match setsid() {
        Ok(sid) => {
            debug!("Started new session {}", sid);
            SessionState::NewSession(sid)
        }
        Err(Errno::EPERM) if getsid(None).ok() == Some(getpid()) => {
            debug!("Already session leader");
            SessionState::AlreadyLeader
        }
        Err(e) => {
            warn!("setsid failed, keeping current session: {}", e);
            SessionState::GroupLeader
        }
    }
}

nix::ioctl_write_int_bad!(tiocsctty, libc::TIOCSCTTY);

/// Make `fd` the controlling terminal of the current session
pub fn acquire_controlling_terminal(fd: BorrowedFd<'_>) -> Result<(), TtyError> {
    unsafe { tiocsctty(fd.as_raw_fd(), 0) }.map_err(TtyError::ControllingTerminal)?;
    debug!("Acquired controlling terminal on fd {}", fd.as_raw_fd());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_leader_is_not_leader() {
        assert!(!SessionState::GroupLeader.is_leader());
        assert!(SessionState::AlreadyLeader.is_leader());
        assert!(SessionState::NewSession(Pid::from_raw(42)).is_leader());
    }
}
