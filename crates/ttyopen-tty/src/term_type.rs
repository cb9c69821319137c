//! `TERM` negotiation
//!
//! A Linux virtual console answers `VT_OPENQRY`; anything else on the other
//! end (typically a serial line) does not, and gets a conservative terminal
//! type instead of the `linux` default.

use crate::env::Environment;
use crate::platform::Platform;
use std::ffi::OsStr;
use std::os::fd::BorrowedFd;
use tracing::debug;

pub const TERM_VAR: &str = "TERM";

/// Full featured console type
pub const GENERIC_TERM: &str = "linux";

/// Minimal type for consoles that are not virtual terminals
pub const MINIMAL_TERM: &str = "vt102";

/// What the capability query said about standard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermCapability {
    /// Answered the query: a full featured virtual console
    VirtualConsole,

    /// Rejected the query
    NotVirtualConsole,

    /// The platform has no such query
    Unknown,
}

impl TermCapability {
    /// Query `fd` on `platform`
    pub fn probe(fd: BorrowedFd<'_>, platform: &Platform) -> Self {
        match platform.query_virtual_console(fd) {
            Some(true) => TermCapability::VirtualConsole,
            Some(false) => TermCapability::NotVirtualConsole,
            None => TermCapability::Unknown,
        }
    }
}

/// Value `TERM` should be set to, if it needs changing
pub fn decide(current: Option<&OsStr>, capability: TermCapability) -> Option<&'static str> {
    match capability {
        TermCapability::NotVirtualConsole => match current {
            None => Some(MINIMAL_TERM),
            Some(term) if term == GENERIC_TERM => Some(MINIMAL_TERM),
            Some(_) => None,
        },
        TermCapability::VirtualConsole | TermCapability::Unknown => match current {
            None => Some(GENERIC_TERM),
            Some(_) => None,
        },
    }
}

/// Probe `fd` and update `TERM` in `env` accordingly
pub fn negotiate<E: Environment>(
    env: &mut E,
    fd: BorrowedFd<'_>,
    platform: &Platform,
) -> TermCapability {
    let capability = TermCapability::probe(fd, platform);
    let current = env.var(TERM_VAR);
    match decide(current.as_deref(), capability) {
        Some(term) => {
            debug!("{:?}: setting {}={}", capability, TERM_VAR, term);
            env.set_var(TERM_VAR, OsStr::new(term));
        }
        None => debug!("{:?}: keeping {}={:?}", capability, TERM_VAR, current),
    }
    capability
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use crate::platform::HOST;
    use std::ffi::OsString;
    use std::os::fd::AsFd;
    use test_case::test_case;

    #[test_case(None, TermCapability::VirtualConsole => Some(GENERIC_TERM); "unset on virtual console")]
    #[test_case(None, TermCapability::Unknown => Some(GENERIC_TERM); "unset without query")]
    #[test_case(None, TermCapability::NotVirtualConsole => Some(MINIMAL_TERM); "unset on serial line")]
    #[test_case(Some("linux"), TermCapability::NotVirtualConsole => Some(MINIMAL_TERM); "default on serial line")]
    #[test_case(Some("linux"), TermCapability::VirtualConsole => None; "default on virtual console")]
    #[test_case(Some("xterm"), TermCapability::NotVirtualConsole => None; "custom on serial line")]
    #[test_case(Some("xterm"), TermCapability::VirtualConsole => None; "custom on virtual console")]
    #[test_case(Some("vt220"), TermCapability::Unknown => None; "custom without query")]
    #[test_case(Some(""), TermCapability::NotVirtualConsole => None; "empty on serial line")]
    #[test_case(Some(""), TermCapability::VirtualConsole => None; "empty on virtual console")]
    fn test_decide(current: Option<&str>, capability: TermCapability) -> Option<&'static str> {
        decide(current.map(OsStr::new), capability)
    }

    #[test]
    fn test_probe_disabled_platform() {
        let platform = Platform {
            vt_query: false,
            ..HOST
        };
        let file = std::fs::File::open("/dev/null").expect("open /dev/null");
        assert_eq!(
            TermCapability::probe(file.as_fd(), &platform),
            TermCapability::Unknown
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_negotiate_pty_is_not_virtual_console() {
        let pty = nix::pty::openpty(None, None).expect("openpty");
        let mut env = MapEnv::new().with(TERM_VAR, GENERIC_TERM);

        let capability = negotiate(&mut env, pty.slave.as_fd(), &HOST);

        assert_eq!(capability, TermCapability::NotVirtualConsole);
        assert_eq!(env.var(TERM_VAR), Some(OsString::from(MINIMAL_TERM)));
    }

    #[test]
    fn test_negotiate_keeps_custom_value() {
        let file = std::fs::File::open("/dev/null").expect("open /dev/null");
        let mut env = MapEnv::new().with(TERM_VAR, "screen-256color");

        negotiate(&mut env, file.as_fd(), &HOST);

        assert_eq!(env.var(TERM_VAR), Some(OsString::from("screen-256color")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_negotiate_keeps_empty_value() {
        let pty = nix::pty::openpty(None, None).expect("openpty");
        let mut env = MapEnv::new().with(TERM_VAR, "");

        negotiate(&mut env, pty.slave.as_fd(), &HOST);

        assert_eq!(env.var(TERM_VAR), Some(OsString::new()));
    }
}
