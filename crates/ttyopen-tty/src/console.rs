//! Console selection and attachment
//!
//! The device is opened with `O_NOCTTY | O_NONBLOCK` so the open can neither
//! hang on carrier detect nor grab the terminal as a side effect. A device
//! that fails to open is not fatal: the standard descriptors get sanitized
//! instead.

use crate::env::Environment;
use crate::platform::Platform;
use crate::stdio::{release, sanitize_stdio, Fallback};
use crate::TtyError;
use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::dup2;
use std::os::fd::RawFd;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Variables consulted, in order, when no path is given explicitly
pub const CONSOLE_VARS: [&str; 2] = ["CONSOLE", "console"];

/// Where the standard descriptors ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleOutcome {
    /// The resolved device now backs 0, 1 and 2
    Attached(PathBuf),

    /// No usable device; 0, 1 and 2 point at a fallback
    Sanitized(Fallback),
}

/// Pick the console device: explicit path, then `CONSOLE`, then `console`,
/// then the platform default. Empty variables are skipped.
pub fn resolve_console<E: Environment>(
    explicit: Option<&Path>,
    env: &E,
    platform: &Platform,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    CONSOLE_VARS
        .iter()
        .find_map(|key| env.var(key).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
        .or_else(|| platform.default_console.map(PathBuf::from))
}

/// Resolve the console and make it standard input, output and error
pub fn console_init<E: Environment>(
    explicit: Option<&Path>,
    env: &E,
    platform: &Platform,
) -> Result<ConsoleOutcome, TtyError> {
    let Some(path) = resolve_console(explicit, env, platform) else {
        debug!("No console configured");
        return sanitize_stdio().map(ConsoleOutcome::Sanitized);
    };

    let fd = match open(
        path.as_path(),
        OFlag::O_RDWR | OFlag::O_NONBLOCK | OFlag::O_NOCTTY,
        Mode::empty(),
    ) {
        Ok(fd) => fd,
        Err(e) => {
            info!("cannot open console {}: {}", path.display(), e);
            return sanitize_stdio().map(ConsoleOutcome::Sanitized);
        }
    };

    attach(fd)?;
    debug!("Attached {} as standard input/output/error", path.display());
    Ok(ConsoleOutcome::Attached(path))
}

fn attach(fd: RawFd) -> Result<(), TtyError> {
    for slot in [libc::STDIN_FILENO, libc::STDOUT_FILENO] {
        if let Err(e) = dup2(fd, slot) {
            warn!("dup2({}, {}) failed: {}", fd, slot, e);
        }
    }
    if let Err(e) = dup2(fd, libc::STDERR_FILENO) {
        release(fd);
        return Err(TtyError::Duplicate(e));
    }
    release(fd);

    // The flag lives on the open file description shared by all three slots.
    clear_nonblocking(libc::STDERR_FILENO);
    Ok(())
}

fn clear_nonblocking(fd: RawFd) {
    let flags = match fcntl(fd, FcntlArg::F_GETFL) {
        Ok(bits) => OFlag::from_bits_truncate(bits),
        Err(e) => {
            warn!("F_GETFL on {} failed: {}", fd, e);
            return;
        }
    };
    if let Err(e) = fcntl(fd, FcntlArg::F_SETFL(flags - OFlag::O_NONBLOCK)) {
        warn!("cannot clear O_NONBLOCK on {}: {}", fd, e);
    }
}
