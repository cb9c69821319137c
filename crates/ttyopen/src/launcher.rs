//! Console setup followed by process image replacement

use crate::LaunchError;
use nix::errno::Errno;
use nix::unistd::execv;
use std::convert::Infallible;
use std::ffi::{CString, OsString};
use std::io;
use std::os::fd::AsFd;
use std::os::unix::ffi::OsStringExt;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use ttyopen_tty::session::acquire_controlling_terminal;
use ttyopen_tty::{
    console_init, detach, negotiate, normalize, ConsoleOutcome, Platform, ProcessEnv, TtyError,
    HOST,
};

/// What to run and where, fixed once the command line is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Console device; `None` resolves through the environment
    pub terminal: Option<PathBuf>,

    /// Program to exec; also passed as its `argv[0]`
    pub command: PathBuf,

    /// Arguments following `argv[0]`
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Build from the raw `TTYPATH` and `CMD [ARG...]` values
    pub fn new(terminal: OsString, command: Vec<OsString>) -> Result<Self, LaunchError> {
        let mut command = command.into_iter();
        let program = command
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LaunchError::Usage("CMD must not be empty".to_string()))?;

        Ok(Self {
            terminal: (!terminal.is_empty()).then(|| PathBuf::from(terminal)),
            command: PathBuf::from(program),
            args: command.collect(),
        })
    }

    /// Argument vector for exec: the command path, then the trailing arguments
    pub fn argv(&self) -> Result<Vec<CString>, LaunchError> {
        std::iter::once(self.command.as_os_str().to_os_string())
            .chain(self.args.iter().cloned())
            .map(to_cstring)
            .collect()
    }
}

fn to_cstring(arg: OsString) -> Result<CString, LaunchError> {
    CString::new(arg.clone().into_vec()).map_err(|_| LaunchError::NulByte(arg))
}

/// Runs the startup sequence and execs the target
#[derive(Debug, Clone)]
pub struct Launcher {
    platform: Platform,
    acquire_ctty: bool,
}

impl Launcher {
    pub fn new() -> Self {
        Self {
            platform: HOST,
            acquire_ctty: false,
        }
    }

    /// Make the console the controlling terminal right before exec
    pub fn acquire_ctty(mut self, acquire: bool) -> Self {
        self.acquire_ctty = acquire;
        self
    }

    /// Set up the console and replace the process image.
    ///
    /// Only returns on failure.
    pub fn launch(&self, invocation: &Invocation) -> Result<Infallible, LaunchError> {
        let path = to_cstring(invocation.command.as_os_str().to_os_string())?;
        let argv = invocation.argv()?;

        let mut env = ProcessEnv;
        match console_init(invocation.terminal.as_deref(), &env, &self.platform)? {
            ConsoleOutcome::Attached(device) => info!("Console {}", device.display()),
            ConsoleOutcome::Sanitized(fallback) => info!("No console, stdio on {:?}", fallback),
        }

        let stdin = io::stdin();
        negotiate(&mut env, stdin.as_fd(), &self.platform);
        match normalize(stdin.as_fd(), &self.platform) {
            Err(TtyError::GetAttributes(Errno::ENOTTY)) => {
                info!("Standard input is not a terminal, line discipline left alone")
            }
            result => result?,
        }

        let session = detach();
        if session.is_leader() {
            debug!("Session before exec: {:?}", session);
        } else {
            warn!("{} will not lead its session", invocation.command.display());
        }
        if self.acquire_ctty {
            acquire_controlling_terminal(stdin.as_fd())?;
        }

        debug!("Executing {} {:?}", invocation.command.display(), invocation.args);
        execv(&path, &argv).map_err(|errno| LaunchError::Exec {
            command: invocation.command.clone(),
            errno,
        })
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_invocation_splits_command() {
        let inv = Invocation::new("/dev/tty1".into(), strings(&["/bin/echo", "hello"])).unwrap();
        assert_eq!(inv.terminal, Some(PathBuf::from("/dev/tty1")));
        assert_eq!(inv.command, PathBuf::from("/bin/echo"));
        assert_eq!(inv.args, strings(&["hello"]));
    }

    #[test]
    fn test_empty_terminal_is_unset() {
        let inv = Invocation::new(OsString::new(), strings(&["/bin/true"])).unwrap();
        assert_eq!(inv.terminal, None);
    }

    #[test]
    fn test_empty_command_is_usage_error() {
        let err = Invocation::new("/dev/tty1".into(), strings(&[""])).unwrap_err();
        assert!(matches!(err, LaunchError::Usage(_)));
        assert_eq!(err.exit_code(), 1);

        let err = Invocation::new("/dev/tty1".into(), Vec::new()).unwrap_err();
        assert!(matches!(err, LaunchError::Usage(_)));
    }

    #[test]
    fn test_argv_starts_with_command() {
        let inv =
            Invocation::new("".into(), strings(&["/bin/echo", "hello", "-n", ""])).unwrap();
        let argv = inv.argv().unwrap();
        let argv: Vec<&str> = argv.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(argv, ["/bin/echo", "hello", "-n", ""]);
    }

    #[test]
    fn test_argv_without_args() {
        let inv = Invocation::new("".into(), strings(&["/bin/true"])).unwrap();
        assert_eq!(inv.argv().unwrap(), vec![CString::new("/bin/true").unwrap()]);
    }

    #[test]
    fn test_argv_rejects_nul() {
        let inv = Invocation {
            terminal: None,
            command: PathBuf::from("/bin/echo"),
            args: vec![OsString::from_vec(b"a\0b".to_vec())],
        };
        assert!(matches!(inv.argv(), Err(LaunchError::NulByte(_))));
    }
}
