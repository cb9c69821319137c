//! Command line and logging setup

use clap::{Parser, ValueEnum};
use nix::fcntl::{fcntl, FcntlArg};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsRawFd, FromRawFd};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Open a console as the terminal of a new session and exec a command on it"
)]
pub struct Args {
    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Append logs to this file instead of standard error
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Make the console the controlling terminal before exec
    #[arg(long)]
    pub ctty: bool,

    /// Console device; pass "" to use $CONSOLE, $console or the platform default
    #[arg(value_name = "TTYPATH")]
    pub tty: OsString,

    /// Program to execute, followed by its arguments
    #[arg(
        value_name = "CMD",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

/// Install the global tracing subscriber
///
/// Falls back to standard error when `log_file` cannot be opened; a missing
/// log directory must not keep the console from coming up.
pub fn init_logging(level: LogLevel, log_file: Option<&Path>) {
    let level = tracing::Level::from(level);

    let file = log_file.map(|path| (path, open_log_file(path)));
    match file {
        Some((_, Ok(file))) => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Some((path, Err(e))) => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(io::stderr)
                .with_ansi(false)
                .init();
            tracing::warn!("cannot open log file {}: {}", path.display(), e);
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(io::stderr)
                .with_ansi(false)
                .init();
        }
    }
}

/// Open `path` for appending, never on 0, 1 or 2
///
/// Standard descriptors may be closed when running as init; the console is
/// about to be duplicated over them.
fn open_log_file(path: &Path) -> io::Result<File> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.as_raw_fd() > libc::STDERR_FILENO {
        return Ok(file);
    }
    let fd = fcntl(file.as_raw_fd(), FcntlArg::F_DUPFD_CLOEXEC(libc::STDERR_FILENO + 1))?;
    Ok(unsafe { File::from_raw_fd(fd) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = Args::try_parse_from(["ttyopen", "/dev/tty1", "/bin/sh"]).unwrap();
        assert_eq!(args.tty, OsString::from("/dev/tty1"));
        assert_eq!(args.command, vec![OsString::from("/bin/sh")]);
        assert!(!args.ctty);
    }

    #[test]
    fn test_trailing_args_verbatim() {
        let args = Args::try_parse_from([
            "ttyopen", "--ctty", "/dev/tty1", "/bin/sh", "-l", "--ctty", "-c",
        ])
        .unwrap();
        assert!(args.ctty);
        assert_eq!(
            args.command,
            ["/bin/sh", "-l", "--ctty", "-c"]
                .iter()
                .map(OsString::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_tty_placeholder() {
        let args = Args::try_parse_from(["ttyopen", "", "/bin/true"]).unwrap();
        assert!(args.tty.is_empty());
    }

    #[test]
    fn test_missing_command_is_error() {
        assert!(Args::try_parse_from(["ttyopen", "/dev/tty1"]).is_err());
        assert!(Args::try_parse_from(["ttyopen"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let args =
            Args::try_parse_from(["ttyopen", "--log-level", "debug", "/dev/tty1", "/bin/sh"])
                .unwrap();
        assert_eq!(tracing::Level::from(args.log_level), tracing::Level::DEBUG);
    }
}
