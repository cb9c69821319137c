//! Terminal handling for ttyopen
//!
//! Opens the console device, wires it to the standard descriptors, rewrites
//! its line discipline to a sane baseline and negotiates `TERM` before the
//! launcher replaces the process image.

pub mod console;
pub mod discipline;
pub mod env;
pub mod platform;
pub mod session;
pub mod stdio;
pub mod term_type;

pub use console::{console_init, resolve_console, ConsoleOutcome};
pub use discipline::{is_sane, make_sane, normalize};
pub use env::{Environment, MapEnv, ProcessEnv};
pub use platform::{Platform, HOST};
pub use session::{detach, SessionState};
pub use stdio::{sanitize_stdio, Fallback};
pub use term_type::{negotiate, TermCapability};

use nix::errno::Errno;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtyError {
    #[error("cannot open '/': {0}")]
    NoFallbackDevice(Errno),

    #[error("cannot duplicate file descriptor: {0}")]
    Duplicate(Errno),

    #[error("cannot read terminal attributes: {0}")]
    GetAttributes(Errno),

    #[error("cannot set terminal attributes: {0}")]
    SetAttributes(Errno),

    #[error("cannot acquire controlling terminal: {0}")]
    ControllingTerminal(Errno),
}

impl TtyError {
    /// The system error behind this failure
    pub fn errno(&self) -> Errno {
        match self {
            TtyError::NoFallbackDevice(e)
            | TtyError::Duplicate(e)
            | TtyError::GetAttributes(e)
            | TtyError::SetAttributes(e)
            | TtyError::ControllingTerminal(e) => *e,
        }
    }
}
