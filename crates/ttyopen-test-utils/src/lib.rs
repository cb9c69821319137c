pub mod pty;

pub use pty::PtyFixture;

use std::path::PathBuf;
use std::process::Command;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("ttyopen=debug,ttyopen_tty=debug")),
            )
            .with_test_writer()
            .init();
    });
}

/// Scratch directory plus a file path inside it for commands to write into
pub struct Scratch {
    pub dir: tempfile::TempDir,
    pub out: PathBuf,
}

impl Scratch {
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("out");
        Ok(Self { dir, out })
    }

    /// Contents written by the command, empty if it never wrote
    pub fn output(&self) -> String {
        std::fs::read_to_string(&self.out).unwrap_or_default()
    }
}

/// Argument vector running `script` under `/bin/sh`
pub fn shell_args(script: &str) -> Vec<String> {
    vec!["/bin/sh".into(), "-c".into(), script.into()]
}

/// A `Command` for `binary` with a clean `TERM`/`CONSOLE` environment
pub fn launcher_command(binary: &str, scratch: &Scratch) -> Command {
    let mut cmd = Command::new(binary);
    cmd.env_remove("TERM")
        .env_remove("CONSOLE")
        .env_remove("console")
        .env("OUT", &scratch.out);
    cmd
}
