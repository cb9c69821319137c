//! Pseudo-terminal fixture standing in for a real console

use anyhow::{Context, Result};
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::pty::openpty;
use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg, SpecialCharacterIndices, Termios};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A pty pair; the slave path is handed to the launcher as its console
pub struct PtyFixture {
    master: File,
    slave: OwnedFd,
    path: PathBuf,
}

impl PtyFixture {
    pub fn open() -> Result<Self> {
        let pty = openpty(None, None).context("openpty failed")?;
        let path = std::fs::read_link(format!("/proc/self/fd/{}", pty.slave.as_raw_fd()))
            .context("cannot resolve pty slave path")?;

        fcntl(pty.master.as_raw_fd(), FcntlArg::F_SETFL(OFlag::O_NONBLOCK))
            .context("cannot make pty master non-blocking")?;

        Ok(Self {
            master: File::from(pty.master),
            slave: pty.slave,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn slave(&self) -> BorrowedFd<'_> {
        self.slave.as_fd()
    }

    pub fn termios(&self) -> Result<Termios> {
        tcgetattr(self.slave()).context("tcgetattr on pty slave")
    }

    /// Leave the slave in raw mode with nonstandard control characters
    pub fn scramble(&self) -> Result<()> {
        let mut termios = self.termios()?;
        cfmakeraw(&mut termios);
        termios.control_chars[SpecialCharacterIndices::VINTR as usize] = 1;
        termios.control_chars[SpecialCharacterIndices::VERASE as usize] = 8;
        termios.control_chars[SpecialCharacterIndices::VEOF as usize] = 0;
        tcsetattr(self.slave(), SetArg::TCSANOW, &termios).context("tcsetattr on pty slave")
    }

    /// Read from the master until `needle` shows up or `timeout` passes
    pub fn read_until(&mut self, needle: &str, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        let mut output = Vec::new();
        let mut buf = [0u8; 1024];

        while Instant::now() < deadline {
            match self.master.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    output.extend_from_slice(&buf[..n]);
                    if String::from_utf8_lossy(&output).contains(needle) {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(e) => return Err(e).context("pty master read failed"),
            }
        }

        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}
