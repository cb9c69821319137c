//! Build-time description of what the host terminal layer supports
//!
//! Everything that differs between kernels lives here so the normalizer and
//! the `TERM` negotiator see one interface on every target.

use nix::sys::termios::{ControlFlags, Termios};
use std::os::fd::BorrowedFd;

/// Terminal capabilities of a target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Console used when neither an argument nor `CONSOLE` names one
    pub default_console: Option<&'static str>,

    /// Termios carries a line discipline number
    pub line_discipline: bool,

    /// The kernel answers the virtual console query
    pub vt_query: bool,

    /// Control mode bits carried over from the previous configuration
    pub preserved_control: ControlFlags,
}

/// Capabilities of the platform this crate was built for
pub const HOST: Platform = Platform {
    default_console: DEFAULT_CONSOLE,
    line_discipline: cfg!(any(target_os = "linux", target_os = "android")),
    vt_query: cfg!(target_os = "linux"),
    preserved_control: ControlFlags::from_bits_retain(PRESERVED_CONTROL_BITS),
};

// FreeBSD kernels do not open 0, 1 and 2 for init.
#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
const DEFAULT_CONSOLE: Option<&str> = Some("/dev/console");
#[cfg(not(any(target_os = "freebsd", target_os = "dragonfly")))]
const DEFAULT_CONSOLE: Option<&str> = None;

const CHARACTER_FORMAT: libc::tcflag_t =
    libc::CSIZE | libc::CSTOPB | libc::PARENB | libc::PARODD | libc::CRTSCTS;

// Baud rate lives in c_cflag on Linux; the BSDs keep it in c_ispeed/c_ospeed.
#[cfg(any(target_os = "linux", target_os = "android"))]
const PRESERVED_CONTROL_BITS: libc::tcflag_t = CHARACTER_FORMAT | libc::CBAUD | libc::CBAUDEX;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const PRESERVED_CONTROL_BITS: libc::tcflag_t = CHARACTER_FORMAT;

impl Platform {
    /// Reset the line discipline number to N_TTY where the field exists
    pub fn reset_line_discipline(&self, termios: &mut Termios) {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            if self.line_discipline {
                termios.line_discipline = 0;
            }
        }
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        {
            let _ = termios;
        }
    }

    /// Line discipline number, if the platform has one
    pub fn line_discipline_of(&self, termios: &Termios) -> Option<u8> {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            self.line_discipline.then_some(termios.line_discipline)
        }
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        {
            let _ = termios;
            None
        }
    }

    /// Ask the kernel for a free virtual console through `fd`.
    ///
    /// `None` when the platform has no such query, otherwise whether the
    /// descriptor answered it.
    pub fn query_virtual_console(&self, fd: BorrowedFd<'_>) -> Option<bool> {
        if !self.vt_query {
            return None;
        }
        Some(vt::query(fd))
    }
}

#[cfg(target_os = "linux")]
mod vt {
    use std::os::fd::{AsRawFd, BorrowedFd};
    use tracing::trace;

    // <linux/vt.h>
    const VT_OPENQRY: nix::sys::ioctl::ioctl_num_type = 0x5600;

    nix::ioctl_read_bad!(vt_openqry, VT_OPENQRY, libc::c_int);

    pub(super) fn query(fd: BorrowedFd<'_>) -> bool {
        let mut vtno: libc::c_int = -1;
        match unsafe { vt_openqry(fd.as_raw_fd(), &mut vtno) } {
            Ok(_) => {
                trace!("VT_OPENQRY answered, first free console {}", vtno);
                true
            }
            Err(e) => {
                trace!("VT_OPENQRY rejected: {}", e);
                false
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod vt {
    use std::os::fd::BorrowedFd;

    pub(super) fn query(_fd: BorrowedFd<'_>) -> bool {
        false
    }
}
