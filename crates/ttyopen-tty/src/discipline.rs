//! Line discipline normalization
//!
//! Whatever state the device was left in (raw mode, odd control characters,
//! a different line discipline) gets replaced by the classic cooked-mode
//! baseline. Only the character format and baud bits of `c_cflag` survive.

use crate::platform::Platform;
use crate::TtyError;
use nix::sys::termios::{
    tcgetattr, tcsetattr, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg,
    SpecialCharacterIndices, Termios,
};
use std::os::fd::BorrowedFd;
use tracing::debug;

/// Canonical control characters
pub const CONTROL_CHARS: [(SpecialCharacterIndices, u8); 8] = [
    (SpecialCharacterIndices::VINTR, 3),    // C-c
    (SpecialCharacterIndices::VQUIT, 28),   // C-\
    (SpecialCharacterIndices::VERASE, 127), // C-?
    (SpecialCharacterIndices::VKILL, 21),   // C-u
    (SpecialCharacterIndices::VEOF, 4),     // C-d
    (SpecialCharacterIndices::VSTART, 17),  // C-q
    (SpecialCharacterIndices::VSTOP, 19),   // C-s
    (SpecialCharacterIndices::VSUSP, 26),   // C-z
];

/// Control bits forced on regardless of the previous configuration
pub const FORCED_CONTROL: ControlFlags = ControlFlags::CREAD
    .union(ControlFlags::HUPCL)
    .union(ControlFlags::CLOCAL);

pub const SANE_INPUT: InputFlags = InputFlags::ICRNL
    .union(InputFlags::IXON)
    .union(InputFlags::IXOFF);

pub const SANE_OUTPUT: OutputFlags = OutputFlags::OPOST.union(OutputFlags::ONLCR);

pub const SANE_LOCAL: LocalFlags = LocalFlags::ISIG
    .union(LocalFlags::ICANON)
    .union(LocalFlags::ECHO)
    .union(LocalFlags::ECHOE)
    .union(LocalFlags::ECHOK)
    .union(LocalFlags::ECHOCTL)
    .union(LocalFlags::ECHOKE)
    .union(LocalFlags::IEXTEN);

/// Rewrite `termios` in place to the sane baseline
pub fn make_sane(termios: &mut Termios, platform: &Platform) {
    for (index, value) in CONTROL_CHARS {
        termios.control_chars[index as usize] = value;
    }

    platform.reset_line_discipline(termios);

    termios.control_flags &= platform.preserved_control;
    termios.control_flags |= FORCED_CONTROL;
    termios.input_flags = SANE_INPUT;
    termios.output_flags = SANE_OUTPUT;
    termios.local_flags = SANE_LOCAL;
}

/// Whether `termios` already holds the baseline
pub fn is_sane(termios: &Termios, platform: &Platform) -> bool {
    let chars_ok = CONTROL_CHARS
        .iter()
        .all(|&(index, value)| termios.control_chars[index as usize] == value);
    let control_ok = termios.control_flags.contains(FORCED_CONTROL)
        && (platform.preserved_control | FORCED_CONTROL).contains(termios.control_flags);

    chars_ok
        && control_ok
        && platform.line_discipline_of(termios).unwrap_or(0) == 0
        && termios.input_flags == SANE_INPUT
        && termios.output_flags == SANE_OUTPUT
        && termios.local_flags == SANE_LOCAL
}

/// Read the attributes of `fd`, make them sane and apply them immediately
pub fn normalize(fd: BorrowedFd<'_>, platform: &Platform) -> Result<(), TtyError> {
    let mut termios = tcgetattr(fd).map_err(TtyError::GetAttributes)?;
    make_sane(&mut termios, platform);
    tcsetattr(fd, SetArg::TCSANOW, &termios).map_err(TtyError::SetAttributes)?;
    debug!("Terminal line discipline normalized");
    Ok(())
}
