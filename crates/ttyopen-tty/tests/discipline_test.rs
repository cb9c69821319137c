//! Line discipline normalization against a real pty

#[cfg(target_os = "linux")]
mod linux_tests {
    use nix::sys::termios::{tcsetattr, LocalFlags, SetArg, SpecialCharacterIndices};
    use ttyopen_test_utils::{init_test_logging, PtyFixture};
    use ttyopen_tty::discipline::CONTROL_CHARS;
    use ttyopen_tty::{is_sane, normalize, HOST};

    #[test]
    fn test_normalize_scrambled_pty() {
        init_test_logging();
        let pty = PtyFixture::open().unwrap();
        pty.scramble().unwrap();

        normalize(pty.slave(), &HOST).unwrap();

        let termios = pty.termios().unwrap();
        for (index, value) in CONTROL_CHARS {
            assert_eq!(termios.control_chars[index as usize], value, "{index:?}");
        }
        assert!(is_sane(&termios, &HOST));
    }

    #[test]
    fn test_normalize_twice_is_stable() {
        let pty = PtyFixture::open().unwrap();
        pty.scramble().unwrap();

        normalize(pty.slave(), &HOST).unwrap();
        let first = pty.termios().unwrap();
        normalize(pty.slave(), &HOST).unwrap();
        let second = pty.termios().unwrap();

        assert_eq!(first.control_chars, second.control_chars);
        assert_eq!(first.control_flags, second.control_flags);
        assert_eq!(first.input_flags, second.input_flags);
        assert_eq!(first.output_flags, second.output_flags);
        assert_eq!(first.local_flags, second.local_flags);
    }

    #[test]
    fn test_normalize_leaves_other_control_chars() {
        let pty = PtyFixture::open().unwrap();
        let mut termios = pty.termios().unwrap();
        termios.control_chars[SpecialCharacterIndices::VWERASE as usize] = 0x0b;
        termios.local_flags.remove(LocalFlags::ECHO);
        tcsetattr(pty.slave(), SetArg::TCSANOW, &termios).unwrap();

        normalize(pty.slave(), &HOST).unwrap();

        let termios = pty.termios().unwrap();
        assert_eq!(
            termios.control_chars[SpecialCharacterIndices::VWERASE as usize],
            0x0b
        );
        assert!(termios.local_flags.contains(LocalFlags::ECHO));
    }
}
