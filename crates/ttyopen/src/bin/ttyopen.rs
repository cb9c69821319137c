use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::process;
use ttyopen::cli::{init_logging, Args};
use ttyopen::{Invocation, LaunchError, Launcher};

fn main() {
    // Usage problems exit 1 before any descriptor or session is touched
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => usage(e),
    };

    let invocation = match Invocation::new(args.tty, args.command) {
        Ok(invocation) => invocation,
        Err(LaunchError::Usage(message)) => {
            usage(Args::command().error(ErrorKind::InvalidValue, message))
        }
        Err(e) => fail(e),
    };

    init_logging(args.log_level, args.log_file.as_deref());

    let launcher = Launcher::new().acquire_ctty(args.ctty);
    match launcher.launch(&invocation) {
        Ok(never) => match never {},
        Err(e) => fail(e),
    }
}

fn usage(err: clap::Error) -> ! {
    let code = if err.use_stderr() { 1 } else { 0 };
    let _ = err.print();
    process::exit(code);
}

fn fail(err: LaunchError) -> ! {
    eprintln!("ttyopen: {err}");
    process::exit(err.exit_code());
}
