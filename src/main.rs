//! cli-handle binary entry point.

use std::io;
use std::process::ExitCode;

use cli_handle::cli::{self, Args};
use cli_handle::repl::{eval, interactive, Dispatcher, EvalOutcome};
use cli_handle::{logging, CliHandle, Config, Handle};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'cli-handle --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_with_level(config.log_filter()) {
        eprintln!("warning: logging not initialized: {}", e);
    }

    info!("cli-handle v{}", env!("CARGO_PKG_VERSION"));

    match run(&config, &args) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "session failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, args: &Args) -> cli_handle::Result<ExitCode> {
    let mut handle: CliHandle = CliHandle::create()?;
    info!(handle = %handle.id(), "session started");

    config.apply_to(&mut handle);
    config.load_syntax_into(&mut handle)?;

    handle.set_susp_hook(Some(Box::new(|h: &mut CliHandle| {
        info!(handle = %h.id(), "session suspended");
        Ok(())
    })));

    let dispatcher = Dispatcher::with_builtins();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = if args.command.is_empty() {
        let stdin = io::stdin();
        interactive(&mut handle, &dispatcher, &mut stdin.lock(), &mut out)?;
        ExitCode::SUCCESS
    } else {
        let line = args.command.join(" ");
        match eval(&mut handle, &dispatcher, &line, &mut out)? {
            EvalOutcome::NoMatch(_) => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        }
    };

    info!(handle = %handle.id(), "session finished");
    handle.exit();
    Ok(code)
}
