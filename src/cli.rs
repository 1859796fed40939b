//! Command-line interface for cli-handle.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Grammar files to load (repeatable).
    pub grammar: Vec<PathBuf>,
    /// Directory of `*.cli` grammar files.
    pub grammar_dir: Option<PathBuf>,
    /// Mode to start in.
    pub mode: Option<String>,
    /// Prompt override.
    pub prompt: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Log every matched command.
    pub logsyntax: bool,
    /// Words of a single command to run instead of the interactive loop.
    pub command: Vec<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('f') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('g') | Long("grammar") => {
                result.grammar.push(parser.value()?.parse()?);
            }
            Short('d') | Long("grammar-dir") => {
                result.grammar_dir = Some(parser.value()?.parse()?);
            }
            Short('m') | Long("mode") => {
                let value: String = parser.value()?.parse()?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidValue("mode", value));
                }
                result.mode = Some(value);
            }
            Short('P') | Long("prompt") => {
                result.prompt = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("logsyntax") => {
                result.logsyntax = true;
            }
            Value(val) => {
                result.command.push(val.string()?);
                for word in parser.raw_args()? {
                    result
                        .command
                        .push(word.into_string().map_err(ArgsError::NotUnicode)?);
                }
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"cli-handle {version}
Grammar-driven interactive command-line session

USAGE:
    cli-handle [OPTIONS] [COMMAND]...

ARGS:
    [COMMAND]...            Run one command line and exit instead of reading stdin

OPTIONS:
    -f, --config <FILE>     Path to configuration file (JSON)
    -g, --grammar <FILE>    Grammar file to load (repeatable)
    -d, --grammar-dir <DIR> Load every *.cli file in a directory
    -m, --mode <MODE>       Mode to start in [default: operation]
    -P, --prompt <TEXT>     Prompt override
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --logsyntax         Log every matched command
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    CLI_HANDLE_PROMPT       Prompt (overrides config)
    CLI_HANDLE_MODE         Start mode (overrides config)
    CLI_HANDLE_GRAMMAR      Grammar files, path-list separated (overrides config)
    CLI_HANDLE_LOG_LEVEL    Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Interactive session on one grammar file
    cli-handle -g router.cli

    # Start in configure mode with a config file
    cli-handle -f /etc/cli-handle/config.json -m configure

    # Run a single command
    cli-handle -g router.cli show version
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("cli-handle {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Command word that is not valid UTF-8.
    NotUnicode(OsString),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::NotUnicode(word) => {
                write!(f, "command word is not valid unicode: {:?}", word)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
