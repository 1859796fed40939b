//! Error types for cli-handle.

use thiserror::Error;

/// Main error type for cli-handle operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// The grammar engine could not be initialized.
    #[error("grammar engine initialization failed: {0}")]
    EngineInit(String),

    /// A handle failed its identity check.
    #[error("invalid handle: expected magic {expected:#010x}, found {found:#010x}")]
    InvalidHandle { expected: u32, found: u32 },

    /// A command tree was registered under an unusable name.
    #[error("invalid tree name: {0:?}")]
    InvalidTreeName(String),

    /// No command tree is registered under the given name.
    #[error("tree not found: {0}")]
    TreeNotFound(String),

    /// Matching was attempted without an active tree.
    #[error("no active tree selected")]
    NoActiveTree,

    /// A grammar stream could not be parsed.
    #[error("{name}:{line}: {message}")]
    GrammarParse {
        name: String,
        line: usize,
        message: String,
    },

    /// A matched command names a callback that is not registered.
    #[error("unknown callback: {0}")]
    UnknownCallback(String),

    /// A callback ran and reported failure.
    #[error("callback {name} failed: {reason}")]
    CallbackFailed { name: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for cli-handle operations.
pub type Result<T> = std::result::Result<T, CliError>;
