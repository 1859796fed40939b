//! # cli-handle
//!
//! Session handle layer for grammar-driven interactive command lines.
//!
//! A [`CliHandle`] is the single object an interactive CLI program passes
//! around. It extends the generic [`BaseHandle`] (identity sentinel, option
//! store, data store) with an owned grammar engine and the active syntax
//! structure, and exposes the engine's settings through identity-checked
//! accessors.
//!
//! ## Features
//!
//! - **Checked handles**: every accessor verifies the magic sentinel first
//! - **Pluggable engines**: anything implementing [`GrammarEngine`]
//! - **Grammar files**: keyword/variable command trees with callbacks
//! - **Modes**: one parse tree per mode, switched at run time
//!
//! ## Quick Start
//!
//! ```no_run
//! use cli_handle::{CliHandle, Handle};
//!
//! fn main() -> cli_handle::Result<()> {
//!     // Initialize logging
//!     cli_handle::logging::try_init().ok();
//!
//!     // Create a handle with the default engine
//!     let mut handle: CliHandle = CliHandle::create()?;
//!
//!     // Load grammar files into the "operation" mode
//!     cli_handle::session::load_syntax(&mut handle, &["router.cli"], "operation")?;
//!
//!     println!("handle {} in mode {:?}", handle.id(), handle.tree_active());
//!
//!     handle.exit();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod logging;
pub mod repl;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use engine::{CommandEngine, CommandMatch, GrammarEngine, ParseTree, SuspendHook};
pub use error::{CliError, Result};
pub use handle::{BaseHandle, Handle, HandleId, CLICON_MAGIC};
pub use repl::{Dispatcher, EvalOutcome};
pub use session::{CliHandle, CliSyntax, SyntaxMode};
