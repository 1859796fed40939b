//! CLI session handle.
//!
//! [`CliHandle`] specializes the generic handle with a grammar engine and
//! the active [`CliSyntax`]. This module also loads grammar files into
//! syntax modes.

mod handle;
mod syntax;

pub use handle::CliHandle;
pub use syntax::{
    load_syntax, load_syntax_dir, set_mode, CliSyntax, SyntaxMode, MODE_GLOBAL, PROMPT_GLOBAL,
};
