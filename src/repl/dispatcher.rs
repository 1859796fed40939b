//! Callback registry for matched commands.

use std::collections::HashMap;
use std::io::Write;

use tracing::debug;

use crate::engine::{CommandMatch, GrammarEngine, NodeKind};
use crate::error::CliError;
use crate::session::{set_mode, CliHandle};
use crate::Result;

/// A command callback.
///
/// Receives the session handle, the matched command, and the output sink.
pub type CallbackFn<E> = Box<dyn Fn(&mut CliHandle<E>, &CommandMatch, &mut dyn Write) -> Result<()>>;

/// Maps callback names used in grammar files to functions.
pub struct Dispatcher<E: GrammarEngine> {
    callbacks: HashMap<String, CallbackFn<E>>,
}

impl<E: GrammarEngine> Dispatcher<E> {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    /// Create a dispatcher with the built-in callbacks registered:
    ///
    /// - `cli_quit`: leave the read loop
    /// - `cli_set_mode("mode")`: switch the active mode
    /// - `cli_help`: list the commands of the active mode
    pub fn with_builtins() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register("cli_quit", cli_quit::<E>);
        dispatcher.register("cli_set_mode", cli_set_mode::<E>);
        dispatcher.register("cli_help", cli_help::<E>);
        dispatcher
    }

    /// Register a callback, returning the one it replaces.
    pub fn register<F>(&mut self, name: impl Into<String>, callback: F) -> Option<CallbackFn<E>>
    where
        F: Fn(&mut CliHandle<E>, &CommandMatch, &mut dyn Write) -> Result<()> + 'static,
    {
        self.callbacks.insert(name.into(), Box::new(callback))
    }

    /// Whether a callback is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Run the callback named by a match.
    pub fn dispatch(
        &self,
        handle: &mut CliHandle<E>,
        matched: &CommandMatch,
        out: &mut dyn Write,
    ) -> Result<()> {
        let name = &matched.callback.name;
        let callback = self
            .callbacks
            .get(name)
            .ok_or_else(|| CliError::UnknownCallback(name.clone()))?;

        debug!(callback = %name, args = ?matched.callback.args, "dispatching");
        callback(handle, matched, out)
    }
}

impl<E: GrammarEngine> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn cli_quit<E: GrammarEngine>(
    handle: &mut CliHandle<E>,
    _matched: &CommandMatch,
    _out: &mut dyn Write,
) -> Result<()> {
    handle.set_exiting(true);
    Ok(())
}

fn cli_set_mode<E: GrammarEngine>(
    handle: &mut CliHandle<E>,
    matched: &CommandMatch,
    _out: &mut dyn Write,
) -> Result<()> {
    let mode = matched
        .callback
        .args
        .first()
        .ok_or_else(|| CliError::CallbackFailed {
            name: matched.callback.name.clone(),
            reason: "missing mode argument".into(),
        })?;
    set_mode(handle, mode)
}

fn cli_help<E: GrammarEngine>(
    handle: &mut CliHandle<E>,
    _matched: &CommandMatch,
    out: &mut dyn Write,
) -> Result<()> {
    let active = handle.tree_active().ok_or(CliError::NoActiveTree)?.to_string();
    let tree = handle
        .tree(&active)
        .ok_or_else(|| CliError::TreeNotFound(active.clone()))?;

    for node in tree.nodes() {
        let name = match &node.kind {
            NodeKind::Keyword(word) => word.clone(),
            other => other.to_string(),
        };
        match &node.help {
            Some(help) => writeln!(out, "  {:<20} {}", name, help)?,
            None => writeln!(out, "  {}", name)?,
        }
    }
    Ok(())
}
