//! Grammar engine contract and the default in-memory engine.
//!
//! A [`CliHandle`](crate::session::CliHandle) owns exactly one engine and
//! talks to it only through [`GrammarEngine`]. The engine keeps the command
//! tree registry, the active tree, prompt and comment settings, the exiting
//! flag and the diagnostics of the last failed match.

mod command;
mod matcher;
mod parser;
mod tree;

pub use command::CommandEngine;
pub use matcher::{match_tokens, split_line, CommandMatch, MatchOutcome};
pub use parser::parse_grammar;
pub use tree::{Callback, CommandNode, Globals, NodeKind, ParseTree, VarType};

use std::io::Read;

use tracing::{debug, info};

use crate::error::CliError;
use crate::handle::HandleId;
use crate::session::CliHandle;
use crate::Result;

/// Callback run when the interactive session is suspended.
///
/// The hook receives the owning handle itself, fully typed.
pub type SuspendHook<E> = Box<dyn FnMut(&mut CliHandle<E>) -> Result<()>>;

/// Operations a session handle needs from its grammar engine.
///
/// `parse_file` and `match_command` have default implementations built on
/// the grammar parser and matcher in this module; engines only override
/// them to change the grammar language itself.
pub trait GrammarEngine: Sized + 'static {
    /// Construct a fresh engine.
    fn init() -> Result<Self>;

    /// Release engine resources. Called once, before the engine is dropped.
    fn shutdown(&mut self);

    /// Record the identity of the handle that owns this engine.
    fn set_user_handle(&mut self, handle: HandleId);

    /// The owning handle's identity, once linked.
    fn user_handle(&self) -> Option<HandleId>;

    fn exiting(&self) -> bool;

    fn set_exiting(&mut self, exiting: bool);

    /// Character that starts a comment line.
    fn comment(&self) -> char;

    /// Set the comment character, returning the previous one.
    fn set_comment(&mut self, comment: char) -> char;

    /// Register a command tree under `name`, replacing any previous tree.
    fn tree_add(&mut self, name: &str, tree: ParseTree) -> Result<()>;

    /// Unregister a tree, returning it. Removing the active tree leaves no
    /// tree active.
    fn tree_remove(&mut self, name: &str) -> Option<ParseTree>;

    /// Name of the tree consulted by [`GrammarEngine::match_command`].
    fn tree_active(&self) -> Option<&str>;

    /// Select the active tree. Unknown names are rejected.
    fn set_tree_active(&mut self, name: &str) -> Result<()>;

    /// Look up a registered tree.
    fn tree(&self, name: &str) -> Option<&ParseTree>;

    /// Install or clear the suspend hook, returning the previous one.
    fn set_susp_hook(&mut self, hook: Option<SuspendHook<Self>>) -> Option<SuspendHook<Self>>;

    /// Text describing the most recent failed match.
    fn nomatch(&self) -> Option<&str>;

    /// Replace the no-match text.
    fn set_nomatch(&mut self, text: Option<String>);

    fn prompt(&self) -> &str;

    fn set_prompt(&mut self, prompt: &str);

    /// Whether matched commands are logged.
    fn logsyntax(&self) -> bool;

    fn set_logsyntax(&mut self, enabled: bool);

    /// Parse a grammar from `reader`.
    ///
    /// On success the parsed commands are merged into `tree` and the
    /// assignments appended to `globals`. On failure neither is touched.
    fn parse_file(
        &mut self,
        reader: &mut dyn Read,
        name: &str,
        tree: &mut ParseTree,
        globals: &mut Globals,
    ) -> Result<()> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let (parsed, parsed_globals) = parse_grammar(&text, name, self.comment())?;
        debug!(
            file = name,
            commands = parsed.len(),
            globals = parsed_globals.len(),
            "grammar parsed"
        );
        tree.merge(parsed);
        globals.extend(parsed_globals);
        Ok(())
    }

    /// Match a command line against the active tree.
    ///
    /// Returns `Ok(None)` when the line does not match; the reason is then
    /// available from [`GrammarEngine::nomatch`].
    fn match_command(&mut self, line: &str) -> Result<Option<CommandMatch>> {
        let active = self.tree_active().ok_or(CliError::NoActiveTree)?.to_string();
        let tree = self
            .tree(&active)
            .ok_or_else(|| CliError::TreeNotFound(active.clone()))?;

        let outcome = match_tokens(tree, &split_line(line));
        match outcome {
            MatchOutcome::Matched(matched) => {
                if self.logsyntax() {
                    info!(
                        tree = %active,
                        command = %matched.words.join(" "),
                        callback = %matched.callback.name,
                        "command matched"
                    );
                }
                self.set_nomatch(None);
                Ok(Some(matched))
            }
            other => {
                let text = other.diagnostic().unwrap_or("No match");
                if self.logsyntax() {
                    info!(tree = %active, line = line.trim(), reason = text, "command not matched");
                }
                self.set_nomatch(Some(text.to_string()));
                Ok(None)
            }
        }
    }
}
