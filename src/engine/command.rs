//! The default grammar engine.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::{GrammarEngine, ParseTree, SuspendHook};
use crate::error::CliError;
use crate::handle::HandleId;
use crate::Result;

/// Default prompt of a fresh engine.
pub const DEFAULT_PROMPT: &str = "cli> ";

/// Default comment character of a fresh engine.
pub const DEFAULT_COMMENT: char = '#';

/// In-memory grammar engine.
pub struct CommandEngine {
    user_handle: Option<HandleId>,
    exiting: bool,
    comment: char,
    trees: BTreeMap<String, ParseTree>,
    active: Option<String>,
    prompt: String,
    logsyntax: bool,
    nomatch: Option<String>,
    susp_hook: Option<SuspendHook<Self>>,
}

impl CommandEngine {
    /// Names of all registered trees, in order.
    pub fn tree_names(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(|k| k.as_str())
    }

    /// Whether a suspend hook is installed.
    pub fn has_susp_hook(&self) -> bool {
        self.susp_hook.is_some()
    }
}

impl GrammarEngine for CommandEngine {
    fn init() -> Result<Self> {
        Ok(Self {
            user_handle: None,
            exiting: false,
            comment: DEFAULT_COMMENT,
            trees: BTreeMap::new(),
            active: None,
            prompt: DEFAULT_PROMPT.to_string(),
            logsyntax: false,
            nomatch: None,
            susp_hook: None,
        })
    }

    fn shutdown(&mut self) {
        debug!(
            handle = ?self.user_handle,
            trees = self.trees.len(),
            "grammar engine shut down"
        );
        self.susp_hook = None;
        self.trees.clear();
        self.active = None;
        self.nomatch = None;
    }

    fn set_user_handle(&mut self, handle: HandleId) {
        self.user_handle = Some(handle);
    }

    fn user_handle(&self) -> Option<HandleId> {
        self.user_handle
    }

    fn exiting(&self) -> bool {
        self.exiting
    }

    fn set_exiting(&mut self, exiting: bool) {
        self.exiting = exiting;
    }

    fn comment(&self) -> char {
        self.comment
    }

    fn set_comment(&mut self, comment: char) -> char {
        std::mem::replace(&mut self.comment, comment)
    }

    fn tree_add(&mut self, name: &str, tree: ParseTree) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CliError::InvalidTreeName(name.to_string()));
        }
        if self.trees.insert(name.to_string(), tree).is_some() {
            debug!(tree = name, "command tree replaced");
        }
        Ok(())
    }

    fn tree_remove(&mut self, name: &str) -> Option<ParseTree> {
        let tree = self.trees.remove(name)?;
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        debug!(tree = name, "command tree removed");
        Some(tree)
    }

    fn tree_active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    fn set_tree_active(&mut self, name: &str) -> Result<()> {
        if !self.trees.contains_key(name) {
            return Err(CliError::TreeNotFound(name.to_string()));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    fn tree(&self, name: &str) -> Option<&ParseTree> {
        self.trees.get(name)
    }

    fn set_susp_hook(&mut self, hook: Option<SuspendHook<Self>>) -> Option<SuspendHook<Self>> {
        std::mem::replace(&mut self.susp_hook, hook)
    }

    fn nomatch(&self) -> Option<&str> {
        self.nomatch.as_deref()
    }

    fn set_nomatch(&mut self, text: Option<String>) {
        self.nomatch = text;
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
    }

    fn logsyntax(&self) -> bool {
        self.logsyntax
    }

    fn set_logsyntax(&mut self, enabled: bool) {
        self.logsyntax = enabled;
    }
}

impl fmt::Debug for CommandEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEngine")
            .field("user_handle", &self.user_handle)
            .field("exiting", &self.exiting)
            .field("comment", &self.comment)
            .field("trees", &self.trees.keys().collect::<Vec<_>>())
            .field("active", &self.active)
            .field("prompt", &self.prompt)
            .field("logsyntax", &self.logsyntax)
            .field("nomatch", &self.nomatch)
            .field("susp_hook", &self.susp_hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Callback, CommandNode, Globals};
    use crate::session::CliHandle;

    fn engine() -> CommandEngine {
        CommandEngine::init().unwrap()
    }

    fn quit_tree() -> ParseTree {
        let mut tree = ParseTree::new();
        tree.insert(CommandNode::keyword("quit").callback(Callback::new("cli_quit")));
        tree
    }

    #[test]
    fn test_defaults() {
        let e = engine();
        assert!(!e.exiting());
        assert_eq!(e.comment(), '#');
        assert_eq!(e.prompt(), DEFAULT_PROMPT);
        assert!(e.tree_active().is_none());
        assert!(e.nomatch().is_none());
        assert!(e.user_handle().is_none());
        assert!(!e.logsyntax());
    }

    #[test]
    fn test_set_comment_returns_previous() {
        let mut e = engine();
        assert_eq!(e.set_comment(';'), '#');
        assert_eq!(e.comment(), ';');
    }

    #[test]
    fn test_tree_registry() {
        let mut e = engine();
        e.tree_add("top", quit_tree()).unwrap();
        assert!(e.tree("top").is_some());
        assert!(e.tree("nope").is_none());
        assert!(matches!(
            e.tree_add("  ", ParseTree::new()),
            Err(CliError::InvalidTreeName(_))
        ));

        e.tree_add("top", ParseTree::new()).unwrap();
        assert!(e.tree("top").unwrap().is_empty());
        assert_eq!(e.tree_names().collect::<Vec<_>>(), vec!["top"]);
    }

    #[test]
    fn test_tree_remove_clears_active() {
        let mut e = engine();
        e.tree_add("top", quit_tree()).unwrap();
        e.tree_add("config", ParseTree::new()).unwrap();
        e.set_tree_active("top").unwrap();

        assert!(e.tree_remove("config").is_some());
        assert_eq!(e.tree_active(), Some("top"));

        assert_eq!(e.tree_remove("top").unwrap().len(), 1);
        assert!(e.tree_active().is_none());
        assert!(e.tree_remove("top").is_none());
    }

    #[test]
    fn test_set_tree_active_unknown_keeps_previous() {
        let mut e = engine();
        e.tree_add("top", quit_tree()).unwrap();
        e.set_tree_active("top").unwrap();

        assert!(matches!(
            e.set_tree_active("nope"),
            Err(CliError::TreeNotFound(name)) if name == "nope"
        ));
        assert_eq!(e.tree_active(), Some("top"));
    }

    #[test]
    fn test_match_requires_active_tree() {
        let mut e = engine();
        assert!(matches!(e.match_command("quit"), Err(CliError::NoActiveTree)));
    }

    #[test]
    fn test_match_sets_and_clears_nomatch() {
        let mut e = engine();
        e.tree_add("top", quit_tree()).unwrap();
        e.set_tree_active("top").unwrap();

        assert!(e.match_command("reboot").unwrap().is_none());
        assert_eq!(e.nomatch(), Some("Unknown command"));

        let m = e.match_command("quit").unwrap().unwrap();
        assert_eq!(m.callback.name, "cli_quit");
        assert!(e.nomatch().is_none());
    }

    #[test]
    fn test_parse_file_uses_comment_char() {
        let mut e = engine();
        e.set_comment('!');
        let mut tree = ParseTree::new();
        let mut globals = Globals::new();
        let mut input = "! a comment\nquit, cli_quit();\n".as_bytes();

        e.parse_file(&mut input, "quit.cli", &mut tree, &mut globals)
            .unwrap();
        assert!(tree.keyword("quit").is_some());
    }

    #[test]
    fn test_shutdown_clears_hook_and_trees() {
        let mut e = engine();
        e.tree_add("top", quit_tree()).unwrap();
        e.set_susp_hook(Some(Box::new(|_: &mut CliHandle<CommandEngine>| Ok(()))));
        assert!(e.has_susp_hook());

        e.shutdown();
        assert!(!e.has_susp_hook());
        assert!(e.tree("top").is_none());
    }
}
