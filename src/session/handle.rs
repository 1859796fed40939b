//! The CLI session handle.

use std::fmt;
use std::io::Read;

use tracing::{debug, warn};

use super::CliSyntax;
use crate::engine::{
    CommandEngine, CommandMatch, GrammarEngine, Globals, ParseTree, SuspendHook,
};
use crate::error::CliError;
use crate::handle::{BaseHandle, Handle};
use crate::Result;

/// Handle for one interactive CLI session.
///
/// Extends the generic [`BaseHandle`] with an owned grammar engine and the
/// active syntax structure. The only way to obtain one is
/// [`CliHandle::create`]; every accessor re-checks the identity sentinel
/// before touching a field.
pub struct CliHandle<E: GrammarEngine = CommandEngine> {
    base: BaseHandle,
    engine: E,
    syntax: Option<CliSyntax>,
    /// Set while the suspend hook runs; flips to `Some(true)` once the
    /// hook installs or clears a hook itself.
    hook_touched: Option<bool>,
}

impl<E: GrammarEngine> CliHandle<E> {
    /// Create a handle together with its grammar engine.
    ///
    /// If the engine cannot be initialized the generic handle is torn down
    /// again and the engine's error is returned as
    /// [`CliError::EngineInit`].
    pub fn create() -> Result<Self> {
        let mut base = BaseHandle::new();

        let mut engine = match E::init() {
            Ok(engine) => engine,
            Err(err) => {
                warn!(handle = %base.id(), error = %err, "grammar engine init failed");
                base.exit();
                return Err(match err {
                    CliError::EngineInit(reason) => CliError::EngineInit(reason),
                    other => CliError::EngineInit(other.to_string()),
                });
            }
        };
        engine.set_user_handle(base.id());

        debug!(handle = %base.id(), "cli handle created");
        Ok(Self {
            base,
            engine,
            syntax: None,
            hook_touched: None,
        })
    }

    /// Destroy the handle.
    ///
    /// Releases the syntax structure, tears down the generic handle, then
    /// shuts the engine down. Dropping a handle does the same.
    pub fn exit(mut self) {
        self.base.assert_valid();
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.base.is_valid() {
            return;
        }
        let id = self.base.id();

        if let Some(syntax) = self.syntax.take() {
            debug!(handle = %id, modes = syntax.len(), "releasing syntax");
            drop(syntax);
        }
        self.base.exit();
        self.engine.shutdown();

        debug!(handle = %id, "cli handle destroyed");
    }

    fn eng(&self) -> &E {
        self.base.assert_valid();
        &self.engine
    }

    fn eng_mut(&mut self) -> &mut E {
        self.base.assert_valid();
        &mut self.engine
    }

    // ----------------------------------------------------------------
    // Syntax structure
    // ----------------------------------------------------------------

    /// The active syntax structure, if one is set.
    pub fn syntax(&self) -> Option<&CliSyntax> {
        self.base.assert_valid();
        self.syntax.as_ref()
    }

    /// The active syntax structure, mutably.
    pub fn syntax_mut(&mut self) -> Option<&mut CliSyntax> {
        self.base.assert_valid();
        self.syntax.as_mut()
    }

    /// Replace the syntax structure, handing back the previous one.
    pub fn set_syntax(&mut self, syntax: Option<CliSyntax>) -> Option<CliSyntax> {
        self.base.assert_valid();
        std::mem::replace(&mut self.syntax, syntax)
    }

    // ----------------------------------------------------------------
    // Grammar engine delegation
    // ----------------------------------------------------------------

    /// The grammar engine.
    pub fn engine(&self) -> &E {
        self.eng()
    }

    /// The grammar engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        self.eng_mut()
    }

    /// Whether the read loop should terminate.
    pub fn exiting(&self) -> bool {
        self.eng().exiting()
    }

    pub fn set_exiting(&mut self, exiting: bool) {
        self.eng_mut().set_exiting(exiting);
    }

    /// Comment character recognized by the grammar engine.
    pub fn comment(&self) -> char {
        self.eng().comment()
    }

    /// Set the comment character, returning the previous one.
    pub fn set_comment(&mut self, comment: char) -> char {
        self.eng_mut().set_comment(comment)
    }

    /// Register a command tree under `name`.
    pub fn tree_add(&mut self, name: &str, tree: ParseTree) -> Result<()> {
        self.eng_mut().tree_add(name, tree)
    }

    /// Unregister a command tree.
    pub fn tree_remove(&mut self, name: &str) -> Option<ParseTree> {
        self.eng_mut().tree_remove(name)
    }

    /// Name of the active tree.
    pub fn tree_active(&self) -> Option<&str> {
        self.eng().tree_active()
    }

    /// Select the active tree.
    pub fn set_tree_active(&mut self, name: &str) -> Result<()> {
        self.eng_mut().set_tree_active(name)
    }

    /// Look up a registered tree by name.
    pub fn tree(&self, name: &str) -> Option<&ParseTree> {
        self.eng().tree(name)
    }

    /// Parse a command grammar from `reader`.
    ///
    /// `name` appears in error messages only. On failure `tree` and
    /// `globals` are left as they were.
    pub fn parse_file(
        &mut self,
        reader: &mut dyn Read,
        name: &str,
        tree: &mut ParseTree,
        globals: &mut Globals,
    ) -> Result<()> {
        self.eng_mut().parse_file(reader, name, tree, globals)
    }

    /// Install or clear the suspend hook, returning the previous one.
    ///
    /// Called from inside the running hook, the slot is empty, so `None`
    /// is returned; the change still takes effect once the hook finishes.
    pub fn set_susp_hook(&mut self, hook: Option<SuspendHook<E>>) -> Option<SuspendHook<E>> {
        if let Some(touched) = self.hook_touched.as_mut() {
            *touched = true;
        }
        self.eng_mut().set_susp_hook(hook)
    }

    /// Run the suspend hook, if one is installed.
    ///
    /// Returns `Ok(false)` when there is no hook. If the running hook
    /// installs a replacement or clears the hook, that choice stands;
    /// otherwise the hook stays installed.
    pub fn suspend(&mut self) -> Result<bool> {
        let Some(mut hook) = self.eng_mut().set_susp_hook(None) else {
            return Ok(false);
        };

        debug!(handle = %self.base.id(), "running suspend hook");
        let outer = self.hook_touched.replace(false);
        let result = hook(self);
        let touched = std::mem::replace(&mut self.hook_touched, outer);

        if self.base.is_valid() && touched != Some(true) {
            self.engine.set_susp_hook(Some(hook));
        }

        result.map(|()| true)
    }

    /// Diagnostic text of the most recent failed match.
    pub fn nomatch(&self) -> Option<&str> {
        self.eng().nomatch()
    }

    pub fn prompt(&self) -> &str {
        self.eng().prompt()
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.eng_mut().set_prompt(prompt);
    }

    pub fn logsyntax(&self) -> bool {
        self.eng().logsyntax()
    }

    /// Enable or disable logging of matched commands.
    pub fn set_logsyntax(&mut self, enabled: bool) {
        self.eng_mut().set_logsyntax(enabled);
    }

    /// Match a command line against the active tree.
    pub fn match_command(&mut self, line: &str) -> Result<Option<CommandMatch>> {
        self.eng_mut().match_command(line)
    }
}

impl<E: GrammarEngine> Handle for CliHandle<E> {
    fn base(&self) -> &BaseHandle {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseHandle {
        &mut self.base
    }
}

impl<E: GrammarEngine> Drop for CliHandle<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<E: GrammarEngine> fmt::Debug for CliHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliHandle")
            .field("base", &self.base)
            .field("syntax", &self.syntax)
            .finish_non_exhaustive()
    }
}
