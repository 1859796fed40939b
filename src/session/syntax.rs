//! Syntax structure and loading of grammar files into modes.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::CliHandle;
use crate::engine::{GrammarEngine, Globals, ParseTree};
use crate::error::CliError;
use crate::Result;

/// Grammar global naming the mode a file's commands belong to.
pub const MODE_GLOBAL: &str = "CLICON_MODE";

/// Grammar global carrying the prompt of a mode.
pub const PROMPT_GLOBAL: &str = "CLICON_PROMPT";

/// One named syntax mode: a command tree registered with the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxMode {
    pub name: String,
    /// Grammar files that contributed to this mode.
    pub files: Vec<PathBuf>,
    /// Number of top-level commands after merging.
    pub commands: usize,
    /// Prompt to use while this mode is active.
    pub prompt: Option<String>,
}

impl SyntaxMode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            commands: 0,
            prompt: None,
        }
    }
}

/// The syntax structure held by a [`CliHandle`]: the loaded modes and the
/// mode to start in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliSyntax {
    modes: Vec<SyntaxMode>,
    default_mode: Option<String>,
}

impl CliSyntax {
    /// Create an empty syntax with the given default mode.
    pub fn new(default_mode: impl Into<String>) -> Self {
        Self {
            modes: Vec::new(),
            default_mode: Some(default_mode.into()),
        }
    }

    pub fn default_mode(&self) -> Option<&str> {
        self.default_mode.as_deref()
    }

    /// Modes in load order.
    pub fn modes(&self) -> &[SyntaxMode] {
        &self.modes
    }

    pub fn mode(&self, name: &str) -> Option<&SyntaxMode> {
        self.modes.iter().find(|m| m.name == name)
    }

    fn mode_mut(&mut self, name: &str) -> Option<&mut SyntaxMode> {
        self.modes.iter_mut().find(|m| m.name == name)
    }

    /// Add a mode, replacing one with the same name.
    pub fn push_mode(&mut self, mode: SyntaxMode) {
        match self.mode_mut(&mode.name) {
            Some(existing) => *existing = mode,
            None => self.modes.push(mode),
        }
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

/// Load grammar files into the handle.
///
/// Each file's commands go to the mode named by its `CLICON_MODE` global,
/// or to `default_mode`. Every mode is registered as a command tree, the
/// resulting [`CliSyntax`] replaces the handle's syntax, and the default
/// mode (or the first loaded one) becomes active.
///
/// Trees of the previous syntax's modes that the new syntax does not list
/// are unregistered; trees added directly with `tree_add` are left alone.
/// Nothing is registered or removed if any file fails to parse or names a
/// blank mode.
pub fn load_syntax<E, P>(handle: &mut CliHandle<E>, files: &[P], default_mode: &str) -> Result<()>
where
    E: GrammarEngine,
    P: AsRef<Path>,
{
    let mut syntax = CliSyntax::new(default_mode);
    let mut trees: Vec<(String, ParseTree)> = Vec::new();

    for path in files {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut tree = ParseTree::new();
        let mut globals = Globals::new();
        handle.parse_file(
            &mut file,
            &path.display().to_string(),
            &mut tree,
            &mut globals,
        )?;

        let mode = globals.get(MODE_GLOBAL).unwrap_or(default_mode).to_string();
        if mode.trim().is_empty() {
            return Err(CliError::InvalidTreeName(mode));
        }
        info!(file = %path.display(), mode = %mode, commands = tree.len(), "syntax file loaded");

        if syntax.mode(&mode).is_none() {
            syntax.push_mode(SyntaxMode::new(&mode));
        }
        if let Some(entry) = syntax.mode_mut(&mode) {
            entry.files.push(path.to_path_buf());
            if let Some(prompt) = globals.get(PROMPT_GLOBAL) {
                entry.prompt = Some(prompt.to_string());
            }
        }

        match trees.iter_mut().find(|(name, _)| *name == mode) {
            Some((_, existing)) => existing.merge(tree),
            None => trees.push((mode, tree)),
        }
    }

    let stale: Vec<String> = handle
        .syntax()
        .map(|old| {
            old.modes()
                .iter()
                .filter(|m| syntax.mode(&m.name).is_none())
                .map(|m| m.name.clone())
                .collect()
        })
        .unwrap_or_default();
    for mode in stale {
        if handle.tree_remove(&mode).is_some() {
            debug!(mode = %mode, "stale mode unregistered");
        }
    }

    for (mode, tree) in trees {
        if let Some(entry) = syntax.mode_mut(&mode) {
            entry.commands = tree.len();
        }
        handle.tree_add(&mode, tree)?;
    }

    let start = if syntax.mode(default_mode).is_some() {
        Some(default_mode.to_string())
    } else {
        syntax.modes().first().map(|m| m.name.clone())
    };

    if handle.set_syntax(Some(syntax)).is_some() {
        debug!("previous syntax released");
    }
    if let Some(mode) = start {
        set_mode(handle, &mode)?;
    }

    Ok(())
}

/// Switch the active mode: select its tree and apply its prompt, if any.
pub fn set_mode<E: GrammarEngine>(handle: &mut CliHandle<E>, mode: &str) -> Result<()> {
    handle.set_tree_active(mode)?;

    let prompt = handle
        .syntax()
        .and_then(|s| s.mode(mode))
        .and_then(|m| m.prompt.clone());
    if let Some(prompt) = prompt {
        handle.set_prompt(&prompt);
    }

    debug!(mode, "mode changed");
    Ok(())
}

/// Load every `*.cli` file in a directory, in name order.
pub fn load_syntax_dir<E: GrammarEngine>(
    handle: &mut CliHandle<E>,
    dir: &Path,
    default_mode: &str,
) -> Result<()> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "cli"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(CliError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no .cli files in {}", dir.display()),
        )));
    }
    load_syntax(handle, &files, default_mode)
}
