//! Configuration management for cli-handle.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::Args;
use crate::engine::GrammarEngine;
use crate::handle::Handle;
use crate::session::{load_syntax, load_syntax_dir, CliHandle};

/// Option key recording the mode the session started in.
pub const CLI_MODE_OPTION: &str = "CLICON_CLI_MODE";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interactive CLI settings.
    pub cli: CliSection,
    /// Logging configuration.
    pub logging: LoggingSection,
    /// Free-form options copied into the handle's option store.
    pub options: BTreeMap<String, String>,
}

/// CLI configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSection {
    /// Prompt override; when unset the mode's prompt or the engine default
    /// is used.
    pub prompt: Option<String>,
    /// Comment character for grammar files and input lines.
    pub comment: char,
    /// Mode to start in.
    pub mode: String,
    /// Grammar files to load.
    pub grammar: Vec<PathBuf>,
    /// Directory of `*.cli` grammar files, used when `grammar` is empty.
    pub grammar_dir: Option<PathBuf>,
    /// Log every matched command.
    pub logsyntax: bool,
}

impl Default for CliSection {
    fn default() -> Self {
        Self {
            prompt: None,
            comment: '#',
            mode: "operation".to_string(),
            grammar: Vec::new(),
            grammar_dir: None,
            logsyntax: false,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or a full filter
    /// directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(prompt) = std::env::var("CLI_HANDLE_PROMPT") {
            self.cli.prompt = Some(prompt);
        }

        if let Ok(mode) = std::env::var("CLI_HANDLE_MODE") {
            if !mode.is_empty() {
                self.cli.mode = mode;
            }
        }

        if let Some(paths) = std::env::var_os("CLI_HANDLE_GRAMMAR") {
            let files: Vec<PathBuf> = std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !files.is_empty() {
                self.cli.grammar = files;
            }
        }

        if let Ok(level) = std::env::var("CLI_HANDLE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref mode) = args.mode {
            self.cli.mode = mode.clone();
        }

        if let Some(ref prompt) = args.prompt {
            self.cli.prompt = Some(prompt.clone());
        }

        if !args.grammar.is_empty() {
            self.cli.grammar = args.grammar.clone();
        }

        if let Some(ref dir) = args.grammar_dir {
            self.cli.grammar_dir = Some(dir.clone());
        }

        if args.logsyntax {
            self.cli.logsyntax = true;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Copy options and engine settings into a handle.
    ///
    /// Must run before grammar files are loaded, since the comment
    /// character affects parsing.
    pub fn apply_to<E: GrammarEngine>(&self, handle: &mut CliHandle<E>) {
        handle
            .options_mut()
            .merge(self.options.iter().map(|(k, v)| (k.clone(), v.clone())));
        handle
            .options_mut()
            .set(CLI_MODE_OPTION, self.cli.mode.clone());

        handle.set_comment(self.cli.comment);
        handle.set_logsyntax(self.cli.logsyntax);
    }

    /// Load the configured grammar into a handle and apply the prompt
    /// override.
    ///
    /// Explicit grammar files take precedence over the grammar directory.
    pub fn load_syntax_into<E: GrammarEngine>(
        &self,
        handle: &mut CliHandle<E>,
    ) -> crate::Result<()> {
        if !self.cli.grammar.is_empty() {
            load_syntax(handle, &self.cli.grammar, &self.cli.mode)?;
        } else if let Some(ref dir) = self.cli.grammar_dir {
            load_syntax_dir(handle, dir, &self.cli.mode)?;
        } else {
            warn!("no grammar files configured");
        }

        if let Some(ref prompt) = self.cli.prompt {
            handle.set_prompt(prompt);
        }
        Ok(())
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
