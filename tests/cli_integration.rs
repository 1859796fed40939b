//! CLI integration tests.
//!
//! These tests drive argument parsing, configuration loading and a full
//! session from grammar files to callback output.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

use cli_handle::cli::{parse_args_from, Args};
use cli_handle::config::{Config, CLI_MODE_OPTION};
use cli_handle::engine::CommandMatch;
use cli_handle::repl::{eval, interactive, Dispatcher, EvalOutcome};
use cli_handle::{CliHandle, Handle};

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("cli-handle")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn write_file(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

const OPERATION_CLI: &str = r#"
# Operational mode
CLICON_PROMPT="router> ";
show("Show information") {
    version, show_version();
    interface <name:string>("Interface name"), show_interface();
}
configure("Enter configuration mode"), cli_set_mode("configure");
help, cli_help();
quit("Leave the CLI"), cli_quit();
"#;

const CONFIGURE_CLI: &str = r#"
CLICON_MODE="configure";
CLICON_PROMPT="router(config)# ";
hostname <name:string>, set_hostname();
exit, cli_set_mode("operation");
"#;

fn dispatcher() -> Dispatcher<cli_handle::CommandEngine> {
    let mut d = Dispatcher::with_builtins();
    d.register("show_version", |_h: &mut CliHandle, _m: &CommandMatch, out: &mut dyn Write| {
        writeln!(out, "version 1.0")?;
        Ok(())
    });
    d.register("show_interface", |_h: &mut CliHandle, m: &CommandMatch, out: &mut dyn Write| {
        writeln!(out, "interface {}", m.var("name").unwrap_or("?"))?;
        Ok(())
    });
    d.register("set_hostname", |h: &mut CliHandle, m: &CommandMatch, _out: &mut dyn Write| {
        if let Some(name) = m.var("name") {
            h.options_mut().set("hostname", name);
        }
        Ok(())
    });
    d
}

fn session(dir: &TempDir) -> CliHandle {
    let config = Config {
        cli: cli_handle::config::CliSection {
            grammar: vec![
                write_file(dir, "operation.cli", OPERATION_CLI),
                write_file(dir, "configure.cli", CONFIGURE_CLI),
            ],
            ..Default::default()
        },
        ..Default::default()
    };

    let mut handle: CliHandle = CliHandle::create().unwrap();
    config.apply_to(&mut handle);
    config.load_syntax_into(&mut handle).unwrap();
    handle
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.config.is_none());
    assert!(result.grammar.is_empty());
    assert!(result.grammar_dir.is_none());
    assert!(result.mode.is_none());
    assert!(result.prompt.is_none());
    assert!(!result.logsyntax);
    assert!(result.command.is_empty());
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-f",
        "/etc/cli-handle.json",
        "-g",
        "operation.cli",
        "-g",
        "configure.cli",
        "-m",
        "configure",
        "-P",
        "r1# ",
        "-l",
        "debug",
        "--logsyntax",
    ]))
    .unwrap();

    assert_eq!(result.config, Some(PathBuf::from("/etc/cli-handle.json")));
    assert_eq!(result.grammar.len(), 2);
    assert_eq!(result.mode.as_deref(), Some("configure"));
    assert_eq!(result.prompt.as_deref(), Some("r1# "));
    assert_eq!(result.log_level, Some("debug".to_string()));
    assert!(result.logsyntax);
}

#[test]
fn test_cli_single_command() {
    let result = parse_args_from(args(&["-g", "operation.cli", "show", "version"])).unwrap();
    assert_eq!(result.command, vec!["show", "version"]);
}

#[test]
fn test_cli_unknown_option() {
    let result = parse_args_from(args(&["--host", "0.0.0.0"]));
    assert!(result.is_err());
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let json = r#"{
        "cli": {
            "prompt": "edge> ",
            "mode": "configure",
            "grammar": ["/etc/cli/operation.cli"]
        },
        "logging": {
            "level": "warn"
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.cli.prompt.as_deref(), Some("edge> "));
    assert_eq!(config.cli.mode, "configure");
    assert_eq!(config.cli.grammar, vec![PathBuf::from("/etc/cli/operation.cli")]);
    assert_eq!(config.log_filter(), "warn");
}

#[test]
fn test_config_priority_cli_over_file() {
    let json = r#"{
        "cli": {
            "mode": "configure",
            "grammar": ["/etc/cli/operation.cli"]
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let mut config = Config::from_file(file.path()).unwrap();
    let cli_args = Args {
        mode: Some("operation".to_string()),
        grammar: vec![PathBuf::from("local.cli")],
        ..Default::default()
    };
    config.apply_args(&cli_args);

    assert_eq!(config.cli.mode, "operation");
    assert_eq!(config.cli.grammar, vec![PathBuf::from("local.cli")]);
}

#[test]
fn test_config_load_missing_file() {
    let cli_args = Args {
        config: Some(PathBuf::from("/nonexistent/cli-handle.json")),
        ..Default::default()
    };
    assert!(Config::load(&cli_args).is_err());
}

#[test]
fn test_config_grammar_dir() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "10-operation.cli", OPERATION_CLI);
    write_file(&dir, "20-configure.cli", CONFIGURE_CLI);
    write_file(&dir, "README", "not a grammar");

    let mut config = Config::default();
    config.cli.grammar_dir = Some(dir.path().to_path_buf());

    let mut handle: CliHandle = CliHandle::create().unwrap();
    config.apply_to(&mut handle);
    config.load_syntax_into(&mut handle).unwrap();

    let syntax = handle.syntax().unwrap();
    assert_eq!(syntax.len(), 2);
    assert_eq!(handle.tree_active(), Some("operation"));
    assert_eq!(handle.options().get(CLI_MODE_OPTION), Some("operation"));

    handle.exit();
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_session_single_command() {
    let dir = TempDir::new().unwrap();
    let mut handle = session(&dir);
    let d = dispatcher();

    let mut out = Vec::new();
    let outcome = eval(&mut handle, &d, "show interface eth0", &mut out).unwrap();

    assert_eq!(outcome, EvalOutcome::Executed("show_interface".into()));
    assert_eq!(String::from_utf8(out).unwrap(), "interface eth0\n");

    handle.exit();
}

#[test]
fn test_session_mode_switching() {
    let dir = TempDir::new().unwrap();
    let mut handle = session(&dir);
    let d = dispatcher();

    let input = "configure\nhostname r1\nexit\nshow version\nquit\nshow version\n";
    let mut out = Vec::new();
    interactive(&mut handle, &d, &mut input.as_bytes(), &mut out).unwrap();

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("router(config)# "));
    assert_eq!(output.matches("version 1.0").count(), 1);
    assert_eq!(handle.options().get("hostname"), Some("r1"));
    assert_eq!(handle.tree_active(), Some("operation"));
    assert!(handle.exiting());

    handle.exit();
}

#[test]
fn test_session_reports_syntax_errors() {
    let dir = TempDir::new().unwrap();
    let mut handle = session(&dir);
    let d = dispatcher();

    let input = "show\nshow version extra\nreload\n";
    let mut out = Vec::new();
    interactive(&mut handle, &d, &mut input.as_bytes(), &mut out).unwrap();

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("CLI syntax error: \"reload\": Unknown command"));
    assert_eq!(output.matches("CLI syntax error").count(), 3);

    handle.exit();
}

#[test]
fn test_session_help_lists_active_mode() {
    let dir = TempDir::new().unwrap();
    let mut handle = session(&dir);
    let d = dispatcher();

    let mut out = Vec::new();
    eval(&mut handle, &d, "help", &mut out).unwrap();

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("Show information"));
    assert!(output.contains("Leave the CLI"));
    assert!(!output.contains("hostname"));

    handle.exit();
}
