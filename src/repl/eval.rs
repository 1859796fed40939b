//! Line evaluation and the interactive read loop.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use super::Dispatcher;
use crate::engine::GrammarEngine;
use crate::session::CliHandle;
use crate::Result;

/// Character that suspends the session when it appears on a line (`^Z`).
pub const SUSPEND_CHAR: char = '\u{1a}';

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalOutcome {
    /// Blank line.
    Empty,
    /// Line starting with the comment character.
    Comment,
    /// A command matched and its callback ran.
    Executed(String),
    /// No command matched; carries the engine's diagnostic.
    NoMatch(String),
}

/// Evaluate one command line.
///
/// Non-matching lines are reported on `out` as a syntax error; the
/// diagnostic is also returned.
pub fn eval<E: GrammarEngine>(
    handle: &mut CliHandle<E>,
    dispatcher: &Dispatcher<E>,
    line: &str,
    out: &mut dyn Write,
) -> Result<EvalOutcome> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(EvalOutcome::Empty);
    }
    if line.starts_with(handle.comment()) {
        return Ok(EvalOutcome::Comment);
    }

    match handle.match_command(line)? {
        Some(matched) => {
            dispatcher.dispatch(handle, &matched, out)?;
            Ok(EvalOutcome::Executed(matched.callback.name))
        }
        None => {
            let reason = handle.nomatch().unwrap_or("No match").to_string();
            writeln!(out, "CLI syntax error: \"{}\": {}", line, reason)?;
            Ok(EvalOutcome::NoMatch(reason))
        }
    }
}

/// Run the interactive read loop until the exiting flag is set or input
/// ends.
///
/// The exiting flag is checked before each prompt. Errors from individual
/// lines are written to `out` and the loop carries on; only I/O errors on
/// the streams themselves end it early.
pub fn interactive<E: GrammarEngine>(
    handle: &mut CliHandle<E>,
    dispatcher: &Dispatcher<E>,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    let mut line = String::new();

    while !handle.exiting() {
        write!(out, "{}", handle.prompt())?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("end of input");
            writeln!(out)?;
            break;
        }

        if line.contains(SUSPEND_CHAR) {
            if let Err(err) = handle.suspend() {
                warn!(error = %err, "suspend hook failed");
                writeln!(out, "{}", err)?;
            }
            continue;
        }

        if let Err(err) = eval(handle, dispatcher, &line, out) {
            warn!(error = %err, line = line.trim(), "command failed");
            writeln!(out, "{}", err)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Callback, CommandMatch, CommandNode, ParseTree};
    use crate::error::CliError;
    use crate::handle::Handle;

    fn handle() -> CliHandle {
        let mut h = CliHandle::create().unwrap();
        let mut tree = ParseTree::new();
        tree.insert(CommandNode::keyword("quit").callback(Callback::new("cli_quit")));
        tree.insert(CommandNode::keyword("ping").callback(Callback::new("ping")));
        tree.insert(CommandNode::keyword("fail").callback(Callback::new("fail")));
        h.tree_add("operation", tree).unwrap();
        h.set_tree_active("operation").unwrap();
        h
    }

    fn dispatcher() -> Dispatcher<crate::engine::CommandEngine> {
        let mut d = Dispatcher::with_builtins();
        d.register("ping", |_h: &mut CliHandle, _m: &CommandMatch, out: &mut dyn Write| {
            writeln!(out, "pong")?;
            Ok(())
        });
        d.register("fail", |_h: &mut CliHandle, _m: &CommandMatch, _out: &mut dyn Write| {
            Err(CliError::CallbackFailed {
                name: "fail".into(),
                reason: "always".into(),
            })
        });
        d
    }

    fn run(h: &mut CliHandle, input: &str) -> String {
        let d = dispatcher();
        let mut out = Vec::new();
        interactive(h, &d, &mut input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_eval_skips_blank_and_comment() {
        let mut h = handle();
        let d = dispatcher();
        let mut out = Vec::new();

        assert_eq!(eval(&mut h, &d, "   ", &mut out).unwrap(), EvalOutcome::Empty);
        assert_eq!(
            eval(&mut h, &d, "# ping", &mut out).unwrap(),
            EvalOutcome::Comment
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_eval_executes_callback() {
        let mut h = handle();
        let d = dispatcher();
        let mut out = Vec::new();

        let outcome = eval(&mut h, &d, "ping\n", &mut out).unwrap();
        assert_eq!(outcome, EvalOutcome::Executed("ping".into()));
        assert_eq!(String::from_utf8(out).unwrap(), "pong\n");
    }

    #[test]
    fn test_eval_reports_nomatch() {
        let mut h = handle();
        let d = dispatcher();
        let mut out = Vec::new();

        let outcome = eval(&mut h, &d, "reboot now", &mut out).unwrap();
        assert_eq!(outcome, EvalOutcome::NoMatch("Unknown command".into()));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "CLI syntax error: \"reboot now\": Unknown command\n"
        );
        assert_eq!(h.nomatch(), Some("Unknown command"));
    }

    #[test]
    fn test_interactive_stops_on_quit() {
        let mut h = handle();
        let output = run(&mut h, "ping\nquit\nping\n");

        assert!(h.exiting());
        assert_eq!(output.matches("pong").count(), 1);
        assert_eq!(output.matches("cli> ").count(), 2);
    }

    #[test]
    fn test_interactive_stops_at_eof() {
        let mut h = handle();
        let output = run(&mut h, "ping\n");

        assert!(!h.exiting());
        assert_eq!(output.matches("pong").count(), 1);
    }

    #[test]
    fn test_interactive_continues_after_error() {
        let mut h = handle();
        let output = run(&mut h, "fail\nping\n");

        assert!(output.contains("callback fail failed: always"));
        assert!(output.contains("pong"));
    }

    #[test]
    fn test_interactive_not_entered_when_exiting() {
        let mut h = handle();
        h.set_exiting(true);
        let output = run(&mut h, "ping\n");
        assert!(output.is_empty());
    }

    #[test]
    fn test_interactive_suspend_runs_hook() {
        let mut h = handle();
        h.set_susp_hook(Some(Box::new(|h: &mut CliHandle| {
            let count = h.data().get::<u32>("suspends").copied().unwrap_or(0);
            h.data_mut().insert("suspends", count + 1);
            Ok(())
        })));

        let output = run(&mut h, "\u{1a}\n\u{1a}\nping\n");
        assert_eq!(h.data().get::<u32>("suspends"), Some(&2));
        assert!(output.contains("pong"));
    }
}
