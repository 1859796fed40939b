//! Interactive read/eval loop.
//!
//! Lines are matched against the handle's active tree and the matched
//! callback is looked up in a [`Dispatcher`]:
//!
//! ```no_run
//! use cli_handle::repl::{interactive, Dispatcher};
//! use cli_handle::CliHandle;
//!
//! let mut handle: CliHandle = CliHandle::create().unwrap();
//! cli_handle::session::load_syntax(&mut handle, &["main.cli"], "operation").unwrap();
//!
//! let dispatcher = Dispatcher::with_builtins();
//! let stdin = std::io::stdin();
//! interactive(&mut handle, &dispatcher, &mut stdin.lock(), &mut std::io::stdout()).unwrap();
//! handle.exit();
//! ```

mod dispatcher;
mod eval;

pub use dispatcher::{CallbackFn, Dispatcher};
pub use eval::{eval, interactive, EvalOutcome, SUSPEND_CHAR};
