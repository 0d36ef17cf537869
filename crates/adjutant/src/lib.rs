#![deny(clippy::all)]

//! Standardized execution for command line apps.
//!
//! An app wraps a flags collaborator, parses arguments with it, answers
//! `--help`/`--version`, runs an optional init hook and then the command,
//! and turns the outcome into a process exit code. Errors returned by
//! callbacks can carry an explicit exit code ([`StatusCodeError`]) or ask
//! for the active help to be shown ([`HelpRequestedError`]).
//!
//! ```no_run
//! use adjutant::{AppInfo, Context, Output, SingleCommandApp};
//!
//! let mut app = SingleCommandApp::new(
//!     AppInfo {
//!         name: "hello".into(),
//!         version: "v1.0.0".into(),
//!         ..Default::default()
//!     },
//!     |_ctx: &Context, args: &[String]| {
//!         println!("Hello {}!", args.join(", "));
//!         Ok(())
//!     },
//!     None,
//!     Output::stdout(),
//!     Output::stderr(),
//! );
//!
//! // No arguments: the process arguments are read, lossily converted.
//! std::process::exit(app.run(&Context::background(), Vec::<String>::new()));
//! ```

mod app;
mod context;
mod error;
pub mod flags;
mod info;
mod output;
mod registry;
mod render;

pub use app::{ArgumentSource, Executor, InitFn, MultiCommandApp, SingleCommandApp};
pub use context::{CancelHandle, Context, InterruptGuard};
pub use error::exit_codes;
pub use error::{
    BoxError, Canceled, ErrorSignalExt, HelpRequestedError, RegistrationError, Signals,
    StatusCodeError,
};
pub use flags::{shared, ClapFlags, Flags, FlagsHandle};
pub use info::{AppInfo, CommandInfo, DEFAULT_COMMAND_USAGE, DEFAULT_PARENT_COMMAND_USAGE};
pub use output::{Output, SharedBuffer};
