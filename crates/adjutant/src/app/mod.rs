//! Single- and multi-command apps and the dispatch logic they share.

mod multi;
mod single;

use std::error::Error as StdError;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::error::{BoxError, Signals};
use crate::flags::{shared, ClapFlags, FlagSet, FlagsHandle, UsageFn};
use crate::info::AppInfo;
use crate::output::Output;
use crate::render;

pub use self::multi::MultiCommandApp;
pub use self::single::SingleCommandApp;

/// A command callback: receives a cancellable context and the positional
/// arguments left after flag parsing.
pub type Executor = Box<dyn FnMut(&Context, &[String]) -> Result<(), BoxError> + Send>;

/// Runs after flags are parsed and before the command executes.
pub type InitFn = Box<dyn FnMut() -> Result<(), BoxError> + Send>;

/// Supplies arguments when `run` is given none.
pub type ArgumentSource = Box<dyn Fn() -> Vec<String> + Send>;

fn process_arguments() -> Vec<String> {
    std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

/// State and behavior common to both app kinds.
pub(crate) struct AppCore {
    pub info: AppInfo,
    pub flags: FlagSet,
    pub out: Output,
    pub err: Output,
    init: Option<InitFn>,
    arguments: ArgumentSource,
}

impl AppCore {
    pub fn new(info: AppInfo, flags: Option<FlagsHandle>, out: Output, err: Output) -> Self {
        let flags = flags.unwrap_or_else(|| shared(ClapFlags::new(info.name.clone())));

        Self {
            info,
            flags: FlagSet::new(flags),
            out,
            err,
            init: None,
            arguments: Box::new(process_arguments),
        }
    }

    /// A usage hook printing `usage_line` and the help hint for `full_name`.
    ///
    /// It prints the short usage rather than the full help: the hook runs
    /// inside the collaborator's `parse`, while its lock is held, so the
    /// flag defaults cannot be rendered from here.
    pub fn usage_hook(&self, usage_line: String, full_name: &str) -> UsageFn {
        let errors = self.err.clone();
        let text = render::usage_error("", &usage_line, full_name);
        Arc::new(move || errors.print(&text))
    }

    pub fn set_init(&mut self, init: InitFn) {
        self.init = Some(init);
    }

    pub fn set_argument_source(&mut self, source: ArgumentSource) {
        self.arguments = source;
    }

    /// The given arguments, or the argument source's when none are given.
    pub fn resolve_arguments<I, S>(&self, arguments: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments: Vec<String> = arguments.into_iter().map(Into::into).collect();
        if arguments.is_empty() {
            debug!("No arguments given; using argument source");
            (self.arguments)()
        } else {
            arguments
        }
    }

    pub fn initialize(&mut self) -> Result<(), BoxError> {
        match self.init.as_mut() {
            Some(init) => init(),
            None => Ok(()),
        }
    }

    pub fn version_line(&self) -> String {
        render::version_line(&self.info.name, &self.info.version)
    }

    pub fn print_version(&self) {
        self.out.print(&self.version_line());
    }

    /// Prints `Error: <msg>` unless the message is empty. Returns whether
    /// anything was printed.
    pub fn print_error(&self, err: &dyn StdError) -> bool {
        let line = render::error_line(&err.to_string());
        self.err.print(&line);
        !line.is_empty()
    }

    /// Reports a callback error and maps it to an exit code.
    ///
    /// `help` prints the help of whichever scope was active.
    pub fn handle_error(&self, err: &(dyn StdError + 'static), help: impl FnOnce()) -> i32 {
        let signals = Signals::inspect(err);
        debug!(?signals, "Handling callback error");

        if signals.help_requested {
            if self.print_error(err) {
                self.err.print("\n");
            }
            help();
        } else {
            self.print_error(err);
        }

        signals.exit_code()
    }
}

/// Runs `executor` under a context that is cancelled on SIGINT.
///
/// A cancellation error anywhere in the returned chain counts as success.
pub(crate) fn execute(ctx: &Context, executor: &mut Executor, arguments: &[String]) -> Result<(), BoxError> {
    let (ctx, _interrupt) = ctx.with_interrupt();

    match executor(&ctx, arguments) {
        Err(err) if Signals::inspect(err.as_ref()).canceled => {
            debug!(error = %err, "Command cancelled");
            Ok(())
        }
        result => result,
    }
}
