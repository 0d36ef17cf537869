use std::error::Error as StdError;

use tracing::debug;

use super::{execute, AppCore, ArgumentSource, Executor};
use crate::context::Context;
use crate::error::{exit_codes, BoxError};
use crate::flags::{FlagsHandle, Scope};
use crate::info::{AppInfo, DEFAULT_COMMAND_USAGE};
use crate::output::Output;
use crate::render::{self, Help};

/// An app that runs one command.
pub struct SingleCommandApp {
    core: AppCore,
    executor: Executor,
}

impl SingleCommandApp {
    /// Creates the app. Without `flags`, a [`ClapFlags`](crate::ClapFlags)
    /// named after the app is used.
    pub fn new<F>(info: AppInfo, executor: F, flags: Option<FlagsHandle>, out: Output, err: Output) -> Self
    where
        F: FnMut(&Context, &[String]) -> Result<(), BoxError> + Send + 'static,
    {
        let info = info.backfilled(DEFAULT_COMMAND_USAGE);
        let core = AppCore::new(info, flags, out, err);

        let usage = core.usage_hook(core_usage_line(&core), &core.info.name);
        core.flags.setup(&core.err, Scope::Global, usage);

        Self {
            core,
            executor: Box::new(executor),
        }
    }

    pub fn info(&self) -> &AppInfo {
        &self.core.info
    }

    pub fn flags(&self) -> &FlagsHandle {
        self.core.flags.handle()
    }

    /// Sets a hook run after flag parsing and before the command.
    pub fn on_init<F>(&mut self, init: F)
    where
        F: FnMut() -> Result<(), BoxError> + Send + 'static,
    {
        self.core.set_init(Box::new(init));
    }

    /// Replaces where arguments come from when `run` is given none. Defaults
    /// to the process arguments without the program name.
    pub fn set_argument_source<F>(&mut self, source: F)
    where
        F: Fn() -> Vec<String> + Send + 'static,
    {
        let source: ArgumentSource = Box::new(source);
        self.core.set_argument_source(source);
    }

    /// Parses `arguments`, handles help/version, then runs init and the
    /// command. Returns the process exit code.
    pub fn run<I, S>(&mut self, ctx: &Context, arguments: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments = self.core.resolve_arguments(arguments);
        debug!(app = %self.core.info.name, ?arguments, "Running single-command app");

        if let Err(err) = self.core.flags.parse(&arguments) {
            debug!(error = %err, "Flag parsing failed");
            self.print_usage_error(Some(err.as_ref()));
            return exit_codes::USAGE_ERROR;
        }

        if self.intercept() {
            return exit_codes::SUCCESS;
        }

        if let Err(err) = self.core.initialize() {
            return self.core.handle_error(err.as_ref(), || self.print_help());
        }

        let positional = self.core.flags.args();
        match execute(ctx, &mut self.executor, &positional) {
            Ok(()) => exit_codes::SUCCESS,
            Err(err) => self.core.handle_error(err.as_ref(), || self.print_help()),
        }
    }

    fn intercept(&self) -> bool {
        if self.core.flags.requested_help() {
            debug!("Help requested");
            self.print_help();
            return true;
        }
        if self.core.flags.requested_version() {
            debug!("Version requested");
            self.print_version();
            return true;
        }
        false
    }

    /// Prints the full help to the error output.
    pub fn print_help(&self) {
        let help = Help {
            usage_line: core_usage_line(&self.core),
            summary: &self.core.info.summary,
            commands: None,
            defaults: self.core.flags.defaults(),
            version_line: self.core.version_line(),
        };
        self.core.err.print(&help.render());
    }

    pub fn print_usage(&self) {
        self.core.err.print(&core_usage_line(&self.core));
    }

    /// Prints `err` (if any), the usage line and a pointer to `--help`.
    pub fn print_usage_error(&self, err: Option<&dyn StdError>) {
        let message = err.map(|err| err.to_string()).unwrap_or_default();
        self.core.err.print(&render::usage_error(
            &message,
            &core_usage_line(&self.core),
            &self.core.info.name,
        ));
    }

    /// Prints the version line to the standard output.
    pub fn print_version(&self) {
        self.core.print_version();
    }
}

fn core_usage_line(core: &AppCore) -> String {
    render::usage_line(&core.info.name, &core.info.usage)
}
