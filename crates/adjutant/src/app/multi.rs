use std::error::Error as StdError;

use tracing::debug;

use super::{execute, AppCore, ArgumentSource};
use crate::context::Context;
use crate::error::{exit_codes, BoxError, RegistrationError};
use crate::flags::{shared, ClapFlags, FlagSet, FlagsHandle, Scope};
use crate::info::{AppInfo, CommandInfo, DEFAULT_PARENT_COMMAND_USAGE};
use crate::output::Output;
use crate::registry::{Command, CommandRegistry};
use crate::render::{self, CommandRow, Help};

/// An app that dispatches to one of several named commands.
///
/// The first argument selects the command. Global flags are accepted after
/// the command name only: every command inherits them unless it defines a
/// flag of the same name. A leading flag is parsed against the global scope
/// for `--help` and `--version` and is otherwise an unknown command.
pub struct MultiCommandApp {
    core: AppCore,
    commands: CommandRegistry,
}

impl MultiCommandApp {
    /// Creates the app. `flags` are the global flags; without them, a
    /// [`ClapFlags`] named after the app is used.
    pub fn new(info: AppInfo, flags: Option<FlagsHandle>, out: Output, err: Output) -> Self {
        let info = info.backfilled(DEFAULT_PARENT_COMMAND_USAGE);
        let core = AppCore::new(info, flags, out, err);

        let usage_line = render::usage_line(&core.info.name, &core.info.usage);
        let usage = core.usage_hook(usage_line, &core.info.name);
        core.flags.setup(&core.err, Scope::Global, usage);

        Self {
            core,
            commands: CommandRegistry::new(),
        }
    }

    pub fn info(&self) -> &AppInfo {
        &self.core.info
    }

    pub fn flags(&self) -> &FlagsHandle {
        self.core.flags.handle()
    }

    /// Registers `executor` under `info.name`.
    ///
    /// Registering a name again replaces the command but keeps its place in
    /// the listing. Fails if `flags` are already used by the app or by any
    /// command, including a previous registration of the same name. Without
    /// `flags`, a [`ClapFlags`] named after the command is used.
    pub fn set_command<F>(
        &mut self,
        info: CommandInfo,
        executor: F,
        flags: Option<FlagsHandle>,
    ) -> Result<(), RegistrationError>
    where
        F: FnMut(&Context, &[String]) -> Result<(), BoxError> + Send + 'static,
    {
        let info = info.backfilled();

        if let Some(flags) = &flags {
            if self.core.flags.is_same(flags) || self.commands.contains_flags(flags) {
                return Err(RegistrationError::DuplicateFlags {
                    command: info.name.clone(),
                });
            }
        }

        let flags = FlagSet::new(flags.unwrap_or_else(|| shared(ClapFlags::new(info.name.clone()))));
        let full_name = format!("{} {}", self.core.info.name, info.name);
        let usage = self
            .core
            .usage_hook(render::usage_line(&full_name, &info.usage), &full_name);
        flags.setup(
            &self.core.err,
            Scope::Command {
                globals: &self.core.flags,
            },
            usage,
        );

        debug!(command = %info.name, "Registered command");
        self.commands.insert(Command {
            info,
            executor: Box::new(executor),
            flags,
        });
        Ok(())
    }

    /// Command names in registration order.
    pub fn command_names(&self) -> Vec<String> {
        self.commands.names().to_vec()
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

    /// Resolves the command from the first argument, parses the rest, handles
    /// help/version, then runs init and the command. Returns the process exit
    /// code.
    pub fn run<I, S>(&mut self, ctx: &Context, arguments: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments = self.core.resolve_arguments(arguments);
        debug!(app = %self.core.info.name, ?arguments, "Running multi-command app");

        let Some(command_name) = arguments.first().cloned() else {
            debug!("No arguments; printing help");
            self.print_help("");
            return exit_codes::USAGE_ERROR;
        };
        if self.commands.is_empty() {
            debug!("No commands registered; printing help");
            self.print_help("");
            return exit_codes::USAGE_ERROR;
        }

        let has_command = self.commands.contains(&command_name);
        if !has_command && !command_name.starts_with('-') {
            return self.print_unknown_command(&command_name);
        }

        let (flags, rest) = match self.commands.get(&command_name) {
            Some(command) => (command.flags.clone(), &arguments[1..]),
            None => (self.core.flags.clone(), &arguments[..]),
        };

        if let Err(err) = flags.parse(rest) {
            debug!(command = %command_name, error = %err, "Flag parsing failed");
            self.print_usage_error(&command_name, Some(err.as_ref()));
            return exit_codes::USAGE_ERROR;
        }

        if flags.requested_help() {
            debug!(command = %command_name, "Help requested");
            self.print_help(&command_name);
            return exit_codes::SUCCESS;
        }
        if flags.requested_version() {
            debug!("Version requested");
            self.print_version();
            return exit_codes::SUCCESS;
        }

        if !has_command {
            return self.print_unknown_command(&command_name);
        }

        if let Err(err) = self.core.initialize() {
            return self
                .core
                .handle_error(err.as_ref(), || self.print_help(&command_name));
        }

        let positional = flags.args();
        let result = match self.commands.get_mut(&command_name) {
            Some(command) => execute(ctx, &mut command.executor, &positional),
            None => Ok(()),
        };

        match result {
            Ok(()) => exit_codes::SUCCESS,
            Err(err) => self
                .core
                .handle_error(err.as_ref(), || self.print_help(&command_name)),
        }
    }

    /// Prints help for `command_name`, or the top-level help (with the
    /// command listing) when it names no command.
    pub fn print_help(&self, command_name: &str) {
        let help = match self.commands.get(command_name) {
            Some(command) => Help {
                usage_line: self.usage_line(command_name),
                summary: &command.info.summary,
                commands: None,
                defaults: command.flags.defaults(),
                version_line: self.core.version_line(),
            },
            None => Help {
                usage_line: self.usage_line(""),
                summary: &self.core.info.summary,
                commands: Some(
                    self.commands
                        .iter()
                        .map(|command| CommandRow {
                            name: &command.info.name,
                            summary: &command.info.summary,
                        })
                        .collect(),
                ),
                defaults: self.core.flags.defaults(),
                version_line: self.core.version_line(),
            },
        };
        self.core.err.print(&help.render());
    }

    /// Prints the usage line for `command_name`, or the app's when it names
    /// no command.
    pub fn print_usage(&self, command_name: &str) {
        self.core.err.print(&self.usage_line(command_name));
    }

    /// Prints `err` (if any), the usage line and a pointer to `--help`.
    pub fn print_usage_error(&self, command_name: &str, err: Option<&dyn StdError>) {
        let message = err.map(|err| err.to_string()).unwrap_or_default();
        self.core.err.print(&render::usage_error(
            &message,
            &self.usage_line(command_name),
            &self.full_name(command_name),
        ));
    }

    /// Prints the version line to the standard output.
    pub fn print_version(&self) {
        self.core.print_version();
    }

    fn full_name(&self, command_name: &str) -> String {
        match self.commands.get(command_name) {
            Some(command) => format!("{} {}", self.core.info.name, command.info.name),
            None => self.core.info.name.clone(),
        }
    }

    fn usage_line(&self, command_name: &str) -> String {
        let usage = match self.commands.get(command_name) {
            Some(command) => &command.info.usage,
            None => &self.core.info.usage,
        };
        render::usage_line(&self.full_name(command_name), usage)
    }

    fn print_unknown_command(&self, token: &str) -> i32 {
        debug!(command = %token, "Unknown command");
        let err: BoxError = format!("unknown command '{}'", token).into();
        self.print_usage_error("", Some(err.as_ref()));
        exit_codes::ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SharedBuffer;
    use std::sync::{Arc, Mutex};

    fn platform() -> String {
        format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
    }

    fn info() -> AppInfo {
        AppInfo {
            name: "test".into(),
            summary: "A test".into(),
            usage: "testing".into(),
            version: "vTest".into(),
        }
    }

    fn noop(_: &Context, _: &[String]) -> Result<(), BoxError> {
        Ok(())
    }

    fn app(buffer: &SharedBuffer) -> MultiCommandApp {
        MultiCommandApp::new(info(), None, buffer.clone().into(), buffer.clone().into())
    }

    #[test]
    fn test_zero_values_are_backfilled() {
        let buffer = SharedBuffer::new();
        let mut app = MultiCommandApp::new(
            AppInfo::default(),
            None,
            Output::discard(),
            buffer.clone().into(),
        );
        assert_eq!(app.info().usage, DEFAULT_PARENT_COMMAND_USAGE);
        assert!(!app.info().name.is_empty());

        app.set_command(CommandInfo { name: "x".into(), ..Default::default() }, noop, None)
            .unwrap();
        app.print_usage("x");

        assert_eq!(
            buffer.contents(),
            format!("Usage: {} x [arguments ...]\n", app.info().name)
        );
    }

    #[test]
    fn test_set_command_rejects_duplicate_flags() {
        let global = shared(ClapFlags::new("test"));
        let mut app = MultiCommandApp::new(
            info(),
            Some(global.clone()),
            Output::discard(),
            Output::discard(),
        );

        let err = app
            .set_command(CommandInfo { name: "a".into(), ..Default::default() }, noop, Some(global))
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateFlags { command: "a".into() });

        let flags = shared(ClapFlags::new("a"));
        app.set_command(CommandInfo { name: "a".into(), ..Default::default() }, noop, Some(flags.clone()))
            .unwrap();
        assert!(app
            .set_command(CommandInfo { name: "b".into(), ..Default::default() }, noop, Some(flags.clone()))
            .is_err());
        assert!(app
            .set_command(CommandInfo { name: "a".into(), ..Default::default() }, noop, Some(flags))
            .is_err());

        app.set_command(CommandInfo { name: "a".into(), ..Default::default() }, noop, None)
            .unwrap();
        assert_eq!(app.command_names(), ["a"]);
    }

    #[test]
    fn test_command_names_is_a_copy() {
        let mut app = app(&SharedBuffer::new());
        app.set_command(CommandInfo { name: "one".into(), ..Default::default() }, noop, None)
            .unwrap();

        let mut names = app.command_names();
        names.push("two".into());

        assert_eq!(app.command_names(), ["one"]);
    }

    #[test]
    fn test_print_help_top_level() {
        let buffer = SharedBuffer::new();
        let mut flags = ClapFlags::new("test");
        flags.string("testflag", "testval", "A test flag");
        let mut app = MultiCommandApp::new(
            info(),
            Some(shared(flags)),
            buffer.clone().into(),
            buffer.clone().into(),
        );

        let mut command_flags = ClapFlags::new("testcommand");
        command_flags.parsed("testcommandflag", 5i64, "A test command flag");
        app.set_command(
            CommandInfo {
                name: "testcommand".into(),
                summary: "A test command".into(),
                usage: "args here...".into(),
            },
            noop,
            Some(shared(command_flags)),
        )
        .unwrap();

        app.print_help("");

        assert_eq!(
            buffer.contents(),
            format!(
                "Usage: test testing\n\nA test\n\nCommands:\n\n\ttestcommand\tA test command\n\
                 \nOptions:\n\n\
                 \x20 -h, --help\n    \tDisplay the help message\n\
                 \x20 --testflag string\n    \tA test flag (default \"testval\")\n\
                 \x20 --version\n    \tDisplay the application version\n\
                 \ntest vTest ({})\n",
                platform()
            )
        );
    }

    #[test]
    fn test_print_help_command_includes_globals() {
        let buffer = SharedBuffer::new();
        let mut flags = ClapFlags::new("test");
        flags.string("testflag", "testval", "A test flag");
        let mut app = MultiCommandApp::new(
            info(),
            Some(shared(flags)),
            buffer.clone().into(),
            buffer.clone().into(),
        );

        let mut command_flags = ClapFlags::new("testcommand");
        command_flags.parsed("testcommandflag", 5i64, "A test command flag");
        app.set_command(
            CommandInfo {
                name: "testcommand".into(),
                summary: "A test command".into(),
                usage: "args here...".into(),
            },
            noop,
            Some(shared(command_flags)),
        )
        .unwrap();

        app.print_help("testcommand");

        assert_eq!(
            buffer.contents(),
            format!(
                "Usage: test testcommand args here...\n\nA test command\n\nOptions:\n\n\
                 \x20 -h, --help\n    \tDisplay the help message\n\
                 \x20 --testcommandflag i64\n    \tA test command flag (default 5)\n\
                 \x20 --testflag string\n    \tA test flag (default \"testval\")\n\
                 \ntest vTest ({})\n",
                platform()
            )
        );
    }

    #[test]
    fn test_print_usage_variants() {
        let buffer = SharedBuffer::new();
        let mut app = app(&buffer);
        app.set_command(
            CommandInfo {
                name: "cmd".into(),
                usage: "test [opts]".into(),
                ..Default::default()
            },
            noop,
            None,
        )
        .unwrap();

        app.print_usage("cmd");
        app.print_usage("");
        app.print_usage("nope");

        assert_eq!(
            buffer.contents(),
            "Usage: test cmd test [opts]\nUsage: test testing\nUsage: test testing\n"
        );
    }

    #[test]
    fn test_print_usage_error_for_command() {
        let buffer = SharedBuffer::new();
        let mut app = app(&buffer);
        app.set_command(CommandInfo { name: "testcommand".into(), ..Default::default() }, noop, None)
            .unwrap();

        let err: BoxError = "test usage error".into();
        app.print_usage_error("testcommand", Some(err.as_ref()));

        assert_eq!(
            buffer.contents(),
            "Error: test usage error\n\nUsage: test testcommand [arguments ...]\n\n\
             Run 'test testcommand --help' for usage.\n"
        );
    }

    #[test]
    fn test_command_usage_hook() {
        let buffer = SharedBuffer::new();
        let mut app = app(&buffer);
        let flags = Arc::new(Mutex::new(ClapFlags::new("cmd")));
        app.set_command(CommandInfo { name: "cmd".into(), ..Default::default() }, noop, Some(flags.clone()))
            .unwrap();

        flags.lock().unwrap().usage();

        assert_eq!(
            buffer.contents(),
            "Usage: test cmd [arguments ...]\n\nRun 'test cmd --help' for usage.\n"
        );
    }
}
