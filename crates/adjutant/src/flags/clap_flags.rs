//! The default flags collaborator, built on `clap`.

use std::sync::Arc;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};
use thiserror::Error;
use tracing::warn;

use super::{
    BoolFlagger, BoolValue, Flag, Flags, LookupVarFlagger, ParsedValue, ShortBoolFlagger,
    StringValue, UsageFn, VisitAllFlagger,
};
use crate::error::BoxError;
use crate::output::Output;

const REMAINING_ARGS: &str = "__adjutant_remaining_args";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagsError {
    /// clap rejected the arguments; holds clap's one-line message.
    #[error("{0}")]
    Parse(String),

    #[error("invalid value {value:?} for flag --{flag}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },
}

impl From<clap::Error> for FlagsError {
    fn from(err: clap::Error) -> Self {
        let rendered = err.to_string();
        let first_line = rendered.lines().next().unwrap_or_default();
        let message = first_line.strip_prefix("error: ").unwrap_or(first_line);
        FlagsError::Parse(message.trim().to_string())
    }
}

/// Flags parsed with `clap`.
///
/// Flags are long options (`--name value`, `--name=value`, boolean
/// `--name`), optionally with a short alias. Parsing stops at the first
/// positional argument or at `--`; everything from there on is returned by
/// [`Flags::args`]. A flag given more than once keeps its last value.
pub struct ClapFlags {
    command: Command,
    flags: Vec<Flag>,
    remaining: Vec<String>,
    output: Output,
    usage: Option<UsageFn>,
}

impl ClapFlags {
    pub fn new(name: impl Into<String>) -> Self {
        let command = Command::new(name.into())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .args_override_self(true)
            .color(ColorChoice::Never)
            .arg(
                Arg::new(REMAINING_ARGS)
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .action(ArgAction::Append)
                    .hide(true),
            );

        Self {
            command,
            flags: Vec::new(),
            remaining: Vec::new(),
            output: Output::stderr(),
            usage: None,
        }
    }

    pub fn name(&self) -> &str {
        self.command.get_name()
    }

    /// Defines a boolean flag and returns its value handle.
    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> Arc<BoolValue> {
        let value = BoolValue::new(default);
        self.define(Flag::new(name, usage, value.clone()));
        value
    }

    /// Defines a string flag and returns its value handle.
    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> Arc<StringValue> {
        let value = StringValue::new(default);
        self.define(Flag::new(name, usage, value.clone()));
        value
    }

    /// Defines a flag parsed with [`std::str::FromStr`].
    pub fn parsed<T>(&mut self, name: &str, default: T, usage: &str) -> Arc<ParsedValue<T>>
    where
        T: std::str::FromStr + std::fmt::Display + Clone + Send + 'static,
        T::Err: std::fmt::Display,
    {
        let value = ParsedValue::new(default);
        self.define(Flag::new(name, usage, value.clone()));
        value
    }

    /// Calls the bound usage hook, if any.
    pub fn usage(&self) {
        if let Some(usage) = &self.usage {
            usage();
        }
    }

    fn find(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    fn short_taken(&self, short: char) -> bool {
        self.flags.iter().any(|flag| flag.short == Some(short))
    }

    fn define(&mut self, mut flag: Flag) {
        if self.find(&flag.name).is_some() || flag.name == REMAINING_ARGS {
            warn!(flag = %flag.name, command = %self.name(), "Flag already defined; keeping the existing definition");
            return;
        }
        if let Some(short) = flag.short {
            if self.short_taken(short) {
                warn!(flag = %flag.name, short = %short, "Short alias already taken; defining long form only");
                flag.short = None;
            }
        }

        let command = std::mem::take(&mut self.command);
        self.command = command.arg(to_arg(&flag));
        self.flags.push(flag);
    }

    fn apply(&self, matches: &ArgMatches) -> Result<(), FlagsError> {
        for flag in &self.flags {
            if matches.value_source(&flag.name) != Some(ValueSource::CommandLine) {
                continue;
            }

            let raw = if flag.value.is_bool() {
                "true".to_string()
            } else {
                match matches.get_one::<String>(&flag.name) {
                    Some(raw) => raw.clone(),
                    None => continue,
                }
            };

            flag.value
                .set(&raw)
                .map_err(|reason| FlagsError::InvalidValue {
                    flag: flag.name.clone(),
                    value: raw.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    fn sorted(&self) -> Vec<&Flag> {
        let mut flags: Vec<&Flag> = self.flags.iter().collect();
        flags.sort_by(|a, b| a.name.cmp(&b.name));
        flags
    }
}

fn to_arg(flag: &Flag) -> Arg {
    let mut arg = Arg::new(flag.name.clone())
        .long(flag.name.clone())
        .help(flag.usage.clone());

    if let Some(short) = flag.short {
        arg = arg.short(short);
    }

    if flag.value.is_bool() {
        arg.action(ArgAction::SetTrue)
    } else {
        arg.action(ArgAction::Set)
            .num_args(1)
            .allow_hyphen_values(true)
    }
}

fn describe(flag: &Flag) -> String {
    let mut line = match flag.short {
        Some(short) => format!("  -{}, --{}", short, flag.name),
        None => format!("  --{}", flag.name),
    };

    let is_bool = flag.value.is_bool();
    if !is_bool {
        line.push(' ');
        line.push_str(flag.value.type_name());
    }

    line.push_str("\n    \t");
    line.push_str(&flag.usage);

    let show_default = if is_bool {
        flag.default_value == "true"
    } else {
        !flag.default_value.is_empty()
    };
    if show_default {
        if flag.value.type_name() == "string" {
            line.push_str(&format!(" (default {:?})", flag.default_value));
        } else {
            line.push_str(&format!(" (default {})", flag.default_value));
        }
    }

    line.push('\n');
    line
}

impl Flags for ClapFlags {
    fn parse(&mut self, arguments: &[String]) -> Result<(), BoxError> {
        let matches = self
            .command
            .try_get_matches_from_mut(arguments.iter())
            .map_err(FlagsError::from)?;

        self.apply(&matches)?;
        self.remaining = matches
            .get_many::<String>(REMAINING_ARGS)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Ok(())
    }

    fn args(&self) -> Vec<String> {
        self.remaining.clone()
    }

    fn print_defaults(&self) {
        let text: String = self.sorted().into_iter().map(describe).collect();
        self.output.print(&text);
    }

    fn output(&self) -> Output {
        self.output.clone()
    }

    fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    fn set_usage(&mut self, usage: UsageFn) {
        self.usage = Some(usage);
    }

    fn as_bool_flagger(&mut self) -> Option<&mut dyn BoolFlagger> {
        Some(self)
    }

    fn as_short_bool_flagger(&mut self) -> Option<&mut dyn ShortBoolFlagger> {
        Some(self)
    }

    fn as_lookup_var_flagger(&mut self) -> Option<&mut dyn LookupVarFlagger> {
        Some(self)
    }

    fn as_visit_all_flagger(&self) -> Option<&dyn VisitAllFlagger> {
        Some(self)
    }
}

impl BoolFlagger for ClapFlags {
    fn bool_var(&mut self, value: Arc<BoolValue>, name: &str, usage: &str) {
        self.define(Flag::new(name, usage, value));
    }
}

impl ShortBoolFlagger for ClapFlags {
    fn bool_var_short(&mut self, value: Arc<BoolValue>, name: &str, short: char, usage: &str) {
        self.define(Flag::new(name, usage, value).with_short(short));
    }
}

impl LookupVarFlagger for ClapFlags {
    fn lookup(&self, name: &str) -> Option<Flag> {
        self.find(name).cloned()
    }

    fn var(&mut self, flag: Flag) {
        self.define(flag);
    }
}

impl VisitAllFlagger for ClapFlags {
    fn visit_all(&self, visit: &mut dyn FnMut(&Flag)) {
        for flag in self.sorted() {
            visit(flag);
        }
    }
}
