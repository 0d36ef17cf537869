//! The flags collaborator boundary.
//!
//! Apps never parse arguments themselves. They drive an external flags object
//! through the minimal [`Flags`] trait and probe it for optional capabilities
//! (`as_*` methods). A capability a collaborator does not report is skipped:
//! no managed `--help`, no `--version`, or no global flag merging.

mod adapter;
mod clap_flags;
mod value;

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::BoxError;
use crate::output::Output;

pub(crate) use self::adapter::{FlagSet, Scope};
pub use self::clap_flags::{ClapFlags, FlagsError};
pub use self::value::{BoolValue, ParsedValue, StringValue, Value};

/// Name of the managed help flag.
pub const HELP_FLAG: &str = "help";
/// Short alias of the managed help flag, when the collaborator supports one.
pub const HELP_SHORT: char = 'h';
/// Name of the managed version flag (global scope only).
pub const VERSION_FLAG: &str = "version";

pub(crate) const HELP_USAGE: &str = "Display the help message";
pub(crate) const VERSION_USAGE: &str = "Display the application version";

/// Called by a collaborator that wants to show usage on its own.
pub type UsageFn = Arc<dyn Fn() + Send + Sync>;

/// A flags object shared between the app and the code that built it.
///
/// Identity is the allocation: two handles are the same flags exactly when
/// they point at the same object.
pub type FlagsHandle = Arc<Mutex<dyn Flags + Send>>;

/// Wraps a flags object into a [`FlagsHandle`].
pub fn shared<F: Flags + Send + 'static>(flags: F) -> FlagsHandle {
    Arc::new(Mutex::new(flags))
}

pub(crate) fn same_flags(a: &FlagsHandle, b: &FlagsHandle) -> bool {
    Arc::ptr_eq(a, b)
}

/// Minimal contract of a flags collaborator.
pub trait Flags {
    fn parse(&mut self, arguments: &[String]) -> Result<(), BoxError>;

    /// Positional arguments left over after the last `parse`.
    fn args(&self) -> Vec<String>;

    /// Writes flag descriptions and defaults to the configured output.
    fn print_defaults(&self);

    fn output(&self) -> Output;

    fn set_output(&mut self, output: Output);

    /// Binds the hook the collaborator calls to show usage. Optional.
    fn set_usage(&mut self, usage: UsageFn) {
        let _ = usage;
    }

    fn as_bool_flagger(&mut self) -> Option<&mut dyn BoolFlagger> {
        None
    }

    fn as_short_bool_flagger(&mut self) -> Option<&mut dyn ShortBoolFlagger> {
        None
    }

    fn as_lookup_var_flagger(&mut self) -> Option<&mut dyn LookupVarFlagger> {
        None
    }

    fn as_visit_all_flagger(&self) -> Option<&dyn VisitAllFlagger> {
        None
    }
}

/// Registers long-only boolean flags.
pub trait BoolFlagger {
    fn bool_var(&mut self, value: Arc<BoolValue>, name: &str, usage: &str);
}

/// Registers boolean flags with a one-character alias.
pub trait ShortBoolFlagger {
    fn bool_var_short(&mut self, value: Arc<BoolValue>, name: &str, short: char, usage: &str);
}

/// Looks up flags by name and registers arbitrary flag definitions.
pub trait LookupVarFlagger {
    fn lookup(&self, name: &str) -> Option<Flag>;
    fn var(&mut self, flag: Flag);
}

/// Enumerates every defined flag, in name order.
pub trait VisitAllFlagger {
    fn visit_all(&self, visit: &mut dyn FnMut(&Flag));
}

/// One flag definition.
///
/// Clones share `value`: a flag copied into another scope writes to the same
/// place as the original.
#[derive(Clone)]
pub struct Flag {
    pub name: String,
    pub short: Option<char>,
    pub usage: String,
    /// Text form of the value at definition time.
    pub default_value: String,
    pub value: Arc<dyn Value>,
}

impl Flag {
    pub fn new(name: impl Into<String>, usage: impl Into<String>, value: Arc<dyn Value>) -> Self {
        Self {
            name: name.into(),
            short: None,
            usage: usage.into(),
            default_value: value.get(),
            value,
        }
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }
}

impl PartialEq for Flag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.short == other.short
            && self.usage == other.usage
            && self.default_value == other.default_value
            && Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("short", &self.short)
            .field("usage", &self.usage)
            .field("default_value", &self.default_value)
            .field("value", &self.value.get())
            .finish()
    }
}
