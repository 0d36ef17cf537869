use std::fmt;
use std::sync::Arc;

use adjutant_common::mutex_lock_or_recover;
use tracing::{debug, trace};

use super::{
    same_flags, BoolValue, Flag, Flags, FlagsHandle, UsageFn, HELP_FLAG, HELP_SHORT, HELP_USAGE,
    VERSION_FLAG, VERSION_USAGE,
};
use crate::error::BoxError;
use crate::output::{Output, SharedBuffer};

/// Where a [`FlagSet`] sits in an app.
pub(crate) enum Scope<'a> {
    /// The app-wide flags. Gets `--version`.
    Global,
    /// A command's flags. Global flags are merged in.
    Command { globals: &'a FlagSet },
}

/// A flags collaborator together with the managed help/version switches the
/// app injected into it.
#[derive(Clone)]
pub(crate) struct FlagSet {
    flags: FlagsHandle,
    requested_help: Arc<BoolValue>,
    requested_version: Arc<BoolValue>,
}

impl FlagSet {
    pub(crate) fn new(flags: FlagsHandle) -> Self {
        Self {
            flags,
            requested_help: BoolValue::new(false),
            requested_version: BoolValue::new(false),
        }
    }

    pub(crate) fn handle(&self) -> &FlagsHandle {
        &self.flags
    }

    pub(crate) fn is_same(&self, other: &FlagsHandle) -> bool {
        same_flags(&self.flags, other)
    }

    /// Prepares the collaborator: routes its output to `errors`, injects the
    /// managed flags and binds `usage`.
    pub(crate) fn setup(&self, errors: &Output, scope: Scope<'_>, usage: UsageFn) {
        // Collected before locking our own flags; the global handle may be
        // borrowed elsewhere but never while this lock is held.
        let inherited = match scope {
            Scope::Global => None,
            Scope::Command { globals } => Some(globals.collect()),
        };

        let mut flags = mutex_lock_or_recover(&self.flags);
        flags.set_output(errors.clone());

        register_help(&mut *flags, &self.requested_help);
        match inherited {
            None => register_version(&mut *flags, &self.requested_version),
            Some(globals) => merge(&mut *flags, globals),
        }

        flags.set_usage(usage);
    }

    fn collect(&self) -> Vec<Flag> {
        let flags = mutex_lock_or_recover(&self.flags);
        let mut collected = Vec::new();
        if let Some(visitor) = flags.as_visit_all_flagger() {
            visitor.visit_all(&mut |flag| collected.push(flag.clone()));
        }
        collected
    }

    /// Parses `arguments` with the collaborator's own output silenced; the
    /// app reports errors itself.
    pub(crate) fn parse(&self, arguments: &[String]) -> Result<(), BoxError> {
        let mut flags = mutex_lock_or_recover(&self.flags);
        let previous = flags.output();
        flags.set_output(Output::discard());
        let result = flags.parse(arguments);
        flags.set_output(previous);
        result
    }

    pub(crate) fn args(&self) -> Vec<String> {
        mutex_lock_or_recover(&self.flags).args()
    }

    pub(crate) fn requested_help(&self) -> bool {
        self.requested_help.value()
    }

    pub(crate) fn requested_version(&self) -> bool {
        self.requested_version.value()
    }

    /// The collaborator's defaults listing, captured as text.
    pub(crate) fn defaults(&self) -> String {
        let buffer = SharedBuffer::new();
        let mut flags = mutex_lock_or_recover(&self.flags);
        let previous = flags.output();
        flags.set_output(buffer.clone().into());
        flags.print_defaults();
        flags.set_output(previous);
        buffer.contents()
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSet")
            .field("requested_help", &self.requested_help.value())
            .field("requested_version", &self.requested_version.value())
            .finish_non_exhaustive()
    }
}

fn defines(flags: &mut dyn Flags, name: &str) -> bool {
    flags
        .as_lookup_var_flagger()
        .map(|lookup| lookup.lookup(name).is_some())
        .unwrap_or(false)
}

fn register_help(flags: &mut dyn Flags, value: &Arc<BoolValue>) {
    if defines(flags, HELP_FLAG) {
        debug!("Flags define their own help; skipping managed --help");
        return;
    }

    if let Some(flagger) = flags.as_short_bool_flagger() {
        flagger.bool_var_short(value.clone(), HELP_FLAG, HELP_SHORT, HELP_USAGE);
    } else if let Some(flagger) = flags.as_bool_flagger() {
        flagger.bool_var(value.clone(), HELP_FLAG, HELP_USAGE);
    }
}

fn register_version(flags: &mut dyn Flags, value: &Arc<BoolValue>) {
    if defines(flags, VERSION_FLAG) {
        debug!("Flags define their own version; skipping managed --version");
        return;
    }

    if let Some(flagger) = flags.as_bool_flagger() {
        flagger.bool_var(value.clone(), VERSION_FLAG, VERSION_USAGE);
    }
}

fn merge(flags: &mut dyn Flags, globals: Vec<Flag>) {
    let Some(local) = flags.as_lookup_var_flagger() else {
        return;
    };

    for flag in globals {
        if flag.name == VERSION_FLAG || local.lookup(&flag.name).is_some() {
            continue;
        }
        trace!(flag = %flag.name, "Merging global flag into command scope");
        local.var(flag);
    }
}
