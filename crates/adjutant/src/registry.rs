use std::collections::HashMap;

use crate::app::Executor;
use crate::flags::{FlagSet, FlagsHandle};
use crate::info::CommandInfo;

/// A registered command.
pub(crate) struct Command {
    pub info: CommandInfo,
    pub executor: Executor,
    pub flags: FlagSet,
}

/// Commands by name, remembering the order they were first registered in.
#[derive(Default)]
pub(crate) struct CommandRegistry {
    commands: HashMap<String, Command>,
    names: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `command`, replacing any command of the same name in place.
    pub fn insert(&mut self, command: Command) {
        let name = command.info.name.clone();
        if self.commands.insert(name.clone(), command).is_none() {
            self.names.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.commands.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> + '_ {
        self.names.iter().filter_map(|name| self.commands.get(name))
    }

    /// Whether any registered command already uses `flags`.
    pub fn contains_flags(&self, flags: &FlagsHandle) -> bool {
        self.commands
            .values()
            .any(|command| command.flags.is_same(flags))
    }
}
