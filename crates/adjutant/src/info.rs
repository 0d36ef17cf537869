use std::path::Path;

/// Default usage string for commands and single-command apps.
pub const DEFAULT_COMMAND_USAGE: &str = "[arguments ...]";

/// Default usage string for apps with sub-commands.
pub const DEFAULT_PARENT_COMMAND_USAGE: &str = "<command> [arguments ...]";

/// Describes an app. Empty `name` and `usage` are filled in at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub summary: String,
    pub usage: String,
    pub version: String,
}

impl AppInfo {
    pub(crate) fn backfilled(mut self, default_usage: &str) -> Self {
        if self.name.is_empty() {
            self.name = infer_app_name();
        }
        if self.usage.is_empty() {
            self.usage = default_usage.to_string();
        }
        self
    }
}

/// Describes a command of a multi-command app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub summary: String,
    pub usage: String,
}

impl CommandInfo {
    pub(crate) fn backfilled(mut self) -> Self {
        if self.usage.is_empty() {
            self.usage = DEFAULT_COMMAND_USAGE.to_string();
        }
        self
    }
}

/// The program name from argv[0]: its file name without extension.
pub fn infer_app_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|argv0| {
            Path::new(&argv0)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "app".to_string())
}
