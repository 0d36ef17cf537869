//! Text builders for usage, help, version and error output.
//!
//! Everything here returns a `String`; the apps decide which sink it goes to.

use std::fmt::Write as _;

/// `Usage: <name> <usage>`
pub(crate) fn usage_line(name: &str, usage: &str) -> String {
    format!("Usage: {} {}\n", name, usage)
}

/// `<name>[ <version>] (<os>/<arch>)`
pub(crate) fn version_line(name: &str, version: &str) -> String {
    let mut identifier = name.to_string();
    if !version.is_empty() {
        identifier.push(' ');
        identifier.push_str(version);
    }
    format!(
        "{} ({}/{})\n",
        identifier,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// `Error: <message>`, or nothing for an empty message.
pub(crate) fn error_line(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!("Error: {}\n", message)
    }
}

pub(crate) fn usage_error(message: &str, usage_line: &str, full_name: &str) -> String {
    let mut text = error_line(message);
    if !text.is_empty() {
        text.push('\n');
    }
    text.push_str(usage_line);
    let _ = write!(text, "\nRun '{} --help' for usage.\n", full_name);
    text
}

/// One row of the top-level command listing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CommandRow<'a> {
    pub name: &'a str,
    pub summary: &'a str,
}

/// Parts of a full help screen.
#[derive(Debug, Default)]
pub(crate) struct Help<'a> {
    pub usage_line: String,
    pub summary: &'a str,
    /// Present only for the top level of a multi-command app.
    pub commands: Option<Vec<CommandRow<'a>>>,
    /// Captured flag defaults; empty means no options section.
    pub defaults: String,
    pub version_line: String,
}

impl Help<'_> {
    pub(crate) fn render(&self) -> String {
        let mut text = self.usage_line.clone();

        if !self.summary.is_empty() {
            let _ = write!(text, "\n{}\n", self.summary);
        }

        if let Some(rows) = &self.commands {
            text.push_str(&commands_section(rows));
        }

        if !self.defaults.is_empty() {
            text.push_str("\nOptions:\n\n");
            text.push_str(&self.defaults);
        }

        text.push('\n');
        text.push_str(&self.version_line);
        text
    }
}

fn commands_section(rows: &[CommandRow<'_>]) -> String {
    let width = rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut text = String::from("\nCommands:\n\n");
    for row in rows {
        let _ = writeln!(text, "\t{:<width$}\t{}", row.name, row.summary, width = width);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> String {
        format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
    }

    #[test]
    fn test_usage_line() {
        assert_eq!(usage_line("test", "testing"), "Usage: test testing\n");
        assert_eq!(
            usage_line("test cmd", "[arguments ...]"),
            "Usage: test cmd [arguments ...]\n"
        );
    }

    #[test]
    fn test_version_line() {
        assert_eq!(
            version_line("test", "vTest"),
            format!("test vTest ({})\n", platform())
        );
        assert_eq!(version_line("test", ""), format!("test ({})\n", platform()));
    }

    #[test]
    fn test_usage_error() {
        assert_eq!(
            usage_error("test usage error", "Usage: test testing\n", "test"),
            "Error: test usage error\n\nUsage: test testing\n\nRun 'test --help' for usage.\n"
        );
    }

    #[test]
    fn test_usage_error_without_message() {
        assert_eq!(
            usage_error("", "Usage: test cmd x\n", "test cmd"),
            "Usage: test cmd x\n\nRun 'test cmd --help' for usage.\n"
        );
    }

    #[test]
    fn test_help_minimal() {
        let help = Help {
            usage_line: usage_line("test", "testing"),
            version_line: version_line("test", ""),
            ..Default::default()
        };
        assert_eq!(
            help.render(),
            format!("Usage: test testing\n\ntest ({})\n", platform())
        );
    }

    #[test]
    fn test_help_with_summary_and_options() {
        let help = Help {
            usage_line: usage_line("test", "testing"),
            summary: "A test",
            defaults: "  --x\n    \tx flag\n".into(),
            version_line: version_line("test", "vTest"),
            ..Default::default()
        };
        assert_eq!(
            help.render(),
            format!(
                "Usage: test testing\n\nA test\n\nOptions:\n\n  --x\n    \tx flag\n\ntest vTest ({})\n",
                platform()
            )
        );
    }

    #[test]
    fn test_command_rows_are_aligned_in_given_order() {
        let rows = [
            CommandRow { name: "a", summary: "Short summary" },
            CommandRow { name: "longer", summary: "Another summary" },
            CommandRow { name: "much-longer-command", summary: "Yet another summary" },
            CommandRow { name: "zzz", summary: "Last summary" },
        ];
        assert_eq!(
            commands_section(&rows),
            "\nCommands:\n\n\
             \ta                  \tShort summary\n\
             \tlonger             \tAnother summary\n\
             \tmuch-longer-command\tYet another summary\n\
             \tzzz                \tLast summary\n"
        );
    }

    #[test]
    fn test_empty_command_listing_keeps_header() {
        let help = Help {
            usage_line: usage_line("test", "testing"),
            commands: Some(Vec::new()),
            version_line: version_line("test", ""),
            ..Default::default()
        };
        assert!(help.render().contains("\nCommands:\n\n\ntest ("));
    }
}
