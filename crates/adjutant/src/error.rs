//! Error signals understood by the dispatcher.
//!
//! Callbacks return [`BoxError`]. Anywhere in an error's `source()` chain the
//! dispatcher looks for two orthogonal signals:
//!
//! - [`StatusCodeError`] overrides the exit code the error would otherwise get.
//! - [`HelpRequestedError`] makes the dispatcher print the active scope's help
//!   after the error message and exit with [`exit_codes::USAGE_ERROR`].
//!
//! The two compose in either nesting order. An error whose message is empty
//! prints no `Error:` line but still carries its signals.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Error type returned by command callbacks and init hooks.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Process exit codes returned by `run`.
pub mod exit_codes {
    /// The app ran successfully, or help/version was printed on request.
    pub const SUCCESS: i32 = 0;
    /// Default code for any reported error.
    pub const ERROR: i32 = 1;
    /// Malformed invocation: bad flags, missing command, or help redirection.
    pub const USAGE_ERROR: i32 = 2;
}

/// Errors raised while registering commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("provided flags are duplicate (command '{command}')")]
    DuplicateFlags { command: String },
}

/// An error carrying an explicit exit code.
///
/// Displays as the wrapped error, so `Error:` lines are unchanged by the code.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct StatusCodeError {
    source: BoxError,
    status_code: i32,
}

impl StatusCodeError {
    pub fn new(err: impl Into<BoxError>, status_code: i32) -> Self {
        Self {
            source: err.into(),
            status_code,
        }
    }

    pub fn status_code(&self) -> i32 {
        self.status_code
    }
}

/// Signals that the user should be shown help for the active scope.
///
/// The bare sentinel ([`HelpRequestedError::new`]) reads `help requested`;
/// the wrapping form ([`HelpRequestedError::wrap`]) reads as the wrapped error.
#[derive(Debug, Default)]
pub struct HelpRequestedError {
    source: Option<BoxError>,
}

impl HelpRequestedError {
    pub fn new() -> Self {
        Self { source: None }
    }

    pub fn wrap(err: impl Into<BoxError>) -> Self {
        Self {
            source: Some(err.into()),
        }
    }
}

impl fmt::Display for HelpRequestedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => fmt::Display::fmt(source, f),
            None => f.write_str("help requested"),
        }
    }
}

impl StdError for HelpRequestedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// Returned by [`Context::err`](crate::Context::err) once the context is
/// cancelled. A callback error carrying it is treated as a clean exit.
#[derive(Error, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[error("context canceled")]
pub struct Canceled;

/// Attaches dispatcher signals to any error.
pub trait ErrorSignalExt {
    fn with_status_code(self, status_code: i32) -> StatusCodeError;
    fn with_help_requested(self) -> HelpRequestedError;
}

impl<E: Into<BoxError>> ErrorSignalExt for E {
    fn with_status_code(self, status_code: i32) -> StatusCodeError {
        StatusCodeError::new(self, status_code)
    }

    fn with_help_requested(self) -> HelpRequestedError {
        HelpRequestedError::wrap(self)
    }
}

/// Signals found by walking an error's source chain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    /// Outermost status code in the chain.
    pub status_code: Option<i32>,
    pub help_requested: bool,
    pub canceled: bool,
}

impl Signals {
    pub fn inspect(err: &(dyn StdError + 'static)) -> Self {
        let mut signals = Self::default();
        let mut current = Some(err);

        while let Some(err) = current {
            if let Some(status) = err.downcast_ref::<StatusCodeError>() {
                signals.status_code.get_or_insert(status.status_code());
            }
            if err.is::<HelpRequestedError>() {
                signals.help_requested = true;
            }
            if err.is::<Canceled>() {
                signals.canceled = true;
            }
            current = err.source();
        }

        signals
    }

    /// The exit code for an error with these signals.
    pub fn exit_code(&self) -> i32 {
        let default = if self.help_requested {
            exit_codes::USAGE_ERROR
        } else {
            exit_codes::ERROR
        };

        self.status_code.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, Debug)]
    #[error("loading config")]
    struct ConfigError {
        #[source]
        cause: BoxError,
    }

    fn inspect(err: &BoxError) -> Signals {
        Signals::inspect(err.as_ref())
    }

    #[test]
    fn test_status_code_error_keeps_message() {
        let err = StatusCodeError::new("test error", 107);
        assert_eq!(err.to_string(), "test error");
        assert_eq!(err.status_code(), 107);
        assert_eq!(err.source().unwrap().to_string(), "test error");
    }

    #[test]
    fn test_help_requested_sentinel_message() {
        assert_eq!(HelpRequestedError::new().to_string(), "help requested");
        assert!(HelpRequestedError::new().source().is_none());
    }

    #[test]
    fn test_help_requested_wrap_keeps_message() {
        let err = HelpRequestedError::wrap("test error");
        assert_eq!(err.to_string(), "test error");
        assert_eq!(err.source().unwrap().to_string(), "test error");
    }

    #[test]
    fn test_plain_error_has_no_signals() {
        let err: BoxError = "boom".into();
        let signals = inspect(&err);
        assert_eq!(signals, Signals::default());
        assert_eq!(signals.exit_code(), exit_codes::ERROR);
    }

    #[test]
    fn test_help_requested_defaults_to_usage_error() {
        let err: BoxError = "need args".with_help_requested().into();
        let signals = inspect(&err);
        assert!(signals.help_requested);
        assert_eq!(signals.exit_code(), exit_codes::USAGE_ERROR);
    }

    #[test]
    fn test_status_code_wins_in_either_order() {
        let outer_help: BoxError = "x".with_status_code(217).with_help_requested().into();
        let outer_status: BoxError = "x".with_help_requested().with_status_code(217).into();

        for err in [outer_help, outer_status] {
            let signals = inspect(&err);
            assert!(signals.help_requested);
            assert_eq!(signals.exit_code(), 217);
        }
    }

    #[test]
    fn test_outermost_status_code_wins() {
        let err: BoxError = "x".with_status_code(3).with_status_code(4).into();
        assert_eq!(inspect(&err).status_code, Some(4));
    }

    #[test]
    fn test_signals_found_through_foreign_wrappers() {
        let err: BoxError = Box::new(ConfigError {
            cause: Box::new(Canceled),
        });
        assert!(inspect(&err).canceled);

        let err: BoxError = Box::new(ConfigError {
            cause: "bad".with_status_code(9).into(),
        });
        assert_eq!(inspect(&err).exit_code(), 9);
    }

    #[test]
    fn test_empty_message_survives_wrapping() {
        let err = "".with_help_requested().with_status_code(101);
        assert_eq!(err.to_string(), "");
    }

    #[test]
    fn test_registration_error_message() {
        let err = RegistrationError::DuplicateFlags {
            command: "foo".into(),
        };
        assert_eq!(
            err.to_string(),
            "provided flags are duplicate (command 'foo')"
        );
    }
}
