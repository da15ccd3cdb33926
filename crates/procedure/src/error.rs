//! Error types for the procedure engine
//!
//! Two layers:
//! - [`ProcessError`] is what a process or expander returns. It separates
//!   expected precondition failures (`CheckFailed`) from everything else.
//! - [`Error`] is what the executor returns. It names the origin of the
//!   failure and the phase it happened in, so the runner can map it to a
//!   terminal status without inspecting error messages.

use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Boxed error kept as the source of an unexpected failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One of the three phases of a procedure run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Check,
    Execute,
    Revert,
}

impl Phase {
    /// Lowercase name used in logs and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Execute => "execute",
            Self::Revert => "revert",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a process or an expander
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Preconditions are not met; each entry is a human-readable violation
    #[error("checks failed: {}", .violations.join("; "))]
    CheckFailed { violations: Vec<String> },

    /// Anything else
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProcessError {
    /// Build a `CheckFailed` error from a list of violations
    pub fn check_failed<I, S>(violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::CheckFailed {
            violations: violations.into_iter().map(Into::into).collect(),
        }
    }

    /// Violation list, if this is a check failure
    pub fn violations(&self) -> Option<&[String]> {
        match self {
            Self::CheckFailed { violations } => Some(violations),
            Self::Other(_) => None,
        }
    }
}

/// Errors produced by the executor
#[derive(Debug, Error)]
pub enum Error {
    /// A process (or hook) reported unmet preconditions
    #[error("{origin} failed its checks: {}", .violations.join("; "))]
    CheckFailed {
        origin: String,
        violations: Vec<String>,
    },

    /// A process (or hook) returned an unexpected error
    #[error("{origin} failed during {phase}: {message}")]
    Unexpected {
        origin: String,
        phase: Phase,
        message: String,
        #[source]
        source: BoxError,
    },

    /// A process (or hook) panicked
    #[error("{origin} panicked during {phase}: {message}")]
    Panicked {
        origin: String,
        phase: Phase,
        message: String,
    },

    /// One or more compensations failed during the revert sweep
    #[error("revert failed for {}", describe_failures(.failures))]
    Revert { failures: Vec<Error> },
}

impl Error {
    /// Wrap an unexpected error, keeping the full context chain in the message
    pub fn unexpected(origin: impl Into<String>, phase: Phase, err: anyhow::Error) -> Self {
        Self::Unexpected {
            origin: origin.into(),
            phase,
            message: format!("{err:#}"),
            source: err.into(),
        }
    }

    /// Convert a panic payload into an error
    pub(crate) fn panicked(
        origin: impl Into<String>,
        phase: Phase,
        payload: &(dyn Any + Send),
    ) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Self::Panicked {
            origin: origin.into(),
            phase,
            message,
        }
    }

    /// Attach an origin to a process error
    pub(crate) fn from_process(origin: impl Into<String>, phase: Phase, err: ProcessError) -> Self {
        match err {
            ProcessError::CheckFailed { violations } => Self::CheckFailed {
                origin: origin.into(),
                violations,
            },
            ProcessError::Other(err) => Self::unexpected(origin, phase, err),
        }
    }

    /// Whether this is an expected precondition failure
    pub fn is_check_failed(&self) -> bool {
        matches!(self, Self::CheckFailed { .. })
    }

    /// Violation list for `CheckFailed`, empty otherwise
    pub fn violations(&self) -> &[String] {
        match self {
            Self::CheckFailed { violations, .. } => violations,
            _ => &[],
        }
    }

    /// Individual failures of a revert sweep, empty for other variants
    pub fn revert_failures(&self) -> &[Error] {
        match self {
            Self::Revert { failures } => failures,
            _ => &[],
        }
    }

    /// Name of the process or hook that failed, if there is a single one
    pub fn origin(&self) -> Option<&str> {
        match self {
            Self::CheckFailed { origin, .. }
            | Self::Unexpected { origin, .. }
            | Self::Panicked { origin, .. } => Some(origin),
            Self::Revert { .. } => None,
        }
    }
}

fn describe_failures(failures: &[Error]) -> String {
    let origins: Vec<&str> = failures.iter().filter_map(Error::origin).collect();
    match origins.len() {
        0 => "no process".to_string(),
        1 => origins[0].to_string(),
        n => format!("{n} processes ({})", origins.join(", ")),
    }
}

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
