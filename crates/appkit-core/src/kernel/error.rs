//! # Appkit Kernel Errors
//!
//! Defines the top-level [`Error`] returned throughout `appkit-core`.
//!
//! Subsystem errors ([`ContainerError`], [`EventSystemError`],
//! [`ConfigError`]) convert into it with `?`. Lifecycle misuse is reported as
//! [`Error::InvalidPhase`]. None of these errors is retried or recovered from
//! inside the core; they propagate to the host, which decides whether to abort
//! startup.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::app::phase::LifecyclePhase;
use crate::config::ConfigError;
use crate::container::error::ContainerError;
use crate::event::error::EventSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Service registration or resolution failure
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// A lifecycle method was invoked out of order, or more than once.
    #[error("Invalid lifecycle phase for '{app_id}' during {operation}: expected {expected}, found {actual}")]
    InvalidPhase {
        app_id: String,
        operation: &'static str,
        expected: LifecyclePhase,
        actual: LifecyclePhase,
    },

    /// Several independent boot steps of one app failed.
    #[error("Boot of '{app_id}' failed in {} step(s): {}", .failures.len(), format_failures(.failures))]
    BootFailed {
        app_id: String,
        failures: Vec<(String, Error)>,
    },

    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("App '{app_id}' is not installed")]
    AppNotFound { app_id: String },

    #[error("App '{app_id}' is already installed")]
    DuplicateApp { app_id: String },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

pub(crate) fn format_failures(failures: &[(String, Error)]) -> String {
    failures
        .iter()
        .map(|(step, err)| format!("[{}] {}", step, err))
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// The container error at the root of this error, if any.
    pub fn as_container_error(&self) -> Option<&ContainerError> {
        match self {
            Error::Container(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_invalid_phase(&self) -> bool {
        matches!(self, Error::InvalidPhase { .. })
    }
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
