//! # Appkit Event System Errors
//!
//! Defines [`EventSystemError`], raised when a lazily bound listener cannot
//! be built at dispatch time or when several subscribers fail on one event.
use thiserror::Error;

use crate::kernel::error::{Error as KernelError, format_failures};

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("Failed to resolve listener '{listener}' for event '{event_name}': {reason}")]
    ListenerResolution {
        event_name: String,
        listener: &'static str,
        reason: String,
    },

    /// Several subscribers of one event failed; every subscriber still ran.
    #[error("Delivery of '{event_name}' failed for {} subscriber(s): {}", .failures.len(), format_failures(.failures))]
    DeliveryFailed {
        event_name: String,
        failures: Vec<(String, KernelError)>,
    },
}
