//! # Appkit Container Errors
//!
//! Defines [`ContainerError`], the errors raised while registering factories
//! or resolving services from a [`Container`](crate::container::Container).
//! Every variant is fatal at the point it is raised: the container never
//! retries a failed resolution and never caches a failed construction.
use std::fmt;

use thiserror::Error;

use crate::container::identifier::ServiceId;

/// Key a lookup was performed with: a string identifier or a capability type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    /// Identifier-based lookup (`files::TagService`)
    Id(ServiceId),
    /// Capability/type-based lookup, keyed by the type name of the interface
    Type(&'static str),
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKey::Id(id) => write!(f, "{}", id),
            ServiceKey::Type(name) => write!(f, "<{}>", name),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Unknown service '{key}': no factory or instance was registered for it")]
    UnknownService { key: ServiceKey },

    #[error("Cyclic dependency while resolving '{key}': {}", format_chain(.chain))]
    CyclicDependency {
        key: ServiceKey,
        /// Resolution chain, outermost first, ending with the repeated key
        chain: Vec<ServiceKey>,
    },

    #[error("Service '{id}' is already registered and the registry is in strict mode")]
    DuplicateService { id: ServiceId },

    #[error("Service '{key}' does not have the requested type '{expected}'")]
    TypeMismatch {
        key: ServiceKey,
        expected: &'static str,
    },

    #[error("Container lock poisoned: {component}")]
    LockPoisoned {
        component: &'static str, // e.g. "registry", "instance_cache"
    },
}

fn format_chain(chain: &[ServiceKey]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ContainerError {
    /// Whether this error reports a lookup of an unregistered key.
    pub fn is_unknown_service(&self) -> bool {
        matches!(self, ContainerError::UnknownService { .. })
    }

    /// Whether this error reports a cyclic resolution.
    pub fn is_cyclic(&self) -> bool {
        matches!(self, ContainerError::CyclicDependency { .. })
    }
}
