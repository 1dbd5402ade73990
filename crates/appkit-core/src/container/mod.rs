//! # Appkit Service Container
//!
//! Lazy, memoizing service resolution.
//!
//! - **[`registry`]**: [`ServiceRegistry`], the per-namespace factory table.
//!   Registering never constructs anything; re-registration overwrites unless
//!   the registry is in [`RegistrationPolicy::Strict`] mode.
//! - **[`resolver`]**: [`Container`], a per-scope instance cache. The first
//!   resolution of an identifier invokes its factory with the container,
//!   later resolutions on the same container return the same `Arc`.
//!   Self-referential resolution fails with
//!   [`ContainerError::CyclicDependency`].
//! - **[`factory`]**: the [`ServiceFactory`] and [`FromContainer`] traits used
//!   to write named factories that receive their container explicitly.
//! - **[`identifier`]**: [`ServiceId`], the namespaced identifier type.
//! - **[`error`]**: [`ContainerError`] and [`ServiceKey`].
pub mod error;
pub mod factory;
pub mod identifier;
pub mod registry;
pub mod resolver;

pub use error::{ContainerError, ServiceKey};
pub use factory::{Constructor, FromContainer, Instance, ServiceFactory, ValueFactory, factory_fn};
pub use identifier::ServiceId;
pub use registry::{RegistrationPolicy, ServiceRegistry};
pub use resolver::Container;

// Test module declaration
#[cfg(test)]
mod tests;
