//! # Appkit App Lifecycle
//!
//! Everything an app module touches while it is brought up.
//!
//! - **[`lifecycle`]**: the [`Bootstrap`] trait app modules implement and the
//!   [`Application`] controller enforcing the
//!   `Constructed -> Registered -> Booted` state machine.
//! - **[`registration`]**: [`RegistrationContext`], the phase-1 declaration API.
//! - **[`boot`]**: [`BootContext`], read access to the app and host containers
//!   during phase 2, and [`BootSteps`] for running independent boot steps.
//! - **[`base`]**: [`App`], the app id, init params and app container.
//! - **[`descriptor`]**: [`Descriptor`], a constructible reference to an
//!   implementation type.
//! - **[`phase`]**: [`LifecyclePhase`].
pub mod base;
pub mod boot;
pub mod descriptor;
pub mod lifecycle;
pub mod phase;
pub mod registration;

pub use base::App;
pub use boot::{BootContext, BootSteps};
pub use descriptor::Descriptor;
pub use lifecycle::{Application, Bootstrap};
pub use phase::LifecyclePhase;
pub use registration::RegistrationContext;

// Test module declaration
#[cfg(test)]
mod tests;
