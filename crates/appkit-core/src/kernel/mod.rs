//! # Appkit Kernel
//!
//! The `kernel` module hosts apps: it owns the host (server) container with
//! the shared managers, the host declaration tables, and the installed
//! [`Application`](crate::app::Application)s, and it drives every app through
//! register and boot.
//!
//! ## Key Components:
//!
//! - **Host orchestration**: [`Host`](bootstrap::Host) in the `bootstrap`
//!   submodule.
//! - **Declaration tables**: [`HostTables`](tables::HostTables), where
//!   capabilities and event bindings accumulate during registration.
//! - **Core Constants**: names of built-in services and defaults, in `constants`.
//! - **Error Handling**: the crate-wide [`Error`](error::Error) and `Result`
//!   alias in `error`.
pub mod bootstrap;
pub mod constants;
pub mod error;
pub mod tables;

pub use bootstrap::Host;
pub use error::{Error, Result};
pub use tables::HostTables;
