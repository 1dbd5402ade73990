pub mod app;
pub mod config;
pub mod container;
pub mod event;
pub mod kernel;
pub mod managers;

// Re-export key public types/traits for use by the binary and app modules
pub use app::{Application, BootContext, BootSteps, Bootstrap, LifecyclePhase, RegistrationContext};
pub use config::{ConfigData, HostConfig};
pub use container::{Container, ContainerError, FromContainer, ServiceFactory, ServiceId};
pub use event::{Event, EventDispatcher, EventListener, EventResult};
pub use kernel::Host;
pub use kernel::error::{Error, Result};

#[cfg(test)]
mod tests;
