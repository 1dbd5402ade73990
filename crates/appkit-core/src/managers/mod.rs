//! # Appkit Host Managers
//!
//! Host-wide singletons that apps register types with during boot. Each is a
//! trait (the contract apps code against) plus an in-memory default the
//! [`Host`](crate::kernel::Host) installs in its server container.
//!
//! - **[`provider`]**: [`ProviderManager`] for collaboration resource providers.
//! - **[`notification`]**: [`NotificationManager`] for notifier services.
//! - **[`capabilities`]**: [`CapabilitiesManager`], the capability table
//!   filled during registration and merged on discovery.
//! - **[`scripts`]**: [`ScriptManager`] for frontend scripts requested by
//!   listeners.
pub mod capabilities;
pub mod notification;
pub mod provider;
pub mod scripts;

pub use capabilities::{CapabilitiesManager, Capability, CapabilityDescriptor};
pub use notification::{DefaultNotificationManager, NotificationManager, Notifier, NotifierDescriptor};
pub use provider::{DefaultProviderManager, Invalidation, ProviderDescriptor, ProviderManager, ResourceProvider};
pub use scripts::{DefaultScriptManager, ScriptManager};
