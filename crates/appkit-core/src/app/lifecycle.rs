use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::app::base::App;
use crate::app::boot::BootContext;
use crate::app::phase::LifecyclePhase;
use crate::app::registration::RegistrationContext;
use crate::config::ConfigData;
use crate::container::{Container, RegistrationPolicy};
use crate::kernel::error::{Error, Result};
use crate::kernel::tables::HostTables;

/// Core trait that all app modules implement.
#[async_trait]
pub trait Bootstrap: Send + Sync {
    /// The app id; also the namespace of every identifier the app registers.
    fn app_id(&self) -> &'static str;

    /// Declare factories, capabilities and listeners. Must not resolve
    /// anything.
    fn register(&self, context: &RegistrationContext<'_>) -> Result<()>;

    /// Perform boot-time registrations with live host services.
    async fn boot(&self, context: &BootContext) -> Result<()>;
}

/// Lifecycle controller for one app module.
///
/// Drives `Constructed -> register -> Registered -> boot -> Booted`. Each
/// transition happens exactly once; calling `register` or `boot` out of order
/// or a second time fails with [`Error::InvalidPhase`]. The phase advances
/// before the module's hook runs, so a failed hook is not retried.
pub struct Application {
    bootstrap: Box<dyn Bootstrap>,
    app: App,
    phase: LifecyclePhase,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("app_id", &self.app.app_id())
            .field("phase", &self.phase)
            .finish()
    }
}

impl Application {
    /// Construct a standalone app (its container has no host fallback).
    pub fn new(bootstrap: Box<dyn Bootstrap>, params: ConfigData) -> Result<Self> {
        let app = App::new(bootstrap.app_id(), params)?;
        Ok(Self::from_parts(bootstrap, app))
    }

    /// Construct an app whose container falls back to the host container.
    pub fn with_server(
        bootstrap: Box<dyn Bootstrap>,
        params: ConfigData,
        policy: RegistrationPolicy,
        server: Arc<Container>,
    ) -> Result<Self> {
        let app = App::with_server(bootstrap.app_id(), params, policy, server)?;
        Ok(Self::from_parts(bootstrap, app))
    }

    fn from_parts(bootstrap: Box<dyn Bootstrap>, app: App) -> Self {
        log::debug!("Constructed app '{}'", app.app_id());
        Self {
            bootstrap,
            app,
            phase: LifecyclePhase::Constructed,
        }
    }

    pub fn app_id(&self) -> &str {
        self.app.app_id()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn container(&self) -> &Arc<Container> {
        self.app.container()
    }

    /// Run the module's declarations against `tables`.
    pub fn register(&mut self, tables: &HostTables) -> Result<()> {
        self.advance("register", LifecyclePhase::Constructed)?;
        log::info!("Registering app '{}'", self.app.app_id());
        let context = RegistrationContext::new(&self.app, tables, self.phase);
        self.bootstrap.register(&context)
    }

    /// Run the module's boot hook.
    pub async fn boot(&mut self, context: &BootContext) -> Result<()> {
        self.advance("boot", LifecyclePhase::Registered)?;
        log::info!("Booting app '{}'", self.app.app_id());
        self.bootstrap.boot(context).await
    }

    /// Boot context over this app's container and its host container.
    ///
    /// A standalone app serves as its own host container.
    pub fn boot_context(&self) -> BootContext {
        let app_container = self.app.container().clone();
        let server = app_container
            .parent()
            .cloned()
            .unwrap_or_else(|| app_container.clone());
        BootContext::new(app_container, server)
    }

    fn advance(&mut self, operation: &'static str, expected: LifecyclePhase) -> Result<()> {
        if self.phase != expected {
            return Err(Error::InvalidPhase {
                app_id: self.app.app_id().to_string(),
                operation,
                expected,
                actual: self.phase,
            });
        }
        if let Some(next) = self.phase.next() {
            log::trace!("App '{}': {} -> {}", self.app.app_id(), self.phase, next);
            self.phase = next;
        }
        Ok(())
    }
}
