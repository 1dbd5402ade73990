use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::app::{Application, BootContext, Bootstrap, LifecyclePhase};
use crate::config::{ConfigData, HostConfig};
use crate::container::{Container, ServiceRegistry};
use crate::event::{Event, EventDispatcher, EventResult};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::kernel::tables::HostTables;
use crate::managers::{
    CapabilitiesManager, DefaultNotificationManager, DefaultProviderManager, DefaultScriptManager,
    NotificationManager, ProviderManager, ScriptManager,
};

/// Host coordinating app modules.
///
/// The host container provides these capabilities to every app container:
/// [`EventDispatcher`], `dyn` [`ProviderManager`], `dyn`
/// [`NotificationManager`], `dyn` [`ScriptManager`] and
/// [`CapabilitiesManager`].
pub struct Host {
    config: HostConfig,
    server: Arc<Container>,
    tables: HostTables,
    dispatcher: Arc<EventDispatcher>,
    apps: Vec<Application>,
    wired: HashSet<String>,
}

impl Host {
    /// Creates a host with the default managers installed.
    pub fn new(config: HostConfig) -> Result<Self> {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);

        let registry = Arc::new(ServiceRegistry::with_policy(
            constants::HOST_NAMESPACE,
            config.registration_policy(),
        ));
        let server = Arc::new(Container::new(registry));
        let tables = HostTables::new();
        let dispatcher = Arc::new(EventDispatcher::new());

        server.provide::<EventDispatcher>(dispatcher.clone())?;
        server.provide::<dyn ProviderManager>(Arc::new(DefaultProviderManager::new()))?;
        server.provide::<dyn NotificationManager>(Arc::new(DefaultNotificationManager::new()))?;
        server.provide::<dyn ScriptManager>(Arc::new(DefaultScriptManager::new()))?;
        server.provide::<CapabilitiesManager>(tables.capabilities().clone())?;
        log::debug!("Host container ready (policy: {:?})", config.registration_policy());

        Ok(Self {
            config,
            server,
            tables,
            dispatcher,
            apps: Vec::new(),
            wired: HashSet::new(),
        })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn server_container(&self) -> &Arc<Container> {
        &self.server
    }

    pub fn tables(&self) -> &HostTables {
        &self.tables
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Install an app with the init params configured for it.
    pub fn install(&mut self, bootstrap: Box<dyn Bootstrap>) -> Result<()> {
        let params = self.config.app_params(bootstrap.app_id());
        self.install_with_params(bootstrap, params)
    }

    /// Install an app with explicit init params.
    pub fn install_with_params(&mut self, bootstrap: Box<dyn Bootstrap>, params: ConfigData) -> Result<()> {
        let app_id = bootstrap.app_id();
        if self.apps.iter().any(|a| a.app_id() == app_id) {
            return Err(Error::DuplicateApp { app_id: app_id.to_string() });
        }
        let app = Application::with_server(
            bootstrap,
            params,
            self.config.registration_policy(),
            self.server.clone(),
        )?;
        log::info!("Installed app '{}'", app.app_id());
        self.apps.push(app);
        Ok(())
    }

    /// Installed app ids, in install order.
    pub fn app_ids(&self) -> Vec<&str> {
        self.apps.iter().map(|a| a.app_id()).collect()
    }

    pub fn phase(&self, app_id: &str) -> Result<LifecyclePhase> {
        Ok(self.app(app_id)?.phase())
    }

    /// Run `register` for every app still in the constructed phase.
    pub fn register_apps(&mut self) -> Result<()> {
        for app in self
            .apps
            .iter_mut()
            .filter(|a| a.phase() == LifecyclePhase::Constructed)
        {
            app.register(&self.tables)?;
        }
        Ok(())
    }

    /// Wire each registered app's listener bindings into the dispatcher, then
    /// run its `boot`. Stops at the first app whose boot fails.
    pub async fn boot_apps(&mut self) -> Result<()> {
        for app in self
            .apps
            .iter_mut()
            .filter(|a| a.phase() == LifecyclePhase::Registered)
        {
            if self.wired.insert(app.app_id().to_string()) {
                for binding in self.tables.bindings_for(app.app_id()) {
                    self.dispatcher
                        .subscribe_binding(binding, app.container())
                        .await;
                }
            }
            let context = BootContext::new(app.container().clone(), self.server.clone());
            app.boot(&context).await?;
        }
        log::info!("All apps booted.");
        Ok(())
    }

    /// Register, then boot, every installed app.
    pub async fn start(&mut self) -> Result<()> {
        self.register_apps()?;
        self.boot_apps().await
    }

    pub fn app_container(&self, app_id: &str) -> Result<Arc<Container>> {
        Ok(self.app(app_id)?.container().clone())
    }

    /// A fresh request scope for `app_id`.
    pub fn request_scope(&self, app_id: &str) -> Result<Container> {
        Ok(self.app(app_id)?.app().request_scope())
    }

    /// Merged capability document of every registered capability, built
    /// through `container`.
    pub fn capabilities(&self, container: &Container) -> Result<Value> {
        self.tables.capabilities().collect(container)
    }

    pub async fn publish(&self, event: &dyn Event) -> Result<EventResult> {
        self.dispatcher.publish(event).await
    }

    fn app(&self, app_id: &str) -> Result<&Application> {
        self.apps
            .iter()
            .find(|a| a.app_id() == app_id)
            .ok_or_else(|| Error::AppNotFound { app_id: app_id.to_string() })
    }
}
