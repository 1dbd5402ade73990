use std::sync::Arc;

use crate::config::ConfigData;
use crate::container::{Container, RegistrationPolicy, ServiceRegistry, ValueFactory};
use crate::kernel::constants;
use crate::kernel::error::Result;

/// Generic app base: owns the app id, its init params, and the app
/// container whose namespace is the app id.
///
/// The app container is created with the built-in services
/// [`constants::APP_NAME_SERVICE`] (the app id, as `String`) and
/// [`constants::INIT_PARAMS_SERVICE`] (the init params, as [`ConfigData`]).
#[derive(Debug)]
pub struct App {
    app_id: String,
    params: ConfigData,
    registry: Arc<ServiceRegistry>,
    container: Arc<Container>,
}

impl App {
    /// Create a standalone app whose container has no parent.
    pub fn new(app_id: &str, params: ConfigData) -> Result<Self> {
        let registry = Arc::new(ServiceRegistry::new(app_id));
        let container = Arc::new(Container::new(registry.clone()));
        Self::assemble(app_id, params, registry, container)
    }

    /// Create an app whose container falls back to `server` for lookups it
    /// cannot satisfy itself.
    pub fn with_server(
        app_id: &str,
        params: ConfigData,
        policy: RegistrationPolicy,
        server: Arc<Container>,
    ) -> Result<Self> {
        let registry = Arc::new(ServiceRegistry::with_policy(app_id, policy));
        let container = Arc::new(Container::with_parent(registry.clone(), server));
        Self::assemble(app_id, params, registry, container)
    }

    fn assemble(
        app_id: &str,
        params: ConfigData,
        registry: Arc<ServiceRegistry>,
        container: Arc<Container>,
    ) -> Result<Self> {
        // Built-ins go in before any app factory, so strict mode reports an
        // app redefining them.
        registry.register_factory(constants::APP_NAME_SERVICE, ValueFactory(app_id.to_string()))?;
        registry.register_factory(constants::INIT_PARAMS_SERVICE, ValueFactory(params.clone()))?;
        Ok(Self {
            app_id: app_id.to_string(),
            params,
            registry,
            container,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn params(&self) -> &ConfigData {
        &self.params
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// A new request scope over this app's registry.
    pub fn request_scope(&self) -> Container {
        self.container.scope()
    }
}
