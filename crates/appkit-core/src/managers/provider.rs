use std::any::type_name;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::app::descriptor::Descriptor;
use crate::container::{Container, FromContainer};
use crate::kernel::error::Result;

/// A collaboration resource provider: turns resource ids of one type into
/// displayable rich objects.
pub trait ResourceProvider: Send + Sync {
    /// Resource type handled by this provider, e.g. `"file"`.
    fn resource_type(&self) -> &'static str;

    fn rich_object(&self, resource_id: &str) -> Result<Value>;
}

pub type ProviderDescriptor = Descriptor<dyn ResourceProvider>;

impl Descriptor<dyn ResourceProvider> {
    /// Describe resource provider type `P`.
    pub fn of<P: ResourceProvider + FromContainer>() -> Self {
        Descriptor::new(type_name::<P>(), |container: &Container| {
            let provider: Arc<dyn ResourceProvider> = Arc::new(P::from_container(container)?);
            Ok(provider)
        })
    }
}

/// Access cache invalidation requested through a [`ProviderManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Provider(String),
    User(String),
}

/// Host-side registry of collaboration resource providers.
pub trait ProviderManager: Send + Sync {
    fn register_resource_provider(&self, provider: ProviderDescriptor) -> Result<()>;

    /// Type names of the registered providers, in registration order.
    fn registered_providers(&self) -> Vec<&'static str>;

    /// Instantiate every registered provider through `container`.
    fn providers(&self, container: &Container) -> Result<Vec<Arc<dyn ResourceProvider>>>;

    fn invalidate_access_cache_for_provider(&self, resource_type: &str);

    fn invalidate_access_cache_for_user(&self, user_id: &str);
}

/// In-memory [`ProviderManager`].
#[derive(Debug, Default)]
pub struct DefaultProviderManager {
    providers: Mutex<Vec<ProviderDescriptor>>,
    invalidations: Mutex<Vec<Invalidation>>,
}

impl DefaultProviderManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidations requested so far, oldest first.
    pub fn invalidations(&self) -> Vec<Invalidation> {
        self.invalidations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProviderManager for DefaultProviderManager {
    fn register_resource_provider(&self, provider: ProviderDescriptor) -> Result<()> {
        let mut providers = self.providers.lock().unwrap_or_else(PoisonError::into_inner);
        if providers.iter().any(|p| p.type_name() == provider.type_name()) {
            log::debug!("Resource provider {} already registered", provider.type_name());
            return Ok(());
        }
        log::info!("Registered resource provider {}", provider.type_name());
        providers.push(provider);
        Ok(())
    }

    fn registered_providers(&self) -> Vec<&'static str> {
        self.providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|p| p.type_name())
            .collect()
    }

    fn providers(&self, container: &Container) -> Result<Vec<Arc<dyn ResourceProvider>>> {
        let descriptors = self
            .providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        descriptors.iter().map(|d| d.instantiate(container)).collect()
    }

    fn invalidate_access_cache_for_provider(&self, resource_type: &str) {
        log::debug!("Invalidating access cache for provider '{}'", resource_type);
        self.invalidations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Invalidation::Provider(resource_type.to_string()));
    }

    fn invalidate_access_cache_for_user(&self, user_id: &str) {
        log::debug!("Invalidating access cache for user '{}'", user_id);
        self.invalidations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Invalidation::User(user_id.to_string()));
    }
}
