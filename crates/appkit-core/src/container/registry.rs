use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::container::Container;
use crate::container::error::ContainerError;
use crate::container::factory::{ErasedFactory, Factory, ServiceFactory, TypedFactory};
use crate::container::identifier::ServiceId;
use crate::kernel::error::Result;

/// What happens when a factory is registered under an identifier that
/// already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationPolicy {
    /// Last registration wins; the earlier factory is dropped silently.
    #[default]
    Overwrite,
    /// Re-registration fails with [`ContainerError::DuplicateService`].
    Strict,
}

impl RegistrationPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            RegistrationPolicy::Strict
        } else {
            RegistrationPolicy::Overwrite
        }
    }
}

/// Factory table for one namespace.
///
/// Holds identifier-keyed factories and capability factories keyed by the
/// [`TypeId`] of the interface they produce. Registration never evaluates a
/// factory; instances are built and cached by a [`Container`] on first
/// resolution. The registry is shared (`Arc<ServiceRegistry>`) between every
/// container scope created for the namespace.
pub struct ServiceRegistry {
    namespace: String,
    policy: RegistrationPolicy,
    factories: RwLock<HashMap<ServiceId, Arc<dyn Factory>>>,
    typed: RwLock<HashMap<TypeId, (&'static str, Arc<dyn Factory>)>>,
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let factory_count = self.factories.read().map(|m| m.len()).unwrap_or(0);
        let typed_count = self.typed.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("ServiceRegistry")
            .field("namespace", &self.namespace)
            .field("policy", &self.policy)
            .field("factory_count", &factory_count)
            .field("typed_count", &typed_count)
            .finish()
    }
}

impl ServiceRegistry {
    /// Create an empty registry for `namespace` that overwrites on re-registration.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_policy(namespace, RegistrationPolicy::Overwrite)
    }

    pub fn with_policy(namespace: impl Into<String>, policy: RegistrationPolicy) -> Self {
        Self {
            namespace: namespace.into(),
            policy,
            factories: RwLock::new(HashMap::new()),
            typed: RwLock::new(HashMap::new()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Qualify `name` with this registry's namespace.
    pub fn qualify(&self, name: &str) -> ServiceId {
        ServiceId::qualified(&self.namespace, name)
    }

    /// Record (or replace) the factory for `name`.
    ///
    /// Returns the qualified identifier the factory was stored under.
    pub fn register_factory<F: ServiceFactory>(&self, name: &str, factory: F) -> Result<ServiceId> {
        let id = self.qualify(name);
        let mut factories = self.write_factories()?;
        if factories.contains_key(&id) {
            if self.policy == RegistrationPolicy::Strict {
                return Err(ContainerError::DuplicateService { id }.into());
            }
            log::debug!("Replacing factory for service '{}'", id);
        } else {
            log::trace!("Registering factory for service '{}'", id);
        }
        factories.insert(id.clone(), Arc::new(ErasedFactory(factory)));
        Ok(id)
    }

    /// Record (or replace) a lazily built capability of interface type `T`.
    pub fn register_type<T, F>(&self, build: F) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        let name = type_name::<T>();
        let mut typed = self.typed.write().map_err(|_| ContainerError::LockPoisoned {
            component: "registry.typed",
        })?;
        if typed.contains_key(&TypeId::of::<T>()) && self.policy == RegistrationPolicy::Strict {
            return Err(ContainerError::DuplicateService { id: ServiceId::new(name) }.into());
        }
        let factory = TypedFactory::<T, F> { build, _marker: PhantomData };
        typed.insert(TypeId::of::<T>(), (name, Arc::new(factory)));
        log::trace!("Registering capability factory for <{}>", name);
        Ok(())
    }

    /// Whether a factory is registered for `name` (qualified with this namespace).
    pub fn contains(&self, name: &str) -> bool {
        let id = self.qualify(name);
        self.factories
            .read()
            .map(|factories| factories.contains_key(&id))
            .unwrap_or(false)
    }

    pub fn contains_type<T: ?Sized + 'static>(&self) -> bool {
        self.typed
            .read()
            .map(|typed| typed.contains_key(&TypeId::of::<T>()))
            .unwrap_or(false)
    }

    /// All registered identifiers, sorted.
    pub fn ids(&self) -> Result<Vec<ServiceId>> {
        let mut ids: Vec<ServiceId> = self.read_factories()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Number of identifier-keyed factories.
    pub fn len(&self) -> usize {
        self.factories.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn factory(&self, id: &ServiceId) -> Result<Option<Arc<dyn Factory>>> {
        Ok(self.read_factories()?.get(id).cloned())
    }

    pub(crate) fn typed_factory(&self, type_id: TypeId) -> Result<Option<Arc<dyn Factory>>> {
        let typed = self.typed.read().map_err(|_| ContainerError::LockPoisoned {
            component: "registry.typed",
        })?;
        Ok(typed.get(&type_id).map(|(_, factory)| factory.clone()))
    }

    fn read_factories(&self) -> Result<RwLockReadGuard<'_, HashMap<ServiceId, Arc<dyn Factory>>>> {
        Ok(self.factories.read().map_err(|_| ContainerError::LockPoisoned {
            component: "registry.factories",
        })?)
    }

    fn write_factories(&self) -> Result<RwLockWriteGuard<'_, HashMap<ServiceId, Arc<dyn Factory>>>> {
        Ok(self.factories.write().map_err(|_| ContainerError::LockPoisoned {
            component: "registry.factories",
        })?)
    }
}
