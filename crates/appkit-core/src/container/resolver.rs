use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::container::error::{ContainerError, ServiceKey};
use crate::container::factory::Instance;
use crate::container::identifier::ServiceId;
use crate::container::registry::ServiceRegistry;
use crate::kernel::error::Result;

/// Cache slot: identifier-keyed or capability-keyed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot {
    Id(ServiceId),
    Type(TypeId),
}

/// A resolution currently running on some thread.
#[derive(Debug)]
struct InFlight {
    thread: ThreadId,
    slot: Slot,
    key: ServiceKey,
}

/// Outcome of claiming a slot for construction.
enum Claim<'a> {
    /// Another resolution finished first.
    Cached(Instance),
    /// The current thread builds the instance.
    Owner(ResolutionGuard<'a>),
}

/// Per-scope instance cache and resolver.
///
/// A container resolves services from its [`ServiceRegistry`] and memoizes
/// every constructed instance for its own lifetime. Lookups that have no
/// local factory and no cached instance fall through to the parent container
/// (for app containers this is the host container). Each request scope gets
/// its own container via [`Container::scope`], so instances are never shared
/// between scopes.
///
/// A factory runs at most once per identifier per container: a thread that
/// finds the slot under construction on another thread waits for it.
pub struct Container {
    registry: Arc<ServiceRegistry>,
    parent: Option<Arc<Container>>,
    instances: Mutex<HashMap<Slot, Instance>>,
    resolving: Mutex<Vec<InFlight>>,
    finished: Condvar,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("namespace", &self.registry.namespace())
            .field("cached", &self.cached_count())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl Container {
    /// Create a root container over `registry`.
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            parent: None,
            instances: Mutex::new(HashMap::new()),
            resolving: Mutex::new(Vec::new()),
            finished: Condvar::new(),
        }
    }

    /// Create a container over `registry` that falls back to `parent`.
    pub fn with_parent(registry: Arc<ServiceRegistry>, parent: Arc<Container>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(registry)
        }
    }

    /// A fresh scope over the same registry and parent, with an empty cache.
    pub fn scope(&self) -> Container {
        Container {
            registry: self.registry.clone(),
            parent: self.parent.clone(),
            instances: Mutex::new(HashMap::new()),
            resolving: Mutex::new(Vec::new()),
            finished: Condvar::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        self.registry.namespace()
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn parent(&self) -> Option<&Arc<Container>> {
        self.parent.as_ref()
    }

    /// Resolve a service by identifier.
    ///
    /// Unqualified identifiers are qualified with this container's namespace.
    /// If neither this container nor its registry knows the identifier, the
    /// lookup is retried on the parent with the identifier as given.
    pub fn resolve(&self, id: &str) -> Result<Instance> {
        let qualified = self.registry.qualify(id);
        let slot = Slot::Id(qualified.clone());
        if let Some(instance) = self.cached(&slot)? {
            log::trace!("Cache hit for service '{}'", qualified);
            return Ok(instance);
        }

        match self.registry.factory(&qualified)? {
            Some(factory) => {
                log::debug!("Constructing service '{}' ({})", qualified, factory.output_name());
                self.construct(slot, ServiceKey::Id(qualified), |c| factory.create(c))
            }
            None => match &self.parent {
                Some(parent) => parent.resolve(id),
                None => Err(ContainerError::UnknownService {
                    key: ServiceKey::Id(qualified),
                }
                .into()),
            },
        }
    }

    /// Resolve a service by identifier and downcast it to `T`.
    pub fn resolve_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        let instance = self.resolve(id)?;
        instance.downcast::<T>().map_err(|_| {
            ContainerError::TypeMismatch {
                key: ServiceKey::Id(self.registry.qualify(id)),
                expected: type_name::<T>(),
            }
            .into()
        })
    }

    /// Resolve a capability by its interface type, e.g. `dyn ProviderManager`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let slot = Slot::Type(TypeId::of::<T>());
        let key = ServiceKey::Type(type_name::<T>());

        let instance = match self.cached(&slot)? {
            Some(instance) => instance,
            None => match self.registry.typed_factory(TypeId::of::<T>())? {
                Some(factory) => {
                    log::debug!("Constructing capability <{}>", type_name::<T>());
                    self.construct(slot, key.clone(), |c| factory.create(c))?
                }
                None => {
                    return match &self.parent {
                        Some(parent) => parent.get::<T>(),
                        None => Err(ContainerError::UnknownService { key }.into()),
                    };
                }
            },
        };

        instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| {
                ContainerError::TypeMismatch {
                    key,
                    expected: type_name::<T>(),
                }
                .into()
            })
    }

    /// Install an already constructed capability instance in this container.
    ///
    /// Replaces any instance previously provided for `T` here.
    pub fn provide<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>) -> Result<()> {
        let mut instances = self.lock_instances()?;
        instances.insert(Slot::Type(TypeId::of::<T>()), Arc::new(value));
        Ok(())
    }

    /// Whether `id` can be resolved here or in a parent, without building it.
    pub fn has(&self, id: &str) -> bool {
        let qualified = self.registry.qualify(id);
        let cached = self
            .instances
            .lock()
            .map(|instances| instances.contains_key(&Slot::Id(qualified)))
            .unwrap_or(false);
        cached
            || self.registry.contains(id)
            || self.parent.as_ref().is_some_and(|parent| parent.has(id))
    }

    /// Whether capability `T` can be resolved here or in a parent.
    pub fn has_type<T: ?Sized + 'static>(&self) -> bool {
        let cached = self
            .instances
            .lock()
            .map(|instances| instances.contains_key(&Slot::Type(TypeId::of::<T>())))
            .unwrap_or(false);
        cached
            || self.registry.contains_type::<T>()
            || self.parent.as_ref().is_some_and(|parent| parent.has_type::<T>())
    }

    /// Whether an instance for `id` has already been built in this container.
    pub fn is_cached(&self, id: &str) -> bool {
        let slot = Slot::Id(self.registry.qualify(id));
        self.instances
            .lock()
            .map(|instances| instances.contains_key(&slot))
            .unwrap_or(false)
    }

    /// Number of instances cached in this container (parents excluded).
    pub fn cached_count(&self) -> usize {
        self.instances.lock().map(|i| i.len()).unwrap_or(0)
    }

    fn cached(&self, slot: &Slot) -> Result<Option<Instance>> {
        Ok(self.lock_instances()?.get(slot).cloned())
    }

    /// Run `build` for `slot` with cycle detection, then cache the result.
    ///
    /// No lock is held while `build` runs, so factories may resolve further
    /// services from this container.
    fn construct<F>(&self, slot: Slot, key: ServiceKey, build: F) -> Result<Instance>
    where
        F: FnOnce(&Container) -> Result<Instance>,
    {
        let guard = match self.claim(slot.clone(), key)? {
            Claim::Cached(instance) => return Ok(instance),
            Claim::Owner(guard) => guard,
        };
        let built = build(self)?;

        // Cache before releasing the claim so waiting threads find it.
        let instance = self.lock_instances()?.entry(slot).or_insert(built).clone();
        drop(guard);
        Ok(instance)
    }

    /// Mark `slot` as being built by the current thread.
    ///
    /// Waits while another thread builds the same slot, then returns its
    /// instance. If that build failed, the slot is claimed again.
    fn claim(&self, slot: Slot, key: ServiceKey) -> Result<Claim<'_>> {
        let thread = thread::current().id();
        let mut resolving = self.lock_resolving()?;

        loop {
            if resolving.iter().any(|f| f.thread == thread && f.slot == slot) {
                let mut chain: Vec<ServiceKey> = resolving
                    .iter()
                    .filter(|f| f.thread == thread)
                    .map(|f| f.key.clone())
                    .collect();
                chain.push(key.clone());
                log::error!("Cyclic dependency detected while resolving '{}'", key);
                return Err(ContainerError::CyclicDependency { key, chain }.into());
            }
            if let Some(instance) = self.cached(&slot)? {
                return Ok(Claim::Cached(instance));
            }
            if !resolving.iter().any(|f| f.slot == slot) {
                break;
            }
            log::trace!("Waiting for '{}' to be built on another thread", key);
            resolving = self
                .finished
                .wait(resolving)
                .map_err(|_| ContainerError::LockPoisoned {
                    component: "resolution_stack",
                })?;
        }

        resolving.push(InFlight { thread, slot: slot.clone(), key });
        Ok(Claim::Owner(ResolutionGuard { container: self, thread, slot }))
    }

    fn lock_resolving(&self) -> Result<MutexGuard<'_, Vec<InFlight>>> {
        Ok(self.resolving.lock().map_err(|_| ContainerError::LockPoisoned {
            component: "resolution_stack",
        })?)
    }

    fn lock_instances(&self) -> Result<MutexGuard<'_, HashMap<Slot, Instance>>> {
        Ok(self.instances.lock().map_err(|_| ContainerError::LockPoisoned {
            component: "instance_cache",
        })?)
    }
}

/// Releases a claim when a construction ends, including on error, and wakes
/// threads waiting for it.
struct ResolutionGuard<'a> {
    container: &'a Container,
    thread: ThreadId,
    slot: Slot,
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        let mut resolving = self
            .container
            .resolving
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = resolving
            .iter()
            .rposition(|f| f.thread == self.thread && f.slot == self.slot)
        {
            resolving.remove(pos);
        }
        drop(resolving);
        self.container.finished.notify_all();
    }
}
