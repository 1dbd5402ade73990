use crate::app::base::App;
use crate::app::phase::LifecyclePhase;
use crate::container::{Constructor, Container, FromContainer, ServiceFactory, ServiceId, factory_fn};
use crate::event::binding::{EventBinding, listener_service_name};
use crate::event::{Event, EventListener};
use crate::kernel::error::{Error, Result};
use crate::kernel::tables::HostTables;
use crate::managers::{Capability, CapabilityDescriptor};

/// Phase-1 API handed to [`Bootstrap::register`](crate::app::Bootstrap::register).
///
/// Every method only records a declaration: factories go to the app's
/// registry, capabilities and listener bindings to the host tables. Nothing
/// is constructed. All methods fail with [`Error::InvalidPhase`] unless the
/// app is in the [`LifecyclePhase::Registered`] phase.
pub struct RegistrationContext<'a> {
    app: &'a App,
    tables: &'a HostTables,
    phase: LifecyclePhase,
}

impl<'a> RegistrationContext<'a> {
    pub fn new(app: &'a App, tables: &'a HostTables, phase: LifecyclePhase) -> Self {
        Self { app, tables, phase }
    }

    pub fn app_id(&self) -> &str {
        self.app.app_id()
    }

    /// Record (or replace) the factory for `name` in the app namespace.
    pub fn register_factory<F: ServiceFactory>(&self, name: &str, factory: F) -> Result<ServiceId> {
        self.ensure_phase("register_factory")?;
        self.app.registry().register_factory(name, factory)
    }

    /// Closure form of [`register_factory`](Self::register_factory).
    pub fn register_service<F, T>(&self, name: &str, build: F) -> Result<ServiceId>
    where
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register_factory(name, factory_fn(build))
    }

    /// Declare capability type `C`; it is instantiated on capability discovery.
    pub fn register_capability<C: Capability + FromContainer>(&self) -> Result<()> {
        self.ensure_phase("register_capability")?;
        self.tables
            .capabilities()
            .register(CapabilityDescriptor::of::<C>());
        Ok(())
    }

    /// Bind events of type `E` to listener type `L`.
    ///
    /// `L` is registered as a service of the app so that, once resolved at
    /// dispatch time, the same listener instance serves every later event.
    pub fn register_event_listener<E, L>(&self) -> Result<()>
    where
        E: Event,
        L: EventListener<E> + FromContainer,
    {
        self.ensure_phase("register_event_listener")?;
        let name = listener_service_name::<L>();
        let registry = self.app.registry();
        let listener_id = if registry.contains(&name) {
            registry.qualify(&name)
        } else {
            registry.register_factory(&name, Constructor::<L>::new())?
        };
        let binding = EventBinding::new::<E, L>(self.app.app_id(), listener_id);
        log::debug!("Declared listener {:?}", binding);
        self.tables.add_binding(binding);
        Ok(())
    }

    fn ensure_phase(&self, operation: &'static str) -> Result<()> {
        if self.phase != LifecyclePhase::Registered {
            return Err(Error::InvalidPhase {
                app_id: self.app.app_id().to_string(),
                operation,
                expected: LifecyclePhase::Registered,
                actual: self.phase,
            });
        }
        Ok(())
    }
}
