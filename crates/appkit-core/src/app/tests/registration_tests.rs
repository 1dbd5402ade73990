use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::app::{App, LifecyclePhase, RegistrationContext};
use crate::config::ConfigData;
use crate::container::{Container, FromContainer, ValueFactory};
use crate::event::binding::listener_service_name;
use crate::event::{Event, EventListener, EventResult, NamedEvent};
use crate::kernel::error::{Error, Result};
use crate::kernel::tables::HostTables;
use crate::managers::Capability;

static CAPABILITY_BUILDS: AtomicU32 = AtomicU32::new(0);

struct DemoCapabilities;

impl FromContainer for DemoCapabilities {
    fn from_container(_container: &Container) -> Result<Self> {
        CAPABILITY_BUILDS.fetch_add(1, Ordering::SeqCst);
        Ok(DemoCapabilities)
    }
}

impl Capability for DemoCapabilities {
    fn capabilities(&self) -> Result<Value> {
        Ok(json!({ "demo": { "enabled": true } }))
    }
}

#[derive(Debug, Clone)]
struct Uploaded;

impl Event for Uploaded {
    fn name(&self) -> &'static str {
        "demo.uploaded"
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

// Listens to two event types
struct AuditListener;

impl FromContainer for AuditListener {
    fn from_container(_container: &Container) -> Result<Self> {
        Ok(AuditListener)
    }
}

#[async_trait]
impl EventListener<Uploaded> for AuditListener {
    async fn handle(&self, _event: &Uploaded) -> Result<EventResult> {
        Ok(EventResult::Continue)
    }
}

#[async_trait]
impl EventListener<NamedEvent> for AuditListener {
    async fn handle(&self, _event: &NamedEvent) -> Result<EventResult> {
        Ok(EventResult::Continue)
    }
}

fn demo_app() -> Result<App> {
    App::new("demo", ConfigData::new())
}

#[test]
fn test_register_factory_is_lazy_and_namespaced() -> Result<()> {
    let app = demo_app()?;
    let tables = HostTables::new();
    let context = RegistrationContext::new(&app, &tables, LifecyclePhase::Registered);
    assert_eq!(context.app_id(), "demo");

    let builds = Arc::new(AtomicU32::new(0));
    let builds_clone = builds.clone();
    let id = context.register_service("Clock", move |_c: &Container| {
        builds_clone.fetch_add(1, Ordering::SeqCst);
        Ok(42u64)
    })?;
    let other = context.register_factory("Limit", ValueFactory(10u32))?;

    assert_eq!(id.as_str(), "demo::Clock");
    assert_eq!(other.as_str(), "demo::Limit");
    assert_eq!(builds.load(Ordering::SeqCst), 0);
    assert_eq!(*app.container().resolve_as::<u64>("Clock")?, 42);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_register_capability_records_descriptor() -> Result<()> {
    let app = demo_app()?;
    let tables = HostTables::new();
    let context = RegistrationContext::new(&app, &tables, LifecyclePhase::Registered);

    let before = CAPABILITY_BUILDS.load(Ordering::SeqCst);
    context.register_capability::<DemoCapabilities>()?;

    let registered = tables.capabilities().registered();
    assert_eq!(registered.len(), 1);
    assert!(registered[0].ends_with("DemoCapabilities"));
    assert_eq!(
        CAPABILITY_BUILDS.load(Ordering::SeqCst),
        before,
        "Capability must not be built at registration"
    );

    let document = tables.capabilities().collect(app.container())?;
    assert_eq!(document, json!({ "demo": { "enabled": true } }));
    Ok(())
}

#[test]
fn test_register_event_listener_records_binding() -> Result<()> {
    let app = demo_app()?;
    let tables = HostTables::new();
    let context = RegistrationContext::new(&app, &tables, LifecyclePhase::Registered);

    context.register_event_listener::<Uploaded, AuditListener>()?;
    context.register_event_listener::<NamedEvent, AuditListener>()?;

    let bindings = tables.bindings_for("demo");
    assert_eq!(bindings.len(), 2);
    assert!(bindings[0].event_name().ends_with("Uploaded"));
    assert!(bindings[1].event_name().ends_with("NamedEvent"));
    assert_eq!(bindings[0].listener_id(), bindings[1].listener_id(), "Both bindings share one listener service");
    assert!(tables.bindings_for("other").is_empty());

    let name = listener_service_name::<AuditListener>();
    assert!(app.registry().contains(&name));
    assert!(!app.container().is_cached(&name), "Listener must not be built at registration");
    Ok(())
}

#[test]
fn test_context_outside_register_phase_rejects_everything() -> Result<()> {
    let app = demo_app()?;
    let tables = HostTables::new();

    for phase in [LifecyclePhase::Constructed, LifecyclePhase::Booted] {
        let context = RegistrationContext::new(&app, &tables, phase);

        let results = [
            context.register_factory("Limit", ValueFactory(1u32)).map(|_| ()),
            context.register_service("Clock", |_c: &Container| Ok(1u64)).map(|_| ()),
            context.register_capability::<DemoCapabilities>(),
            context.register_event_listener::<Uploaded, AuditListener>(),
        ];
        for result in results {
            match result {
                Err(Error::InvalidPhase { expected, actual, .. }) => {
                    assert_eq!(expected, LifecyclePhase::Registered);
                    assert_eq!(actual, phase);
                }
                other => panic!("Expected InvalidPhase, got {:?}", other),
            }
        }
    }

    assert!(!app.registry().contains("Limit"));
    assert!(tables.capabilities().registered().is_empty());
    assert!(tables.bindings().is_empty());
    Ok(())
}
