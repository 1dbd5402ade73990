use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::container::{Constructor, Container, ContainerError, FromContainer, ServiceRegistry, factory_fn};
use crate::event::binding::{EventBinding, listener_service_name};
use crate::event::{Event, EventDispatcher, EventListener, EventResult, EventSystemError};
use crate::kernel::error::{Error, Result};

#[derive(Debug, Clone)]
struct SidebarEvent {
    file: String,
}

impl Event for SidebarEvent {
    fn name(&self) -> &'static str {
        "sidebar.load"
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

// Shared probe registered in the app container
#[derive(Default)]
struct Probe {
    constructions: AtomicU32,
    handled: AtomicU32,
}

struct SidebarListener {
    probe: Arc<Probe>,
}

impl FromContainer for SidebarListener {
    fn from_container(container: &Container) -> Result<Self> {
        let probe = container.resolve_as::<Probe>("Probe")?;
        probe.constructions.fetch_add(1, Ordering::SeqCst);
        Ok(Self { probe })
    }
}

#[async_trait]
impl EventListener<SidebarEvent> for SidebarListener {
    async fn handle(&self, event: &SidebarEvent) -> Result<EventResult> {
        assert_eq!(event.file, "report.pdf");
        self.probe.handled.fetch_add(1, Ordering::SeqCst);
        Ok(EventResult::Continue)
    }
}

fn app_with_listener() -> Result<(Arc<Container>, EventBinding)> {
    let registry = Arc::new(ServiceRegistry::new("files"));
    registry.register_factory("Probe", factory_fn(|_c: &Container| Ok(Probe::default())))?;
    let listener_id = registry.register_factory(
        &listener_service_name::<SidebarListener>(),
        Constructor::<SidebarListener>::new(),
    )?;
    let binding = EventBinding::new::<SidebarEvent, SidebarListener>("files", listener_id);
    Ok((Arc::new(Container::new(registry)), binding))
}

#[test]
fn test_listener_service_name_is_unqualified() {
    let name = listener_service_name::<SidebarListener>();
    assert!(name.starts_with("listener."));
    assert!(name.ends_with("SidebarListener"));
    assert!(!name.contains("::"), "Listener names must not look namespaced: {}", name);
}

#[test]
fn test_binding_metadata() -> Result<()> {
    let (_container, binding) = app_with_listener()?;
    assert_eq!(binding.app_id(), "files");
    assert_eq!(binding.event_type(), std::any::TypeId::of::<SidebarEvent>());
    assert!(binding.event_name().ends_with("SidebarEvent"));
    assert!(binding.listener_name().ends_with("SidebarListener"));
    assert_eq!(binding.listener_id().namespace(), Some("files"));
    Ok(())
}

#[tokio::test]
async fn test_listener_built_on_first_publish_only() -> Result<()> {
    let (container, binding) = app_with_listener()?;
    let dispatcher = EventDispatcher::new();
    dispatcher.subscribe_binding(binding, &container).await;

    let probe = container.resolve_as::<Probe>("Probe")?;
    assert_eq!(probe.constructions.load(Ordering::SeqCst), 0, "Binding must not build the listener");

    let event = SidebarEvent {
        file: "report.pdf".to_string(),
    };
    dispatcher.publish(&event).await?;
    dispatcher.publish(&event).await?;

    assert_eq!(probe.constructions.load(Ordering::SeqCst), 1, "Listener should be memoized");
    assert_eq!(probe.handled.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_binding_ignores_other_events() -> Result<()> {
    let (container, binding) = app_with_listener()?;
    let dispatcher = EventDispatcher::new();
    dispatcher.subscribe_binding(binding, &container).await;

    let other = crate::event::NamedEvent::new("sidebar.load", serde_json::json!({}));
    dispatcher.publish(&other).await?;

    assert!(!container.is_cached(&listener_service_name::<SidebarListener>()));
    Ok(())
}

#[tokio::test]
async fn test_unresolvable_listener_fails_publish() -> Result<()> {
    // Binding points at an identifier nobody registered
    let registry = Arc::new(ServiceRegistry::new("files"));
    let binding = EventBinding::new::<SidebarEvent, SidebarListener>("files", registry.qualify("listener.Missing"));
    let container = Arc::new(Container::new(registry));

    let dispatcher = EventDispatcher::new();
    dispatcher.subscribe_binding(binding, &container).await;

    let result = dispatcher
        .publish(&SidebarEvent {
            file: "report.pdf".to_string(),
        })
        .await;
    match result {
        Err(Error::Container(ContainerError::UnknownService { key })) => {
            assert_eq!(key.to_string(), "files::listener.Missing");
        }
        other => panic!("Expected UnknownService, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_binding_does_not_keep_container_alive() -> Result<()> {
    let (container, binding) = app_with_listener()?;
    let dispatcher = EventDispatcher::new();
    dispatcher.subscribe_binding(binding, &container).await;
    drop(container);

    let result = dispatcher
        .publish(&SidebarEvent {
            file: "report.pdf".to_string(),
        })
        .await;
    assert!(matches!(
        result,
        Err(Error::EventSystem(EventSystemError::ListenerResolution { .. }))
    ));
    Ok(())
}

// Listener whose construction always fails
struct BrokenListener;

impl FromContainer for BrokenListener {
    fn from_container(_container: &Container) -> Result<Self> {
        Err(Error::from("broken listener"))
    }
}

#[async_trait]
impl EventListener<SidebarEvent> for BrokenListener {
    async fn handle(&self, _event: &SidebarEvent) -> Result<EventResult> {
        Ok(EventResult::Continue)
    }
}

#[tokio::test]
async fn test_failing_binding_does_not_block_later_listeners() -> Result<()> {
    let (container, good) = app_with_listener()?;
    let broken_id = container.registry().register_factory(
        &listener_service_name::<BrokenListener>(),
        Constructor::<BrokenListener>::new(),
    )?;
    let broken = EventBinding::new::<SidebarEvent, BrokenListener>("files", broken_id);

    let dispatcher = EventDispatcher::new();
    dispatcher.subscribe_binding(broken, &container).await;
    dispatcher.subscribe_binding(good, &container).await;

    let result = dispatcher
        .publish(&SidebarEvent {
            file: "report.pdf".to_string(),
        })
        .await;

    // The lone failure comes back unchanged, after the good listener ran
    assert!(matches!(result, Err(Error::Other(ref msg)) if msg == "broken listener"));
    let probe = container.resolve_as::<Probe>("Probe")?;
    assert_eq!(probe.handled.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_several_failing_bindings_are_reported_together() -> Result<()> {
    let (container, good) = app_with_listener()?;
    let broken_id = container.registry().register_factory(
        &listener_service_name::<BrokenListener>(),
        Constructor::<BrokenListener>::new(),
    )?;

    let dispatcher = EventDispatcher::new();
    for _ in 0..2 {
        let broken = EventBinding::new::<SidebarEvent, BrokenListener>("files", broken_id.clone());
        dispatcher.subscribe_binding(broken, &container).await;
    }
    dispatcher.subscribe_binding(good, &container).await;

    let result = dispatcher
        .publish(&SidebarEvent {
            file: "report.pdf".to_string(),
        })
        .await;

    match result {
        Err(Error::EventSystem(EventSystemError::DeliveryFailed { event_name, failures })) => {
            assert_eq!(event_name, "sidebar.load");
            assert_eq!(failures.len(), 2);
            assert!(failures.iter().all(|(listener, _)| listener.ends_with("BrokenListener")));
        }
        other => panic!("Expected DeliveryFailed, got {:?}", other),
    }
    let probe = container.resolve_as::<Probe>("Probe")?;
    assert_eq!(probe.handled.load(Ordering::SeqCst), 1);
    Ok(())
}
