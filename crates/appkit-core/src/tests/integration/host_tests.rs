use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::json;

use crate::app::{BootContext, BootSteps, Bootstrap, RegistrationContext};
use crate::config::HostConfig;
use crate::container::{Container, ContainerError};
use crate::event::{Event, EventDispatcher, EventResult, NamedEvent, sync_event_handler};
use crate::kernel::Host;
use crate::kernel::error::{Error, Result};
use crate::managers::{ProviderManager, ScriptManager};

// Module that owns a counter service and listens to a named host event
struct CounterModule {
    hits: Arc<AtomicU32>,
}

#[async_trait]
impl Bootstrap for CounterModule {
    fn app_id(&self) -> &'static str {
        "counter"
    }

    fn register(&self, context: &RegistrationContext<'_>) -> Result<()> {
        context.register_service("Total", |_c: &Container| Ok(AtomicU32::new(0)))?;
        Ok(())
    }

    async fn boot(&self, context: &BootContext) -> Result<()> {
        let dispatcher = context.server_container().get::<EventDispatcher>()?;
        let total = context.app_container().resolve_as::<AtomicU32>("Total")?;
        let hits = self.hits.clone();
        dispatcher
            .subscribe_named(
                "host.tick",
                sync_event_handler(move |_event: &dyn Event| {
                    total.fetch_add(1, Ordering::SeqCst);
                    hits.fetch_add(1, Ordering::SeqCst);
                    EventResult::Continue
                }),
            )
            .await;
        Ok(())
    }
}

// Module whose boot touches services it does not own
struct NosyModule;

#[async_trait]
impl Bootstrap for NosyModule {
    fn app_id(&self) -> &'static str {
        "nosy"
    }

    fn register(&self, _context: &RegistrationContext<'_>) -> Result<()> {
        Ok(())
    }

    async fn boot(&self, context: &BootContext) -> Result<()> {
        let mut steps = BootSteps::new("nosy");
        steps.record(
            "foreign-service",
            context.app_container().resolve("counter::Total").map(|_| ()),
        );
        steps.record(
            "providers",
            context.app_container().get::<dyn ProviderManager>().map(|_| ()),
        );
        steps.finish()
    }
}

#[tokio::test]
async fn test_boot_subscriptions_receive_host_events() -> Result<()> {
    let hits = Arc::new(AtomicU32::new(0));
    let mut host = Host::new(HostConfig::default())?;
    host.install(Box::new(CounterModule { hits: hits.clone() }))?;
    host.start().await?;

    host.publish(&NamedEvent::new("host.tick", json!({}))).await?;
    host.dispatcher()
        .queue_event(Box::new(NamedEvent::new("host.tick", json!({}))))
        .await;
    host.dispatcher().process_queue().await?;

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    let total = host
        .app_container("counter")?
        .resolve_as::<AtomicU32>("Total")?;
    assert_eq!(total.load(Ordering::SeqCst), 2, "Boot captured the app-scoped instance");
    Ok(())
}

#[tokio::test]
async fn test_apps_cannot_see_each_others_services() -> Result<()> {
    let mut host = Host::new(HostConfig::default())?;
    host.install(Box::new(CounterModule {
        hits: Arc::new(AtomicU32::new(0)),
    }))?;
    host.install(Box::new(NosyModule))?;

    let err = host.start().await.expect_err("nosy boot must fail");
    // One failing step: the original error comes back unwrapped
    match err {
        Error::Container(ContainerError::UnknownService { key }) => {
            assert_eq!(key.to_string(), "counter::Total");
        }
        other => panic!("Expected UnknownService, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_scripts_manager_shared_between_apps() -> Result<()> {
    let host = Host::new(HostConfig::default())?;
    let scripts = host.server_container().get::<dyn ScriptManager>()?;
    scripts.add_script("files", "sidebar");

    let again = host.server_container().get::<dyn ScriptManager>()?;
    assert_eq!(again.scripts(), vec!["files/sidebar"]);
    assert!(matches!(host.phase("files"), Err(Error::AppNotFound { .. })));
    Ok(())
}
