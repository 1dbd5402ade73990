//! # Files App
//!
//! The files module: registers the file API controller and tag service,
//! the files capability document and the sidebar/script listeners, then at
//! boot hooks into the host's collaboration, event and notification managers.
use std::sync::Arc;

use appkit_core::app::{BootContext, BootSteps, Bootstrap, RegistrationContext};
use appkit_core::event::EventDispatcher;
use appkit_core::kernel::error::Result;
use appkit_core::managers::{NotificationManager, NotifierDescriptor, ProviderDescriptor, ProviderManager};
use async_trait::async_trait;

pub mod capabilities;
pub mod collaboration;
pub mod events;
pub mod notification;
pub mod services;

use capabilities::FilesCapabilities;
use collaboration::{CollaborationListener, FileResourceProvider};
use events::{LegacyLoadAdditionalScriptsAdapter, LoadAdditionalScriptsEvent, LoadSidebar, LoadSidebarListener};
use notification::FilesNotifier;
use services::{API_CONTROLLER, ApiControllerFactory, TAG_SERVICE, TagServiceFactory};

/// App id and service namespace of the files app.
pub const APP_ID: &str = "files";

#[derive(Debug, Default)]
pub struct FilesApp;

impl FilesApp {
    pub fn new() -> Self {
        FilesApp
    }
}

#[async_trait]
impl Bootstrap for FilesApp {
    fn app_id(&self) -> &'static str {
        APP_ID
    }

    fn register(&self, context: &RegistrationContext<'_>) -> Result<()> {
        // Controllers
        context.register_factory(API_CONTROLLER, ApiControllerFactory)?;

        // Services
        context.register_factory(TAG_SERVICE, TagServiceFactory)?;

        context.register_capability::<FilesCapabilities>()?;

        context.register_event_listener::<LoadAdditionalScriptsEvent, LegacyLoadAdditionalScriptsAdapter>()?;
        context.register_event_listener::<LoadSidebar, LoadSidebarListener>()?;
        Ok(())
    }

    async fn boot(&self, context: &BootContext) -> Result<()> {
        let mut steps = BootSteps::new(APP_ID);
        steps.record("resource-provider", register_resource_provider(context));
        steps.record("collaboration-listener", attach_collaboration_listener(context).await);
        steps.record("notifier", register_notifier(context));
        steps.finish()
    }
}

fn register_resource_provider(context: &BootContext) -> Result<()> {
    let providers = context.app_container().get::<dyn ProviderManager>()?;
    providers.register_resource_provider(ProviderDescriptor::of::<FileResourceProvider>())
}

async fn attach_collaboration_listener(context: &BootContext) -> Result<()> {
    let server = context.server_container();
    let dispatcher = server.get::<EventDispatcher>()?;
    let listener = Arc::new(CollaborationListener::new(server));
    let ids = listener.attach(&dispatcher).await;
    log::debug!("Collaboration listener attached to {} events", ids.len());
    Ok(())
}

fn register_notifier(context: &BootContext) -> Result<()> {
    let notifications = context.app_container().get::<dyn NotificationManager>()?;
    notifications.register_notifier_service(NotifierDescriptor::of::<FilesNotifier>())
}
