//! Events the files app publishes and the listeners it binds to them.
use std::any::Any;
use std::sync::Arc;

use appkit_core::container::{Container, FromContainer};
use appkit_core::event::{Event, EventDispatcher, EventListener, EventResult, NamedEvent};
use appkit_core::kernel::constants::APP_NAME_SERVICE;
use appkit_core::kernel::error::Result;
use appkit_core::managers::ScriptManager;
use async_trait::async_trait;
use serde_json::json;

/// Name of the legacy event republished for [`LoadAdditionalScriptsEvent`].
pub const LEGACY_LOAD_ADDITIONAL_SCRIPTS: &str = "files.load_additional_scripts";

/// Script queued when the sidebar is requested.
pub const SIDEBAR_SCRIPT: &str = "sidebar";

/// Published when the file list page loads; other apps add their scripts.
#[derive(Debug, Clone, Default)]
pub struct LoadAdditionalScriptsEvent;

impl Event for LoadAdditionalScriptsEvent {
    fn name(&self) -> &'static str {
        "files.LoadAdditionalScriptsEvent"
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Published when the details sidebar is rendered.
#[derive(Debug, Clone, Default)]
pub struct LoadSidebar;

impl Event for LoadSidebar {
    fn name(&self) -> &'static str {
        "files.LoadSidebar"
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Republishes [`LoadAdditionalScriptsEvent`] under its legacy string name
/// for subscribers that predate the typed event.
pub struct LegacyLoadAdditionalScriptsAdapter {
    dispatcher: Arc<EventDispatcher>,
}

impl FromContainer for LegacyLoadAdditionalScriptsAdapter {
    fn from_container(container: &Container) -> Result<Self> {
        Ok(Self {
            dispatcher: container.get::<EventDispatcher>()?,
        })
    }
}

#[async_trait]
impl EventListener<LoadAdditionalScriptsEvent> for LegacyLoadAdditionalScriptsAdapter {
    async fn handle(&self, _event: &LoadAdditionalScriptsEvent) -> Result<EventResult> {
        let legacy = NamedEvent::new(LEGACY_LOAD_ADDITIONAL_SCRIPTS, json!({}));
        self.dispatcher.publish(&legacy).await
    }
}

/// Queues the sidebar script.
pub struct LoadSidebarListener {
    app_name: Arc<String>,
    scripts: Arc<dyn ScriptManager>,
}

impl FromContainer for LoadSidebarListener {
    fn from_container(container: &Container) -> Result<Self> {
        Ok(Self {
            app_name: container.resolve_as::<String>(APP_NAME_SERVICE)?,
            scripts: container.get::<dyn ScriptManager>()?,
        })
    }
}

#[async_trait]
impl EventListener<LoadSidebar> for LoadSidebarListener {
    async fn handle(&self, _event: &LoadSidebar) -> Result<EventResult> {
        self.scripts.add_script(&self.app_name, SIDEBAR_SCRIPT);
        Ok(EventResult::Continue)
    }
}
