//! Collaboration resources: the file resource provider and the listener
//! that keeps the provider manager's access cache fresh.
use std::sync::{Arc, Weak};

use appkit_core::container::{Container, FromContainer};
use appkit_core::event::{AsyncEventHandler, Event, EventDispatcher, EventId, EventResult, NamedEvent};
use appkit_core::kernel::constants::APP_NAME_SERVICE;
use appkit_core::kernel::error::Result;
use appkit_core::managers::{ProviderManager, ResourceProvider};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Resource type handled by [`FileResourceProvider`].
pub const RESOURCE_TYPE: &str = "file";

/// Share events after which access to file resources may have changed.
pub const SHARE_EVENTS: [&str; 3] = ["share.post_share", "share.post_unshare", "share.post_unshare_from_self"];

/// Published after a user was deleted; payload field `uid`.
pub const USER_DELETED_EVENT: &str = "user.post_delete";

/// Resolves file ids into collaboration rich objects.
pub struct FileResourceProvider {
    app_name: Arc<String>,
}

impl FromContainer for FileResourceProvider {
    fn from_container(container: &Container) -> Result<Self> {
        Ok(Self {
            app_name: container.resolve_as::<String>(APP_NAME_SERVICE)?,
        })
    }
}

impl ResourceProvider for FileResourceProvider {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn rich_object(&self, resource_id: &str) -> Result<Value> {
        Ok(json!({
            "type": RESOURCE_TYPE,
            "id": resource_id,
            "link": format!("/{}/f/{}", self.app_name, resource_id),
        }))
    }
}

/// Invalidates access caches when shares change or users are deleted.
///
/// The provider manager is looked up in the host container on every event,
/// so attaching the listener does not depend on it.
pub struct CollaborationListener {
    server: Weak<Container>,
}

impl CollaborationListener {
    pub fn new(server: &Arc<Container>) -> Self {
        Self {
            server: Arc::downgrade(server),
        }
    }

    /// Subscribe to every share event and to user deletion.
    pub async fn attach(self: Arc<Self>, dispatcher: &EventDispatcher) -> Vec<EventId> {
        let mut ids = Vec::with_capacity(SHARE_EVENTS.len() + 1);
        for name in SHARE_EVENTS.into_iter().chain([USER_DELETED_EVENT]) {
            ids.push(dispatcher.add_listener(name, self.clone()).await);
        }
        ids
    }

    fn invalidate(&self, event: &dyn Event) -> Result<()> {
        let server = self.server.upgrade().ok_or("host container is gone")?;
        let providers = server.get::<dyn ProviderManager>()?;
        if event.name() == USER_DELETED_EVENT {
            let uid = event
                .as_any()
                .downcast_ref::<NamedEvent>()
                .and_then(|e| e.field("uid"))
                .ok_or("user deletion event without uid")?;
            providers.invalidate_access_cache_for_user(uid);
        } else {
            providers.invalidate_access_cache_for_provider(RESOURCE_TYPE);
        }
        Ok(())
    }
}

#[async_trait]
impl AsyncEventHandler for CollaborationListener {
    async fn handle(&self, event: &dyn Event) -> Result<EventResult> {
        self.invalidate(event)?;
        log::debug!("Access cache invalidated on {}", event.name());
        Ok(EventResult::Continue)
    }
}
