use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use appkit_core::config::ConfigData;
use appkit_core::container::{Container, ServiceFactory};
use appkit_core::event::{EventDispatcher, NamedEvent};
use appkit_core::kernel::constants::{APP_NAME_SERVICE, INIT_PARAMS_SERVICE};
use appkit_core::kernel::error::Result;
use serde_json::{Value, json};

/// Service identifier of the files API controller.
pub const API_CONTROLLER: &str = "APIController";
/// Service identifier of the tag service.
pub const TAG_SERVICE: &str = "TagService";
/// Published after the tags of a file changed.
pub const TAGS_UPDATED_EVENT: &str = "files.tags_updated";

/// Keeps per-file tags and announces changes on the host dispatcher.
pub struct TagService {
    app_name: Arc<String>,
    dispatcher: Arc<EventDispatcher>,
    tags: Mutex<HashMap<String, BTreeSet<String>>>,
}

impl TagService {
    pub fn new(app_name: Arc<String>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            app_name,
            dispatcher,
            tags: Mutex::new(HashMap::new()),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Replace the tags of `file_id`; returns the stored, sorted tag list.
    pub async fn update_file_tags(&self, file_id: &str, tags: &[&str]) -> Result<Vec<String>> {
        let stored: Vec<String> = {
            let mut all = self.tags.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = all.entry(file_id.to_string()).or_default();
            entry.clear();
            entry.extend(tags.iter().map(|t| t.to_string()));
            entry.iter().cloned().collect()
        };

        let event = NamedEvent::new(
            TAGS_UPDATED_EVENT,
            json!({ "app": self.app_name(), "fileId": file_id, "tags": stored }),
        );
        self.dispatcher.publish(&event).await?;
        Ok(stored)
    }

    pub fn tags_for(&self, file_id: &str) -> Vec<String> {
        self.tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file_id)
            .map(|tags| tags.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Builds [`TagService`] from the app name and the host dispatcher.
#[derive(Debug, Default)]
pub struct TagServiceFactory;

impl ServiceFactory for TagServiceFactory {
    type Output = TagService;

    fn build(&self, container: &Container) -> Result<TagService> {
        let app_name = container.resolve_as::<String>(APP_NAME_SERVICE)?;
        let dispatcher = container.get::<EventDispatcher>()?;
        log::debug!("Building tag service for '{}'", app_name);
        Ok(TagService::new(app_name, dispatcher))
    }
}

/// Entry point for file API calls.
pub struct ApiController {
    app_name: Arc<String>,
    params: Arc<ConfigData>,
    tag_service: Arc<TagService>,
}

impl ApiController {
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn tag_service(&self) -> &Arc<TagService> {
        &self.tag_service
    }

    /// Update the tags of a file and return the API response body.
    pub async fn update_file_tags(&self, file_id: &str, tags: &[&str]) -> Result<Value> {
        let max_tags = self.params.get_or("max_tags", usize::MAX);
        if tags.len() > max_tags {
            return Ok(json!({ "message": format!("At most {} tags per file", max_tags) }));
        }
        let stored = self.tag_service.update_file_tags(file_id, tags).await?;
        Ok(json!({ "tags": stored }))
    }
}

/// Builds [`ApiController`]; resolves [`TagService`] from the same container.
#[derive(Debug, Default)]
pub struct ApiControllerFactory;

impl ServiceFactory for ApiControllerFactory {
    type Output = ApiController;

    fn build(&self, container: &Container) -> Result<ApiController> {
        Ok(ApiController {
            app_name: container.resolve_as::<String>(APP_NAME_SERVICE)?,
            params: container.resolve_as::<ConfigData>(INIT_PARAMS_SERVICE)?,
            tag_service: container.resolve_as::<TagService>(TAG_SERVICE)?,
        })
    }
}
