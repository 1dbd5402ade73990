use std::sync::Arc;

use appkit_core::container::{Container, FromContainer};
use appkit_core::kernel::constants::APP_NAME_SERVICE;
use appkit_core::kernel::error::Result;
use appkit_core::managers::Notifier;

/// Notifier for files app notifications.
pub struct FilesNotifier {
    app_name: Arc<String>,
}

impl FromContainer for FilesNotifier {
    fn from_container(container: &Container) -> Result<Self> {
        Ok(Self {
            app_name: container.resolve_as::<String>(APP_NAME_SERVICE)?,
        })
    }
}

impl Notifier for FilesNotifier {
    fn id(&self) -> &'static str {
        crate::APP_ID
    }

    fn name(&self) -> String {
        let mut chars = self.app_name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
