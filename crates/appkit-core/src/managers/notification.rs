use std::any::type_name;
use std::sync::{Arc, Mutex, PoisonError};

use crate::app::descriptor::Descriptor;
use crate::container::{Container, FromContainer};
use crate::kernel::error::Result;

/// Prepares notifications of one app for display.
pub trait Notifier: Send + Sync {
    /// Identifier of the notifier, usually the app id.
    fn id(&self) -> &'static str;

    /// Human readable name.
    fn name(&self) -> String;
}

pub type NotifierDescriptor = Descriptor<dyn Notifier>;

impl Descriptor<dyn Notifier> {
    /// Describe notifier type `N`.
    pub fn of<N: Notifier + FromContainer>() -> Self {
        Descriptor::new(type_name::<N>(), |container: &Container| {
            let notifier: Arc<dyn Notifier> = Arc::new(N::from_container(container)?);
            Ok(notifier)
        })
    }
}

/// Host-side registry of notifier services.
pub trait NotificationManager: Send + Sync {
    fn register_notifier_service(&self, notifier: NotifierDescriptor) -> Result<()>;

    fn registered_notifiers(&self) -> Vec<&'static str>;

    /// Instantiate every registered notifier through `container`.
    fn notifiers(&self, container: &Container) -> Result<Vec<Arc<dyn Notifier>>>;
}

/// In-memory [`NotificationManager`].
#[derive(Debug, Default)]
pub struct DefaultNotificationManager {
    notifiers: Mutex<Vec<NotifierDescriptor>>,
}

impl DefaultNotificationManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationManager for DefaultNotificationManager {
    fn register_notifier_service(&self, notifier: NotifierDescriptor) -> Result<()> {
        let mut notifiers = self.notifiers.lock().unwrap_or_else(PoisonError::into_inner);
        if notifiers.iter().any(|n| n.type_name() == notifier.type_name()) {
            log::debug!("Notifier {} already registered", notifier.type_name());
            return Ok(());
        }
        log::info!("Registered notifier service {}", notifier.type_name());
        notifiers.push(notifier);
        Ok(())
    }

    fn registered_notifiers(&self) -> Vec<&'static str> {
        self.notifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|n| n.type_name())
            .collect()
    }

    fn notifiers(&self, container: &Container) -> Result<Vec<Arc<dyn Notifier>>> {
        let descriptors = self
            .notifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        descriptors.iter().map(|d| d.instantiate(container)).collect()
    }
}
