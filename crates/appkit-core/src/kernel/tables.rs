use std::sync::{Arc, Mutex, PoisonError};

use crate::event::EventBinding;
use crate::managers::CapabilitiesManager;

/// Process-wide declaration tables owned by the host.
///
/// Registration contexts write capability descriptors and event bindings
/// here; the host reads them back when wiring the dispatcher and answering
/// capability discovery.
#[derive(Debug, Default)]
pub struct HostTables {
    capabilities: Arc<CapabilitiesManager>,
    bindings: Mutex<Vec<EventBinding>>,
}

impl HostTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capabilities(&self) -> &Arc<CapabilitiesManager> {
        &self.capabilities
    }

    pub fn add_binding(&self, binding: EventBinding) {
        self.bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(binding);
    }

    /// Every binding, in registration order.
    pub fn bindings(&self) -> Vec<EventBinding> {
        self.bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bindings declared by `app_id`.
    pub fn bindings_for(&self, app_id: &str) -> Vec<EventBinding> {
        self.bindings()
            .into_iter()
            .filter(|b| b.app_id() == app_id)
            .collect()
    }
}
