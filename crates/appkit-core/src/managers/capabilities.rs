use std::any::type_name;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use crate::app::descriptor::Descriptor;
use crate::container::{Container, FromContainer};
use crate::kernel::error::Result;

/// Exposes an app's capabilities as a structured document.
///
/// The document must be a JSON object; the host merges the documents of all
/// registered capabilities into one.
pub trait Capability: Send + Sync {
    fn capabilities(&self) -> Result<Value>;
}

pub type CapabilityDescriptor = Descriptor<dyn Capability>;

impl Descriptor<dyn Capability> {
    /// Describe capability type `C`.
    pub fn of<C: Capability + FromContainer>() -> Self {
        Descriptor::new(type_name::<C>(), |container: &Container| {
            let capability: Arc<dyn Capability> = Arc::new(C::from_container(container)?);
            Ok(capability)
        })
    }
}

/// Host-owned table of capability descriptors.
#[derive(Debug, Default)]
pub struct CapabilitiesManager {
    descriptors: RwLock<Vec<CapabilityDescriptor>>,
}

impl CapabilitiesManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, descriptor: CapabilityDescriptor) {
        log::debug!("Registering capability {}", descriptor.type_name());
        self.descriptors
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(descriptor);
    }

    /// Type names of every registered capability, in registration order.
    pub fn registered(&self) -> Vec<&'static str> {
        self.descriptors
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|d| d.type_name())
            .collect()
    }

    /// Instantiate every capability through `container` and merge their
    /// documents. Later documents win on conflicting leaf keys; nested
    /// objects are merged recursively.
    pub fn collect(&self, container: &Container) -> Result<Value> {
        let descriptors = self
            .descriptors
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        let mut merged = Value::Object(Map::new());
        for descriptor in &descriptors {
            let document = descriptor.instantiate(container)?.capabilities()?;
            if !document.is_object() {
                return Err(format!(
                    "Capability {} returned a non-object document",
                    descriptor.type_name()
                )
                .into());
            }
            merge_documents(&mut merged, document);
        }
        Ok(merged)
    }
}

fn merge_documents(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => merge_documents(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}
