use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::kernel::error::Result;

type Build<T> = Arc<dyn Fn(&Container) -> Result<Arc<T>> + Send + Sync>;

/// Reference to a concrete type implementing interface `T`, together with
/// the way to construct it from a container.
///
/// Descriptors are what apps hand to host managers ("register this provider
/// type"); the manager instantiates the type only when it needs it. Typed
/// constructors live next to each interface, e.g.
/// [`CapabilityDescriptor::of`](crate::managers::CapabilityDescriptor).
pub struct Descriptor<T: ?Sized> {
    type_name: &'static str,
    build: Build<T>,
}

impl<T: ?Sized> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            build: self.build.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized> Descriptor<T> {
    pub fn new<F>(type_name: &'static str, build: F) -> Self
    where
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            type_name,
            build: Arc::new(build),
        }
    }

    /// Type name of the described implementation.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Construct the described type from `container`.
    pub fn instantiate(&self, container: &Container) -> Result<Arc<T>> {
        (self.build)(container)
    }
}
