use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::Container;
use crate::kernel::error::Result;

/// A constructed service instance as stored in a container cache.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Named factory for a service.
///
/// Implement this on a small struct per service so the construction of each
/// service is a named, testable unit that receives its container explicitly.
/// Closures can be adapted with [`factory_fn`].
pub trait ServiceFactory: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    fn build(&self, container: &Container) -> Result<Self::Output>;
}

/// Construct a value of `Self` from a container.
///
/// Used for types the host instantiates on demand from a descriptor or
/// binding: listeners, capabilities, resource providers and notifiers.
pub trait FromContainer: Sized + Send + Sync + 'static {
    fn from_container(container: &Container) -> Result<Self>;
}

/// Type-erased factory stored by the registry.
pub(crate) trait Factory: Send + Sync {
    fn create(&self, container: &Container) -> Result<Instance>;

    /// Type name of the produced service, for diagnostics.
    fn output_name(&self) -> &'static str;
}

/// Erases a [`ServiceFactory`] into a cacheable [`Instance`] producer.
pub(crate) struct ErasedFactory<F>(pub(crate) F);

impl<F: ServiceFactory> Factory for ErasedFactory<F> {
    fn create(&self, container: &Container) -> Result<Instance> {
        let value = self.0.build(container)?;
        Ok(Arc::new(value))
    }

    fn output_name(&self) -> &'static str {
        type_name::<F::Output>()
    }
}

/// Factory for a capability type: stores the `Arc<T>` itself so unsized
/// interfaces (`dyn Trait`) survive the round trip through `Any`.
pub(crate) struct TypedFactory<T: ?Sized, F> {
    pub(crate) build: F,
    pub(crate) _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T, F> Factory for TypedFactory<T, F>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
{
    fn create(&self, container: &Container) -> Result<Instance> {
        let value: Arc<T> = (self.build)(container)?;
        Ok(Arc::new(value))
    }

    fn output_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Adapter turning a closure into a [`ServiceFactory`].
pub struct FnFactory<F, T> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> fmt::Debug for FnFactory<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("output", &type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<F, T> ServiceFactory for FnFactory<F, T>
where
    F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    type Output = T;

    fn build(&self, container: &Container) -> Result<T> {
        (self.f)(container)
    }
}

/// Wrap a closure as a [`ServiceFactory`].
pub fn factory_fn<F, T>(f: F) -> FnFactory<F, T>
where
    F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    FnFactory { f, _marker: PhantomData }
}

/// Factory producing clones of a fixed value.
#[derive(Debug, Clone)]
pub struct ValueFactory<T>(pub T);

impl<T: Clone + Send + Sync + 'static> ServiceFactory for ValueFactory<T> {
    type Output = T;

    fn build(&self, _container: &Container) -> Result<T> {
        Ok(self.0.clone())
    }
}

/// Factory delegating to [`FromContainer`].
pub struct Constructor<T>(PhantomData<fn() -> T>);

impl<T> Constructor<T> {
    pub fn new() -> Self {
        Constructor(PhantomData)
    }
}

impl<T> Default for Constructor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromContainer> ServiceFactory for Constructor<T> {
    type Output = T;

    fn build(&self, container: &Container) -> Result<T> {
        T::from_container(container)
    }
}
