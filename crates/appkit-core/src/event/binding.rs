use std::any::{TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::container::{Container, ServiceId};
use crate::event::{AsyncEventHandler, Event, EventListener, EventResult};
use crate::kernel::error::Result;

type HandlerResolver = Arc<dyn Fn(&Container) -> Result<Arc<dyn AsyncEventHandler>> + Send + Sync>;

/// Local service name under which a listener type is registered in its app
/// container.
pub fn listener_service_name<L: 'static>() -> String {
    format!("listener.{}", type_name::<L>().replace("::", "."))
}

/// An (event type, listener type) pair recorded at registration time.
///
/// The listener is not constructed when the binding is made. Once the host
/// attaches the binding to its dispatcher together with the owning app's
/// container, the listener is resolved through that container the first time
/// a matching event is published, and memoized there.
#[derive(Clone)]
pub struct EventBinding {
    app_id: String,
    event_type: TypeId,
    event_name: &'static str,
    listener_name: &'static str,
    listener_id: ServiceId,
    resolver: HandlerResolver,
}

impl fmt::Debug for EventBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("app_id", &self.app_id)
            .field("event", &self.event_name)
            .field("listener", &self.listener_name)
            .field("listener_id", &self.listener_id)
            .finish()
    }
}

impl EventBinding {
    /// Bind events of type `E` to listener type `L`, which must be resolvable
    /// as `listener_id` from the app container of `app_id`.
    pub fn new<E, L>(app_id: &str, listener_id: ServiceId) -> Self
    where
        E: Event,
        L: EventListener<E>,
    {
        let id = listener_id.clone();
        let resolver: HandlerResolver = Arc::new(move |container: &Container| {
            let listener = container.resolve_as::<L>(id.as_str())?;
            let handler: Arc<dyn AsyncEventHandler> = Arc::new(ListenerAdapter::<E, L> {
                listener,
                _event: PhantomData,
            });
            Ok(handler)
        });

        Self {
            app_id: app_id.to_string(),
            event_type: TypeId::of::<E>(),
            event_name: type_name::<E>(),
            listener_name: type_name::<L>(),
            listener_id,
            resolver,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn event_type(&self) -> TypeId {
        self.event_type
    }

    pub fn event_name(&self) -> &'static str {
        self.event_name
    }

    pub fn listener_name(&self) -> &'static str {
        self.listener_name
    }

    pub fn listener_id(&self) -> &ServiceId {
        &self.listener_id
    }

    /// Build (or fetch the memoized) listener from `container`.
    pub fn resolve(&self, container: &Container) -> Result<Arc<dyn AsyncEventHandler>> {
        (self.resolver)(container)
    }
}

/// Adapts a typed [`EventListener`] to the dispatcher's handler interface.
struct ListenerAdapter<E, L> {
    listener: Arc<L>,
    _event: PhantomData<fn(E)>,
}

#[async_trait]
impl<E, L> AsyncEventHandler for ListenerAdapter<E, L>
where
    E: Event,
    L: EventListener<E>,
{
    async fn handle(&self, event: &dyn Event) -> Result<EventResult> {
        match event.as_any().downcast_ref::<E>() {
            Some(e) => self.listener.handle(e).await,
            None => Ok(EventResult::Continue),
        }
    }
}
