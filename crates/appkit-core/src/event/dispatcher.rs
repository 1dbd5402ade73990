use std::any::TypeId;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::Mutex; // Use tokio's Mutex

use crate::container::Container;
use crate::event::binding::EventBinding;
use crate::event::error::EventSystemError;
use crate::event::{AsyncEventHandler, Event, EventId, EventResult};
use crate::kernel::error::Result;

// This type represents an owned future that returns EventResult
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = EventResult> + Send + 'a>>;

/// Handler closure for events matched by name
pub type NamedHandlerFn = Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>;

/// Handler closure for events matched by type
pub type TypedHandlerFn<E> = Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>;

/// A subscription: either a ready handler or a binding resolved on dispatch.
///
/// Lazy subscriptions hold their container weakly: the host container caches
/// the dispatcher, so a strong reference would never be released.
#[derive(Clone)]
enum Subscriber {
    Ready(Arc<dyn AsyncEventHandler>),
    Lazy {
        binding: EventBinding,
        container: Weak<Container>,
    },
}

impl Subscriber {
    async fn deliver(&self, event: &dyn Event) -> Result<EventResult> {
        let handler = match self {
            Subscriber::Ready(handler) => handler.clone(),
            Subscriber::Lazy { binding, container } => {
                log::trace!(
                    "Resolving listener {} for event {}",
                    binding.listener_name(),
                    binding.event_name()
                );
                let container = container.upgrade().ok_or_else(|| EventSystemError::ListenerResolution {
                    event_name: event.name().to_string(),
                    listener: binding.listener_name(),
                    reason: format!("container of app '{}' was dropped", binding.app_id()),
                })?;
                binding.resolve(&container)?
            }
        };
        handler.handle(event).await
    }

    /// Name used when reporting a failed delivery.
    fn label(&self, id: EventId) -> String {
        match self {
            Subscriber::Ready(_) => format!("subscription #{}", id),
            Subscriber::Lazy { binding, .. } => binding.listener_name().to_string(),
        }
    }
}

/// Simple handler for events with a specific name (Internal Helper)
struct SimpleHandler {
    handler: NamedHandlerFn,
}

#[async_trait]
impl AsyncEventHandler for SimpleHandler {
    async fn handle(&self, event: &dyn Event) -> Result<EventResult> {
        Ok((self.handler)(event).await)
    }
}

/// Handler for typed events that will check the type (Internal Helper)
struct TypedEventHandler<E: Event + 'static> {
    handler: TypedHandlerFn<E>,
}

#[async_trait]
impl<E: Event + 'static> AsyncEventHandler for TypedEventHandler<E> {
    async fn handle(&self, event: &dyn Event) -> Result<EventResult> {
        match event.as_any().downcast_ref::<E>() {
            Some(e) => Ok((self.handler)(e).await),
            None => Ok(EventResult::Continue),
        }
    }
}

/// Subscription tables (Internal, guarded by [`EventDispatcher`])
#[derive(Default)]
struct DispatchTable {
    named: HashMap<&'static str, Vec<(EventId, Subscriber)>>,
    typed: HashMap<TypeId, Vec<(EventId, Subscriber)>>,
    next_id: EventId,
    queue: VecDeque<Box<dyn Event>>,
}

impl DispatchTable {
    fn next_id(&mut self) -> EventId {
        self.next_id += 1;
        self.next_id
    }

    fn add_named(&mut self, name: &'static str, subscriber: Subscriber) -> EventId {
        let id = self.next_id();
        self.named.entry(name).or_default().push((id, subscriber));
        id
    }

    fn add_typed(&mut self, type_id: TypeId, subscriber: Subscriber) -> EventId {
        let id = self.next_id();
        self.typed.entry(type_id).or_default().push((id, subscriber));
        id
    }

    fn remove(&mut self, id: EventId) -> bool {
        let mut found = false;
        for subscribers in self.named.values_mut().chain(self.typed.values_mut()) {
            let len_before = subscribers.len();
            subscribers.retain(|(s_id, _)| *s_id != id);
            found |= subscribers.len() < len_before;
        }
        found
    }

    /// Subscribers for `event`: name matches first, then type matches.
    fn snapshot(&self, event: &dyn Event) -> Vec<(EventId, Subscriber)> {
        let by_name = self.named.get(event.name()).into_iter().flatten();
        let by_type = self
            .typed
            .get(&event.as_any().type_id())
            .into_iter()
            .flatten();
        by_name.chain(by_type).cloned().collect()
    }

    fn count(&self) -> usize {
        self.named.values().chain(self.typed.values()).map(Vec::len).sum()
    }
}

/// Host-wide event dispatcher.
///
/// Subscriptions are matched by event name or by event type. Lazy bindings
/// recorded by apps are resolved through the app's container only when a
/// matching event is published. Handlers are copied out of the table before
/// they run, so a handler may publish further events or add subscriptions.
pub struct EventDispatcher {
    table: Mutex<DispatchTable>,
}

// Manual Debug impl for EventDispatcher
impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher").finish_non_exhaustive()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(DispatchTable::default()),
        }
    }

    /// Subscribe a closure to events named `event_name`.
    pub async fn subscribe_named(&self, event_name: &'static str, handler: NamedHandlerFn) -> EventId {
        self.add_listener(event_name, Arc::new(SimpleHandler { handler })).await
    }

    /// Subscribe a handler object to events named `event_name`.
    pub async fn add_listener(&self, event_name: &'static str, handler: Arc<dyn AsyncEventHandler>) -> EventId {
        let mut table = self.table.lock().await;
        table.add_named(event_name, Subscriber::Ready(handler))
    }

    /// Subscribe a closure to events of type `E`.
    pub async fn subscribe<E: Event + 'static>(&self, handler: TypedHandlerFn<E>) -> EventId {
        let mut table = self.table.lock().await;
        table.add_typed(
            TypeId::of::<E>(),
            Subscriber::Ready(Arc::new(TypedEventHandler { handler })),
        )
    }

    /// Attach a registration-time binding; its listener is built from
    /// `container` on the first matching publish.
    pub async fn subscribe_binding(&self, binding: EventBinding, container: &Arc<Container>) -> EventId {
        let container = Arc::downgrade(container);
        let mut table = self.table.lock().await;
        log::debug!(
            "Binding {} -> {} (app '{}')",
            binding.event_name(),
            binding.listener_name(),
            binding.app_id()
        );
        table.add_typed(binding.event_type(), Subscriber::Lazy { binding, container })
    }

    pub async fn unsubscribe(&self, id: EventId) -> bool {
        let mut table = self.table.lock().await;
        table.remove(id)
    }

    /// Deliver `event` to every matching subscriber.
    ///
    /// Stops at the first handler returning [`EventResult::Stop`]. A failing
    /// subscriber does not keep later ones from running; once delivery ends,
    /// a single failure is returned unchanged and several are reported as
    /// [`EventSystemError::DeliveryFailed`].
    pub async fn publish(&self, event: &dyn Event) -> Result<EventResult> {
        let subscribers = {
            let table = self.table.lock().await;
            table.snapshot(event)
        };

        log::trace!("Publishing {} to {} subscriber(s)", event.name(), subscribers.len());
        let mut outcome = EventResult::Continue;
        let mut failures = Vec::new();
        for (id, subscriber) in &subscribers {
            match subscriber.deliver(event).await {
                Ok(EventResult::Stop) => {
                    outcome = EventResult::Stop;
                    break;
                }
                Ok(EventResult::Continue) => {}
                Err(e) => {
                    let label = subscriber.label(*id);
                    log::error!("Subscriber {} failed on {}: {}", label, event.name(), e);
                    failures.push((label, e));
                }
            }
        }

        match failures.len() {
            0 => Ok(outcome),
            1 => Err(failures.remove(0).1),
            _ => Err(EventSystemError::DeliveryFailed {
                event_name: event.name().to_string(),
                failures,
            }
            .into()),
        }
    }

    pub async fn queue_event(&self, event: Box<dyn Event>) {
        let mut table = self.table.lock().await;
        table.queue.push_back(event);
    }

    /// Publish queued events in FIFO order; returns how many were published.
    pub async fn process_queue(&self) -> Result<usize> {
        let mut count = 0;
        loop {
            let next = {
                let mut table = self.table.lock().await;
                table.queue.pop_front()
            };
            let Some(event) = next else { break };
            self.publish(&*event).await?;
            count += 1;
        }
        Ok(count)
    }

    pub async fn queue_size(&self) -> usize {
        self.table.lock().await.queue.len()
    }

    /// Total number of subscriptions.
    pub async fn subscriber_count(&self) -> usize {
        self.table.lock().await.count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to create synchronous handlers that are compatible with async system
pub fn sync_event_handler<F>(f: F) -> NamedHandlerFn
where
    F: Fn(&dyn Event) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}

/// Helper function to create typed synchronous handlers
pub fn sync_typed_handler<E, F>(f: F) -> TypedHandlerFn<E>
where
    E: Event + 'static,
    F: Fn(&E) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}
