//! Synchronous event fan-out Relay
//!
//! Relay delivers every event to all registered listeners, in registration
//! order, before `send` returns. Async consumers can take a stream instead.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T> {
    next_id: u64,
    callbacks: IndexMap<u64, Listener<T>>,
    streams: Vec<UnboundedSender<T>>,
}

/// Type-safe event relay with synchronous listeners.
///
/// Relays follow the `{source}_{event}_relay` naming pattern:
/// - `properties_changed_relay` - a store mutation happened
/// - `invalidated_relay` - a computed value went stale
///
/// # Examples
///
/// ```rust
/// use properties::dataflow::Relay;
///
/// let properties_changed_relay = Relay::new();
/// let subscription = properties_changed_relay.subscribe(|path: &String| {
///     println!("changed: {path}");
/// });
///
/// properties_changed_relay.send("user.name".to_string());
/// drop(subscription); // listener detached
/// ```
pub struct Relay<T> {
    listeners: Arc<Mutex<Listeners<T>>>,
}

impl<T> Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Relay {
            listeners: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                callbacks: IndexMap::new(),
                streams: Vec::new(),
            })),
        }
    }

    /// Registers a listener that runs on every event until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut listeners = self.listeners.lock();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.callbacks.insert(id, Arc::new(listener));
            id
        };

        let registry: Weak<Mutex<Listeners<T>>> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().callbacks.shift_remove(&id);
            }
        })
    }

    /// Creates a stream receiving a clone of every later event.
    ///
    /// The stream is pruned on the first send after its receiver is dropped.
    pub fn stream(&self) -> UnboundedReceiver<T> {
        let (sender, receiver) = unbounded();
        self.listeners.lock().streams.push(sender);
        receiver
    }

    /// Delivers `event` to every listener and stream.
    ///
    /// Listeners run after the registry lock is released, so they may
    /// subscribe, unsubscribe or send on this relay themselves.
    pub fn send(&self, event: T) {
        let callbacks: Vec<Listener<T>> = {
            let mut listeners = self.listeners.lock();
            listeners
                .streams
                .retain(|sender| sender.unbounded_send(event.clone()).is_ok());
            listeners.callbacks.values().cloned().collect()
        };

        for callback in callbacks {
            callback(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        let listeners = self.listeners.lock();
        listeners.callbacks.len() + listeners.streams.len()
    }
}

impl<T> Clone for Relay<T> {
    fn clone(&self) -> Self {
        Relay {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T> Default for Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

// Debug implementation that doesn't expose the listeners themselves
impl<T> std::fmt::Debug for Relay<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock();
        f.debug_struct("Relay")
            .field("callbacks", &listeners.callbacks.len())
            .field("streams", &listeners.streams.len())
            .finish()
    }
}

/// Keeps a relay listener registered. Dropping it detaches the listener.
#[must_use = "dropping a Subscription detaches its listener immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Keeps the listener registered for as long as the relay lives.
    pub fn detach(mut self) {
        self.unsubscribe.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
