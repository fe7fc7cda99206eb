//! Lazily cached derived value
//!
//! Computed owns a derive function and a cache. A listener on a source relay
//! marks the cache stale; the next `get` recomputes. Every invalidation is
//! re-emitted on the Computed's own relay, so derived values chain.

use crate::dataflow::{Relay, Subscription};
use futures_signals::signal::{Mutable, Signal, SignalExt};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type Derive<T> = Box<dyn Fn() -> T + Send + Sync>;

struct Inner<T> {
    derive: Derive<T>,
    cache: Mutex<Option<T>>,
    dirty: Arc<AtomicBool>,
    // Bumped on every invalidation; drives `signal()`
    version: Mutable<u64>,
    invalidated_relay: Relay<()>,
    _source: Subscription,
}

/// Derived value that is recomputed on demand after its source changes.
///
/// # Examples
///
/// ```rust
/// use properties::dataflow::{Computed, Relay};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// let counter = Arc::new(AtomicU32::new(1));
/// let counter_changed_relay = Relay::new();
///
/// let doubled = Computed::new(&counter_changed_relay, |_: &()| true, {
///     let counter = Arc::clone(&counter);
///     move || counter.load(Ordering::SeqCst) * 2
/// });
/// assert_eq!(doubled.get(), 2);
///
/// counter.store(5, Ordering::SeqCst);
/// assert_eq!(doubled.get(), 2); // still cached
///
/// counter_changed_relay.send(());
/// assert_eq!(doubled.get(), 10);
/// ```
pub struct Computed<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a Computed invalidated by every event on `source` for which
    /// `relevant` returns true.
    pub fn new<E>(
        source: &Relay<E>,
        relevant: impl Fn(&E) -> bool + Send + Sync + 'static,
        derive: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self
    where
        E: Clone + Send + Sync + 'static,
    {
        let dirty = Arc::new(AtomicBool::new(true));
        let version = Mutable::new(0);
        let invalidated_relay = Relay::new();

        let subscription = source.subscribe({
            let dirty = Arc::clone(&dirty);
            let version = version.clone();
            let invalidated_relay = invalidated_relay.clone();
            move |event: &E| {
                if relevant(event) {
                    invalidate(&dirty, &version, &invalidated_relay);
                }
            }
        });

        Self {
            inner: Arc::new(Inner {
                derive: Box::new(derive),
                cache: Mutex::new(None),
                dirty,
                version,
                invalidated_relay,
                _source: subscription,
            }),
        }
    }

    /// Returns the current value, recomputing it first when stale.
    pub fn get(&self) -> T {
        let mut cache = self.inner.cache.lock();
        let stale = self.inner.dirty.swap(false, Ordering::SeqCst);
        if !stale {
            if let Some(value) = cache.as_ref() {
                return value.clone();
            }
        }

        log::trace!("Recomputing derived value");
        let value = (self.inner.derive)();
        *cache = Some(value.clone());
        value
    }

    /// Returns true when the next `get` will recompute.
    pub fn is_stale(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Forces recomputation on the next `get` and notifies dependents.
    pub fn invalidate(&self) {
        invalidate(&self.inner.dirty, &self.inner.version, &self.inner.invalidated_relay);
    }

    /// Registers a listener that runs whenever this value goes stale.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.inner.invalidated_relay.subscribe(move |_| listener())
    }

    /// Derives a new Computed from this one. The result goes stale
    /// whenever this value does.
    pub fn map<U>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Computed<U>
    where
        U: Clone + Send + Sync + 'static,
    {
        let source = self.clone();
        Computed::new(&self.inner.invalidated_relay, |_| true, move || f(source.get()))
    }

    /// Reactive signal of this value for UI binding.
    ///
    /// Emits the current value first, then a fresh value after each
    /// invalidation.
    pub fn signal(&self) -> impl Signal<Item = T> + use<T> {
        let this = self.clone();
        self.inner.version.signal().map(move |_| this.get())
    }
}

fn invalidate(dirty: &AtomicBool, version: &Mutable<u64>, invalidated_relay: &Relay<()>) {
    dirty.store(true, Ordering::SeqCst);
    *version.lock_mut() += 1;
    invalidated_relay.send(());
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Computed<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed")
            .field("cache", &*self.inner.cache.lock())
            .field("stale", &self.inner.dirty.load(Ordering::SeqCst))
            .finish()
    }
}
