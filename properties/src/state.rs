//! ContextStore - owned page state
//!
//! Holds the current page [`Context`] and announces every mutation on
//! `properties_changed_relay`. One store is created per application (or per
//! test) and passed to whatever needs it.

use crate::dataflow::Relay;
use crate::path::PropertyPath;
use crate::tree::{self, PathError, SetOptions};
use futures_signals::signal::{Mutable, Signal};
use serde_json::Value;
use shared::{Context, View};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A mutation of the store, as seen by listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// A context was installed or the view was replaced.
    ContextReplaced,
    /// The store was torn down.
    ContextCleared,
    /// One property was written.
    PropertySet(PropertyPath),
}

impl Change {
    /// Whether a value read at `path` may differ after this change.
    pub fn affects(&self, path: &PropertyPath) -> bool {
        match self {
            Change::ContextReplaced | Change::ContextCleared => true,
            Change::PropertySet(changed) => changed.overlaps(path),
        }
    }
}

/// Owned, cheaply cloneable container for the current page context.
///
/// Clones share the same state. The store starts empty; reads through it
/// resolve to `None` and writes are ignored until [`initialize`] is called.
///
/// [`initialize`]: ContextStore::initialize
#[derive(Clone, Default)]
pub struct ContextStore {
    context: Mutable<Option<Context>>,
    revision: Arc<AtomicU64>,
    properties_changed_relay: Relay<Change>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: Context) -> Self {
        let store = Self::new();
        store.initialize(context);
        store
    }

    /// Installs `context`, replacing any previous one.
    pub fn initialize(&self, context: Context) {
        log::debug!(
            "Initializing context for `{}` ({})",
            context.view.component,
            context.url
        );
        self.context.set(Some(context));
        self.commit(Change::ContextReplaced);
    }

    /// Swaps in the view of a new page visit. Ignored before `initialize`.
    pub fn replace_view(&self, view: View) {
        {
            let mut context = self.context.lock_mut();
            // A mutable deref marks the value changed, so check through a shared one
            if context.is_none() {
                log::debug!("Ignoring view `{}`: context not initialized", view.component);
                return;
            }
            if let Some(context) = context.as_mut() {
                log::debug!(
                    "Replacing view `{}` with `{}`",
                    context.view.component,
                    view.component
                );
                context.view = view;
            }
        }
        self.commit(Change::ContextReplaced);
    }

    /// Clears the context and returns it.
    pub fn teardown(&self) -> Option<Context> {
        let previous = self.context.replace(None);
        if previous.is_some() {
            log::debug!("Tearing down context");
            self.commit(Change::ContextCleared);
        }
        previous
    }

    pub fn is_initialized(&self) -> bool {
        self.context.lock_ref().is_some()
    }

    /// Counts committed mutations.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn context(&self) -> Option<Context> {
        self.context.get_cloned()
    }

    /// Runs `f` against the property tree, or `None` when it's absent.
    pub fn with_properties<R>(&self, f: impl FnOnce(Option<&Value>) -> R) -> R {
        let context = self.context.lock_ref();
        f((*context).as_ref().and_then(Context::properties))
    }

    /// Writes `value` at `path`.
    ///
    /// Returns `Ok(false)` without touching anything when the property tree
    /// is absent. Path failures are returned before any mutation.
    pub fn set_property(
        &self,
        path: &PropertyPath,
        value: Value,
        options: SetOptions,
    ) -> Result<bool, PathError> {
        {
            let mut context = self.context.lock_mut();

            // Validate through a shared borrow so a rejected write leaves
            // signal subscribers untouched
            match (*context).as_ref().and_then(Context::properties) {
                Some(properties) => tree::check(properties, path, options)?,
                None => {
                    log::debug!("Ignoring write to `{path}`: no property tree");
                    return Ok(false);
                }
            }

            let Some(properties) = (*context)
                .as_mut()
                .and_then(|context| context.view.properties_mut())
            else {
                return Ok(false);
            };
            tree::set(properties, path, value, options)?;
        }

        log::debug!("Set property `{path}`");
        self.commit(Change::PropertySet(path.clone()));
        Ok(true)
    }

    /// Every committed mutation is sent here, after the state lock is released.
    pub fn changes(&self) -> &Relay<Change> {
        &self.properties_changed_relay
    }

    /// Signal of whether a context is installed.
    pub fn initialized_signal(&self) -> impl Signal<Item = bool> + use<> {
        self.context.signal_ref(Option::is_some)
    }

    fn commit(&self, change: Change) {
        self.revision.fetch_add(1, Ordering::SeqCst);
        self.properties_changed_relay.send(change);
    }
}

impl std::fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextStore")
            .field("initialized", &self.is_initialized())
            .field("revision", &self.revision())
            .finish()
    }
}
