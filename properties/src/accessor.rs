//! PropertyAccessor - reactive access to the page's property tree
//!
//! Reads hand out [`Computed`] values bound to the store: they recompute
//! lazily after a relevant change and can be turned into signals for UI
//! binding. Writes go straight to the store.

use crate::config::PropertiesConfig;
use crate::dataflow::Computed;
use crate::path::PropertyPath;
use crate::state::{Change, ContextStore};
use crate::tree::{self, PathError};
use crate::value::{ReadonlyProperties, ToValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("value could not be converted to JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Read-all, read-one and write-one over a [`ContextStore`].
///
/// # Examples
///
/// ```rust
/// use properties::{ContextStore, PropertyAccessor};
/// use serde_json::json;
/// use shared::{Context, View};
///
/// let store = ContextStore::with_context(Context::new(
///     "/users/1",
///     View::new("users.show", json!({ "user": { "name": "Jane" } })),
/// ));
/// let accessor = PropertyAccessor::new(store);
///
/// let name = accessor.property("user.name");
/// assert_eq!(name.get(), Some(json!("Jane")));
///
/// accessor.set_property("user.name", "Joe").unwrap();
/// assert_eq!(name.get(), Some(json!("Joe")));
/// ```
#[derive(Clone, Debug)]
pub struct PropertyAccessor {
    store: ContextStore,
    config: PropertiesConfig,
}

impl PropertyAccessor {
    pub fn new(store: ContextStore) -> Self {
        Self::with_config(store, PropertiesConfig::default())
    }

    pub fn with_config(store: ContextStore, config: PropertiesConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    pub fn config(&self) -> &PropertiesConfig {
        &self.config
    }

    /// Live read-only view of the whole property tree.
    ///
    /// `None` while the tree is absent. Any store change invalidates it.
    pub fn properties(&self) -> Computed<Option<ReadonlyProperties>> {
        let store = self.store.clone();
        Computed::new(self.store.changes(), |_: &Change| true, move || {
            store.with_properties(|properties| properties.cloned().map(ReadonlyProperties::new))
        })
    }

    /// Live value at a dot-path. `None` while the tree is absent or when the
    /// path doesn't resolve.
    pub fn property(&self, path: &str) -> Computed<Option<Value>> {
        self.property_at(self.config.parse_path(path))
    }

    /// Like [`property`](Self::property), for an already parsed path.
    ///
    /// Only changes at the same path, an ancestor or a descendant (and
    /// whole-context changes) invalidate it.
    pub fn property_at(&self, path: PropertyPath) -> Computed<Option<Value>> {
        let store = self.store.clone();
        let relevant_path = path.clone();
        Computed::new(
            self.store.changes(),
            move |change: &Change| change.affects(&relevant_path),
            move || {
                store.with_properties(|properties| {
                    properties.and_then(|properties| tree::get(properties, &path).cloned())
                })
            },
        )
    }

    /// Typed read. A value that doesn't deserialize into `T` reads as `None`.
    pub fn property_as<T>(&self, path: &str) -> Computed<Option<T>>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let path_text = path.to_string();
        self.property(path).map(move |value| {
            let value = value?;
            match serde_json::from_value(value) {
                Ok(typed) => Some(typed),
                Err(error) => {
                    log::warn!("Property `{path_text}` has an unexpected shape: {error}");
                    None
                }
            }
        })
    }

    /// Writes `value` at a dot-path.
    ///
    /// Does nothing while the tree is absent. Reactive references are read
    /// once and stored by value.
    pub fn set_property(&self, path: &str, value: impl ToValue) -> Result<(), PropertyError> {
        self.set_property_at(&self.config.parse_path(path), value)
    }

    pub fn set_property_at(
        &self,
        path: &PropertyPath,
        value: impl ToValue,
    ) -> Result<(), PropertyError> {
        let value = value.to_value()?;
        self.store
            .set_property(path, value, self.config.set_options())?;
        Ok(())
    }
}
