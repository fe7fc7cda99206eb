//! Reactive dot-path access to a page's property tree
//!
//! A backend-driven page carries its bound state as a nested JSON object
//! (`context.view.properties`). This crate keeps that context in an owned
//! [`ContextStore`] and exposes it through a [`PropertyAccessor`]:
//!
//! - **`properties()`** - live, read-only view of the whole tree
//! - **`property(path)`** - live value at a dot-path such as `"user.name"`
//! - **`set_property(path, value)`** - write at a dot-path
//!
//! Reads are [`Computed`] values: cached, recomputed after a relevant change,
//! and convertible to signals for UI binding. Until a context is installed,
//! reads resolve to `None` and writes do nothing.

pub mod accessor;
pub mod config;
pub mod dataflow;
pub mod path;
pub mod state;
pub mod tree;
pub mod value;

pub use accessor::{PropertyAccessor, PropertyError};
pub use config::PropertiesConfig;
pub use dataflow::{Computed, Relay, Subscription};
pub use path::{PropertyPath, Segment};
pub use state::{Change, ContextStore};
pub use tree::{PathError, SetOptions};
pub use value::{ReadonlyProperties, ToValue};
