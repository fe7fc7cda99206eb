//! Plain values going into, and read-only views coming out of, the tree.

use crate::dataflow::Computed;
use crate::path::PropertyPath;
use crate::tree;
use futures_signals::signal::Mutable;
use serde::Serialize;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;

/// Converts a value, or the current value of a reactive reference, into a
/// plain JSON value for storing in the property tree.
///
/// Reactive references are read once. The tree keeps a copy, not a link.
pub trait ToValue {
    fn to_value(&self) -> Result<Value, serde_json::Error>;
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, serde_json::Error> {
        Ok(self.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Result<Value, serde_json::Error> {
        (**self).to_value()
    }
}

impl<T: Serialize> ToValue for Mutable<T> {
    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&*self.lock_ref())
    }
}

impl<T> ToValue for Computed<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.get())
    }
}

impl<T: Serialize> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl<T: Serialize> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

macro_rules! plain_to_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value, serde_json::Error> {
                    serde_json::to_value(self)
                }
            }
        )*
    };
}

plain_to_value!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, str, String,
);

/// Immutable snapshot of a property tree.
///
/// Shares the tree through an `Arc` and only hands out shared references,
/// so nothing done with it reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadonlyProperties(Arc<Value>);

impl ReadonlyProperties {
    pub fn new(tree: Value) -> Self {
        Self(Arc::new(tree))
    }

    /// Resolves a dot-path inside the snapshot.
    pub fn get(&self, path: &str) -> Option<&Value> {
        tree::get(&self.0, &PropertyPath::parse(path))
    }

    pub fn get_at(&self, path: &PropertyPath) -> Option<&Value> {
        tree::get(&self.0, path)
    }

    /// An owned, independent copy of the tree.
    pub fn to_owned_value(&self) -> Value {
        Value::clone(&self.0)
    }
}

impl Deref for ReadonlyProperties {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl PartialEq<Value> for ReadonlyProperties {
    fn eq(&self, other: &Value) -> bool {
        *self.0 == *other
    }
}

impl ToValue for ReadonlyProperties {
    fn to_value(&self) -> Result<Value, serde_json::Error> {
        Ok(self.to_owned_value())
    }
}

impl Serialize for ReadonlyProperties {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
