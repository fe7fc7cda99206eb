//! Path resolution over a JSON property tree
//!
//! `get` never fails: anything that doesn't resolve is `None`. `set` checks
//! the whole path before touching the tree, so a failed write leaves it
//! unchanged.
//!
//! Writing past the end of an array pads the gap with `null`. The gap is
//! bounded by [`MAX_INDEX_GAP`].

use crate::path::{PropertyPath, Segment};
use serde_json::Value;
use thiserror::Error;

/// Largest number of `null`s a single write may pad an array with.
pub const MAX_INDEX_GAP: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("cannot write to the root of the property tree")]
    EmptyPath,

    #[error("parent `{path}` does not exist")]
    UnresolvedParent { path: String },

    #[error("`{path}` is not an object or array")]
    NotAContainer { path: String },

    #[error("`{path}` is an array and cannot take key `{key}`")]
    KeyOnArray { path: String, key: String },

    #[error("index {index} is too far past the end of `{path}`")]
    IndexOutOfRange { path: String, index: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Create missing intermediate objects/arrays instead of failing.
    pub create_missing_parents: bool,
}

/// Resolves `path` inside `tree`.
///
/// Objects are looked up by the segment's key text, so `Index(0)` also finds
/// a `"0"` member. Arrays only accept indices.
pub fn get<'a>(tree: &'a Value, path: &PropertyPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| child(node, segment))
}

fn child<'a>(node: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (node, segment) {
        (Value::Object(members), segment) => members.get(segment.as_key().as_ref()),
        (Value::Array(items), Segment::Index(index)) => items.get(*index),
        _ => None,
    }
}

/// Writes `value` at `path` and returns the value it replaced.
pub fn set(
    tree: &mut Value,
    path: &PropertyPath,
    value: Value,
    options: SetOptions,
) -> Result<Option<Value>, PathError> {
    check(tree, path, options)?;

    let Some((parent_path, leaf)) = path.split_last() else {
        return Err(PathError::EmptyPath);
    };

    let mut node = tree;
    for (position, segment) in parent_path.segments().iter().enumerate() {
        let next = path.segments().get(position + 1).unwrap_or(leaf);
        node = descend_mut(node, segment, next, options, || prefix(path, position))?;
    }

    assign(node, leaf, value, || parent_path.to_string())
}

/// Validates a write without mutating anything.
pub fn check(tree: &Value, path: &PropertyPath, options: SetOptions) -> Result<(), PathError> {
    let Some((parent_path, leaf)) = path.split_last() else {
        return Err(PathError::EmptyPath);
    };

    let mut node = tree;
    for (position, segment) in parent_path.segments().iter().enumerate() {
        let describe = || prefix(path, position);
        match child(node, segment) {
            Some(Value::Null) | None if options.create_missing_parents => {
                match (node, segment) {
                    (Value::Object(_), _) => {}
                    (Value::Array(items), Segment::Index(index)) => {
                        check_gap(items.len(), *index, || position_parent(path, position))?
                    }
                    (Value::Array(_), Segment::Key(key)) => {
                        return Err(PathError::KeyOnArray {
                            path: position_parent(path, position),
                            key: key.clone(),
                        });
                    }
                    _ => {
                        return Err(PathError::NotAContainer {
                            path: position_parent(path, position),
                        });
                    }
                }

                // Everything below here is created fresh, so its arrays start empty
                let fresh = position + 1;
                return path.segments()[fresh..]
                    .iter()
                    .enumerate()
                    .try_for_each(|(offset, segment)| match segment {
                        Segment::Index(index) => {
                            check_gap(0, *index, || position_parent(path, fresh + offset))
                        }
                        Segment::Key(_) => Ok(()),
                    });
            }
            Some(next) => node = next,
            None => return Err(PathError::UnresolvedParent { path: describe() }),
        }
    }

    match (node, leaf) {
        (Value::Object(_), _) => Ok(()),
        (Value::Array(items), Segment::Index(index)) => {
            check_gap(items.len(), *index, || parent_path.to_string())
        }
        (Value::Array(_), Segment::Key(key)) => Err(PathError::KeyOnArray {
            path: parent_path.to_string(),
            key: key.clone(),
        }),
        _ => Err(PathError::NotAContainer {
            path: parent_path.to_string(),
        }),
    }
}

// Rejects an index that would pad an array of `len` items with too many nulls
fn check_gap(len: usize, index: usize, describe: impl Fn() -> String) -> Result<(), PathError> {
    if index.saturating_sub(len) > MAX_INDEX_GAP {
        return Err(PathError::IndexOutOfRange {
            path: describe(),
            index,
        });
    }
    Ok(())
}

fn descend_mut<'a>(
    node: &'a mut Value,
    segment: &Segment,
    next: &Segment,
    options: SetOptions,
    describe: impl Fn() -> String,
) -> Result<&'a mut Value, PathError> {
    let slot = match (node, segment) {
        (Value::Object(members), segment) => {
            let key = segment.as_key();
            if options.create_missing_parents && !members.contains_key(key.as_ref()) {
                members.insert(key.to_string(), Value::Null);
            }
            members.get_mut(key.as_ref())
        }
        (Value::Array(items), Segment::Index(index)) => {
            if options.create_missing_parents && *index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            items.get_mut(*index)
        }
        _ => None,
    };

    let slot = slot.ok_or_else(|| PathError::UnresolvedParent { path: describe() })?;
    if options.create_missing_parents && slot.is_null() {
        *slot = empty_container_for(next);
    }
    Ok(slot)
}

fn assign(
    parent: &mut Value,
    leaf: &Segment,
    value: Value,
    describe: impl Fn() -> String,
) -> Result<Option<Value>, PathError> {
    match (parent, leaf) {
        (Value::Object(members), leaf) => Ok(members.insert(leaf.as_key().into_owned(), value)),
        (Value::Array(items), Segment::Index(index)) => {
            if let Some(slot) = items.get_mut(*index) {
                return Ok(Some(std::mem::replace(slot, value)));
            }
            // Sparse assignment: pad the gap with nulls
            items.resize(*index, Value::Null);
            items.push(value);
            Ok(None)
        }
        (Value::Array(_), Segment::Key(key)) => Err(PathError::KeyOnArray {
            path: describe(),
            key: key.clone(),
        }),
        _ => Err(PathError::NotAContainer { path: describe() }),
    }
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Index(_) => Value::Array(Vec::new()),
        Segment::Key(_) => Value::Object(serde_json::Map::new()),
    }
}

// Text of the first `position + 1` segments of `path`
fn prefix(path: &PropertyPath, position: usize) -> String {
    path.segments()[..=position]
        .iter()
        .cloned()
        .collect::<PropertyPath>()
        .to_string()
}

// Text of the first `position` segments, i.e. the node holding segment `position`
fn position_parent(path: &PropertyPath, position: usize) -> String {
    path.segments()[..position]
        .iter()
        .cloned()
        .collect::<PropertyPath>()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STRICT: SetOptions = SetOptions {
        create_missing_parents: false,
    };
    const CREATE: SetOptions = SetOptions {
        create_missing_parents: true,
    };

    fn path(raw: &str) -> PropertyPath {
        PropertyPath::parse(raw)
    }

    #[test]
    fn test_get_nested_values() {
        let tree = json!({ "a": { "b": 1, "list": [10, { "c": "x" }] } });

        assert_eq!(get(&tree, &path("a.b")), Some(&json!(1)));
        assert_eq!(get(&tree, &path("a.list.0")), Some(&json!(10)));
        assert_eq!(get(&tree, &path("a.list.1.c")), Some(&json!("x")));
        assert_eq!(get(&tree, &PropertyPath::root()), Some(&tree));
    }

    #[test]
    fn test_get_missing_is_none() {
        let tree = json!({ "a": { "b": 1, "list": [10] } });

        assert_eq!(get(&tree, &path("a.c")), None);
        assert_eq!(get(&tree, &path("a.b.c")), None);
        assert_eq!(get(&tree, &path("a.list.5")), None);
        assert_eq!(get(&tree, &path("a.list.length")), None);
        assert_eq!(get(&tree, &path("")), None);
    }

    #[test]
    fn test_get_numeric_object_keys() {
        let tree = json!({ "years": { "2024": "leap", "0": "zero" } });

        assert_eq!(get(&tree, &path("years.2024")), Some(&json!("leap")));
        assert_eq!(get(&tree, &path("years.0")), Some(&json!("zero")));
    }

    #[test]
    fn test_set_replaces_and_returns_previous() {
        let mut tree = json!({ "a": { "b": 1 } });

        let previous = set(&mut tree, &path("a.b"), json!(2), STRICT).unwrap();
        assert_eq!(previous, Some(json!(1)));

        let previous = set(&mut tree, &path("a.c"), json!("new"), STRICT).unwrap();
        assert_eq!(previous, None);
        assert_eq!(tree, json!({ "a": { "b": 2, "c": "new" } }));
    }

    #[test]
    fn test_set_missing_parent_fails_without_mutation() {
        let mut tree = json!({ "a": {} });

        let error = set(&mut tree, &path("a.b.c"), json!(1), STRICT).unwrap_err();
        assert_eq!(
            error,
            PathError::UnresolvedParent {
                path: "a.b".to_string()
            }
        );
        assert_eq!(tree, json!({ "a": {} }));
    }

    #[test]
    fn test_set_on_scalar_parent_fails() {
        let mut tree = json!({ "a": 5 });

        let error = set(&mut tree, &path("a.b"), json!(1), STRICT).unwrap_err();
        assert_eq!(
            error,
            PathError::NotAContainer {
                path: "a".to_string()
            }
        );
        assert_eq!(tree, json!({ "a": 5 }));
    }

    #[test]
    fn test_set_root_is_empty_path() {
        let mut tree = json!({});
        assert_eq!(
            set(&mut tree, &PropertyPath::root(), json!(1), STRICT),
            Err(PathError::EmptyPath)
        );
    }

    #[test]
    fn test_set_array_elements() {
        let mut tree = json!({ "list": [1, 2] });

        set(&mut tree, &path("list.0"), json!(9), STRICT).unwrap();
        set(&mut tree, &path("list.4"), json!(5), STRICT).unwrap();
        assert_eq!(tree, json!({ "list": [9, 2, null, null, 5] }));

        let error = set(&mut tree, &path("list.name"), json!(1), STRICT).unwrap_err();
        assert_eq!(
            error,
            PathError::KeyOnArray {
                path: "list".to_string(),
                key: "name".to_string()
            }
        );
    }

    #[test]
    fn test_set_far_past_the_end_is_rejected() {
        let mut tree = json!({ "list": [1] });

        let error = set(&mut tree, &path("list.18446744073709551615"), json!(1), STRICT).unwrap_err();
        assert_eq!(
            error,
            PathError::IndexOutOfRange {
                path: "list".to_string(),
                index: usize::MAX
            }
        );

        let error = set(&mut tree, &path("list.100000000000"), json!(1), STRICT).unwrap_err();
        assert!(matches!(error, PathError::IndexOutOfRange { index: 100000000000, .. }));
        assert_eq!(tree, json!({ "list": [1] }));
    }

    #[test]
    fn test_index_gap_limit() {
        let mut tree = json!({ "list": [1] });

        set(&mut tree, &path("list.1025"), json!(2), STRICT).unwrap();
        assert_eq!(tree["list"].as_array().unwrap().len(), 1026);

        let error = set(&mut tree, &path("list.2051"), json!(3), STRICT).unwrap_err();
        assert_eq!(
            error,
            PathError::IndexOutOfRange {
                path: "list".to_string(),
                index: 2051
            }
        );
        assert_eq!(tree["list"].as_array().unwrap().len(), 1026);
    }

    #[test]
    fn test_create_far_past_the_end_is_rejected() {
        let mut tree = json!({ "list": [1] });

        let error = set(&mut tree, &path("list.18446744073709551615.x"), json!(1), CREATE)
            .unwrap_err();
        assert_eq!(
            error,
            PathError::IndexOutOfRange {
                path: "list".to_string(),
                index: usize::MAX
            }
        );

        let error = set(&mut tree, &path("fresh.items.5000.name"), json!(1), CREATE).unwrap_err();
        assert_eq!(
            error,
            PathError::IndexOutOfRange {
                path: "fresh.items".to_string(),
                index: 5000
            }
        );
        assert_eq!(tree, json!({ "list": [1] }));
    }

    #[test]
    fn test_create_missing_parents() {
        let mut tree = json!({ "a": { "existing": true } });

        set(&mut tree, &path("a.b.list.1.name"), json!("x"), CREATE).unwrap();
        assert_eq!(
            tree,
            json!({ "a": { "existing": true, "b": { "list": [null, { "name": "x" }] } } })
        );
    }

    #[test]
    fn test_create_replaces_null_parents() {
        let mut tree = json!({ "a": null });

        set(&mut tree, &path("a.b"), json!(1), CREATE).unwrap();
        assert_eq!(tree, json!({ "a": { "b": 1 } }));
    }

    #[test]
    fn test_create_never_partially_writes() {
        let mut tree = json!({ "a": { "b": 3 } });

        let error = set(&mut tree, &path("a.b.c.d"), json!(1), CREATE).unwrap_err();
        assert_eq!(
            error,
            PathError::NotAContainer {
                path: "a.b".to_string()
            }
        );
        assert_eq!(tree, json!({ "a": { "b": 3 } }));
    }

    #[test]
    fn test_create_rejects_key_on_array() {
        let mut tree = json!({ "list": [] });

        let error = set(&mut tree, &path("list.name.x"), json!(1), CREATE).unwrap_err();
        assert_eq!(
            error,
            PathError::KeyOnArray {
                path: "list".to_string(),
                key: "name".to_string()
            }
        );
        assert_eq!(tree, json!({ "list": [] }));
    }
}
