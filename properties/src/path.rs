//! Tagged property paths
//!
//! A [`PropertyPath`] is the parsed form of a dot-path such as
//! `"user.addresses.0.city"`: an ordered list of object keys and array
//! indices.

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// Canonical decimal integers become indices, anything else stays a key.
    /// `"01"` is a key, matching how object keys and array indices differ.
    pub fn parse(raw: &str) -> Self {
        let canonical = raw == "0" || (!raw.starts_with('0') && !raw.starts_with('+'));
        match raw.parse::<usize>() {
            Ok(index) if canonical => Segment::Index(index),
            _ => Segment::Key(raw.to_string()),
        }
    }

    /// Text used when the segment addresses an object member.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Segment::Key(key) => Cow::Borrowed(key),
            Segment::Index(index) => Cow::Owned(index.to_string()),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    /// True when both segments can name the same object member, e.g.
    /// `Index(0)` and `Key("0")`.
    pub fn same_member(&self, other: &Segment) -> bool {
        self.as_key() == other.as_key()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(raw: &str) -> Self {
        Segment::parse(raw)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Location inside a property tree.
///
/// # Examples
///
/// ```rust
/// use properties::path::{PropertyPath, Segment};
///
/// let path = PropertyPath::parse("user.addresses.0.city");
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.segments()[2], Segment::Index(0));
/// assert_eq!(path.to_string(), "user.addresses.0.city");
///
/// let parent = PropertyPath::parse("user.addresses");
/// assert!(path.starts_with(&parent));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}

impl PropertyPath {
    pub const SEPARATOR: char = '.';

    /// The zero-segment path addressing the whole tree.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        Self::parse_with(raw, Self::SEPARATOR)
    }

    /// Splits `raw` on `separator`. Never fails: empty pieces become empty
    /// keys, the way a string split yields them.
    pub fn parse_with(raw: &str, separator: char) -> Self {
        Self {
            segments: raw.split(separator).map(Segment::parse).collect(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// The parent path and the leaf segment, or `None` for the root.
    pub fn split_last(&self) -> Option<(PropertyPath, &Segment)> {
        self.segments.split_last().map(|(leaf, parents)| {
            (
                PropertyPath {
                    segments: parents.to_vec(),
                },
                leaf,
            )
        })
    }

    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// True when `self` equals `prefix` or lies beneath it. Segments are
    /// compared by the member they name, so `Key("0")` matches `Index(0)`.
    pub fn starts_with(&self, prefix: &PropertyPath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self
                .segments
                .iter()
                .zip(&prefix.segments)
                .all(|(segment, other)| segment.same_member(other))
    }

    /// True when one path is an ancestor of, or equal to, the other.
    /// A write at one path can change what is read at the other.
    pub fn overlaps(&self, other: &PropertyPath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

impl From<&str> for PropertyPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for PropertyPath {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Vec<Segment>> for PropertyPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl FromIterator<Segment> for PropertyPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}
