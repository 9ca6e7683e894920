//! Immutable merged configuration snapshots and path lookup

use crate::value::ConfigValue;
use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// The merged, key-normalized configuration for one name.
///
/// Cloning is cheap and shares the tree. There is no way to obtain a mutable
/// reference to the tree, so a snapshot never changes once built; a reload
/// produces a new snapshot instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    root: Arc<ConfigValue>,
}

impl Snapshot {
    /// Freeze `value`, normalizing its keys first.
    pub fn new(value: ConfigValue) -> Self {
        Self {
            root: Arc::new(value.normalized()),
        }
    }

    pub fn root(&self) -> &ConfigValue {
        &self.root
    }

    /// Whether two snapshots share the same tree (not just equal content).
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Top-level value for `key`.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.root.as_map()?.get(key)
    }

    /// Walk nested keys and indices.
    ///
    /// Returns `None` when a segment is missing or does not fit the value it
    /// is applied to; never fails. An index applied to a map looks up its
    /// decimal string form.
    pub fn lookup<I, S>(&self, path: I) -> Option<&ConfigValue>
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        path.into_iter()
            .try_fold(self.root.as_ref(), |value, segment| {
                let segment: PathSegment = segment.into();
                segment.apply(value)
            })
    }

    /// Deserialize the whole snapshot into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        let json = serde_json::to_value(self.root.as_ref()).map_err(|e| Error::Deserialize {
            message: e.to_string(),
        })?;
        serde_json::from_value(json).map_err(|e| Error::Deserialize {
            message: e.to_string(),
        })
    }
}

impl Serialize for Snapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

/// One step of a lookup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// Interpret a command-line style segment: all digits is an index,
    /// anything else a key.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<usize>() {
            Ok(i) if !raw.starts_with('+') => Self::Index(i),
            _ => Self::Key(raw.to_string()),
        }
    }

    fn apply<'v>(&self, value: &'v ConfigValue) -> Option<&'v ConfigValue> {
        match (self, value) {
            (Self::Key(k), ConfigValue::Map(map)) => map.get(k),
            (Self::Index(i), ConfigValue::Map(map)) => map.get(&i.to_string()),
            (Self::Index(i), ConfigValue::Sequence(items)) => items.get(*i),
            _ => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<&String> for PathSegment {
    fn from(s: &String) -> Self {
        Self::Key(s.clone())
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&PathSegment> for PathSegment {
    fn from(s: &PathSegment) -> Self {
        s.clone()
    }
}
