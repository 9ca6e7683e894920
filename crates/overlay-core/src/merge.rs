//! Overlay merge ("weave") of parsed file contents

use crate::snapshot::Snapshot;
use crate::value::{ConfigMap, ConfigValue};
use serde::{Deserialize, Serialize};

/// How two sequences at the same key combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceMerge {
    /// The later sequence replaces the earlier one outright.
    #[default]
    Replace,
    /// The later sequence is appended to the earlier one.
    Concat,
}

/// Deep-merge `other` into `base`.
///
/// - map + map: merged key by key, recursively; keys only in `base` survive
/// - sequence + sequence: per `mode`
/// - anything else: `other` wins
pub fn weave(base: &mut ConfigValue, other: &ConfigValue, mode: SequenceMerge) {
    match (base, other) {
        (ConfigValue::Map(base_map), ConfigValue::Map(other_map)) => {
            for (key, other_val) in other_map.iter() {
                if let Some(base_val) = base_map.get_mut(key) {
                    weave(base_val, other_val, mode);
                } else {
                    base_map.insert(key, other_val.clone());
                }
            }
        }
        (ConfigValue::Sequence(base_items), ConfigValue::Sequence(other_items))
            if mode == SequenceMerge::Concat =>
        {
            base_items.extend(other_items.iter().cloned());
        }
        (base, other) => {
            *base = other.clone();
        }
    }
}

/// Merge contents in ascending precedence order into a frozen snapshot.
///
/// `None` entries (missing files) and empty documents contribute nothing.
pub fn merge<'a, I>(contents: I, mode: SequenceMerge) -> Snapshot
where
    I: IntoIterator<Item = Option<&'a ConfigValue>>,
{
    let mut acc = ConfigValue::Map(ConfigMap::new());
    for content in contents.into_iter().flatten() {
        if content.is_null() {
            continue;
        }
        weave(&mut acc, content, mode);
    }
    Snapshot::new(acc)
}
