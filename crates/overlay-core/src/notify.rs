//! Change-notification registry for `on_load` callbacks

use crate::error::CallbackError;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Why a callback is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent<'a> {
    /// The immediate call made when the callback is registered.
    Registered,
    /// A change was detected for the named configuration.
    Changed { name: &'a str },
}

/// A registered callback. Registering the same `Arc` twice still fires it
/// once per change.
pub type OnLoadCallback =
    Arc<dyn Fn(&LoadEvent<'_>) -> std::result::Result<(), CallbackError> + Send + Sync>;

/// Wrap a closure as an [`OnLoadCallback`].
pub fn callback<F>(f: F) -> OnLoadCallback
where
    F: Fn(&LoadEvent<'_>) -> std::result::Result<(), CallbackError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What a callback is subscribed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Topic {
    Any,
    Name(String),
}

/// Callbacks keyed by configuration name, or by "any name".
#[derive(Default)]
pub struct CallbackRegistry {
    topics: Mutex<HashMap<Topic, Vec<OnLoadCallback>>>,
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics = self.topics.lock();
        f.debug_struct("CallbackRegistry")
            .field("topics", &topics.len())
            .finish()
    }
}

fn same_callback(a: &OnLoadCallback, b: &OnLoadCallback) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `cb` once with [`LoadEvent::Registered`], then register it
    /// under every name in `names` (or under "any" when `names` is empty).
    ///
    /// If the initial call fails, nothing is registered.
    pub fn subscribe(&self, names: &[&str], cb: OnLoadCallback) -> Result<()> {
        cb(&LoadEvent::Registered).map_err(|source| Error::Callback {
            name: names.join(","),
            source,
        })?;

        let mut topics = self.topics.lock();
        if names.is_empty() {
            topics.entry(Topic::Any).or_default().push(cb);
        } else {
            for name in names {
                topics
                    .entry(Topic::Name(name.to_string()))
                    .or_default()
                    .push(cb.clone());
            }
        }
        Ok(())
    }

    /// Callbacks to run for a change of `name`: "any" subscribers first, then
    /// `name` subscribers, each in registration order with duplicates removed.
    pub fn callbacks_for(&self, name: &str) -> Vec<OnLoadCallback> {
        let topics = self.topics.lock();
        let mut out: Vec<OnLoadCallback> = Vec::new();
        let any = topics.get(&Topic::Any).into_iter().flatten();
        let named = topics
            .get(&Topic::Name(name.to_string()))
            .into_iter()
            .flatten();
        for cb in any.chain(named) {
            if !out.iter().any(|seen| same_callback(seen, cb)) {
                out.push(cb.clone());
            }
        }
        out
    }

    /// Invoke every callback for `name`.
    ///
    /// Runs without holding the registry lock, so callbacks may subscribe or
    /// read configuration. The first failure stops the round and is returned.
    pub fn fire(&self, name: &str) -> Result<()> {
        let callbacks = self.callbacks_for(name);
        if !callbacks.is_empty() {
            tracing::debug!(name, count = callbacks.len(), "Firing on_load callbacks");
        }
        for cb in callbacks {
            cb(&LoadEvent::Changed { name }).map_err(|source| {
                tracing::warn!(name, error = %source, "on_load callback failed");
                Error::Callback {
                    name: name.to_string(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}
