//! Per-name cache of merged snapshots and the file lists they came from

use crate::Result;
use crate::resolver::ConfigFileList;
use crate::snapshot::Snapshot;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Cached {
    snapshot: Snapshot,
    fingerprint: ConfigFileList,
}

/// One name's cache slot.
///
/// `build` serializes rebuilds and invalidations of this name; `cached` is
/// only ever replaced whole, so the snapshot and its fingerprint always
/// change together.
#[derive(Debug, Default)]
struct Slot {
    build: Mutex<()>,
    cached: RwLock<Option<Cached>>,
}

/// Holds at most one snapshot (and its fingerprint) per configuration name.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, name: &str) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().get(name) {
            return slot.clone();
        }
        self.slots
            .write()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn existing_slot(&self, name: &str) -> Option<Arc<Slot>> {
        self.slots.read().get(name).cloned()
    }

    /// The cached snapshot for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Snapshot> {
        let slot = self.existing_slot(name)?;
        let cached = slot.cached.read();
        cached.as_ref().map(|c| c.snapshot.clone())
    }

    /// The file list the cached snapshot for `name` was built from.
    pub fn fingerprint(&self, name: &str) -> Option<ConfigFileList> {
        let slot = self.existing_slot(name)?;
        let cached = slot.cached.read();
        cached.as_ref().map(|c| c.fingerprint.clone())
    }

    /// The cached snapshot, or the result of `build`, stored on success.
    ///
    /// At most one `build` runs per name at a time; callers that arrive while
    /// one is running wait for it and then use its result. Other names are
    /// not blocked. A failed build stores nothing.
    pub fn get_or_build<F>(&self, name: &str, build: F) -> Result<Snapshot>
    where
        F: FnOnce() -> Result<(Snapshot, ConfigFileList)>,
    {
        let slot = self.slot(name);
        if let Some(cached) = slot.cached.read().as_ref() {
            return Ok(cached.snapshot.clone());
        }

        let _building = slot.build.lock();
        if let Some(cached) = slot.cached.read().as_ref() {
            return Ok(cached.snapshot.clone());
        }

        let (snapshot, fingerprint) = build()?;
        *slot.cached.write() = Some(Cached {
            snapshot: snapshot.clone(),
            fingerprint,
        });
        Ok(snapshot)
    }

    /// Drop the cached snapshot for `name` if `stale` says its fingerprint is
    /// out of date. Returns whether anything was dropped.
    ///
    /// Waits for any in-flight build of `name`, so the decision is made
    /// against the snapshot that build produced.
    pub fn invalidate_if<F>(&self, name: &str, stale: F) -> bool
    where
        F: FnOnce(&ConfigFileList) -> bool,
    {
        let Some(slot) = self.existing_slot(name) else {
            return false;
        };
        let _building = slot.build.lock();
        let mut cached = slot.cached.write();
        match cached.as_ref() {
            Some(c) if stale(&c.fingerprint) => {
                *cached = None;
                true
            }
            _ => false,
        }
    }

    /// Unconditionally drop the snapshot for `name`.
    pub fn invalidate(&self, name: &str) -> bool {
        self.invalidate_if(name, |_| true)
    }

    /// Names that currently have a cached snapshot, sorted.
    pub fn names(&self) -> Vec<String> {
        let slots = self.slots.read();
        let mut names: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| slot.cached.read().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Drop every snapshot and fingerprint.
    pub fn clear(&self) {
        self.slots.write().clear();
    }
}
