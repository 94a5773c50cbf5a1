//! Identity bookkeeping for generated rows.
//!
//! The [`IdentityCache`] keeps book of which meta widget id belongs to which
//! slot, and which ids were released and may be handed out again. Lookup
//! follows a three-step order: an exact [`SlotKey`] match is preferred. If no
//! exact match exists, the oldest id released by a slot of the same template
//! widget is recycled. Only when that pool is empty is a fresh id minted.
//!
//! Released ids are parked, not reused within the pass that released them: the
//! generator allocates for the new window first and releases afterwards.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::row::RowKey;
use crate::template::WidgetId;

/// Identifier for one generated widget slot: a template widget in a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub row: RowKey,
    pub template: WidgetId,
}

impl SlotKey {
    #[inline]
    pub fn new(row: RowKey, template: WidgetId) -> Self {
        Self { row, template }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.row, self.template)
    }
}

/// Serializable contents of an [`IdentityCache`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub slots: Vec<SlotEntry>,
    pub released: IndexMap<WidgetId, Vec<WidgetId>>,
    pub next_seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEntry {
    pub row: RowKey,
    pub template_widget_id: WidgetId,
    pub meta_widget_id: WidgetId,
}

impl CacheSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Persists identity cache contents outside the generator so that ids
/// survive the generator being rebuilt.
pub trait WidgetCacheStore: Send + 'static {
    fn load(&self) -> Option<CacheSnapshot>;

    fn save(&mut self, snapshot: CacheSnapshot);
}

/// In-memory [`WidgetCacheStore`]. Clones share the same backing cell.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStore {
    inner: Arc<Mutex<Option<CacheSnapshot>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(snapshot))),
        }
    }

    /// Returns the last saved snapshot.
    pub fn snapshot(&self) -> Option<CacheSnapshot> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl WidgetCacheStore for MemoryCacheStore {
    fn load(&self) -> Option<CacheSnapshot> {
        self.snapshot()
    }

    fn save(&mut self, snapshot: CacheSnapshot) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }
}

/// Maps slots to stable meta widget ids and recycles released ids.
pub struct IdentityCache {
    prefix: String,
    slots: IndexMap<SlotKey, WidgetId>,
    released: IndexMap<WidgetId, VecDeque<WidgetId>>,
    next_seq: u64,
}

impl fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCache")
            .field("prefix", &self.prefix)
            .field("slots", &self.slots.len())
            .field("released", &self.released_count())
            .field("next_seq", &self.next_seq)
            .finish()
    }
}

impl IdentityCache {
    /// Creates an empty cache minting ids under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            slots: IndexMap::new(),
            released: IndexMap::new(),
            next_seq: 0,
        }
    }

    /// Restores a cache from a stored snapshot.
    pub fn from_snapshot(prefix: impl Into<String>, snapshot: CacheSnapshot) -> Self {
        let mut cache = Self::new(prefix);
        for entry in snapshot.slots {
            cache.slots.insert(
                SlotKey::new(entry.row, entry.template_widget_id),
                entry.meta_widget_id,
            );
        }
        for (template, ids) in snapshot.released {
            cache.released.insert(template, ids.into());
        }
        cache.next_seq = snapshot.next_seq;
        cache
    }

    pub fn get(&self, key: &SlotKey) -> Option<&WidgetId> {
        self.slots.get(key)
    }

    /// Pins `id` to `key`, returning the id previously held by the slot.
    pub fn set(&mut self, key: SlotKey, id: WidgetId) -> Option<WidgetId> {
        self.slots.insert(key, id)
    }

    /// Returns the id for `key`, recycling or minting one when the slot is
    /// new.
    pub fn acquire(&mut self, key: &SlotKey) -> WidgetId {
        if let Some(id) = self.slots.get(key) {
            return id.clone();
        }

        let recycled = self
            .released
            .get_mut(&key.template)
            .and_then(VecDeque::pop_front);
        let id = match recycled {
            Some(id) => {
                log::trace!("slot {key} recycles {id}");
                id
            }
            None => {
                let id = self.mint();
                log::trace!("slot {key} mints {id}");
                id
            }
        };
        self.slots.insert(key.clone(), id.clone());
        id
    }

    /// Detaches `key` from its id and parks the id for later reuse.
    pub fn release(&mut self, key: &SlotKey) -> Option<WidgetId> {
        let id = self.slots.shift_remove(key)?;
        self.released
            .entry(key.template.clone())
            .or_default()
            .push_back(id.clone());
        Some(id)
    }

    /// Number of distinct ids ever minted by this cache.
    pub fn minted(&self) -> u64 {
        self.next_seq
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn released_count(&self) -> usize {
        self.released.values().map(VecDeque::len).sum()
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            slots: self
                .slots
                .iter()
                .map(|(key, id)| SlotEntry {
                    row: key.row.clone(),
                    template_widget_id: key.template.clone(),
                    meta_widget_id: id.clone(),
                })
                .collect(),
            released: self
                .released
                .iter()
                .filter(|(_, ids)| !ids.is_empty())
                .map(|(template, ids)| (template.clone(), ids.iter().cloned().collect()))
                .collect(),
            next_seq: self.next_seq,
        }
    }

    fn mint(&mut self) -> WidgetId {
        self.next_seq += 1;
        WidgetId::new(format!("{}_{}", self.prefix, self.next_seq))
    }
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod tests;
