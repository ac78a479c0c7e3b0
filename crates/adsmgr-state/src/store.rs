//! Optimistic Update Store.
//!
//! One entry per overlay key (an ad id for aggregated rows, otherwise the
//! platform id). Entries expire after the TTL whether or not the sweep has
//! run; [`OptimisticStore::sweep_expired`] only reclaims memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adsmgr_core::EntityType;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticEntry {
    pub fields: Map<String, Value>,
    pub entity_type: EntityType,
    pub updated_at: DateTime<Utc>,
}

/// Cloneable handle over the shared overlay map.
#[derive(Clone)]
pub struct OptimisticStore {
    entries: Arc<DashMap<String, OptimisticEntry>>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl std::fmt::Debug for OptimisticStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimisticStore")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl OptimisticStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Merges `fields` over the entry for `key`, creating it if absent, and
    /// restarts its TTL.
    pub fn update_optimistic(&self, key: &str, fields: Map<String, Value>, entity_type: EntityType) {
        let now = self.clock.now();
        let mut entry = self
            .entries
            .entry(key.to_owned())
            .or_insert_with(|| OptimisticEntry {
                fields: Map::new(),
                entity_type,
                updated_at: now,
            });
        entry.fields.extend(fields);
        entry.entity_type = entity_type;
        entry.updated_at = now;
    }

    /// Returns `true` if an entry was removed.
    pub fn clear_optimistic(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear_all_optimistic(&self) {
        self.entries.clear();
    }

    /// Live overlays of one entity type, keyed by overlay key.
    #[must_use]
    pub fn get_updates(&self, entity_type: EntityType) -> HashMap<String, Map<String, Value>> {
        let now = self.clock.now();
        self.entries
            .iter()
            .filter(|e| e.entity_type == entity_type && self.is_live(e.value(), now))
            .map(|e| (e.key().clone(), e.fields.clone()))
            .collect()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<OptimisticEntry> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|e| self.is_live(e.value(), now))
            .map(|e| e.value().clone())
    }

    /// Removes expired entries and returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = self.is_live(entry, now);
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "swept expired overlays");
        }
        removed
    }

    /// Number of stored entries, expired ones included until swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_live(&self, entry: &OptimisticEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.updated_at) < self.ttl
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
