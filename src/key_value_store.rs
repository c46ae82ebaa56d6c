//! The shared keyspace.
//!
//! A single logical map from key to a tagged value record. The store itself
//! is synchronization-free; callers share it behind a `tokio::sync::RwLock`
//! where read commands take the shared guard and every mutation (including
//! lazy expiry eviction) takes the exclusive guard.

use std::collections::{HashMap, VecDeque};

use jiff::Timestamp;

use crate::sorted_set::SortedSet;

/// Tagged payload of a value record. Commands dispatch exhaustively on the
/// variant; a mismatch is a WRONGTYPE-class error, never a mutation.
#[derive(Debug, PartialEq, Clone)]
pub enum DataType {
    String(String),
    List(VecDeque<String>),
    SortedSet(SortedSet),
}

impl DataType {
    /// Name reported by the TYPE command.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::String(_) => "string",
            DataType::List(_) => "list",
            DataType::SortedSet(_) => "zset",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Value {
    pub data: DataType,
    /// Absolute expiry. `None` means the record never expires.
    pub expiration: Option<Timestamp>,
    pub created: Timestamp,
}

impl Value {
    pub fn new(data: DataType) -> Self {
        Self {
            data,
            expiration: None,
            created: Timestamp::now(),
        }
    }

    pub fn with_expiration(data: DataType, expiration: Timestamp) -> Self {
        Self {
            data,
            expiration: Some(expiration),
            created: Timestamp::now(),
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        match self.expiration {
            Some(expiration) => now > expiration,
            None => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<String, Value>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Looks the key up without expiry awareness. Readers that need expiry
    /// semantics go through [`KeyValueStore::get_live`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Expiry-aware read: an expired record is reported as absent. The
    /// record itself is left in place so that readers holding only the
    /// shared guard stay read-only; eviction happens through
    /// [`KeyValueStore::evict_if_expired`] under the exclusive guard.
    pub fn get_live(&self, key: &str) -> Option<&Value> {
        let value = self.entries.get(key)?;

        if value.is_expired(Timestamp::now()) {
            return None;
        }

        Some(value)
    }

    /// Expiry-aware mutable read for read-modify-write commands. Evicts an
    /// expired record on discovery so the command observes an absent key.
    pub fn get_live_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.evict_if_expired(key);
        self.entries.get_mut(key)
    }

    /// Removes the record if its expiry has passed. Returns `true` when an
    /// eviction happened.
    pub fn evict_if_expired(&mut self, key: &str) -> bool {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|value| value.is_expired(Timestamp::now()));

        if expired {
            self.entries.remove(key);
        }

        expired
    }

    pub fn insert(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Live keys in no particular order.
    pub fn keys(&self) -> Vec<String> {
        let now = Timestamp::now();

        self.entries
            .iter()
            .filter(|(_, value)| !value.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
