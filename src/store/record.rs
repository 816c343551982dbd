//! Document-collection store the storefront persists orders into.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, mpsc};

use serde_json::Value;

use crate::foundation::error::{MockupError, MockupResult};

/// One stored document.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: String,
    pub data: Value,
}

/// Single top-level field equality filter.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordFilter {
    pub field: String,
    pub equals: Value,
}

impl RecordFilter {
    pub fn field_eq(field: impl Into<String>, equals: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            equals: equals.into(),
        }
    }

    pub fn matches(&self, data: &Value) -> bool {
        data.get(&self.field) == Some(&self.equals)
    }
}

/// Live view of a collection.
///
/// Receives the full filtered snapshot once on subscribe and again after every change
/// to the collection. Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<Vec<Record>>,
}

impl Subscription {
    /// Block until the next snapshot. `None` once the store is gone.
    pub fn recv(&self) -> Option<Vec<Record>> {
        self.rx.recv().ok()
    }

    /// Next pending snapshot, if any.
    pub fn try_recv(&self) -> Option<Vec<Record>> {
        self.rx.try_recv().ok()
    }

    /// Drain pending snapshots and keep only the newest.
    pub fn latest(&self) -> Option<Vec<Record>> {
        self.rx.try_iter().last()
    }
}

/// Collection-oriented record store.
pub trait RecordStore: Send + Sync {
    fn subscribe(
        &self,
        collection: &str,
        filter: Option<RecordFilter>,
    ) -> MockupResult<Subscription>;

    /// Insert or replace a JSON object. Generates an id when `id` is `None` and returns
    /// the id that was written.
    fn put(&self, collection: &str, id: Option<&str>, data: Value) -> MockupResult<String>;

    /// Remove a record. Deleting an unknown id is not an error.
    fn delete(&self, collection: &str, id: &str) -> MockupResult<()>;
}

struct Subscriber {
    collection: String,
    filter: Option<RecordFilter>,
    tx: mpsc::Sender<Vec<Record>>,
}

#[derive(Default)]
struct StoreState {
    collections: BTreeMap<String, BTreeMap<String, Value>>,
    subscribers: Vec<Subscriber>,
}

impl StoreState {
    fn snapshot(&self, collection: &str, filter: Option<&RecordFilter>) -> Vec<Record> {
        let Some(records) = self.collections.get(collection) else {
            return Vec::new();
        };
        records
            .iter()
            .filter(|(_, data)| filter.is_none_or(|f| f.matches(data)))
            .map(|(id, data)| Record {
                id: id.clone(),
                data: data.clone(),
            })
            .collect()
    }

    fn notify(&mut self, collection: &str) {
        let mut subscribers = std::mem::take(&mut self.subscribers);
        subscribers.retain(|sub| {
            if sub.collection != collection {
                return true;
            }
            let snap = self.snapshot(collection, sub.filter.as_ref());
            sub.tx.send(snap).is_ok()
        });
        self.subscribers = subscribers;
    }
}

/// Process-local [`RecordStore`] for tests and offline hosts.
#[derive(Default)]
pub struct InMemoryRecordStore {
    state: Mutex<StoreState>,
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore").finish_non_exhaustive()
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch one record by id.
    pub fn get(&self, collection: &str, id: &str) -> MockupResult<Option<Value>> {
        let state = self.lock()?;
        Ok(state
            .collections
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned())
    }

    fn lock(&self) -> MockupResult<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| MockupError::store("record store lock poisoned"))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn subscribe(
        &self,
        collection: &str,
        filter: Option<RecordFilter>,
    ) -> MockupResult<Subscription> {
        let mut state = self.lock()?;
        let (tx, rx) = mpsc::channel();
        // Receiver is alive, so the initial send cannot fail.
        let _ = tx.send(state.snapshot(collection, filter.as_ref()));
        state.subscribers.push(Subscriber {
            collection: collection.to_string(),
            filter,
            tx,
        });
        Ok(Subscription { rx })
    }

    fn put(&self, collection: &str, id: Option<&str>, data: Value) -> MockupResult<String> {
        if !data.is_object() {
            return Err(MockupError::validation("records must be JSON objects"));
        }
        let id = match id {
            Some(id) if id.trim().is_empty() => {
                return Err(MockupError::validation("record id must be non-empty"));
            }
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };

        let mut state = self.lock()?;
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        state.notify(collection);
        tracing::debug!(collection, id = %id, "record written");
        Ok(id)
    }

    fn delete(&self, collection: &str, id: &str) -> MockupResult<()> {
        let mut state = self.lock()?;
        let removed = state
            .collections
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .is_some();
        if removed {
            state.notify(collection);
            tracing::debug!(collection, id, "record deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/record.rs"]
mod tests;
