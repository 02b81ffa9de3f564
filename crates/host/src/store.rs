use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use saledash_core::RecordId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record store lock poisoned")]
    Poisoned,

    #[error("record already exists")]
    AlreadyExists,

    #[error("id sequence exhausted")]
    SequenceExhausted,
}

/// Key/value record store.
///
/// `modify` runs its closure under the store's write lock so a read, decide
/// and write cycle on one record cannot interleave with another.
pub trait RecordStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    /// Insert a record that must not exist yet.
    fn insert_new(&self, key: K, value: V) -> Result<(), StoreError>;

    /// All records, ordered by key.
    fn list(&self) -> Vec<V>;

    /// Mutate a record in place. `Ok(None)` when the key is unknown.
    fn modify<R, F>(&self, key: &K, f: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&mut V) -> R;
}

/// In-memory record store for tests/dev and single-process deployments.
#[derive(Debug)]
pub struct InMemoryRecordStore<K, V> {
    inner: RwLock<BTreeMap<K, V>>,
}

impl<K, V> InMemoryRecordStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryRecordStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecordStore<K, V> for InMemoryRecordStore<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    fn insert_new(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if map.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }
        map.insert(key, value);
        Ok(())
    }

    fn list(&self) -> Vec<V> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn modify<R, F>(&self, key: &K, f: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&mut V) -> R,
    {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get_mut(key).map(f))
    }
}

/// Per-model id allocator. Ids start at 1 and never repeat.
#[derive(Debug)]
pub struct IdSequence {
    last: AtomicU64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Fails once `u64::MAX` has been handed out or observed.
    pub fn next_id(&self) -> Result<RecordId, StoreError> {
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|prev| RecordId::new(prev + 1))
            .map_err(|_| StoreError::SequenceExhausted)
    }

    /// Make sure later allocations skip past an explicitly chosen id.
    pub fn observe(&self, id: RecordId) {
        self.last.fetch_max(id.get(), Ordering::SeqCst);
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
