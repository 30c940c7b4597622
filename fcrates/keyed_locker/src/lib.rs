//! This crate provides asynchronous advisory locking keyed by
//! arbitrary names, using an inmemory lock table.
//!
//! A [`KeyedLocker`] hands out owned read/write guards for a
//! key; holders on the same key serialize per rwlock semantics,
//! while distinct keys proceed independently. Lock entries are
//! reclaimed when uncontended.
//!

#![warn(missing_docs)]
#![deny(unused_qualifications)]

use std::{hash::Hash, sync::Arc};

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// A guard holding an advisory lock over a key.
///
/// The lock is released on drop, and the table entry for the
/// key is reclaimed if no other holder or waiter remains.
#[derive(Debug)]
pub struct KeyGuard<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    inner: Option<GuardKind>,
    key: K,
    table: Arc<DashMap<K, Arc<RwLock<()>>>>,
}

#[derive(Debug)]
enum GuardKind {
    Read(OwnedRwLockReadGuard<()>),
    Write(OwnedRwLockWriteGuard<()>),
}

impl<K> Drop for KeyGuard<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        // Release the rwlock guard before inspecting contention.
        drop(self.inner.take());
        self.table.remove_if(&self.key, |_, lock| {
            // Sole strong ref is the table's own: no holder, no waiter.
            Arc::strong_count(lock) == 1 && lock.try_write().is_ok()
        });
    }
}

/// An asynchronous advisory locker over keys of type `K`.
///
/// As the lock table is inmemory, it cannot coordinate across
/// processes.
#[derive(Debug)]
pub struct KeyedLocker<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    table: Arc<DashMap<K, Arc<RwLock<()>>>>,
}

impl<K> Default for KeyedLocker<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for KeyedLocker<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    #[inline]
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K> KeyedLocker<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Create a new locker with an empty lock table.
    #[inline]
    pub fn new() -> Self {
        Self {
            table: Arc::new(DashMap::new()),
        }
    }

    /// Get or insert the lock entry for given key atomically.
    fn entry(&self, key: &K) -> Arc<RwLock<()>> {
        self.table
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Acquire a shared lock over given key.
    pub async fn read(&self, key: K) -> KeyGuard<K> {
        let lock = self.entry(&key);
        let guard = lock.read_owned().await;
        KeyGuard {
            inner: Some(GuardKind::Read(guard)),
            key,
            table: self.table.clone(),
        }
    }

    /// Acquire an exclusive lock over given key.
    pub async fn write(&self, key: K) -> KeyGuard<K> {
        let lock = self.entry(&key);
        let guard = lock.write_owned().await;
        KeyGuard {
            inner: Some(GuardKind::Write(guard)),
            key,
            table: self.table.clone(),
        }
    }

    /// Get the count of currently tracked keys.
    #[inline]
    pub fn tracked_key_count(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn writers_on_same_key_serialize() {
        let locker = KeyedLocker::new();
        let hits = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..4u8 {
            let locker = locker.clone();
            let hits = hits.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locker.write("k".to_string()).await;
                hits.lock().unwrap().push((i, "enter"));
                tokio::time::sleep(Duration::from_millis(5)).await;
                hits.lock().unwrap().push((i, "exit"));
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // Every enter must be followed by the same task's exit.
        let hits = hits.lock().unwrap();
        for pair in hits.chunks(2) {
            assert_eq!(pair[0].0, pair[1].0);
            assert_eq!(pair[0].1, "enter");
            assert_eq!(pair[1].1, "exit");
        }
    }

    #[tokio::test]
    async fn table_entries_reclaimed_when_uncontended() {
        let locker: KeyedLocker<String> = KeyedLocker::new();
        {
            let _g1 = locker.read("a".to_string()).await;
            let _g2 = locker.read("a".to_string()).await;
            assert_eq!(locker.tracked_key_count(), 1);
        }
        assert_eq!(locker.tracked_key_count(), 0);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block() {
        let locker = KeyedLocker::new();
        let _a = locker.write("a".to_string()).await;
        // Must not deadlock.
        let _b = locker.write("b".to_string()).await;
    }
}
