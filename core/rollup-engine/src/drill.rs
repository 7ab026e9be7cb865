//! FILENAME: core/rollup-engine/src/drill.rs
//! Drill-Down Cache - lazily computed detail lists, one per group key.
//!
//! Each key owns a write-once cell. The map lock is held only long enough to
//! fetch or insert that cell; the computation itself runs inside the cell, so:
//! - concurrent first requests for the same key compute exactly once and
//!   every caller receives the same list
//! - requests for different keys never wait on each other
//!
//! Entries are never evicted: the row set they derive from is immutable.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use crate::definition::GroupKey;

type Slot<T> = Arc<OnceCell<Arc<Vec<T>>>>;

pub struct DrillCache<T> {
    entries: Mutex<FxHashMap<GroupKey, Slot<T>>>,
}

impl<T> DrillCache<T> {
    pub fn new() -> Self {
        DrillCache {
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    // A panic inside a computation never leaves the map half-written.
    fn lock(&self) -> MutexGuard<'_, FxHashMap<GroupKey, Slot<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &str) -> Slot<T> {
        let mut entries = self.lock();
        if let Some(slot) = entries.get(key) {
            return Arc::clone(slot);
        }
        let slot: Slot<T> = Arc::new(OnceCell::new());
        entries.insert(GroupKey::from(key), Arc::clone(&slot));
        slot
    }

    /// Returns the cached list for `key`, computing it with `compute` on the
    /// first request. Late callers block until the first computation lands.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Arc<Vec<T>>
    where
        F: FnOnce() -> Vec<T>,
    {
        let slot = self.slot(key);
        Arc::clone(slot.get_or_init(|| Arc::new(compute())))
    }

    /// The cached list for `key`, if one has been computed.
    pub fn get(&self, key: &str) -> Option<Arc<Vec<T>>> {
        let slot = self.lock().get(key).cloned()?;
        slot.get().cloned()
    }

    /// Keys with a completed entry, sorted.
    pub fn cached_keys(&self) -> Vec<GroupKey> {
        let mut keys: Vec<GroupKey> = self
            .lock()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of completed entries.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for DrillCache<T> {
    fn default() -> Self {
        DrillCache::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_computes_once_per_key() {
        let cache: DrillCache<u32> = DrillCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_compute("A", || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![3, 2, 1]
        });
        let second = cache.get_or_compute("A", || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![9]
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, vec![3, 2, 1]);
    }

    #[test]
    fn test_get_and_keys() {
        let cache: DrillCache<u32> = DrillCache::new();
        assert!(cache.get("A").is_none());
        assert!(cache.is_empty());

        cache.get_or_compute("B", Vec::new);
        cache.get_or_compute("A", || vec![1]);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.cached_keys(), vec![GroupKey::from("A"), GroupKey::from("B")]);
        assert_eq!(cache.get("A").as_deref(), Some(&vec![1]));
    }

    #[test]
    fn test_concurrent_same_key_computes_once() {
        let cache: Arc<DrillCache<usize>> = Arc::new(DrillCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_compute("shared", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        vec![1, 2, 3]
                    })
                })
            })
            .collect();

        let results: Vec<Arc<Vec<usize>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
    }

    #[test]
    fn test_different_keys_do_not_block_each_other() {
        let cache: Arc<DrillCache<u32>> = Arc::new(DrillCache::new());
        let slow_started = Arc::new(Barrier::new(2));

        let slow = {
            let cache = Arc::clone(&cache);
            let slow_started = Arc::clone(&slow_started);
            thread::spawn(move || {
                cache.get_or_compute("slow", || {
                    slow_started.wait();
                    thread::sleep(Duration::from_millis(200));
                    vec![1]
                })
            })
        };

        slow_started.wait();
        // "slow" is mid-computation; "fast" must still complete first
        let fast = cache.get_or_compute("fast", || vec![2]);
        assert_eq!(*fast, vec![2]);
        assert!(cache.get("slow").is_none());

        assert_eq!(*slow.join().unwrap(), vec![1]);
    }
}
