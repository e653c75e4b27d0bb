use std::{collections::HashMap, hash::Hash, sync::Arc};

use arc_swap::ArcSwapOption;

use super::WeightTable;
use crate::snapshot::Snapshot;

struct CacheSlot<K> {
    snapshot_id: u64,
    tables: HashMap<K, Arc<WeightTable>>,
}

/// Weight tables of the latest snapshot, one per routing key.
///
/// Only one snapshot is remembered at a time. Storing a table for a newer
/// snapshot drops everything computed for the older one. Readers never lock;
/// writers replace the whole slot, so racing writers at worst redo each
/// other's work.
pub struct WeightCache<K> {
    slot: ArcSwapOption<CacheSlot<K>>,
}

impl<K: Eq + Hash + Clone> Default for WeightCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> WeightCache<K> {
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    pub fn get<G: ?Sized>(&self, snapshot: &Snapshot<G>, key: &K) -> Option<Arc<WeightTable>> {
        let slot = self.slot.load();
        match &*slot {
            Some(slot) if slot.snapshot_id == snapshot.id() => slot.tables.get(key).cloned(),
            _ => None,
        }
    }

    pub fn put<G: ?Sized>(&self, snapshot: &Snapshot<G>, key: K, table: Arc<WeightTable>) {
        let snapshot_id = snapshot.id();
        self.slot.rcu(|current| match current {
            Some(slot) if slot.snapshot_id == snapshot_id => {
                let mut tables = slot.tables.clone();
                tables.insert(key.clone(), table.clone());
                Some(Arc::new(CacheSlot {
                    snapshot_id,
                    tables,
                }))
            }
            // a caller still holding an older snapshot
            Some(slot) if slot.snapshot_id > snapshot_id => Some(slot.clone()),
            _ => {
                let mut tables = HashMap::with_capacity(1);
                tables.insert(key.clone(), table.clone());
                Some(Arc::new(CacheSlot {
                    snapshot_id,
                    tables,
                }))
            }
        });
    }

    pub fn clear(&self) {
        self.slot.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn table(weights: &[u64]) -> Arc<WeightTable> {
        Arc::new(WeightTable::from_weights(weights.iter().copied()))
    }

    #[test]
    fn hit_requires_same_snapshot_and_key() {
        let cache: WeightCache<&'static str> = WeightCache::new();
        let snapshot = Snapshot::<()>::new(vec![]);
        assert!(cache.get(&snapshot, &"a").is_none());

        cache.put(&snapshot, "a", table(&[1, 2]));
        assert_eq!(cache.get(&snapshot, &"a").unwrap().cumulative(), &[1, 3]);
        assert!(cache.get(&snapshot, &"b").is_none());

        cache.put(&snapshot, "b", table(&[4, 4]));
        assert!(cache.get(&snapshot, &"a").is_some());
        assert!(cache.get(&snapshot, &"b").unwrap().is_all_same_weight());
    }

    #[test]
    fn new_snapshot_evicts_old_tables() {
        let cache: WeightCache<u32> = WeightCache::new();
        let old = Snapshot::<()>::new(vec![]);
        let new = Snapshot::<()>::new(vec![]);
        cache.put(&old, 1, table(&[1]));
        assert!(cache.get(&new, &1).is_none());

        cache.put(&new, 1, table(&[2]));
        assert!(cache.get(&old, &1).is_none());
        assert_eq!(cache.get(&new, &1).unwrap().total(), 2);
    }

    #[test]
    fn stale_writer_does_not_clobber_newer_slot() {
        let cache: WeightCache<u32> = WeightCache::new();
        let old = Snapshot::<()>::new(vec![]);
        let new = Snapshot::<()>::new(vec![]);
        cache.put(&new, 1, table(&[2]));
        cache.put(&old, 1, table(&[1]));
        assert_eq!(cache.get(&new, &1).unwrap().total(), 2);
        assert!(cache.get(&old, &1).is_none());
    }

    #[test]
    fn concurrent_puts_keep_every_key() {
        let cache: Arc<WeightCache<u32>> = Arc::new(WeightCache::new());
        let snapshot = Arc::new(Snapshot::<()>::new(vec![]));
        let handles: Vec<_> = (0..8u32)
            .map(|key| {
                let cache = cache.clone();
                let snapshot = snapshot.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        cache.put(&*snapshot, key, table(&[key as u64 + 1]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        for key in 0..8u32 {
            assert_eq!(cache.get(&*snapshot, &key).unwrap().total(), key as u64 + 1);
        }
    }

    #[test]
    fn clear_forgets_everything() {
        let cache: WeightCache<u32> = WeightCache::new();
        let snapshot = Snapshot::<()>::new(vec![]);
        cache.put(&snapshot, 7, table(&[1]));
        cache.clear();
        assert!(cache.get(&snapshot, &7).is_none());
    }
}
