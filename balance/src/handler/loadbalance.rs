use std::{hash::Hash, sync::Arc};

use tracing::{debug, trace};

use crate::{
    random::{RandomSource, ThreadRandom},
    snapshot::GroupSource,
    weight::compute_weights,
};

pub trait LoadBalance<K> {
    /// Picks one group from the current snapshot of `groups`, or `None` when
    /// the list is empty.
    fn select<S>(&self, groups: &S, key: &K) -> Option<Arc<S::Group>>
    where
        S: GroupSource<K> + ?Sized;
}

/// Weighted random balancing.
///
/// Each group is picked with probability `weight / total`. When every weight
/// is the same, zero included, the pick is uniform.
#[derive(Debug, Default, Clone)]
pub struct RandomLoadBalance<R = ThreadRandom> {
    random: R,
}

impl RandomLoadBalance {
    pub fn new() -> Self {
        Self {
            random: ThreadRandom,
        }
    }
}

impl<R: RandomSource> RandomLoadBalance<R> {
    pub fn with_random(random: R) -> Self {
        Self { random }
    }
}

impl<K, R> LoadBalance<K> for RandomLoadBalance<R>
where
    K: Eq + Hash + Clone,
    R: RandomSource,
{
    fn select<S>(&self, groups: &S, key: &K) -> Option<Arc<S::Group>>
    where
        S: GroupSource<K> + ?Sized,
    {
        let snapshot = groups.snapshot();
        let elements = snapshot.elements();
        let length = elements.len();

        if length == 0 {
            return None;
        }

        if length == 1 {
            return Some(elements[0].clone());
        }

        let cache = groups.weight_cache();
        let table = match cache.get(&*snapshot, key) {
            Some(table) => {
                trace!("weight table hit, snapshot {}", snapshot.id());
                table
            }
            None => {
                let (table, cacheable) = compute_weights(elements, key);
                let table = Arc::new(table);
                debug!(
                    "weight table computed, snapshot {} total {} cacheable {}",
                    snapshot.id(),
                    table.total(),
                    cacheable
                );
                if cacheable {
                    cache.put(&*snapshot, key.clone(), table.clone());
                }
                table
            }
        };

        if table.is_all_same_weight() {
            let index = self.random.next_below(length as u64) as usize;
            return Some(elements[index].clone());
        }

        // not all equal and none negative, so total > 0
        let value = self.random.next_below(table.total());
        Some(elements[table.search(value)].clone())
    }
}
