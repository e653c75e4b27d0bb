use std::{
    hash::Hash,
    ops::Deref,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use arc_swap::ArcSwap;
use tracing::info;

use crate::weight::{cache::WeightCache, Candidate};

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(1);

/// An immutable, point in time view of a group list.
///
/// Two snapshots with equal members are still different snapshots: the id is
/// handed out at construction and never reused.
#[derive(Debug)]
pub struct Snapshot<G: ?Sized> {
    id: u64,
    elements: Box<[Arc<G>]>,
}

impl<G: ?Sized> Snapshot<G> {
    pub fn new(elements: Vec<Arc<G>>) -> Self {
        Self {
            id: NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed),
            elements: elements.into_boxed_slice(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn elements(&self) -> &[Arc<G>] {
        &self.elements
    }
}

impl<G: ?Sized> Deref for Snapshot<G> {
    type Target = [Arc<G>];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

/// What the balancer needs from a group list: the current snapshot and the
/// cache that lives as long as the list does.
pub trait GroupSource<K> {
    type Group: Candidate<K> + ?Sized;

    fn snapshot(&self) -> Arc<Snapshot<Self::Group>>;

    fn weight_cache(&self) -> &WeightCache<K>;
}

/// Copy on write group list.
///
/// Readers load the current snapshot without locking. Every mutation builds a
/// new snapshot and publishes it with one atomic swap.
pub struct CandidateGroups<G: ?Sized, K> {
    snapshot: ArcSwap<Snapshot<G>>,
    weight_cache: WeightCache<K>,
}

impl<G, K> Default for CandidateGroups<G, K>
where
    G: Candidate<K> + ?Sized,
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(vec![])
    }
}

impl<G, K> CandidateGroups<G, K>
where
    G: Candidate<K> + ?Sized,
    K: Eq + Hash + Clone,
{
    pub fn new(elements: Vec<Arc<G>>) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot::new(elements)),
            weight_cache: WeightCache::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    pub fn replace_all(&self, elements: Vec<Arc<G>>) {
        self.update(|_| Some(elements.clone()));
    }

    /// Adds `group` unless the very same group is already listed.
    pub fn add_if_absent(&self, group: Arc<G>) -> bool {
        let mut added = false;
        self.update(|current| {
            if current.iter().any(|e| Arc::ptr_eq(e, &group)) {
                added = false;
                return None;
            }
            added = true;
            let mut next = current.to_vec();
            next.push(group.clone());
            Some(next)
        });
        added
    }

    pub fn remove(&self, group: &Arc<G>) -> bool {
        let mut removed = false;
        self.update(|current| {
            let next: Vec<Arc<G>> = current
                .iter()
                .filter(|e| !Arc::ptr_eq(*e, group))
                .cloned()
                .collect();
            removed = next.len() != current.len();
            removed.then_some(next)
        });
        removed
    }

    /// Drops every group whose `is_available` reports false.
    pub fn retain_available(&self) -> usize {
        let mut dropped = 0;
        self.update(|current| {
            let next: Vec<Arc<G>> = current.iter().filter(|e| e.is_available()).cloned().collect();
            dropped = current.len() - next.len();
            (dropped > 0).then_some(next)
        });
        dropped
    }

    /// Republishes the same members under a new identity, so weight tables
    /// computed before a weight change are no longer served.
    pub fn refresh(&self) {
        self.update(|current| Some(current.to_vec()));
    }

    /// Ids are taken inside the swap, so snapshots are published in id order.
    fn update<F>(&self, mut f: F)
    where
        F: FnMut(&Snapshot<G>) -> Option<Vec<Arc<G>>>,
    {
        let mut published = None;
        self.snapshot.rcu(|current| match f(current) {
            Some(next) => {
                let next = Arc::new(Snapshot::new(next));
                published = Some((next.id(), next.len()));
                next
            }
            None => {
                published = None;
                current.clone()
            }
        });
        if let Some((id, len)) = published {
            info!("publish group snapshot {} with {} groups", id, len);
        }
    }
}

impl<G, K> GroupSource<K> for CandidateGroups<G, K>
where
    G: Candidate<K> + ?Sized,
    K: Eq + Hash + Clone,
{
    type Group = G;

    fn snapshot(&self) -> Arc<Snapshot<G>> {
        self.snapshot.load_full()
    }

    fn weight_cache(&self) -> &WeightCache<K> {
        &self.weight_cache
    }
}
