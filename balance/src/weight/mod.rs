//! Cumulative weight tables.
//!
//! ```text
//!            random value
//! ─────────────────────────────────▶
//!                                  │
//!                                  ▼
//! ┌─────────────────┬─────────┬──────────────────────┬─────┬─────────────────┐
//! │element_0        │element_1│element_2             │...  │element_n        │
//! └─────────────────┴─────────┴──────────────────────┴─────┴─────────────────┘
//! ```
//!
//! Every element owns a span as wide as its weight. A draw in `[0, total)` lands
//! in exactly one span, found by binary search over the prefix sums.

use std::{sync::Arc, time::Duration};

use tracing::warn;

pub mod cache;

/// One selectable channel group as seen by the balancer.
pub trait Candidate<K: ?Sized>: Send + Sync {
    /// Raw weight for `key`. Negative values are read as 0.
    fn weight(&self, key: &K) -> i32;

    fn is_available(&self) -> bool {
        true
    }

    /// Period during which the weight ramps up linearly from 0.
    fn warm_up(&self) -> Duration {
        Duration::ZERO
    }

    fn up_time(&self) -> Duration {
        Duration::ZERO
    }
}

/// Prefix sums over the weights of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    cumulative: Box<[u64]>,
    all_same_weight: bool,
}

impl WeightTable {
    pub fn from_weights<I: IntoIterator<Item = u64>>(weights: I) -> Self {
        let mut cumulative = Vec::new();
        let mut all_same_weight = true;
        let mut first = None;
        let mut sum = 0u64;
        for weight in weights {
            match first {
                None => first = Some(weight),
                Some(first) => all_same_weight &= first == weight,
            }
            sum = sum.saturating_add(weight);
            cumulative.push(sum);
        }
        Self {
            cumulative: cumulative.into_boxed_slice(),
            all_same_weight,
        }
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// True when every element carries the same weight, zero included.
    /// When false, `total()` is strictly positive.
    pub fn is_all_same_weight(&self) -> bool {
        self.all_same_weight
    }

    pub fn cumulative(&self) -> &[u64] {
        &self.cumulative
    }

    /// Smallest index whose prefix sum is greater than `value`.
    /// `value` must lie in `[0, total())`.
    pub fn search(&self, value: u64) -> usize {
        debug_assert!(value < self.total());
        self.cumulative.partition_point(|&sum| sum <= value)
    }
}

/// Builds the table for `elements` under `key`.
///
/// The flag is false while any element is still warming up; such a table
/// depends on the clock and must not be cached.
pub fn compute_weights<K, G>(elements: &[Arc<G>], key: &K) -> (WeightTable, bool)
where
    K: ?Sized,
    G: Candidate<K> + ?Sized,
{
    let mut cacheable = true;
    let table = WeightTable::from_weights(elements.iter().map(|group| {
        let (weight, warm_up_complete) = effective_weight(&**group, key);
        cacheable &= warm_up_complete;
        weight
    }));
    (table, cacheable)
}

fn effective_weight<K, G>(group: &G, key: &K) -> (u64, bool)
where
    K: ?Sized,
    G: Candidate<K> + ?Sized,
{
    let raw = group.weight(key);
    let weight = if raw < 0 {
        warn!("negative weight {} normalized to 0", raw);
        0
    } else {
        raw as u64
    };
    let warm_up = group.warm_up();
    let up_time = group.up_time();
    if !up_time.is_zero() && up_time < warm_up {
        let scaled = weight as u128 * up_time.as_nanos() / warm_up.as_nanos();
        (scaled as u64, false)
    } else {
        (weight, up_time >= warm_up)
    }
}
