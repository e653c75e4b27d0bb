use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use arc_swap::ArcSwap;
use tracing::debug;

use crate::{config::BalanceConfig, directory::ServiceDirectory, weight::Candidate};

/// All connections to one remote address.
///
/// Weights are kept per service directory; a directory without its own weight
/// gets the configured default.
pub struct ChannelGroup {
    address: SocketAddr,
    default_weight: i32,
    max_weight: i32,
    weights: ArcSwap<HashMap<ServiceDirectory, i32>>,
    warm_up: Duration,
    timestamp: Instant,
    available: AtomicBool,
}

impl ChannelGroup {
    /// Weights are kept in `[0, max_weight]`; a negative `max_weight` counts as 0.
    pub fn new(address: SocketAddr, config: &BalanceConfig) -> Arc<Self> {
        let max_weight = config.max_weight().max(0);
        Arc::new(Self {
            address,
            default_weight: config.default_weight().clamp(0, max_weight),
            max_weight,
            weights: ArcSwap::from_pointee(HashMap::new()),
            warm_up: config.warm_up(),
            timestamp: Instant::now(),
            available: AtomicBool::new(true),
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Stores `weight` for `directory`, clamped to `[0, max_weight]`.
    pub fn set_weight(&self, directory: &ServiceDirectory, weight: i32) {
        let weight = weight.clamp(0, self.max_weight);
        self.weights.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(directory.clone(), weight);
            next
        });
        debug!("{} weight of {} set to {}", self.address, directory, weight);
    }

    pub fn remove_weight(&self, directory: &ServiceDirectory) {
        self.weights.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.remove(directory);
            next
        });
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
}

impl Candidate<ServiceDirectory> for ChannelGroup {
    fn weight(&self, directory: &ServiceDirectory) -> i32 {
        self.weights
            .load()
            .get(directory)
            .copied()
            .unwrap_or(self.default_weight)
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    fn warm_up(&self) -> Duration {
        self.warm_up
    }

    fn up_time(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

impl Debug for ChannelGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelGroup")
            .field("address", &self.address)
            .field("available", &self.is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Arc<ChannelGroup> {
        ChannelGroup::new(
            "127.0.0.1:18090".parse().unwrap(),
            &BalanceConfig::default().set_warm_up(Duration::ZERO),
        )
    }

    #[test]
    fn weight_falls_back_to_default() {
        let group = group();
        let directory = ServiceDirectory::new("test", "EchoService", "1.0.0");
        assert_eq!(group.weight(&directory), crate::config::DEFAULT_WEIGHT);

        group.set_weight(&directory, 7);
        assert_eq!(group.weight(&directory), 7);
        let other = ServiceDirectory::new("test", "EchoService", "2.0.0");
        assert_eq!(group.weight(&other), crate::config::DEFAULT_WEIGHT);

        group.remove_weight(&directory);
        assert_eq!(group.weight(&directory), crate::config::DEFAULT_WEIGHT);
    }

    #[test]
    fn weight_is_clamped() {
        let group = group();
        let directory = ServiceDirectory::new("test", "EchoService", "1.0.0");
        group.set_weight(&directory, 1000);
        assert_eq!(group.weight(&directory), crate::config::MAX_WEIGHT);
        group.set_weight(&directory, -4);
        assert_eq!(group.weight(&directory), 0);
    }

    #[test]
    fn availability_toggles() {
        let group = group();
        assert!(group.is_available());
        group.set_available(false);
        assert!(!group.is_available());
    }

    #[test]
    fn unvalidated_config_never_panics() {
        let config: BalanceConfig = balance_common::config::yaml::get_yaml_by_context(
            "max_weight: -1\ndefault_weight: 5\nwarm_up_ms: 0\n",
        )
        .unwrap();
        let group = ChannelGroup::new("127.0.0.1:18091".parse().unwrap(), &config);
        let directory = ServiceDirectory::new("test", "EchoService", "1.0.0");
        assert_eq!(group.weight(&directory), 0);
        group.set_weight(&directory, 10);
        assert_eq!(group.weight(&directory), 0);
    }

    #[test]
    fn default_weight_is_clamped_to_max() {
        let config: BalanceConfig = balance_common::config::yaml::get_yaml_by_context(
            "default_weight: 500\nwarm_up_ms: 0\n",
        )
        .unwrap();
        let group = ChannelGroup::new("127.0.0.1:18092".parse().unwrap(), &config);
        let directory = ServiceDirectory::new("test", "EchoService", "1.0.0");
        assert_eq!(group.weight(&directory), crate::config::MAX_WEIGHT);
    }
}
