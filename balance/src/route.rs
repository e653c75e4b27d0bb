use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{info, warn};

use crate::{
    config::BalanceConfig,
    directory::ServiceDirectory,
    error::BalanceError,
    group::ChannelGroup,
    handler::loadbalance::{LoadBalance, RandomLoadBalance},
    snapshot::CandidateGroups,
};

pub type DirectoryGroups = CandidateGroups<ChannelGroup, ServiceDirectory>;

/// Client side routing: one group list per service directory, and the
/// balancer that picks from it.
pub struct Route<L = RandomLoadBalance> {
    config: BalanceConfig,
    load_balance: L,
    directory_map: RwLock<HashMap<ServiceDirectory, Arc<DirectoryGroups>>>,
}

impl Route {
    pub fn new(config: BalanceConfig) -> Self {
        Self::with_load_balance(config, RandomLoadBalance::new())
    }
}

impl<L: LoadBalance<ServiceDirectory>> Route<L> {
    pub fn with_load_balance(config: BalanceConfig, load_balance: L) -> Self {
        Self {
            config,
            load_balance,
            directory_map: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Group list of `directory`, created empty on first use.
    pub fn groups(&self, directory: &ServiceDirectory) -> Arc<DirectoryGroups> {
        let directory_map_read = self
            .directory_map
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(groups) = directory_map_read.get(directory) {
            return groups.clone();
        }
        drop(directory_map_read);
        let mut directory_map_write = self
            .directory_map
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        directory_map_write
            .entry(directory.clone())
            .or_insert_with(|| {
                info!("create group list for {}", directory);
                Arc::new(DirectoryGroups::default())
            })
            .clone()
    }

    /// Replaces the members of `directory` with `groups`, as pushed by the
    /// registry.
    pub fn notify(&self, directory: &ServiceDirectory, groups: Vec<Arc<ChannelGroup>>) {
        info!("{} now has {} groups", directory, groups.len());
        self.groups(directory).replace_all(groups);
    }

    /// Changes the weight `group` carries for `directory`. The list is
    /// republished so the next selection sees the new weight.
    pub fn set_weight(&self, directory: &ServiceDirectory, group: &ChannelGroup, weight: i32) {
        group.set_weight(directory, weight);
        self.groups(directory).refresh();
    }

    /// Unknown directories are not registered by a lookup.
    pub fn select(&self, directory: &ServiceDirectory) -> crate::Result<Arc<ChannelGroup>> {
        let groups = self
            .directory_map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(directory)
            .cloned();
        groups
            .and_then(|groups| self.load_balance.select(&*groups, directory))
            .ok_or_else(|| {
                warn!("no available endpoint for {}", directory);
                BalanceError::NoAvailableEndpoint(directory.directory_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> BalanceConfig {
        BalanceConfig::default().set_warm_up(Duration::ZERO)
    }

    fn group(config: &BalanceConfig, port: u16) -> Arc<ChannelGroup> {
        ChannelGroup::new(([127, 0, 0, 1], port).into(), config)
    }

    #[test]
    fn empty_directory_is_an_error() {
        let route = Route::new(config());
        let directory = ServiceDirectory::new("test", "EchoService", "1.0.0");
        let err = route.select(&directory).unwrap_err();
        assert!(matches!(err, BalanceError::NoAvailableEndpoint(ref key) if key == "test-EchoService-1.0.0"));
    }

    #[test]
    fn select_does_not_register_unknown_directories() {
        let route = Route::new(config());
        for version in 0..32 {
            let directory = ServiceDirectory::new("test", "EchoService", version.to_string());
            assert!(route.select(&directory).is_err());
        }
        assert!(route.directory_map.read().unwrap().is_empty());

        let directory = ServiceDirectory::new("test", "EchoService", "1.0.0");
        route.groups(&directory);
        assert!(route.select(&directory).is_err());
        assert_eq!(route.directory_map.read().unwrap().len(), 1);
    }

    #[test]
    fn groups_are_shared_per_directory() {
        let route = Route::new(config());
        let directory = ServiceDirectory::new("test", "EchoService", "1.0.0");
        assert!(Arc::ptr_eq(&route.groups(&directory), &route.groups(&directory)));
    }

    #[test]
    fn zero_weight_group_is_skipped() {
        let route = Route::new(config());
        let directory = ServiceDirectory::new("test", "EchoService", "1.0.0");
        let a = group(route.config(), 18081);
        let b = group(route.config(), 18082);
        route.notify(&directory, vec![a.clone(), b.clone()]);
        route.set_weight(&directory, &a, 0);
        for _ in 0..64 {
            assert_eq!(route.select(&directory).unwrap().address(), b.address());
        }

        route.set_weight(&directory, &a, 100);
        route.set_weight(&directory, &b, 0);
        for _ in 0..64 {
            assert_eq!(route.select(&directory).unwrap().address(), a.address());
        }
    }
}
