use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use balance_rs::{
    balance_common::logs::init_log, config::BalanceConfig, directory::ServiceDirectory,
    group::ChannelGroup, route::Route,
};
use tracing::{error, info};

const SELECTIONS: usize = 100_000;

#[tokio::main]
async fn main() {
    init_log();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/config/balance.yaml".to_string());
    let config = match BalanceConfig::from_file(&path) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}, fall back to default config");
            BalanceConfig::default().set_warm_up(Duration::ZERO)
        }
    };
    let route = Arc::new(Route::new(config));
    let directory = ServiceDirectory::new("demo", "org.example.EchoService", "1.0.0");

    let groups: Vec<Arc<ChannelGroup>> = (18081..18084)
        .map(|port| ChannelGroup::new(SocketAddr::from(([127, 0, 0, 1], port)), route.config()))
        .collect();
    route.notify(&directory, groups.clone());
    report(&route, &directory);

    // 模拟注册中心推送权重变更
    let registry = {
        let route = route.clone();
        let directory = directory.clone();
        let groups = groups.clone();
        tokio::spawn(async move {
            for (group, weight) in groups.iter().zip([10, 30, 60]) {
                route.set_weight(&directory, group, weight);
            }
        })
    };
    if let Err(err) = registry.await {
        error!("registry task failed : {err}");
        return;
    }
    report(&route, &directory);

    groups[0].set_available(false);
    let dropped = route.groups(&directory).retain_available();
    info!("dropped {} unavailable groups", dropped);
    report(&route, &directory);
}

fn report(route: &Route, directory: &ServiceDirectory) {
    let mut counts: HashMap<SocketAddr, usize> = HashMap::new();
    for _ in 0..SELECTIONS {
        match route.select(directory) {
            Ok(group) => *counts.entry(group.address()).or_default() += 1,
            Err(err) => {
                error!("{err}");
                return;
            }
        }
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort();
    for (address, count) in counts {
        info!("{} -> {:.3}", address, count as f64 / SELECTIONS as f64);
    }
}
