pub mod config;
pub mod directory;
pub mod error;
pub mod group;
pub mod handler;
pub mod random;
pub mod route;
pub mod snapshot;
pub mod weight;

pub use balance_common;
pub use handler::loadbalance::{LoadBalance, RandomLoadBalance};
pub use snapshot::{CandidateGroups, GroupSource, Snapshot};
pub use weight::{cache::WeightCache, compute_weights, Candidate, WeightTable};

pub type Error = error::BalanceError;
pub type Result<T> = std::result::Result<T, Error>;
