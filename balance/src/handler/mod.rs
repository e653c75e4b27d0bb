pub mod loadbalance;
