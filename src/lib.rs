pub mod aggregator;
pub mod config;
pub mod error;
pub mod global;
pub mod http;
pub mod providers;
pub mod types;
