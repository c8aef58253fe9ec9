//! Services for loading run logs and computing statistics

pub mod aggregator;
pub mod config;
pub mod data_loader;

pub use aggregator::{Aggregator, RecomputeOptions};
pub use config::{Config, ConfigService};
pub use data_loader::DataLoaderService;
