pub mod algorithm;
pub mod config;
pub mod merge;

pub use algorithm::group_segments;
pub use config::GroupingConfig;
