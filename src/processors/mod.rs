pub mod file_processor;
pub mod region_aggregator;

pub use file_processor::{FileOutcome, FileProcessor, FileStatus, RunOutcome};
pub use region_aggregator::RegionAggregator;
