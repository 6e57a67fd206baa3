pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use error::{ParseError, ProcessingError, Result};
pub use models::{ObservationRecord, RegionAccumulator, RegionSummary};
pub use processors::{FileProcessor, RegionAggregator, RunOutcome};
pub use readers::{parse_observation_line, ObservationReader};
pub use writers::{ReportFormat, ReportWriter};
