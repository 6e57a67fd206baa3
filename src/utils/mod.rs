pub mod constants;
pub mod conversions;
pub mod progress;
pub mod summation;

pub use constants::*;
pub use conversions::{format_timestamp, kelvin_to_fahrenheit, timestamp_to_datetime};
pub use progress::ProgressReporter;
pub use summation::CompensatedSum;
