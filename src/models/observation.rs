use serde::{Deserialize, Serialize};

/// One decoded observation line.
///
/// Geolocation and pressure are present in the input but never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub region_code: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub humidity: f64,
    pub snow: bool,
    pub cloud_cover: f64,
    pub lightning: bool,
    /// Surface temperature in Kelvin
    pub temperature: f64,
}

impl ObservationRecord {
    pub fn new(
        region_code: impl Into<String>,
        timestamp: i64,
        humidity: f64,
        snow: bool,
        cloud_cover: f64,
        lightning: bool,
        temperature: f64,
    ) -> Self {
        Self {
            region_code: region_code.into(),
            timestamp,
            humidity,
            snow,
            cloud_cover,
            lightning,
            temperature,
        }
    }

    pub fn snow_count(&self) -> u64 {
        u64::from(self.snow)
    }

    pub fn lightning_count(&self) -> u64 {
        u64::from(self.lightning)
    }
}
