use serde::Serialize;

use crate::models::ObservationRecord;
use crate::utils::conversions::{format_timestamp, kelvin_to_fahrenheit};
use crate::utils::summation::CompensatedSum;

/// Running statistics for every observation seen for one region code.
///
/// Only [`RegionAggregator`](crate::processors::RegionAggregator) creates or
/// mutates these; everything else gets a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAccumulator {
    region_code: String,
    record_count: u64,
    temperature_sum: CompensatedSum,
    humidity_sum: CompensatedSum,
    cloud_cover_sum: CompensatedSum,
    max_temperature: f64,
    max_temperature_timestamp: i64,
    min_temperature: f64,
    min_temperature_timestamp: i64,
    snow_event_count: u64,
    lightning_event_count: u64,
}

impl RegionAccumulator {
    /// Start an accumulator from the first record of a region.
    pub(crate) fn from_record(record: &ObservationRecord) -> Self {
        Self {
            region_code: record.region_code.clone(),
            record_count: 1,
            temperature_sum: CompensatedSum::new(record.temperature),
            humidity_sum: CompensatedSum::new(record.humidity),
            cloud_cover_sum: CompensatedSum::new(record.cloud_cover),
            max_temperature: record.temperature,
            max_temperature_timestamp: record.timestamp,
            min_temperature: record.temperature,
            min_temperature_timestamp: record.timestamp,
            snow_event_count: record.snow_count(),
            lightning_event_count: record.lightning_count(),
        }
    }

    /// Fold one more record of the same region into the running statistics.
    ///
    /// Extremes are replaced only on a strictly greater / smaller value, so the
    /// earliest record reaching a tied extreme keeps its timestamp.
    pub(crate) fn fold(&mut self, record: &ObservationRecord) {
        debug_assert_eq!(self.region_code, record.region_code);

        self.record_count += 1;
        self.humidity_sum.add(record.humidity);
        self.cloud_cover_sum.add(record.cloud_cover);
        self.temperature_sum.add(record.temperature);
        self.snow_event_count += record.snow_count();
        self.lightning_event_count += record.lightning_count();

        if record.temperature > self.max_temperature {
            self.max_temperature = record.temperature;
            self.max_temperature_timestamp = record.timestamp;
        }
        if record.temperature < self.min_temperature {
            self.min_temperature = record.temperature;
            self.min_temperature_timestamp = record.timestamp;
        }
    }

    /// Combine with an accumulator for the same region that was built from
    /// records ingested *after* this one's.
    pub(crate) fn merge(&mut self, later: &RegionAccumulator) {
        debug_assert_eq!(self.region_code, later.region_code);

        self.record_count += later.record_count;
        self.humidity_sum.merge(&later.humidity_sum);
        self.cloud_cover_sum.merge(&later.cloud_cover_sum);
        self.temperature_sum.merge(&later.temperature_sum);
        self.snow_event_count += later.snow_event_count;
        self.lightning_event_count += later.lightning_event_count;

        if later.max_temperature > self.max_temperature {
            self.max_temperature = later.max_temperature;
            self.max_temperature_timestamp = later.max_temperature_timestamp;
        }
        if later.min_temperature < self.min_temperature {
            self.min_temperature = later.min_temperature;
            self.min_temperature_timestamp = later.min_temperature_timestamp;
        }
    }

    pub fn region_code(&self) -> &str {
        &self.region_code
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn temperature_sum(&self) -> f64 {
        self.temperature_sum.value()
    }

    pub fn humidity_sum(&self) -> f64 {
        self.humidity_sum.value()
    }

    pub fn cloud_cover_sum(&self) -> f64 {
        self.cloud_cover_sum.value()
    }

    /// Highest temperature (Kelvin) and the timestamp of the record that set it
    pub fn max_temperature(&self) -> (f64, i64) {
        (self.max_temperature, self.max_temperature_timestamp)
    }

    /// Lowest temperature (Kelvin) and the timestamp of the record that set it
    pub fn min_temperature(&self) -> (f64, i64) {
        (self.min_temperature, self.min_temperature_timestamp)
    }

    pub fn snow_event_count(&self) -> u64 {
        self.snow_event_count
    }

    pub fn lightning_event_count(&self) -> u64 {
        self.lightning_event_count
    }

    pub fn average_humidity(&self) -> f64 {
        self.humidity_sum() / self.record_count as f64
    }

    pub fn average_temperature_kelvin(&self) -> f64 {
        self.temperature_sum() / self.record_count as f64
    }

    pub fn average_cloud_cover(&self) -> f64 {
        self.cloud_cover_sum() / self.record_count as f64
    }
}

/// Report-ready view of one region: averages and extremes in Fahrenheit,
/// extremes paired with a readable date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region_code: String,
    pub record_count: u64,
    pub average_humidity: f64,
    pub average_temperature_f: f64,
    pub max_temperature_f: f64,
    pub max_temperature_timestamp: i64,
    pub max_temperature_date: String,
    pub min_temperature_f: f64,
    pub min_temperature_timestamp: i64,
    pub min_temperature_date: String,
    pub lightning_strikes: u64,
    pub snow_records: u64,
    pub average_cloud_cover: f64,
}

impl RegionSummary {
    /// Column names, in field order, as serialized to CSV
    pub const CSV_HEADER: [&'static str; 13] = [
        "region_code",
        "record_count",
        "average_humidity",
        "average_temperature_f",
        "max_temperature_f",
        "max_temperature_timestamp",
        "max_temperature_date",
        "min_temperature_f",
        "min_temperature_timestamp",
        "min_temperature_date",
        "lightning_strikes",
        "snow_records",
        "average_cloud_cover",
    ];

    pub fn from_accumulator(accumulator: &RegionAccumulator, utc: bool) -> Self {
        let (max_k, max_ts) = accumulator.max_temperature();
        let (min_k, min_ts) = accumulator.min_temperature();

        Self {
            region_code: accumulator.region_code().to_string(),
            record_count: accumulator.record_count(),
            average_humidity: accumulator.average_humidity(),
            average_temperature_f: kelvin_to_fahrenheit(accumulator.average_temperature_kelvin()),
            max_temperature_f: kelvin_to_fahrenheit(max_k),
            max_temperature_timestamp: max_ts,
            max_temperature_date: format_timestamp(max_ts, utc),
            min_temperature_f: kelvin_to_fahrenheit(min_k),
            min_temperature_timestamp: min_ts,
            min_temperature_date: format_timestamp(min_ts, utc),
            lightning_strikes: accumulator.lightning_event_count(),
            snow_records: accumulator.snow_event_count(),
            average_cloud_cover: accumulator.average_cloud_cover(),
        }
    }
}
