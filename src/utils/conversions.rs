use crate::utils::constants::{
    KELVIN_TO_FAHRENHEIT_OFFSET, KELVIN_TO_FAHRENHEIT_SCALE, REPORT_DATE_FORMAT,
};
use chrono::{DateTime, Local, Utc};

/// Convert a temperature in Kelvin to degrees Fahrenheit
pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    kelvin * KELVIN_TO_FAHRENHEIT_SCALE - KELVIN_TO_FAHRENHEIT_OFFSET
}

/// Convert an epoch-milliseconds timestamp to a UTC date-time.
///
/// Milliseconds are floored to whole seconds first, so sub-second precision is
/// dropped the same way the report has always shown it.
pub fn timestamp_to_datetime(timestamp_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(timestamp_ms.div_euclid(1000), 0)
}

/// Render an epoch-milliseconds timestamp in `ctime` layout.
///
/// Falls back to the raw millisecond value when the timestamp is outside the
/// range chrono can represent.
pub fn format_timestamp(timestamp_ms: i64, utc: bool) -> String {
    match timestamp_to_datetime(timestamp_ms) {
        Some(dt) if utc => dt.format(REPORT_DATE_FORMAT).to_string(),
        Some(dt) => dt
            .with_timezone(&Local)
            .format(REPORT_DATE_FORMAT)
            .to_string(),
        None => format!("{} ms", timestamp_ms),
    }
}
