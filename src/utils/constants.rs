/// Tab-separated fields per observation line
pub const FIELD_COUNT: usize = 9;

/// Field positions within an observation line (2 = geohash, 7 = pressure, both unused)
pub const FIELD_REGION_CODE: usize = 0;
pub const FIELD_TIMESTAMP: usize = 1;
pub const FIELD_HUMIDITY: usize = 3;
pub const FIELD_SNOW: usize = 4;
pub const FIELD_CLOUD_COVER: usize = 5;
pub const FIELD_LIGHTNING: usize = 6;
pub const FIELD_TEMPERATURE: usize = 8;

pub const FIELD_SEPARATOR: char = '\t';

/// Kelvin to Fahrenheit: F = K * 1.8 - 459.67
pub const KELVIN_TO_FAHRENHEIT_SCALE: f64 = 1.8;
pub const KELVIN_TO_FAHRENHEIT_OFFSET: f64 = 459.67;

/// Same layout as C `ctime`, without the trailing newline
pub const REPORT_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_MAX_REPORTED_ERRORS: usize = 5;

/// Default report format name, as accepted by `report.format`
pub const FORMAT_TEXT: &str = "text";

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "CLIMATE";
