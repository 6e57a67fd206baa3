//! Layered run settings.
//!
//! Sources, later overriding earlier: built-in defaults, an optional TOML file,
//! then `CLIMATE_`-prefixed environment variables using `__` between sections
//! (e.g. `CLIMATE_REPORT__FORMAT=json`). Command-line flags are applied on top
//! by the CLI.

use crate::error::Result;
use crate::utils::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_REPORTED_ERRORS, FORMAT_TEXT,
};
use crate::writers::ReportFormat;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub report: ReportSettings,

    #[validate(nested)]
    pub input: InputSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReportSettings {
    pub format: ReportFormat,

    /// Render dates in UTC rather than local time
    pub utc: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InputSettings {
    pub use_mmap: bool,

    /// 1 KiB to 64 MiB
    #[validate(range(min = 1024, max = 67108864))]
    pub buffer_size: usize,

    /// Malformed-line reasons kept per file for the validate report
    #[validate(range(max = 1000))]
    pub max_reported_errors: usize,
}

impl Settings {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("report.format", FORMAT_TEXT)?
            .set_default("report.utc", false)?
            .set_default("input.use_mmap", false)?
            .set_default("input.buffer_size", DEFAULT_BUFFER_SIZE as i64)?
            .set_default(
                "input.max_reported_errors",
                DEFAULT_MAX_REPORTED_ERRORS as i64,
            )?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}
