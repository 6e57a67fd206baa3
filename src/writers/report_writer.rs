use crate::error::Result;
use crate::models::RegionSummary;
use crate::processors::RegionAggregator;
use clap::ValueEnum;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable per-region sections
    #[default]
    Text,
    /// JSON array of region summaries
    Json,
    /// One CSV row per region
    Csv,
}

/// Renders the aggregator's accumulators as a report, in first-seen region order.
pub struct ReportWriter {
    format: ReportFormat,
    utc: bool,
}

impl ReportWriter {
    pub fn new() -> Self {
        Self {
            format: ReportFormat::Text,
            utc: false,
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Render dates in UTC instead of the local time zone
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    pub fn summaries(&self, aggregator: &RegionAggregator) -> Vec<RegionSummary> {
        aggregator
            .snapshot()
            .iter()
            .map(|acc| RegionSummary::from_accumulator(acc, self.utc))
            .collect()
    }

    pub fn write_report<W: Write>(&self, aggregator: &RegionAggregator, mut out: W) -> Result<()> {
        let summaries = self.summaries(aggregator);

        match self.format {
            ReportFormat::Text => write_text(&summaries, &mut out)?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &summaries)?;
                writeln!(out)?;
            }
            ReportFormat::Csv => write_csv(&summaries, &mut out)?,
        }

        out.flush()?;
        Ok(())
    }

    pub fn write_to_file(&self, aggregator: &RegionAggregator, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        self.write_report(aggregator, BufWriter::new(file))
    }

    pub fn render(&self, aggregator: &RegionAggregator) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_report(aggregator, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_text<W: Write>(summaries: &[RegionSummary], out: &mut W) -> Result<()> {
    let codes: Vec<&str> = summaries.iter().map(|s| s.region_code.as_str()).collect();
    writeln!(out, "States found: {}", codes.join(" "))?;

    for s in summaries {
        writeln!(out, "-- State: {} --", s.region_code)?;
        writeln!(out, "Number of Records: {}", s.record_count)?;
        writeln!(out, "Average Humidity: {:.1}%", s.average_humidity)?;
        writeln!(out, "Average Temperature: {:.2}F", s.average_temperature_f)?;
        writeln!(
            out,
            "Max Temperature: {:.1}F on {}",
            s.max_temperature_f, s.max_temperature_date
        )?;
        writeln!(
            out,
            "Min Temperature: {:.1}F on {}",
            s.min_temperature_f, s.min_temperature_date
        )?;
        writeln!(out, "Lightning Strikes: {}", s.lightning_strikes)?;
        writeln!(out, "Records with Snow Cover: {}", s.snow_records)?;
        writeln!(out, "Average Cloud Cover: {:.1}%", s.average_cloud_cover)?;
    }

    Ok(())
}

fn write_csv<W: Write>(summaries: &[RegionSummary], out: &mut W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    if summaries.is_empty() {
        // serialize() only emits the header alongside the first row
        writer.write_record(RegionSummary::CSV_HEADER)?;
    }
    for summary in summaries {
        writer.serialize(summary)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObservationRecord;
    use pretty_assertions::assert_eq;

    fn sample_aggregator() -> RegionAggregator {
        let mut aggregator = RegionAggregator::new();
        for record in [
            ObservationRecord::new("CA", 1_428_300_000_000, 50.0, false, 10.0, false, 273.15),
            ObservationRecord::new("CA", 1_438_621_200_000, 70.0, true, 30.0, true, 373.15),
            ObservationRecord::new("TN", 0, 49.44, false, 53.0, true, 300.0),
        ] {
            aggregator.ingest(&record);
        }
        aggregator
    }

    #[test]
    fn test_text_report_layout() -> Result<()> {
        let report = ReportWriter::new()
            .with_utc(true)
            .render(&sample_aggregator())?;

        let expected = "\
States found: CA TN
-- State: CA --
Number of Records: 2
Average Humidity: 60.0%
Average Temperature: 122.00F
Max Temperature: 212.0F on Mon Aug  3 17:00:00 2015
Min Temperature: 32.0F on Mon Apr  6 06:00:00 2015
Lightning Strikes: 1
Records with Snow Cover: 1
Average Cloud Cover: 20.0%
-- State: TN --
Number of Records: 1
Average Humidity: 49.4%
Average Temperature: 80.33F
Max Temperature: 80.3F on Thu Jan  1 00:00:00 1970
Min Temperature: 80.3F on Thu Jan  1 00:00:00 1970
Lightning Strikes: 1
Records with Snow Cover: 0
Average Cloud Cover: 53.0%
";
        assert_eq!(report, expected);
        Ok(())
    }

    #[test]
    fn test_empty_text_report() -> Result<()> {
        let report = ReportWriter::new().render(&RegionAggregator::new())?;
        assert_eq!(report, "States found: \n");
        Ok(())
    }

    #[test]
    fn test_json_report() -> Result<()> {
        let report = ReportWriter::new()
            .with_format(ReportFormat::Json)
            .with_utc(true)
            .render(&sample_aggregator())?;

        let value: serde_json::Value = serde_json::from_str(&report)?;
        let regions = value.as_array().unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0]["region_code"], "CA");
        assert_eq!(regions[0]["record_count"], 2);
        assert_eq!(regions[0]["max_temperature_timestamp"], 1_438_621_200_000i64);
        assert_eq!(regions[1]["min_temperature_date"], "Thu Jan  1 00:00:00 1970");
        Ok(())
    }

    #[test]
    fn test_empty_json_report() -> Result<()> {
        let report = ReportWriter::new()
            .with_format(ReportFormat::Json)
            .render(&RegionAggregator::new())?;
        assert_eq!(report.trim(), "[]");
        Ok(())
    }

    #[test]
    fn test_csv_report() -> Result<()> {
        let report = ReportWriter::new()
            .with_format(ReportFormat::Csv)
            .with_utc(true)
            .render(&sample_aggregator())?;

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], RegionSummary::CSV_HEADER.join(","));
        assert!(lines[1].starts_with("CA,2,60.0,"));
        assert!(lines[2].starts_with("TN,1,"));
        Ok(())
    }

    #[test]
    fn test_empty_csv_report_has_header() -> Result<()> {
        let report = ReportWriter::new()
            .with_format(ReportFormat::Csv)
            .render(&RegionAggregator::new())?;
        assert_eq!(report.trim_end(), RegionSummary::CSV_HEADER.join(","));
        Ok(())
    }

    #[test]
    fn test_write_to_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("reports").join("summary.txt");

        ReportWriter::new().write_to_file(&sample_aggregator(), &path)?;

        let written = std::fs::read_to_string(&path)?;
        assert!(written.starts_with("States found: CA TN\n"));
        Ok(())
    }
}
