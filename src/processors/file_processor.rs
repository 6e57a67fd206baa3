use crate::error::ProcessingError;
use crate::processors::RegionAggregator;
use crate::readers::ObservationReader;
use crate::utils::constants::DEFAULT_MAX_REPORTED_ERRORS;
use crate::utils::progress::ProgressReporter;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Processed,
    /// Missing, unopenable, or failed mid-read; nothing from it was kept
    Unavailable { reason: String },
}

/// What happened to one input file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub lines_read: usize,
    pub records_ingested: u64,
    pub malformed_lines: usize,
    pub blank_lines: usize,
    /// First few malformed-line reasons, `"line N: reason"`
    pub malformed_samples: Vec<String>,
}

impl FileOutcome {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Processed,
            lines_read: 0,
            records_ingested: 0,
            malformed_lines: 0,
            blank_lines: 0,
            malformed_samples: Vec::new(),
        }
    }

    fn unavailable(path: &Path, error: &ProcessingError) -> Self {
        Self {
            status: FileStatus::Unavailable {
                reason: error.to_string(),
            },
            ..Self::new(path)
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == FileStatus::Processed
    }
}

/// Outcome of a whole run, one entry per named file in the order given.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub files: Vec<FileOutcome>,
}

impl RunOutcome {
    pub fn total_records(&self) -> u64 {
        self.files.iter().map(|f| f.records_ingested).sum()
    }

    pub fn total_malformed(&self) -> usize {
        self.files.iter().map(|f| f.malformed_lines).sum()
    }

    pub fn unavailable_files(&self) -> usize {
        self.files.iter().filter(|f| !f.is_available()).count()
    }

    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Files: {} ({} unavailable)",
            self.files.len(),
            self.unavailable_files()
        )?;
        writeln!(f, "Records ingested: {}", self.total_records())?;
        writeln!(f, "Malformed lines skipped: {}", self.total_malformed())?;

        for file in &self.files {
            match &file.status {
                FileStatus::Processed => {
                    writeln!(
                        f,
                        "  {}: {} lines, {} records, {} malformed, {} blank",
                        file.path.display(),
                        file.lines_read,
                        file.records_ingested,
                        file.malformed_lines,
                        file.blank_lines
                    )?;
                    for sample in &file.malformed_samples {
                        writeln!(f, "    {}", sample)?;
                    }
                }
                FileStatus::Unavailable { reason } => {
                    writeln!(f, "  {}: skipped ({})", file.path.display(), reason)?;
                }
            }
        }

        Ok(())
    }
}

/// Drives ingestion across every named file, one after another.
///
/// Each file is folded into its own [`RegionAggregator`] and merged into the
/// run's aggregator only once the whole file has been read, so a file that
/// fails mid-read contributes nothing.
pub struct FileProcessor {
    reader: ObservationReader,
    max_reported_errors: usize,
}

impl FileProcessor {
    pub fn new(reader: ObservationReader) -> Self {
        Self {
            reader,
            max_reported_errors: DEFAULT_MAX_REPORTED_ERRORS,
        }
    }

    pub fn with_max_reported_errors(mut self, max_reported_errors: usize) -> Self {
        self.max_reported_errors = max_reported_errors;
        self
    }

    /// Ingest every file into `aggregator`. Never fails: unavailable files
    /// and malformed lines are recorded in the outcome and skipped.
    pub fn process_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        aggregator: &mut RegionAggregator,
        progress: Option<&ProgressReporter>,
    ) -> RunOutcome {
        let mut outcome = RunOutcome::default();

        for path in paths {
            let path = path.as_ref();
            if let Some(p) = progress {
                p.set_message(&format!("Reading {}...", path.display()));
            }

            let (file_outcome, file_aggregator) = self.process_file(path);
            if let Some(file_aggregator) = file_aggregator {
                aggregator.merge(file_aggregator);
            }
            outcome.files.push(file_outcome);

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Ingested {} records from {} files",
                outcome.total_records(),
                outcome.files.len()
            ));
        }

        outcome
    }

    /// Ingest a single file into a fresh aggregator.
    ///
    /// Returns `None` for the aggregator when the file could not be opened or
    /// could not be read to the end.
    pub fn process_file(&self, path: &Path) -> (FileOutcome, Option<RegionAggregator>) {
        info!("Opening file: {}", path.display());

        let mut observations = match self.reader.stream_observations(path) {
            Ok(iter) => iter,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                return (FileOutcome::unavailable(path, &e), None);
            }
        };

        let mut outcome = FileOutcome::new(path);
        let mut aggregator = RegionAggregator::new();

        while let Some(item) = observations.next() {
            match item {
                Ok(record) => {
                    aggregator.ingest(&record);
                    outcome.records_ingested += 1;
                }
                Err(ProcessingError::MalformedLine {
                    line_number,
                    source,
                }) => {
                    warn!(
                        "{}:{}: skipping malformed line: {}",
                        path.display(),
                        line_number,
                        source
                    );
                    outcome.malformed_lines += 1;
                    if outcome.malformed_samples.len() < self.max_reported_errors {
                        outcome
                            .malformed_samples
                            .push(format!("line {}: {}", line_number, source));
                    }
                }
                Err(e) => {
                    warn!(
                        "Read error in {} after {} lines, discarding file: {}",
                        path.display(),
                        observations.line_count(),
                        e
                    );
                    return (FileOutcome::unavailable(path, &e), None);
                }
            }
        }

        outcome.lines_read = observations.line_count();
        outcome.blank_lines = observations.blank_lines();

        if outcome.malformed_lines > 0 {
            info!(
                "{}: skipped {} malformed lines",
                path.display(),
                outcome.malformed_lines
            );
        }
        info!(
            "{}: {} records across {} regions",
            path.display(),
            outcome.records_ingested,
            aggregator.len()
        );

        (outcome, Some(aggregator))
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new(ObservationReader::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, lines: &[&str]) -> std::io::Result<PathBuf> {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path)?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        Ok(path)
    }

    #[test]
    fn test_missing_file_does_not_stop_the_run() -> crate::Result<()> {
        let dir = TempDir::new()?;
        let tn = write_file(&dir, "data_tn.tdv", &["TN\t1000\tgh\t50\t0\t10\t0\t1000\t280.0"])?;
        let wa = write_file(&dir, "data_wa.tdv", &["WA\t2000\tgh\t70\t1\t30\t1\t1000\t300.0"])?;
        let missing = dir.path().join("missing.tdv");

        let mut aggregator = RegionAggregator::new();
        let outcome = FileProcessor::default().process_files(
            &[tn, missing.clone(), wa],
            &mut aggregator,
            None,
        );

        assert_eq!(aggregator.region_codes().collect::<Vec<_>>(), vec!["TN", "WA"]);
        assert_eq!(outcome.files.len(), 3);
        assert_eq!(outcome.unavailable_files(), 1);
        assert_eq!(outcome.files[1].path, missing);
        assert!(matches!(
            outcome.files[1].status,
            FileStatus::Unavailable { .. }
        ));
        assert_eq!(outcome.total_records(), 2);
        Ok(())
    }

    #[test]
    fn test_malformed_lines_are_counted_and_sampled() -> crate::Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(
            &dir,
            "mixed.tdv",
            &[
                "CA\t1000\tgh",
                "CA\t1000\tgh\t50\t0\t10\t0\t1000\t280.0",
                "",
                "CA\tsoon\tgh\t50\t0\t10\t0\t1000\t280.0",
                "CA\t2000\tgh\t70\t1\t30\t1\t1000\t300.0",
                "CA\t3000\tgh\t70\t1\t30\t1\t1000",
            ],
        )?;

        let processor = FileProcessor::default().with_max_reported_errors(2);
        let (outcome, aggregator) = processor.process_file(&path);
        let aggregator = aggregator.unwrap();

        assert_eq!(outcome.lines_read, 6);
        assert_eq!(outcome.records_ingested, 2);
        assert_eq!(outcome.malformed_lines, 3);
        assert_eq!(outcome.blank_lines, 1);
        assert_eq!(
            outcome.malformed_samples,
            vec![
                "line 1: expected 9 tab-separated fields, found 3".to_string(),
                "line 4: invalid timestamp: 'soon'".to_string(),
            ]
        );
        assert_eq!(aggregator.get("CA").unwrap().record_count(), 2);
        Ok(())
    }

    #[test]
    fn test_file_without_valid_records_is_not_an_error() -> crate::Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "junk.tdv", &["not a record", "", "still not"])?;

        let mut aggregator = RegionAggregator::new();
        let outcome = FileProcessor::default().process_files(&[path], &mut aggregator, None);

        assert!(aggregator.is_empty());
        assert!(outcome.files[0].is_available());
        assert_eq!(outcome.files[0].records_ingested, 0);
        assert_eq!(outcome.total_malformed(), 2);
        Ok(())
    }

    #[test]
    fn test_same_region_across_files_keeps_earliest_tie() -> crate::Result<()> {
        let dir = TempDir::new()?;
        let first = write_file(&dir, "a.tdv", &["TN\t100\tgh\t50\t0\t10\t0\t1000\t290.0"])?;
        let second = write_file(&dir, "b.tdv", &["TN\t200\tgh\t50\t0\t10\t0\t1000\t290.0"])?;

        let mut aggregator = RegionAggregator::new();
        FileProcessor::default().process_files(&[first, second], &mut aggregator, None);

        let tn = aggregator.get("TN").unwrap();
        assert_eq!(tn.record_count(), 2);
        assert_eq!(tn.max_temperature(), (290.0, 100));
        assert_eq!(tn.min_temperature(), (290.0, 100));
        Ok(())
    }

    #[test]
    fn test_summary_mentions_skipped_files() {
        let outcome = RunOutcome {
            files: vec![FileOutcome {
                status: FileStatus::Unavailable {
                    reason: "gone".to_string(),
                },
                ..FileOutcome::new(Path::new("x.tdv"))
            }],
        };

        let summary = outcome.summary();
        assert!(summary.contains("Files: 1 (1 unavailable)"));
        assert!(summary.contains("x.tdv: skipped (gone)"));
    }

    #[test]
    fn test_summary_lists_processed_files_and_samples() {
        let outcome = RunOutcome {
            files: vec![FileOutcome {
                lines_read: 4,
                records_ingested: 2,
                malformed_lines: 1,
                blank_lines: 1,
                malformed_samples: vec!["line 3: empty region code".to_string()],
                ..FileOutcome::new(Path::new("a.tdv"))
            }],
        };

        assert_eq!(
            outcome.to_string(),
            "Files: 1 (0 unavailable)\n\
             Records ingested: 2\n\
             Malformed lines skipped: 1\n  \
             a.tdv: 4 lines, 2 records, 1 malformed, 1 blank\n    \
             line 3: empty region code\n"
        );
        assert_eq!(outcome.summary(), outcome.to_string());
    }

    // Opening a directory succeeds on unix but every read fails with EISDIR
    #[cfg(unix)]
    #[test]
    fn test_read_error_discards_the_file() -> crate::Result<()> {
        let dir = TempDir::new()?;
        let good = write_file(&dir, "a.tdv", &["TN\t100\tgh\t50\t0\t10\t0\t1000\t290.0"])?;
        let unreadable = dir.path().join("sub.tdv");
        std::fs::create_dir(&unreadable)?;

        let (outcome, file_aggregator) = FileProcessor::default().process_file(&unreadable);
        assert!(file_aggregator.is_none());
        assert!(matches!(outcome.status, FileStatus::Unavailable { .. }));
        assert_eq!(outcome.records_ingested, 0);

        let mut aggregator = RegionAggregator::new();
        let run = FileProcessor::default().process_files(&[good, unreadable], &mut aggregator, None);
        assert_eq!(run.unavailable_files(), 1);
        assert_eq!(run.total_records(), 1);
        assert_eq!(aggregator.region_codes().collect::<Vec<_>>(), vec!["TN"]);
        Ok(())
    }
}
