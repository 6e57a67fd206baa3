use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::processors::{FileProcessor, RegionAggregator};
use crate::readers::ObservationReader;
use crate::utils::progress::ProgressReporter;
use crate::writers::ReportWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, Level};

/// Execute the parsed command. Logging is expected to be set up already
/// (see [`init_logging`]).
pub fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Summarize {
            files,
            format,
            utc,
            mmap,
            output,
        } => {
            if let Some(format) = format {
                settings.report.format = format;
            }
            settings.report.utc |= utc;
            settings.input.use_mmap |= mmap;

            let progress = ProgressReporter::new_spinner("Reading observations...", cli.quiet);
            let mut aggregator = RegionAggregator::new();
            let outcome =
                file_processor(&settings).process_files(&files, &mut aggregator, Some(&progress));
            drop(progress);

            info!(
                "Ingested {} records for {} regions",
                outcome.total_records(),
                aggregator.len()
            );

            let writer = ReportWriter::new()
                .with_format(settings.report.format)
                .with_utc(settings.report.utc);

            match output {
                Some(path) => {
                    writer.write_to_file(&aggregator, &path)?;
                    info!("Report written to {}", path.display());
                }
                None => writer.write_report(&aggregator, std::io::stdout().lock())?,
            }

            if cli.verbose {
                eprintln!("\n{}", outcome.summary());
            }
        }

        Commands::Validate { files, mmap } => {
            settings.input.use_mmap |= mmap;

            let progress = ProgressReporter::new_spinner("Validating observations...", cli.quiet);
            let mut aggregator = RegionAggregator::new();
            let outcome =
                file_processor(&settings).process_files(&files, &mut aggregator, Some(&progress));
            drop(progress);

            println!("{}", outcome.summary());

            if outcome.total_malformed() == 0 && outcome.unavailable_files() == 0 {
                println!("✅ All lines parsed cleanly");
            } else {
                println!(
                    "⚠️  Found {} malformed lines and {} unavailable files",
                    outcome.total_malformed(),
                    outcome.unavailable_files()
                );
            }
        }
    }

    Ok(())
}

fn file_processor(settings: &Settings) -> FileProcessor {
    let reader = ObservationReader::with_mmap(settings.input.use_mmap)
        .with_buffer_size(settings.input.buffer_size);
    FileProcessor::new(reader).with_max_reported_errors(settings.input.max_reported_errors)
}

/// Install the global `tracing` subscriber: warnings by default, debug when verbose.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| ProcessingError::Logging(e.to_string()))
}
