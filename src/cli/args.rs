use crate::writers::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "climate-summary")]
#[command(about = "Per-region summaries of tab-delimited NOAA climate observations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide the progress spinner")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "TOML settings file")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest observation files and print per-region statistics
    Summarize {
        #[arg(required = true, help = "Tab-delimited observation files")]
        files: Vec<PathBuf>,

        #[arg(short, long, value_enum, help = "Report format [default: text]")]
        format: Option<ReportFormat>,

        #[arg(long, help = "Show dates in UTC instead of local time")]
        utc: bool,

        #[arg(long, help = "Read input files through a memory map")]
        mmap: bool,

        #[arg(short, long, help = "Write the report to a file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Check observation files for malformed lines without summarizing
    Validate {
        #[arg(required = true, help = "Tab-delimited observation files")]
        files: Vec<PathBuf>,

        #[arg(long, help = "Read input files through a memory map")]
        mmap: bool,
    },
}
