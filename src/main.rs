use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ipv4_cardinality::pipeline::{DEFAULT_LINE_CAPACITY, DEFAULT_MAX_LINE_LEN};
use ipv4_cardinality::{
    source, IngestConfig, IngestionPipeline, LogProgress, ProgressSink, RunReport, Silent,
};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "ipv4-cardinality")]
#[command(about = "Counts distinct IPv4 addresses in a zip, gzip or plain text file, one address per line")]
struct Args {
    /// Input file; zip archives scan their first member, gzip is decompressed on the fly
    #[arg(default_value = "ip_addresses.zip")]
    path: PathBuf,

    /// Longest accepted line in bytes; a longer line aborts the run
    #[arg(long, env = "IPV4_CARDINALITY_MAX_LINE_LEN", default_value_t = DEFAULT_MAX_LINE_LEN)]
    max_line_len: usize,

    /// Minimum milliseconds between progress log lines
    #[arg(long, default_value_t = 1000)]
    progress_interval_ms: u64,

    /// Disable progress logging; progress is only logged at the `info` level
    #[arg(long)]
    no_progress: bool,

    /// Tracing log level; stderr only carries warnings and errors by default
    #[arg(long, env = "IPV4_CARDINALITY_LOG", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args).and_then(|report| print_report(&report, args.format)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<RunReport> {
    let config = IngestConfig {
        max_line_len: args.max_line_len,
        initial_line_capacity: DEFAULT_LINE_CAPACITY,
    };
    let interval = Duration::from_millis(args.progress_interval_ms);

    let report = source::open(&args.path, |input| {
        info!(source = %input.name, len = ?input.len, "counting distinct addresses");
        let mut progress = if args.no_progress || !tracing::enabled!(Level::INFO) {
            ProgressSink::from(Silent)
        } else {
            ProgressSink::from(LogProgress::new(input.len, interval))
        };
        IngestionPipeline::new(config).run(input.reader, &mut progress)
    })
    .with_context(|| format!("counting addresses in {}", args.path.display()))?;

    Ok(report)
}

fn print_report(report: &RunReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{report}");
            if let Some(notice) = report.rejection_notice() {
                eprintln!("{notice}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(report)?);
        }
    }
    Ok(())
}
