//! Breakout CLI: scan the market for green-signal breakout setups.
//!
//! ```text
//! breakout --type both --format json
//! breakout --type daily --symbols NVDA AAPL BRK.B
//! breakout --type weekly --csv-dir data --symbols SPY
//! ```
//!
//! The result goes to stdout; logs go to stderr (`RUST_LOG` overrides the
//! level). A fatal failure exits with status 1 and, in JSON mode, prints an
//! `"error"` document with empty lists.

use anyhow::{Context, Result};
use breakout_core::data::{
    http_client, CandidateSource, CircuitBreaker, CsvHistoryProvider, HistoryProvider,
    StaticCandidates, TradingViewScreener, YahooProvider,
};
use breakout_core::domain::ScanMode;
use breakout_runner::{
    error_json, ModeConfig, RequestPacer, ScanConfig, ScanReport, Scanner, TracingProgress,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "breakout",
    about = "Breakout scanner: daily and weekly green-signal candidates"
)]
struct Cli {
    /// Which scan to run.
    #[arg(long = "type", value_enum)]
    scan_type: ScanType,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Only log errors.
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// TOML config file. Defaults are used for anything it does not set.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scan these symbols instead of querying the screener.
    #[arg(long, num_args = 1..)]
    symbols: Vec<String>,

    /// Read history from `<DIR>/<interval>/<SYMBOL>.csv` instead of Yahoo.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Pause between history requests in milliseconds. Overrides the config.
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScanType {
    Daily,
    Weekly,
    Both,
}

impl ScanType {
    fn modes(self) -> &'static [ScanMode] {
        match self {
            ScanType::Daily => &[ScanMode::Daily],
            ScanType::Weekly => &[ScanMode::Weekly],
            ScanType::Both => &ScanMode::ALL,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match run_scan(&cli) {
        Ok(report) => match render(&report, cli.format) {
            Ok(out) => {
                print!("{out}");
                ExitCode::SUCCESS
            }
            Err(e) => fail(cli.format, &e),
        },
        Err(e) => fail(cli.format, &e),
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "error" } else { "breakout=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run_scan(cli: &Cli) -> Result<ScanReport> {
    let config = match &cli.config {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ScanConfig::default(),
    };
    info!(fingerprint = %config.fingerprint()?, "config loaded");

    let client = http_client().context("building HTTP client")?;

    let candidates: Box<dyn CandidateSource> = if cli.symbols.is_empty() {
        Box::new(TradingViewScreener::new(
            client.clone(),
            config.screener.clone(),
        ))
    } else {
        Box::new(StaticCandidates::from_symbols(&cli.symbols))
    };

    let history: Box<dyn HistoryProvider> = match &cli.csv_dir {
        Some(dir) => Box::new(CsvHistoryProvider::new(dir)),
        None => Box::new(YahooProvider::new(
            client,
            Arc::new(CircuitBreaker::default_provider()),
        )),
    };

    let delay_ms = cli.delay_ms.unwrap_or(config.request_delay_ms);
    let modes: Vec<ModeConfig> = cli
        .scan_type
        .modes()
        .iter()
        .map(|&mode| config.mode(mode).clone())
        .collect();

    let mut scanner = Scanner::new(
        candidates.as_ref(),
        history.as_ref(),
        &TracingProgress,
        RequestPacer::from_millis(delay_ms),
    );
    Ok(scanner.scan(&modes)?)
}

fn render(report: &ScanReport, format: Format) -> Result<String> {
    match format {
        Format::Json => {
            let mut out = report.to_json().context("serializing report")?;
            out.push('\n');
            Ok(out)
        }
        Format::Text => Ok(report.to_text()),
    }
}

fn fail(format: Format, err: &anyhow::Error) -> ExitCode {
    if format == Format::Json {
        match error_json(&format!("{err:#}")) {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("Error: {e}"),
        }
    } else {
        eprintln!("Error: {err:#}");
    }
    ExitCode::FAILURE
}
