//! Manifest route reporter CLI
//!
//! Command-line front end for the manifest-reader library. It adds:
//! - Argument parsing
//! - Optional TOML config (extra providers, sheet layout)
//! - Logging setup (diagnostics on stderr, reports on stdout)

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use manifest_reader::{
    select, ProviderSelector, ReportMode, ReportOptions, ReportWriter, RouteCatalog,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod config;

/// Report mode as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Route and item count
    #[value(name = "info")]
    Info,
    /// Route, item count, service type, plan time and route time
    #[value(name = "moreinfo")]
    MoreInfo,
    /// Every stop of each route
    #[value(name = "dump")]
    Dump,
    /// Stops with a delivery window only
    #[value(name = "dumpschedule")]
    DumpSchedule,
}

impl From<Mode> for ReportMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Info => ReportMode::Info,
            Mode::MoreInfo => ReportMode::MoreInfo,
            Mode::Dump => ReportMode::Dump,
            Mode::DumpSchedule => ReportMode::DumpSchedule,
        }
    }
}

/// Manifest list - summarize and dump delivery routes from a manifest workbook
#[derive(Parser, Debug)]
#[command(name = "manilist")]
#[command(about = "Summarize and dump delivery routes from a manifest workbook", long_about = None)]
#[command(version)]
struct Args {
    /// Report to produce
    #[arg(value_enum)]
    mode: Mode,

    /// Path to the manifest .xlsx file
    #[arg(value_name = "FILE")]
    infile: PathBuf,

    /// Provider to report on (sbs, maruwa, amflex, or any configured name), or "all"
    #[arg(short, long, value_name = "NAME", default_value = "all")]
    dspname: String,

    /// Comma-separated route names (can be repeated). Routes to include with
    /// "all", routes to exclude with a specific provider
    #[arg(short, long, value_name = "ROUTES")]
    targetroutes: Vec<String>,

    /// Omit the per-route header lines in dump modes
    #[arg(short, long)]
    noheader: bool,

    /// Append the delivery window in dump mode
    #[arg(short, long)]
    showtimewindow: bool,

    /// Append the quoted address in dump modes
    #[arg(short = 'a', long)]
    showaddress: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn report_options(&self) -> ReportOptions {
        ReportOptions::new()
            .with_headers(!self.noheader)
            .with_time_window(self.showtimewindow)
            .with_address(self.showaddress)
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::debug!("manilist v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using manifest-reader v{}", manifest_reader::VERSION);

    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };
    let providers = config.provider_table()?;

    let selector = ProviderSelector::from_name(&args.dspname);
    if let ProviderSelector::Named(name) = &selector {
        providers
            .resolve(name)
            .with_context(|| format!("Known providers: {}", known_providers(&providers)))?;
    }

    let catalog = RouteCatalog::load_path(&args.infile, &config.layout)
        .with_context(|| format!("Failed to load manifest {:?}", args.infile))?;

    let selection = select(&catalog, &providers, &selector, &args.targetroutes)?;

    let writer = ReportWriter::new(&catalog, args.report_options());
    let mode = ReportMode::from(args.mode);
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let mut out = BufWriter::new(file);
            writer.write(&mut out, mode, &selection.targets)?;
            out.flush()?;
            log::info!("Report written to {:?}", path);
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writer.write(&mut out, mode, &selection.targets)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn known_providers(providers: &manifest_reader::ProviderTable) -> String {
    providers.names().collect::<Vec<_>>().join(", ")
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
