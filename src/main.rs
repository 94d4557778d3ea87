//! Opening range breakout scanner - main entry point
//!
//! This binary provides two subcommands:
//! - analyze: Scan a ticker for morning-range breakouts and report outcomes
//! - download: Save intraday bars from Yahoo Finance to CSV

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::analyze::AnalyzeArgs;

#[derive(Parser, Debug)]
#[command(name = "orb-scanner")]
#[command(about = "Morning-range breakout scanner with same-day outcome reporting", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (defaults are used if it doesn't exist)
    #[arg(short, long, global = true, default_value = "config.json")]
    config: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a ticker for opening range breakouts
    Analyze {
        /// Ticker symbol, e.g. "RELIANCE.NS"
        #[arg(short, long)]
        ticker: String,

        /// Bar interval in minutes: 1, 2, 5, 15, 30, 60 or 90
        #[arg(short, long)]
        interval: Option<u32>,

        /// Number of days of history to scan
        #[arg(short, long)]
        days: Option<u32>,

        /// Start date (YYYY-MM-DD), overrides --days
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), exclusive
        #[arg(long)]
        end: Option<String>,

        /// Read bars from a CSV file instead of Yahoo Finance
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Write detected signals to a CSV file
        #[arg(long)]
        export_signals: Option<PathBuf>,

        /// Write the full report to a JSON file
        #[arg(long)]
        report_out: Option<PathBuf>,

        /// Write close-price series and breakout markers to a JSON file
        #[arg(long)]
        chart_out: Option<PathBuf>,
    },

    /// Download intraday bars from Yahoo Finance
    Download {
        /// Ticker symbol, e.g. "RELIANCE.NS"
        #[arg(short, long)]
        ticker: String,

        /// Bar interval in minutes: 1, 2, 5, 15, 30, 60 or 90
        #[arg(short, long)]
        interval: Option<u32>,

        /// Number of days of history to fetch
        #[arg(short, long)]
        days: Option<u32>,

        /// Output directory
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn setup_logging(verbose: bool, command_name: &str, file_only: bool) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Set log level - filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    if file_only {
        // Keep stdout clean for machine-readable output
        let file_appender = tracing_appender::rolling::never("logs", &log_filename);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    } else {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(true);

        let file_appender = tracing_appender::rolling::never("logs", &log_filename);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        info!("Logging initialized");
        info!("Log file: {}", log_path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (command_name, file_only) = match &cli.command {
        Commands::Analyze { json, .. } => ("analyze", *json),
        Commands::Download { .. } => ("download", false),
    };

    setup_logging(cli.verbose, command_name, file_only)?;

    match cli.command {
        Commands::Analyze {
            ticker,
            interval,
            days,
            start,
            end,
            csv,
            json,
            export_signals,
            report_out,
            chart_out,
        } => commands::analyze::run(
            &cli.config,
            AnalyzeArgs {
                ticker,
                interval,
                days,
                start,
                end,
                csv,
                json,
                export_signals,
                report_out,
                chart_out,
            },
        ),

        Commands::Download {
            ticker,
            interval,
            days,
            output,
        } => commands::download::run(&cli.config, ticker, interval, days, output),
    }
}
