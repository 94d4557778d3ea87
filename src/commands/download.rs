//! Download command - fetch intraday bars from Yahoo Finance into a CSV file

use anyhow::{Context, Result};
use chrono::Local;
use orb_scanner::data::{self, bar_filename};
use orb_scanner::{Config, Interval, Symbol, YahooClient};
use std::path::PathBuf;
use tracing::info;

pub fn run(
    config_path: &str,
    ticker: String,
    interval: Option<u32>,
    days: Option<u32>,
    output: Option<String>,
) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    config.validate()?;

    let symbol = Symbol::parse(&ticker)?;
    let interval = Interval::try_from(interval.unwrap_or(config.run.interval.minutes()))?;
    let days = days.unwrap_or(config.run.lookback_days);
    let output = output.unwrap_or_else(|| config.run.data_dir.clone());
    let (start, end) = data::lookback_range(Local::now().date_naive(), days)?;

    info!("Starting data download from Yahoo Finance");

    println!("\n{}", "=".repeat(60));
    println!("DOWNLOADING INTRADAY DATA FROM YAHOO FINANCE");
    println!("{}", "=".repeat(60));
    println!("  Ticker:     {}", symbol);
    println!("  Interval:   {}", interval);
    println!("  Range:      {} to {}", start, end);
    println!("  Output:     {}", output);
    println!("{}\n", "=".repeat(60));

    let client = YahooClient::with_config(&config.provider)
        .context("Failed to create Yahoo Finance client")?;
    let bars = client
        .fetch_bars(&symbol, start, end, interval)
        .context(format!("Failed to download {} {}", symbol, interval))?;
    let bars = data::normalize(bars);

    if bars.is_empty() {
        anyhow::bail!("No data fetched for {}", symbol);
    }

    let path = PathBuf::from(&output).join(bar_filename(&symbol, interval));
    let path = data::save_csv(&path, &bars)?;

    println!("  ✓ {} bars written to {}", bars.len(), path.display());
    println!("{}", "=".repeat(60));

    Ok(())
}
