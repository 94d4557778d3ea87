//! Analyze command implementation

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use orb_scanner::breakout;
use orb_scanner::chart::ChartData;
use orb_scanner::data::{self, BarLoader, CsvSource};
use orb_scanner::report::{self, Report};
use orb_scanner::{Config, Interval, Symbol, YahooClient};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub ticker: String,
    pub interval: Option<u32>,
    pub days: Option<u32>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub csv: Option<PathBuf>,
    pub json: bool,
    pub export_signals: Option<PathBuf>,
    pub report_out: Option<PathBuf>,
    pub chart_out: Option<PathBuf>,
}

pub fn run(config_path: &str, args: AnalyzeArgs) -> Result<()> {
    info!("Starting breakout scan");

    let config = Config::load_or_default(config_path)?;
    config.validate()?;
    debug!("Configuration: {:?}", config);

    // Input validation happens before any data is requested
    let symbol = Symbol::parse(&args.ticker)?;
    let interval = Interval::try_from(args.interval.unwrap_or(config.run.interval.minutes()))
        .context("Please select a valid interval")?;
    let (start, end) = resolve_range(&config, &args, Local::now().date_naive())?;

    info!(
        "Scanning {} at {} from {} to {}",
        symbol, interval, start, end
    );

    let bars = match &args.csv {
        Some(path) => {
            info!("Loading bars from: {}", path.display());
            BarLoader::new(CsvSource::new(path)).load(&symbol, start, end, interval)
        }
        None => {
            let client = YahooClient::with_config(&config.provider)
                .context("Failed to create Yahoo Finance client")?;
            BarLoader::new(client).load(&symbol, start, end, interval)
        }
    };

    let analyzer = breakout::create(&config)?;
    info!("Analyzing {} bars...", bars.len());
    let analysis = analyzer.analyze(&bars);
    info!(
        "Found {} breakouts ({} target, {} stop, {} neither)",
        analysis.total_trades(),
        analysis.target_hits,
        analysis.stop_hits,
        analysis.no_hits
    );

    let report = Report::new(
        symbol.clone(),
        interval,
        (start, end),
        bars.len(),
        analysis,
        &config.scoring,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\n{}", "=".repeat(60));
        println!("BREAKOUT SCAN: {} ({}, {} to {})", symbol, interval, start, end);
        println!("{}", "=".repeat(60));
        println!("{}", report.render_text());
        println!("{}", "=".repeat(60));
    }

    if let Some(path) = &args.export_signals {
        report::save_signals_csv(path, &report.signals)?;
    }
    if let Some(path) = &args.report_out {
        report.save_json(path)?;
    }
    if let Some(path) = &args.chart_out {
        ChartData::new(&symbol, &bars, &report.signals).save_json(path)?;
    }

    info!("Scan completed");
    Ok(())
}

/// Explicit `--start/--end` win; otherwise the last `days` up to `today`
fn resolve_range(
    config: &Config,
    args: &AnalyzeArgs,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let days = args.days.unwrap_or(config.run.lookback_days);
    let (default_start, default_end) = data::lookback_range(today, days)?;

    let start = match &args.start {
        Some(s) => data::parse_date(s)?,
        None => default_start,
    };
    let end = match &args.end {
        Some(s) => data::parse_date(s)?,
        None => default_end,
    };

    if start > end {
        return Err(orb_scanner::InputError::InvertedRange { start, end }.into());
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orb_scanner::InputError;

    fn args() -> AnalyzeArgs {
        AnalyzeArgs {
            ticker: "RELIANCE.NS".to_string(),
            interval: None,
            days: None,
            start: None,
            end: None,
            csv: None,
            json: false,
            export_signals: None,
            report_out: None,
            chart_out: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        data::parse_date(s).unwrap()
    }

    #[test]
    fn test_resolve_range_defaults_to_lookback() {
        let range = resolve_range(&Config::default(), &args(), date("2024-05-31")).unwrap();
        assert_eq!(range, (date("2024-05-01"), date("2024-05-31")));
    }

    #[test]
    fn test_resolve_range_explicit_dates() {
        let args = AnalyzeArgs {
            start: Some("2024-04-01".to_string()),
            end: Some("2024-04-15".to_string()),
            ..args()
        };
        let range = resolve_range(&Config::default(), &args, date("2024-05-31")).unwrap();
        assert_eq!(range, (date("2024-04-01"), date("2024-04-15")));
    }

    #[test]
    fn test_resolve_range_rejects_inverted_dates() {
        let args = AnalyzeArgs {
            start: Some("2024-05-20".to_string()),
            end: Some("2024-05-10".to_string()),
            ..args()
        };
        let err = resolve_range(&Config::default(), &args, date("2024-05-31")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<InputError>(),
            Some(&InputError::InvertedRange {
                start: date("2024-05-20"),
                end: date("2024-05-10"),
            })
        );
    }

    #[test]
    fn test_resolve_range_rejects_bad_lookback() {
        for days in [0, 200_000_000] {
            let args = AnalyzeArgs {
                days: Some(days),
                ..args()
            };
            let err = resolve_range(&Config::default(), &args, date("2024-05-31")).unwrap_err();
            assert_eq!(
                err.downcast_ref::<InputError>(),
                Some(&InputError::InvalidLookback(days))
            );
        }
    }
}
