//! Data loading
//!
//! The bar loader wraps a `BarSource` (Yahoo Finance or a local CSV file) and
//! turns every fetch failure into an empty series so the analysis pass always
//! runs. Also handles reading and writing bar CSV files.

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{Bar, InputError, Interval, Symbol};

// =============================================================================
// Sources
// =============================================================================

/// Anything that can produce bars for a symbol, date range and interval
pub trait BarSource {
    fn name(&self) -> &str;

    /// Bars for `[start, end)`. Implementations return errors; the loader absorbs them.
    fn fetch(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<Bar>>;
}

/// Bars read from a CSV file previously written by `save_csv`
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource { path: path.into() }
    }
}

impl BarSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<Bar>> {
        debug!(
            "Reading {} {} bars from {}",
            symbol,
            interval,
            self.path.display()
        );
        let bars = load_csv(&self.path)?;
        Ok(filter_bars_by_date(bars, start, end))
    }
}

// =============================================================================
// Loader
// =============================================================================

/// Single best-effort fetch: no caching, no retries, no pagination
pub struct BarLoader<S: BarSource> {
    source: S,
}

impl<S: BarSource> BarLoader<S> {
    pub fn new(source: S) -> Self {
        BarLoader { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load bars in ascending timestamp order; any failure yields an empty series
    pub fn load(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Vec<Bar> {
        if start > end {
            warn!("Start date {} is after end date {}, nothing to load", start, end);
            return Vec::new();
        }

        match self.source.fetch(symbol, start, end, interval) {
            Ok(bars) => {
                let bars = normalize(bars);
                info!(
                    "Data fetched: {} bars for {} ({}, {} to {}) from {}",
                    bars.len(),
                    symbol,
                    interval,
                    start,
                    end,
                    self.source.name()
                );
                bars
            }
            Err(e) => {
                warn!(
                    "Error fetching data for {} from {}: {:#}",
                    symbol,
                    self.source.name(),
                    e
                );
                Vec::new()
            }
        }
    }
}

/// Sort ascending and drop duplicate timestamps (first occurrence wins)
pub fn normalize(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.datetime);
    let before = bars.len();
    bars.dedup_by_key(|b| b.datetime);
    if bars.len() < before {
        debug!("Dropped {} duplicate bars", before - bars.len());
    }
    bars
}

/// `[today - days, today)` as used by a default scan
pub fn lookback_range(
    today: NaiveDate,
    days: u32,
) -> std::result::Result<(NaiveDate, NaiveDate), InputError> {
    if days == 0 {
        return Err(InputError::InvalidLookback(days));
    }
    let start = today
        .checked_sub_days(Days::new(days.into()))
        .ok_or(InputError::InvalidLookback(days))?;
    Ok((start, today))
}

/// Keep bars whose trading date lies in `[start, end)`
pub fn filter_bars_by_date(bars: Vec<Bar>, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    bars.into_iter()
        .filter(|b| {
            let date = b.trading_date();
            date >= start && date < end
        })
        .collect()
}

/// Canonical file name for saved bars, e.g. `RELIANCE.NS_5m.csv`
pub fn bar_filename(symbol: &Symbol, interval: Interval) -> String {
    format!("{}_{}.csv", symbol.as_str(), interval.as_code())
}

// =============================================================================
// CSV
// =============================================================================

/// Load bars from a CSV file with validation
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).context("Failed to open CSV file")?;

    let mut bars = Vec::new();
    let mut invalid_count = 0;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.context(format!("Failed to read row {}", row_idx + 1))?;

        let dt_str = record.get(0).context("Missing datetime column")?;
        let datetime = parse_datetime(dt_str)?;

        let field = |idx: usize, name: &str| -> Result<f64> {
            record
                .get(idx)
                .context(format!("Missing {} column", name))?
                .trim()
                .parse()
                .context(format!("Failed to parse {} at row {}", name, row_idx + 1))
        };

        let open = field(1, "open")?;
        let high = field(2, "high")?;
        let low = field(3, "low")?;
        let close = field(4, "close")?;
        let volume = field(5, "volume")?;

        match Bar::new(datetime, open, high, low, close, volume) {
            Ok(bar) => bars.push(bar),
            Err(e) => {
                invalid_count += 1;
                warn!(
                    "Skipping invalid bar at row {} in {:?}: {}",
                    row_idx + 2, // +2 for 1-indexed and header row
                    path.file_name().unwrap_or_default(),
                    e
                );
            }
        }
    }

    if invalid_count > 0 {
        warn!(
            "Skipped {} invalid bars out of {} in {:?}",
            invalid_count,
            invalid_count + bars.len(),
            path.file_name().unwrap_or_default()
        );
    }

    Ok(bars)
}

/// Save bars to a CSV file in the format `load_csv` reads
pub fn save_csv(path: impl AsRef<Path>, bars: &[Bar]) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }
    let mut file = File::create(path).context("Failed to create output file")?;

    writeln!(file, "datetime,open,high,low,close,volume")?;

    for bar in bars {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            bar.datetime.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        )?;
    }

    info!("Saved {} rows to {}", bars.len(), path.display());
    Ok(path.to_path_buf())
}

/// Parse a bar timestamp as exchange-local wall-clock time.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]`, the `T`-separated form, and RFC 3339 with
/// an offset (the offset is dropped, keeping local time).
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();

    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.naive_local());
    }

    anyhow::bail!("Failed to parse datetime: {}", s)
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").context(format!(
        "Failed to parse date: {}. Use YYYY-MM-DD format",
        date_str
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ts(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    fn bar(s: &str, close: f64) -> Bar {
        Bar::new_unchecked(ts(s), close, close + 1.0, close - 1.0, close, 10.0)
    }

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    struct FailingSource;

    impl BarSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, _: &Symbol, _: NaiveDate, _: NaiveDate, _: Interval) -> Result<Vec<Bar>> {
            anyhow::bail!("connection refused")
        }
    }

    struct StaticSource {
        bars: Vec<Bar>,
        calls: Cell<usize>,
    }

    impl BarSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch(&self, _: &Symbol, _: NaiveDate, _: NaiveDate, _: Interval) -> Result<Vec<Bar>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.bars.clone())
        }
    }

    #[test]
    fn test_loader_swallows_errors() {
        let loader = BarLoader::new(FailingSource);
        let symbol = Symbol::parse("INFY.NS").unwrap();
        let bars = loader.load(
            &symbol,
            date("2024-05-01"),
            date("2024-05-31"),
            Interval::default(),
        );
        assert!(bars.is_empty());
    }

    #[test]
    fn test_loader_sorts_and_dedups_with_single_fetch() {
        let source = StaticSource {
            bars: vec![
                bar("2024-05-02 09:20:00", 101.0),
                bar("2024-05-02 09:15:00", 100.0),
                bar("2024-05-02 09:20:00", 999.0),
            ],
            calls: Cell::new(0),
        };
        let loader = BarLoader::new(source);
        let symbol = Symbol::parse("INFY.NS").unwrap();
        let bars = loader.load(
            &symbol,
            date("2024-05-01"),
            date("2024-05-31"),
            Interval::default(),
        );
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 100.0);
        assert_eq!(bars[1].close, 101.0);
        assert_eq!(loader.source().calls.get(), 1);
    }

    #[test]
    fn test_loader_rejects_inverted_range() {
        let source = StaticSource {
            bars: vec![bar("2024-05-02 09:15:00", 100.0)],
            calls: Cell::new(0),
        };
        let loader = BarLoader::new(source);
        let symbol = Symbol::parse("INFY.NS").unwrap();
        let bars = loader.load(
            &symbol,
            date("2024-05-31"),
            date("2024-05-01"),
            Interval::default(),
        );
        assert!(bars.is_empty());
        assert_eq!(loader.source().calls.get(), 0);
    }

    #[test]
    fn test_lookback_range() {
        let (start, end) = lookback_range(date("2024-05-31"), 30).unwrap();
        assert_eq!(start, date("2024-05-01"));
        assert_eq!(end, date("2024-05-31"));
    }

    #[test]
    fn test_lookback_range_rejects_zero_and_overflow() {
        let today = date("2026-10-14");
        assert_eq!(
            lookback_range(today, 0),
            Err(InputError::InvalidLookback(0))
        );
        assert_eq!(
            lookback_range(today, 200_000_000),
            Err(InputError::InvalidLookback(200_000_000))
        );
        assert_eq!(
            lookback_range(today, u32::MAX),
            Err(InputError::InvalidLookback(u32::MAX))
        );
    }

    #[test]
    fn test_filter_bars_by_date_is_half_open() {
        let bars = vec![
            bar("2024-04-30 15:25:00", 1.0),
            bar("2024-05-01 09:15:00", 2.0),
            bar("2024-05-02 09:15:00", 3.0),
        ];
        let kept = filter_bars_by_date(bars, date("2024-05-01"), date("2024-05-02"));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].close, 2.0);
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert_eq!(ts("2024-05-02 09:15:00").to_string(), "2024-05-02 09:15:00");
        assert_eq!(ts("2024-05-02 09:15").to_string(), "2024-05-02 09:15:00");
        assert_eq!(ts("2024-05-02T09:15:00").to_string(), "2024-05-02 09:15:00");
        assert_eq!(
            ts("2024-05-02T09:15:00+05:30").to_string(),
            "2024-05-02 09:15:00"
        );
        assert_eq!(
            ts("2024-05-02 09:15:00+05:30").to_string(),
            "2024-05-02 09:15:00"
        );
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(date("2024-05-02").to_string(), "2024-05-02");
        assert!(parse_date("02/05/2024").is_err());
    }

    #[test]
    fn test_csv_round_trip_skips_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(
            &path,
            "datetime,open,high,low,close,volume\n\
             2024-05-02 09:15:00,100,100.5,99,99.8,1200\n\
             2024-05-02 09:20:00,100,99,101,100,10\n\
             2024-05-02 09:25:00,99.5,100,99,99.2,950\n",
        )
        .unwrap();

        let bars = load_csv(&path).unwrap();
        assert_eq!(bars.len(), 2);

        let out = dir.path().join("nested").join("out.csv");
        save_csv(&out, &bars).unwrap();
        assert_eq!(load_csv(&out).unwrap(), bars);
    }

    #[test]
    fn test_csv_source_filters_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        save_csv(
            &path,
            &[
                bar("2024-05-01 09:15:00", 100.0),
                bar("2024-06-03 09:15:00", 100.0),
            ],
        )
        .unwrap();

        let loader = BarLoader::new(CsvSource::new(&path));
        let symbol = Symbol::parse("INFY.NS").unwrap();
        let bars = loader.load(
            &symbol,
            date("2024-05-01"),
            date("2024-05-31"),
            Interval::default(),
        );
        assert_eq!(bars.len(), 1);
    }

    #[test]
    fn test_missing_csv_becomes_empty() {
        let loader = BarLoader::new(CsvSource::new("/nonexistent/bars.csv"));
        let symbol = Symbol::parse("INFY.NS").unwrap();
        let bars = loader.load(
            &symbol,
            date("2024-05-01"),
            date("2024-05-31"),
            Interval::default(),
        );
        assert!(bars.is_empty());
    }

    #[test]
    fn test_bar_filename() {
        let symbol = Symbol::parse("reliance.ns").unwrap();
        let interval = Interval::try_from(15).unwrap();
        assert_eq!(bar_filename(&symbol, interval), "RELIANCE.NS_15m.csv");
    }
}
