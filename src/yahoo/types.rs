//! Yahoo Finance chart API types

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::Bar;

#[derive(Debug, Error)]
pub enum YahooError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("API error {code}: {description}")]
    Api { code: String, description: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("empty chart result")]
    EmptyResult,
}

pub type YahooResult<T> = Result<T, YahooError>;

/// Top-level `/v8/finance/chart/{symbol}` payload
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Bar open times, epoch seconds. Absent when the range has no data.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(rename = "exchangeTimezoneName")]
    pub exchange_timezone_name: Option<String>,
    pub gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

/// Column-oriented OHLCV; gaps in the session are reported as nulls
#[derive(Debug, Default, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// Converts epoch seconds into the exchange's wall-clock time
#[derive(Debug, Clone, Copy)]
pub enum ExchangeClock {
    Zone(Tz),
    Fixed(FixedOffset),
}

impl ExchangeClock {
    /// Prefers the named zone (DST-aware), then the fixed offset, then UTC
    pub fn from_meta(meta: &ChartMeta) -> Self {
        if let Some(zone) = meta
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
        {
            return ExchangeClock::Zone(zone);
        }

        let offset = meta
            .gmtoffset
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        ExchangeClock::Fixed(offset)
    }

    pub fn local(&self, epoch_secs: i64) -> Option<NaiveDateTime> {
        let utc = DateTime::from_timestamp(epoch_secs, 0)?;
        Some(match self {
            ExchangeClock::Zone(tz) => utc.with_timezone(tz).naive_local(),
            ExchangeClock::Fixed(offset) => utc.with_timezone(offset).naive_local(),
        })
    }
}

impl ChartResult {
    /// Row-wise bars in exchange-local time.
    ///
    /// Rows with any missing OHLC value are dropped; rows that fail validation
    /// are dropped with a warning.
    pub fn into_bars(self) -> Vec<Bar> {
        let clock = ExchangeClock::from_meta(&self.meta);
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars = Vec::with_capacity(self.timestamp.len());
        let mut null_rows = 0;

        for (i, &ts) in self.timestamp.iter().enumerate() {
            let column = |col: &[Option<f64>]| col.get(i).copied().flatten();

            let (open, high, low, close) = match (
                column(&quote.open),
                column(&quote.high),
                column(&quote.low),
                column(&quote.close),
            ) {
                (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
                _ => {
                    null_rows += 1;
                    continue;
                }
            };
            let volume = column(&quote.volume).unwrap_or(0.0);

            let datetime = match clock.local(ts) {
                Some(dt) => dt,
                None => {
                    warn!("Skipping bar with out-of-range timestamp {}", ts);
                    continue;
                }
            };

            match Bar::new(datetime, open, high, low, close, volume) {
                Ok(bar) => bars.push(bar),
                Err(e) => warn!(
                    "Skipping invalid bar at {} for {}: {}",
                    datetime, self.meta.symbol, e
                ),
            }
        }

        if null_rows > 0 {
            debug!("Dropped {} rows with missing prices for {}", null_rows, self.meta.symbol);
        }

        bars
    }
}

/// Decode a chart payload, surfacing the API's own error object when present
pub fn parse_chart(body: &str) -> YahooResult<ChartResult> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| YahooError::Parse(e.to_string()))?;

    if let Some(err) = response.chart.error {
        return Err(YahooError::Api {
            code: err.code,
            description: err.description,
        });
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or(YahooError::EmptyResult)
}

/// Turn an HTTP status and body into bars or the matching error
pub fn chart_bars(status: u16, body: &str) -> YahooResult<Vec<Bar>> {
    if status == 429 {
        return Err(YahooError::RateLimited);
    }

    // Unknown symbols come back as 404 with a JSON error object
    match parse_chart(body) {
        Err(e @ YahooError::Api { .. }) => Err(e),
        _ if !(200..300).contains(&status) => Err(YahooError::Http {
            status,
            body: truncate(body, 200),
        }),
        parsed => parsed.map(ChartResult::into_bars),
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
