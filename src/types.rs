//! Core data types used across the scanner

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for bar data
#[derive(Debug, Error, PartialEq)]
pub enum BarValidationError {
    #[error("high ({high}) must be >= low ({low})")]
    HighLessThanLow { high: f64, low: f64 },

    #[error("volume ({0}) must be >= 0")]
    NegativeVolume(f64),

    #[error("prices must be positive and finite: open={open}, high={high}, low={low}, close={close}")]
    InvalidPrice {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

/// One OHLCV sample.
///
/// `datetime` is the exchange's local wall-clock time, so the calendar date and
/// time-of-day read off it directly are the trading day and session time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub datetime: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Create a new bar with validation
    pub fn new(
        datetime: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, BarValidationError> {
        let bar = Self::new_unchecked(datetime, open, high, low, close, volume);
        bar.validate()?;
        Ok(bar)
    }

    /// Create a bar without validation (for trusted sources or when validation is done separately)
    pub fn new_unchecked(
        datetime: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            datetime,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Validate the bar data
    pub fn validate(&self) -> Result<(), BarValidationError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(BarValidationError::InvalidPrice {
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }

        if self.high < self.low {
            return Err(BarValidationError::HighLessThanLow {
                high: self.high,
                low: self.low,
            });
        }

        if self.volume < 0.0 {
            return Err(BarValidationError::NegativeVolume(self.volume));
        }

        Ok(())
    }

    /// Trading day this bar belongs to
    pub fn trading_date(&self) -> NaiveDate {
        self.datetime.date()
    }
}

/// Ticker symbol as understood by the data provider (e.g. "RELIANCE.NS")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Trims and upper-cases the ticker; rejects an empty one.
    pub fn parse(s: &str) -> Result<Self, InputError> {
        let ticker = s.trim();
        if ticker.is_empty() {
            return Err(InputError::EmptySymbol);
        }
        Ok(Symbol(ticker.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User-input errors, raised before any data is loaded
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("ticker symbol must not be empty")]
    EmptySymbol,

    #[error("unsupported interval {0}m, expected one of 1, 2, 5, 15, 30, 60, 90")]
    UnsupportedInterval(u32),

    #[error("lookback of {0} days is out of range")]
    InvalidLookback(u32),

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Intraday sampling interval supported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Interval(u32);

impl Interval {
    /// Minutes the provider accepts
    pub const SUPPORTED: &'static [u32] = &[1, 2, 5, 15, 30, 60, 90];

    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Provider/file-name form, e.g. "5m"
    pub fn as_code(&self) -> String {
        format!("{}m", self.0)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval(5)
    }
}

impl TryFrom<u32> for Interval {
    type Error = InputError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        if Self::SUPPORTED.contains(&minutes) {
            Ok(Interval(minutes))
        } else {
            Err(InputError::UnsupportedInterval(minutes))
        }
    }
}

impl From<Interval> for u32 {
    fn from(interval: Interval) -> Self {
        interval.0
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// Breakout direction relative to the opening range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upside,
    Downside,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Upside => write!(f, "upside"),
            Direction::Downside => write!(f, "downside"),
        }
    }
}

/// How a breakout trade resolved within its day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Target,
    Stoploss,
    NoHit,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Target => write!(f, "Target"),
            Outcome::Stoploss => write!(f, "Stoploss"),
            Outcome::NoHit => write!(f, "NoHit"),
        }
    }
}
