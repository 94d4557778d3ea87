//! Yahoo Finance client for fetching intraday chart data
//!
//! No API key required. Blocking: one request per call, no retries.
//!
//! # Example
//! ```no_run
//! use chrono::NaiveDate;
//! use orb_scanner::yahoo::YahooClient;
//! use orb_scanner::{Interval, Symbol};
//!
//! fn main() -> anyhow::Result<()> {
//!     let client = YahooClient::new()?;
//!     let bars = client.fetch_bars(
//!         &Symbol::parse("RELIANCE.NS")?,
//!         NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
//!         Interval::try_from(5)?,
//!     )?;
//!     println!("Fetched {} bars", bars.len());
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use reqwest::blocking::Client;
use std::time::Duration as StdDuration;
use tracing::debug;

use super::types::{chart_bars, YahooResult};
use crate::config::ProviderConfig;
use crate::data::BarSource;
use crate::{Bar, Interval, Symbol};

/// Yahoo Finance chart API client
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    /// Create a client with the default provider settings
    pub fn new() -> YahooResult<Self> {
        Self::with_config(&ProviderConfig::default())
    }

    pub fn with_config(config: &ProviderConfig) -> YahooResult<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(YahooClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch bars for `[start, end)` at `interval`.
    ///
    /// Dates are taken as UTC midnights. Bars come back in exchange-local time.
    pub fn fetch_bars(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> YahooResult<Vec<Bar>> {
        let url = format!("{}/{}", self.base_url, symbol.as_str());
        let params = [
            ("period1", epoch_secs(start).to_string()),
            ("period2", epoch_secs(end).to_string()),
            ("interval", interval.as_code()),
            ("includePrePost", "false".to_string()),
        ];

        debug!(
            "Fetching chart: symbol={}, interval={}, start={}, end={}",
            symbol, interval, start, end
        );

        let response = self.client.get(&url).query(&params).send()?;
        let status = response.status();
        let body = response.text()?;

        chart_bars(status.as_u16(), &body)
    }
}

impl BarSource for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> anyhow::Result<Vec<Bar>> {
        Ok(self.fetch_bars(symbol, start, end, interval)?)
    }
}

fn epoch_secs(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
