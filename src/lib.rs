//! Opening Range Breakout Scanner
//!
//! Detects the first morning-range breakout of each trading day in a series of
//! intraday bars and reports whether the trade reached its target, its stop,
//! or neither, before the session ended.
//!
//! # Data sources
//! - **Yahoo Finance** (default): public chart endpoint, no API key required
//! - **CSV**: files written by the `download` command or any
//!   `datetime,open,high,low,close,volume` export
//!
//! ## Example
//! ```no_run
//! use orb_scanner::breakout::BreakoutAnalyzer;
//! use orb_scanner::data::{lookback_range, BarLoader};
//! use orb_scanner::yahoo::YahooClient;
//! use orb_scanner::{Interval, Symbol};
//!
//! fn main() -> anyhow::Result<()> {
//!     let loader = BarLoader::new(YahooClient::new()?);
//!     let (start, end) = lookback_range(chrono::Local::now().date_naive(), 30)?;
//!     let bars = loader.load(&Symbol::parse("RELIANCE.NS")?, start, end, Interval::try_from(5)?);
//!
//!     let analysis = BreakoutAnalyzer::default().analyze(&bars);
//!     println!(
//!         "{} trades: {} target, {} stop, {} neither",
//!         analysis.total_trades(),
//!         analysis.target_hits,
//!         analysis.stop_hits,
//!         analysis.no_hits
//!     );
//!     Ok(())
//! }
//! ```

pub mod breakout;
pub mod chart;
pub mod config;
pub mod data;
pub mod report;
pub mod types;
pub mod yahoo;

pub use config::Config;
pub use types::*;

pub use yahoo::YahooClient;
