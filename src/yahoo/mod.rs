//! Yahoo Finance chart API client for intraday OHLCV data
//! No API key needed for the public chart endpoint.

mod client;
mod types;

pub use client::YahooClient;
pub use types::*;
