//! Opening Range Breakout
//!
//! First breakout of the morning range per trading day and its same-day outcome.

mod analyzer;
mod config;

pub use analyzer::{
    classify_outcome, group_by_day, BreakoutAnalysis, BreakoutAnalyzer, BreakoutSignal,
    OpeningRange,
};
pub use config::BreakoutConfig;

use crate::Config;
use anyhow::Result;

/// Create analyzer from config
pub fn create(config: &Config) -> Result<BreakoutAnalyzer> {
    config.breakout.validate()?;
    Ok(BreakoutAnalyzer::new(config.breakout.clone()))
}
