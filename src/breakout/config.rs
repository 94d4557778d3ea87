//! Opening Range Breakout Configuration

use anyhow::Result;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutConfig {
    /// First time-of-day included in the opening range (default: 09:15)
    #[serde(default = "default_window_start")]
    pub window_start: NaiveTime,

    /// Time-of-day at which the opening range closes, exclusive (default: 09:20)
    #[serde(default = "default_window_end")]
    pub window_end: NaiveTime,

    /// Target distance from the stop, in opening-range widths (default: 2.0)
    #[serde(default = "default_target_multiple")]
    pub target_multiple: f64,
}

fn default_window_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default()
}
fn default_window_end() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 20, 0).unwrap_or_default()
}
fn default_target_multiple() -> f64 {
    2.0
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            window_start: default_window_start(),
            window_end: default_window_end(),
            target_multiple: default_target_multiple(),
        }
    }
}

impl BreakoutConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_start >= self.window_end {
            anyhow::bail!(
                "opening window start ({}) must be before its end ({})",
                self.window_start,
                self.window_end
            );
        }
        if !(self.target_multiple.is_finite() && self.target_multiple > 0.0) {
            anyhow::bail!(
                "target_multiple must be positive, got {}",
                self.target_multiple
            );
        }
        Ok(())
    }

    /// Whether a time-of-day falls inside [window_start, window_end)
    pub fn in_window(&self, time: NaiveTime) -> bool {
        time >= self.window_start && time < self.window_end
    }
}
