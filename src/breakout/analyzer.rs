//! Opening Range Breakout analysis
//!
//! Per trading day:
//! - Range: high/low of the bars inside the opening window
//! - Entry: first bar whose high clears the range high (upside) or whose low
//!   breaks the range low (downside); upside is checked first on each bar
//! - Levels: stop at the opposite side of the range, target `target_multiple`
//!   range widths beyond the stop
//! - Outcome: classified against every close of the day, target before stop
//!
//! Days without an opening-window bar are skipped. There is no state across days.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::config::BreakoutConfig;
use crate::{Bar, Direction, Outcome};

/// High/low extremes of a day's opening window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningRange {
    pub high: f64,
    pub low: f64,
}

impl OpeningRange {
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// The single breakout detected on a trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutSignal {
    pub date: NaiveDate,
    pub direction: Direction,
    pub triggered_at: NaiveDateTime,
    /// Close of the triggering bar
    pub trigger_price: f64,
    pub target: f64,
    pub stop_loss: f64,
    pub outcome: Outcome,
    pub opening_range: OpeningRange,
}

/// Signals of one run plus the outcome tallies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakoutAnalysis {
    pub signals: Vec<BreakoutSignal>,
    pub target_hits: usize,
    pub stop_hits: usize,
    pub no_hits: usize,
}

impl BreakoutAnalysis {
    pub fn total_trades(&self) -> usize {
        self.signals.len()
    }

    fn record(&mut self, signal: BreakoutSignal) {
        match signal.outcome {
            Outcome::Target => self.target_hits += 1,
            Outcome::Stoploss => self.stop_hits += 1,
            Outcome::NoHit => self.no_hits += 1,
        }
        self.signals.push(signal);
    }
}

#[derive(Debug, Clone, Default)]
pub struct BreakoutAnalyzer {
    config: BreakoutConfig,
}

impl BreakoutAnalyzer {
    pub fn new(config: BreakoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BreakoutConfig {
        &self.config
    }

    /// Run the breakout scan over a bar series.
    ///
    /// An empty series yields an empty analysis.
    pub fn analyze(&self, bars: &[Bar]) -> BreakoutAnalysis {
        let mut analysis = BreakoutAnalysis::default();

        for (date, day_bars) in group_by_day(bars) {
            let range = match self.opening_range(&day_bars) {
                Some(r) => r,
                None => {
                    debug!("{}: no bars in opening window, skipping", date);
                    continue;
                }
            };

            if let Some(signal) = self.scan_day(date, range, &day_bars) {
                debug!(
                    "{}: {} breakout at {} (close {:.2}, target {:.2}, stop {:.2}) -> {}",
                    date,
                    signal.direction,
                    signal.triggered_at.format("%H:%M"),
                    signal.trigger_price,
                    signal.target,
                    signal.stop_loss,
                    signal.outcome
                );
                analysis.record(signal);
            }
        }

        analysis
    }

    /// Extremes of the bars whose time-of-day falls in the opening window
    pub fn opening_range(&self, day_bars: &[&Bar]) -> Option<OpeningRange> {
        day_bars
            .iter()
            .filter(|b| self.config.in_window(b.datetime.time()))
            .fold(None, |acc: Option<OpeningRange>, b| {
                Some(match acc {
                    Some(r) => OpeningRange {
                        high: r.high.max(b.high),
                        low: r.low.min(b.low),
                    },
                    None => OpeningRange {
                        high: b.high,
                        low: b.low,
                    },
                })
            })
    }

    /// Stop and target for a breakout in `direction`
    pub fn levels(&self, direction: Direction, range: OpeningRange) -> (f64, f64) {
        let reach = self.config.target_multiple * range.width();
        match direction {
            Direction::Upside => (range.low, range.low + reach),
            Direction::Downside => (range.high, range.high - reach),
        }
    }

    fn scan_day(
        &self,
        date: NaiveDate,
        range: OpeningRange,
        day_bars: &[&Bar],
    ) -> Option<BreakoutSignal> {
        let (bar, direction) = day_bars.iter().find_map(|b| {
            if b.high > range.high {
                Some((*b, Direction::Upside))
            } else if b.low < range.low {
                Some((*b, Direction::Downside))
            } else {
                None
            }
        })?;

        let (stop_loss, target) = self.levels(direction, range);

        Some(BreakoutSignal {
            date,
            direction,
            triggered_at: bar.datetime,
            trigger_price: bar.close,
            target,
            stop_loss,
            outcome: classify_outcome(direction, target, stop_loss, day_bars),
            opening_range: range,
        })
    }
}

/// Classify against every close of the day, including closes before the trigger.
///
/// A target close anywhere in the day wins over a stop close anywhere in the day.
pub fn classify_outcome(
    direction: Direction,
    target: f64,
    stop_loss: f64,
    day_bars: &[&Bar],
) -> Outcome {
    let (hit_target, hit_stop) = match direction {
        Direction::Upside => (
            day_bars.iter().any(|b| b.close >= target),
            day_bars.iter().any(|b| b.close <= stop_loss),
        ),
        Direction::Downside => (
            day_bars.iter().any(|b| b.close <= target),
            day_bars.iter().any(|b| b.close >= stop_loss),
        ),
    };

    if hit_target {
        Outcome::Target
    } else if hit_stop {
        Outcome::Stoploss
    } else {
        Outcome::NoHit
    }
}

/// Group bars by calendar date, ascending, keeping input order within a day
pub fn group_by_day(bars: &[Bar]) -> BTreeMap<NaiveDate, Vec<&Bar>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Bar>> = BTreeMap::new();
    for bar in bars {
        days.entry(bar.trading_date()).or_default().push(bar);
    }
    days
}
