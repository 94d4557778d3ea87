//! Run summary and report rendering
//!
//! Turns a `BreakoutAnalysis` into the point score, the text report printed by
//! the CLI, and the CSV/JSON exports.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::breakout::{BreakoutAnalysis, BreakoutSignal};
use crate::config::ScoringConfig;
use crate::{Direction, Interval, Outcome, Symbol};

/// Outcome tallies and point score for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub target_hits: usize,
    pub stop_hits: usize,
    pub no_hits: usize,
    pub total_trades: usize,
    pub points_from_targets: i64,
    pub points_from_stops: i64,
    pub total_points: i64,
}

impl Summary {
    pub fn from_analysis(analysis: &BreakoutAnalysis, scoring: &ScoringConfig) -> Self {
        let points_from_targets = analysis.target_hits as i64 * scoring.target_points;
        let points_from_stops = analysis.stop_hits as i64 * scoring.stop_points;

        Summary {
            target_hits: analysis.target_hits,
            stop_hits: analysis.stop_hits,
            no_hits: analysis.no_hits,
            total_trades: analysis.total_trades(),
            points_from_targets,
            points_from_stops,
            total_points: points_from_targets + points_from_stops,
        }
    }
}

/// Everything a presentation layer needs for one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub symbol: Symbol,
    pub interval: Interval,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub bars_loaded: usize,
    pub summary: Summary,
    pub signals: Vec<BreakoutSignal>,
}

impl Report {
    pub fn new(
        symbol: Symbol,
        interval: Interval,
        (start, end): (NaiveDate, NaiveDate),
        bars_loaded: usize,
        analysis: BreakoutAnalysis,
        scoring: &ScoringConfig,
    ) -> Self {
        let summary = Summary::from_analysis(&analysis, scoring);
        Report {
            symbol,
            interval,
            start,
            end,
            bars_loaded,
            summary,
            signals: analysis.signals,
        }
    }

    /// Plain-text report; distinguishes "no data" from "no breakouts"
    pub fn render_text(&self) -> String {
        if self.bars_loaded == 0 {
            return format!("No data returned for {}", self.symbol);
        }
        if self.signals.is_empty() {
            return "No valid breakouts found.".to_string();
        }

        let s = &self.summary;
        let mut out = String::new();
        out.push_str(&format!(
            "Total Points from Targets: {}, Total Points from Stop-Losses: {}, Total Trades: {}\n",
            s.points_from_targets, s.points_from_stops, s.total_trades
        ));
        out.push_str(&format!("Total Points: {}\n\n", s.total_points));

        for signal in &self.signals {
            out.push_str(&detail_line(signal));
            out.push('\n');
        }

        out.push_str(&format!(
            "\nTrades Target Hit: {}, Trades Stop-Loss Hit: {}, not SL hit or not Target: {}",
            s.target_hits, s.stop_hits, s.no_hits
        ));
        out
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).context("Failed to create report file")?;
        serde_json::to_writer_pretty(file, self).context("Failed to write report JSON")?;
        info!("Saved report to {}", path.display());
        Ok(())
    }
}

/// One line per signal, in the form shown in the detail view
pub fn detail_line(signal: &BreakoutSignal) -> String {
    format!(
        "Date: {}, Time: {}, Direction: {}, Trigger Price: {:.2}, Target: {:.2}, Stop-Loss: {:.2}, Trade Exit: {}",
        signal.date.format("%Y-%m-%d"),
        signal.triggered_at.format("%H:%M"),
        signal.direction,
        signal.trigger_price,
        signal.target,
        signal.stop_loss,
        signal.outcome
    )
}

/// Flat row for the signals CSV
#[derive(Debug, Serialize)]
struct SignalRow {
    date: NaiveDate,
    triggered_at: NaiveDateTime,
    direction: Direction,
    trigger_price: f64,
    target: f64,
    stop_loss: f64,
    range_high: f64,
    range_low: f64,
    outcome: Outcome,
}

impl From<&BreakoutSignal> for SignalRow {
    fn from(s: &BreakoutSignal) -> Self {
        SignalRow {
            date: s.date,
            triggered_at: s.triggered_at,
            direction: s.direction,
            trigger_price: s.trigger_price,
            target: s.target,
            stop_loss: s.stop_loss,
            range_high: s.opening_range.high,
            range_low: s.opening_range.low,
            outcome: s.outcome,
        }
    }
}

pub fn save_signals_csv(path: impl AsRef<Path>, signals: &[BreakoutSignal]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).context("Failed to create signals CSV")?;
    for signal in signals {
        writer
            .serialize(SignalRow::from(signal))
            .context("Failed to write signal row")?;
    }
    writer.flush()?;
    info!("Saved {} signals to {}", signals.len(), path.display());
    Ok(())
}
