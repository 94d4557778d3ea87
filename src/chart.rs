//! Chart data for an external plotter
//!
//! A close-price line plus one marker per trading day at the breakout bar.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::breakout::BreakoutSignal;
use crate::{Bar, Direction, Symbol};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosePoint {
    pub datetime: NaiveDateTime,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMarker {
    pub datetime: NaiveDateTime,
    pub price: f64,
    pub direction: Direction,
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub closes: Vec<ClosePoint>,
    pub markers: Vec<ChartMarker>,
}

impl ChartData {
    pub fn new(symbol: &Symbol, bars: &[Bar], signals: &[BreakoutSignal]) -> Self {
        ChartData {
            title: format!("Stock Breakout Analysis for {}", symbol),
            x_label: "Date".to_string(),
            y_label: "Price".to_string(),
            closes: bars
                .iter()
                .map(|b| ClosePoint {
                    datetime: b.datetime,
                    close: b.close,
                })
                .collect(),
            markers: markers(signals),
        }
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).context("Failed to create chart file")?;
        serde_json::to_writer(file, self).context("Failed to write chart JSON")?;
        info!(
            "Saved chart data ({} points, {} markers) to {}",
            self.closes.len(),
            self.markers.len(),
            path.display()
        );
        Ok(())
    }
}

/// Markers for the first signal of each trading day
pub fn markers(signals: &[BreakoutSignal]) -> Vec<ChartMarker> {
    let mut plotted: BTreeSet<NaiveDate> = BTreeSet::new();

    signals
        .iter()
        .filter(|s| plotted.insert(s.date))
        .map(|s| ChartMarker {
            datetime: s.triggered_at,
            price: s.trigger_price,
            direction: s.direction,
            color: match s.direction {
                Direction::Upside => "green",
                Direction::Downside => "red",
            }
            .to_string(),
            label: format!("{}\nPrice: {:.2}", s.outcome, s.trigger_price),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakout::OpeningRange;
    use crate::Outcome;

    fn signal(day: u32, hour: u32, direction: Direction) -> BreakoutSignal {
        let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        BreakoutSignal {
            date,
            direction,
            triggered_at: date.and_hms_opt(hour, 0, 0).unwrap(),
            trigger_price: 101.0,
            target: 102.0,
            stop_loss: 98.0,
            outcome: Outcome::Target,
            opening_range: OpeningRange { high: 100.0, low: 98.0 },
        }
    }

    #[test]
    fn test_one_marker_per_day() {
        let signals = vec![
            signal(2, 10, Direction::Upside),
            signal(2, 11, Direction::Downside),
            signal(3, 10, Direction::Downside),
        ];
        let m = markers(&signals);
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].color, "green");
        assert_eq!(m[0].datetime.to_string(), "2024-05-02 10:00:00");
        assert_eq!(m[1].color, "red");
        assert_eq!(m[1].label, "Target\nPrice: 101.00");
    }

    #[test]
    fn test_chart_data_title_and_series() {
        let symbol = Symbol::parse("TCS.NS").unwrap();
        let bars = vec![Bar::new_unchecked(
            NaiveDate::from_ymd_opt(2024, 5, 2)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap(),
            100.0,
            101.0,
            99.0,
            100.5,
            0.0,
        )];
        let chart = ChartData::new(&symbol, &bars, &[]);
        assert_eq!(chart.title, "Stock Breakout Analysis for TCS.NS");
        assert_eq!(chart.closes.len(), 1);
        assert_eq!(chart.closes[0].close, 100.5);
        assert!(chart.markers.is_empty());
    }
}
