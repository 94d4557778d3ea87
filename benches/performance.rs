//! Performance benchmarks for orb-scanner
//!
//! Run with: `cargo bench`
//! View results: `open target/criterion/report/index.html`

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use orb_scanner::breakout::BreakoutAnalyzer;
use orb_scanner::Bar;

/// `days` sessions of 1-minute bars, 09:15 to 15:29, drifting up and down
fn generate_sessions(days: i64) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut bars = Vec::with_capacity((days * 375) as usize);

    for d in 0..days {
        let open = (start + Duration::days(d)).and_hms_opt(9, 15, 0).unwrap();
        let mut price = 100.0 + (d % 7) as f64;
        for m in 0..375 {
            let step = if (m / 25 + d) % 2 == 0 { 0.05 } else { -0.05 };
            price += step;
            bars.push(Bar::new_unchecked(
                open + Duration::minutes(m),
                price,
                price + 0.1,
                price - 0.1,
                price + step * 0.5,
                1000.0,
            ));
        }
    }

    bars
}

fn benchmark_analyze(c: &mut Criterion) {
    let analyzer = BreakoutAnalyzer::default();
    let month = generate_sessions(22);
    let year = generate_sessions(250);

    c.bench_function("analyze_1m_one_month", |b| {
        b.iter(|| analyzer.analyze(black_box(&month)))
    });
    c.bench_function("analyze_1m_one_year", |b| {
        b.iter(|| analyzer.analyze(black_box(&year)))
    });
}

criterion_group!(benches, benchmark_analyze);
criterion_main!(benches);
