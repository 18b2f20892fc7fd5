#![allow(dead_code)]

use quantedge_ta::{Bar, DynIndicator, Price};
use serde::de::DeserializeOwned;
use std::num::NonZero;

const OHLCV_PATH: &str = "tests/fixtures/data/ohlcv-1h.csv";

pub fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).unwrap()
}

/// Load the hourly OHLCV fixture.
pub fn load_bars() -> Vec<Bar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// Bars whose four prices all equal the given closes, at `open_time` 1, 2, …
pub fn closes(values: &[f64]) -> Vec<Bar> {
    values
        .iter()
        .zip(1..)
        .map(|(&close, t)| Bar::from_value(close, t))
        .collect()
}

/// Latest cells of a type-erased indicator.
pub fn latest(indicator: &dyn DynIndicator) -> Vec<Option<Price>> {
    let mut out = Vec::new();
    indicator.write_latest(&mut out);
    out
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Creates perturbed versions of a bar to simulate live repaints.
///
/// Returns 2 intermediate bars (with shifted close/high/low) followed
/// by the original bar. All share the same `open_time`.
pub fn repaint_sequence(bar: &Bar) -> Vec<Bar> {
    let t = bar.open_time;
    vec![
        // First tick: only open is known, close near open
        Bar::new(bar.open, bar.open * 1.001, bar.open * 0.999, bar.open * 1.0005)
            .with_volume(bar.volume * 0.25)
            .at(t),
        // Mid-bar: partial movement toward final values
        Bar::new(
            bar.open,
            bar.open.midpoint(bar.high),
            bar.open.midpoint(bar.low),
            bar.open.midpoint(bar.close),
        )
        .with_volume(bar.volume * 0.5)
        .at(t),
        // Final: real OHLCV values
        *bar,
    ]
}

/// Assert every output cell matches between closed and repainted
/// indicators. Tolerance is relative, with a floor of `tolerance`.
pub fn assert_cells_match(
    name: &str,
    bar_idx: usize,
    closed: &[Option<f64>],
    repainted: &[Option<f64>],
    tolerance: f64,
) {
    assert_eq!(closed.len(), repainted.len());
    for (field, (c, r)) in closed.iter().zip(repainted).enumerate() {
        match (c, r) {
            (None, None) => {} // both pre-convergence, fine
            (Some(c), Some(r)) => {
                let diff = (c - r).abs();
                let allowed = tolerance * c.abs().max(1.0);
                assert!(
                    diff <= allowed,
                    "{name} field {field} diverged at bar {bar_idx}: closed={c:.10}, repainted={r:.10}, diff={diff:.2e}"
                );
            }
            (c, r) => {
                panic!(
                    "{name} field {field} convergence mismatch at bar {bar_idx}: closed={c:?}, repainted={r:?}"
                );
            }
        }
    }
}

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
