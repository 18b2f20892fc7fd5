// src/test_util.rs

use std::num::NonZero;

use crate::{Bar, Indicator, Timestamp};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() <= e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

/// Asserts that two `f64` values are within an absolute tolerance.
macro_rules! assert_near {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (a, e, t) = ($actual, $expected, $tolerance);
        assert!(
            (a - e).abs() <= t,
            "assert_near failed: actual={a}, expected={e}, diff={} > {t}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;
pub(crate) use assert_near;

pub fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).unwrap()
}

/// Convenience: bar with just a close price and timestamp (OHLC all equal to close).
pub fn bar(close: f64, time: Timestamp) -> Bar {
    Bar::from_value(close, time)
}

pub fn ohlc(open: f64, high: f64, low: f64, close: f64, time: Timestamp) -> Bar {
    Bar::new(open, high, low, close).at(time)
}

/// Feeds closes at consecutive timestamps starting at 1 and collects outputs.
pub fn feed_closes<I: Indicator>(indicator: &mut I, closes: &[f64]) -> Vec<Option<I::Output>> {
    closes
        .iter()
        .zip(1..)
        .map(|(&close, t)| indicator.compute(&bar(close, t)).unwrap())
        .collect()
}

/// Feeds bars in order and collects outputs.
pub fn feed_bars<I: Indicator>(indicator: &mut I, bars: &[Bar]) -> Vec<Option<I::Output>> {
    bars.iter()
        .map(|bar| indicator.compute(bar).unwrap())
        .collect()
}

/// Number of leading `None` outputs.
pub fn warm_up<T>(outputs: &[Option<T>]) -> usize {
    outputs.iter().take_while(|v| v.is_none()).count()
}

/// Gently trending, oscillating OHLCV series with non-zero volume.
pub fn wave_bars(count: usize) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f64;
            let close = 100.0 + 0.3 * x + 5.0 * (x * 0.7).sin();
            let open = close - 1.5 * (x * 1.3).cos();
            let high = open.max(close) + 1.0 + (x * 0.9).sin().abs();
            let low = open.min(close) - 1.0 - (x * 1.1).cos().abs();
            Bar::new(open, high, low, close)
                .at(i as u64 + 1)
                .with_volume(1_000.0 + 250.0 * (x * 0.5).sin())
        })
        .collect()
}
