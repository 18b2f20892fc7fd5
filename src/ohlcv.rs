use serde::Deserialize;

/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar open timestamp or sequence number.
///
/// Used for bar boundary detection. Must be non-decreasing
/// between consecutive calls to [`Indicator::compute`](crate::Indicator::compute).
pub type Timestamp = u64;

/// OHLCV bar data used as input to all indicators.
///
/// Implement this on your own kline/candle type to avoid per-tick
/// conversion. Indicators accept `&impl Ohlcv` and extract the
/// configured [`PriceSource`](crate::PriceSource) internally.
///
/// # Bar boundaries
///
/// Indicators detect new bars by comparing [`open_time`](Ohlcv::open_time)
/// values: same timestamp updates (repaints) the current bar, a new timestamp
/// advances the window, an earlier timestamp is rejected with
/// [`Error::OrderingViolation`](crate::Error::OrderingViolation).
///
/// # Example
///
/// ```
/// use quantedge_ta::{Ohlcv, Price, Timestamp};
///
/// struct MyKline {
///     o: f64, h: f64, l: f64, c: f64,
///     ts: u64,
/// }
///
/// impl Ohlcv for MyKline {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn open_time(&self) -> Timestamp { self.ts }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing (or latest) price of the bar.
    fn close(&self) -> Price;

    /// Bar open timestamp or sequence number.
    ///
    /// Consecutive calls with the same value repaint the current bar; a new
    /// value advances the indicator window.
    fn open_time(&self) -> Timestamp;

    /// Trade volume during the bar. Defaults to `0.0`.
    ///
    /// Override this for volume-dependent indicators (VWMA, EMV, KVO).
    /// Indicators that don't use volume ignore this value.
    fn volume(&self) -> f64 {
        0.0
    }
}

/// Owned OHLCV bar.
///
/// Convenience [`Ohlcv`] implementation for callers without their own kline
/// type. Also the carrier used when one indicator's output feeds another:
/// see [`Bar::from_value`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Bar {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    #[serde(default)]
    pub volume: f64,
    pub open_time: Timestamp,
}

impl Bar {
    /// Bar with the given prices, zero volume and `open_time` 0.
    #[must_use]
    pub fn new(open: Price, high: Price, low: Price, close: Price) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume: 0.0,
            open_time: 0,
        }
    }

    /// Synthetic bar whose four prices all equal `value`.
    ///
    /// Feeding these into an indicator makes it compute over another
    /// indicator's output stream instead of raw prices.
    #[must_use]
    pub fn from_value(value: Price, open_time: Timestamp) -> Self {
        Self::new(value, value, value, value).at(open_time)
    }

    /// Copies any [`Ohlcv`] into an owned bar.
    #[must_use]
    pub fn from_ohlcv(ohlcv: &impl Ohlcv) -> Self {
        Self {
            open: ohlcv.open(),
            high: ohlcv.high(),
            low: ohlcv.low(),
            close: ohlcv.close(),
            volume: ohlcv.volume(),
            open_time: ohlcv.open_time(),
        }
    }

    #[must_use]
    pub fn at(mut self, open_time: Timestamp) -> Self {
        self.open_time = open_time;
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Median price: `(high + low) / 2`.
    #[inline]
    #[must_use]
    pub fn hl2(&self) -> Price {
        f64::midpoint(self.high, self.low)
    }
}

impl Ohlcv for Bar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn open_time(&self) -> Timestamp {
        self.open_time
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn from_value_sets_all_prices() {
        let bar = Bar::from_value(42.0, 7);
        assert_eq!(bar.open, 42.0);
        assert_eq!(bar.high, 42.0);
        assert_eq!(bar.low, 42.0);
        assert_eq!(bar.close, 42.0);
        assert_eq!(bar.volume, 0.0);
        assert_eq!(bar.open_time, 7);
    }

    #[test]
    fn from_ohlcv_copies_volume() {
        struct Kline;
        impl Ohlcv for Kline {
            fn open(&self) -> Price {
                1.0
            }
            fn high(&self) -> Price {
                4.0
            }
            fn low(&self) -> Price {
                0.5
            }
            fn close(&self) -> Price {
                2.0
            }
            fn open_time(&self) -> Timestamp {
                9
            }
            fn volume(&self) -> f64 {
                123.0
            }
        }

        let bar = Bar::from_ohlcv(&Kline);
        assert_eq!(bar, Bar::new(1.0, 4.0, 0.5, 2.0).at(9).with_volume(123.0));
    }

    #[test]
    fn hl2_is_midpoint() {
        assert_eq!(Bar::new(0.0, 30.0, 10.0, 0.0).hl2(), 20.0);
    }
}
