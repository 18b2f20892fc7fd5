use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result, bar_clock::BarClock, indicator::length_config,
    price_window::PriceWindow,
};

length_config!(
    /// Configuration for the Simple Moving Average ([`Sma`]) indicator.
    ///
    /// # Example
    ///
    /// ```rust
    /// use quantedge_ta::SmaConfig;
    /// use std::num::NonZero;
    ///
    /// let config = SmaConfig::close(NonZero::new(20).unwrap());
    /// assert_eq!(config.length(), 20);
    /// ```
    SmaConfig,
    SmaConfigBuilder,
    "SMA",
    PriceSource::Close
);

impl SmaConfig {
    /// SMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// SMA on median price: `(high + low) / 2`.
    #[must_use]
    pub fn hl2(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::HL2)
    }

    /// SMA on average price: `(open + high + low + close) / 4`.
    #[must_use]
    pub fn ohlc4(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::OHLC4)
    }

    /// SMA on an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Simple Moving Average (SMA).
///
/// Computes the unweighted mean of the last *n* values, where *n* is the
/// configured window length. Returns `None` until the window is full.
///
/// Uses a running sum for O(1) updates per bar. Supports live repainting:
/// feeding a bar with the same `open_time` replaces the current value without
/// advancing the window.
///
/// # Example
///
/// ```rust
/// use quantedge_ta::{Bar, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let mut sma = Sma::new(SmaConfig::close(NonZero::new(3).unwrap()));
///
/// assert_eq!(sma.compute(&Bar::from_value(10.0, 1))?, None);
/// assert_eq!(sma.compute(&Bar::from_value(20.0, 2))?, None);
/// assert_eq!(sma.compute(&Bar::from_value(30.0, 3))?, Some(20.0));
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Sma {
    config: SmaConfig,
    clock: BarClock,
    window: PriceWindow,
    length: f64,
    current: Option<Price>,
}

impl Indicator for Sma {
    type Config = SmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            window: PriceWindow::new(config.length),
            #[allow(clippy::cast_precision_loss)]
            length: config.length as f64,
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        self.window.update(price, is_next_bar);

        // Plain division: exact for constant input.
        self.current = self.window.sum().map(|sum| sum / self.length);

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({}, {})", self.config.length, self.config.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error, IndicatorConfig, IndicatorConfigBuilder,
        test_util::{assert_approx, bar, nz, ohlc},
    };

    fn sma(length: usize) -> Sma {
        Sma::new(SmaConfig::close(nz(length)))
    }

    mod filling {
        use super::*;

        #[test]
        fn none_until_window_full() {
            let mut sma = sma(3);
            assert_eq!(sma.compute(&bar(10.0, 1)).unwrap(), None);
            assert_eq!(sma.compute(&bar(20.0, 2)).unwrap(), None);
        }

        #[test]
        fn returns_average_when_full() {
            let mut sma = sma(3);
            sma.compute(&bar(10.0, 1)).unwrap();
            sma.compute(&bar(20.0, 2)).unwrap();
            assert_eq!(sma.compute(&bar(30.0, 3)).unwrap(), Some(20.0));
        }
    }

    mod sliding {
        use super::*;

        #[test]
        fn drops_oldest_on_advance() {
            let mut sma = sma(2);
            sma.compute(&bar(10.0, 1)).unwrap();
            sma.compute(&bar(20.0, 2)).unwrap();
            // (20 + 30) / 2 = 25
            assert_eq!(sma.compute(&bar(30.0, 3)).unwrap(), Some(25.0));
        }

        #[test]
        fn constant_input_is_exact() {
            let mut sma = sma(9);
            for t in 1..=50 {
                let v = sma.compute(&bar(100.0, t)).unwrap();
                if t >= 9 {
                    assert_eq!(v, Some(100.0));
                }
            }
        }
    }

    mod repaint {
        use super::*;

        #[test]
        fn updates_current_bar() {
            let mut sma = sma(2);
            sma.compute(&bar(10.0, 1)).unwrap();
            sma.compute(&bar(20.0, 2)).unwrap();
            // (10 + 30) / 2 = 20
            assert_eq!(sma.compute(&bar(30.0, 2)).unwrap(), Some(20.0));
        }

        #[test]
        fn repaint_during_filling() {
            let mut sma = sma(3);
            sma.compute(&bar(10.0, 1)).unwrap();
            sma.compute(&bar(15.0, 1)).unwrap(); // repaint
            assert_eq!(sma.compute(&bar(20.0, 2)).unwrap(), None);
            // (15 + 20 + 30) / 3 = 21.666...
            let result = sma.compute(&bar(30.0, 3)).unwrap();
            assert_approx!(result.unwrap(), 65.0 / 3.0);
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn rejects_earlier_bar_and_keeps_state() {
            let mut sma = sma(2);
            sma.compute(&bar(10.0, 5)).unwrap();
            sma.compute(&bar(20.0, 6)).unwrap();

            let err = sma.compute(&bar(99.0, 4)).unwrap_err();
            assert!(matches!(err, Error::OrderingViolation { last: 6, got: 4, .. }));
            assert_eq!(sma.value(), Some(15.0));

            assert_eq!(sma.compute(&bar(30.0, 7)).unwrap(), Some(25.0));
        }
    }

    mod price_source {
        use super::*;

        #[test]
        fn hl2_source() {
            let mut sma = Sma::new(SmaConfig::hl2(nz(2)));
            sma.compute(&ohlc(0.0, 20.0, 10.0, 0.0, 1)).unwrap(); // HL2 = 15
            let result = sma.compute(&ohlc(0.0, 30.0, 20.0, 0.0, 2)).unwrap(); // HL2 = 25
            assert_eq!(result, Some(20.0));
        }

        #[test]
        fn true_range_uses_prev_close() {
            let mut sma = Sma::new(SmaConfig::with_source(nz(1), PriceSource::TrueRange));
            sma.compute(&ohlc(10.0, 15.0, 5.0, 10.0, 1)).unwrap();
            // Gap up: hl=10, |30-10|=20, |20-10|=10 → 20
            assert_eq!(
                sma.compute(&ohlc(25.0, 30.0, 20.0, 28.0, 2)).unwrap(),
                Some(20.0)
            );
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_correctly() {
            assert_eq!(sma(20).to_string(), "SMA(20, Close)");
        }
    }

    mod clone {
        use super::*;

        #[test]
        fn produces_independent_state() {
            let mut sma = sma(3);
            sma.compute(&bar(10.0, 1)).unwrap();
            sma.compute(&bar(20.0, 2)).unwrap();

            let mut cloned = sma.clone();

            assert_eq!(sma.compute(&bar(30.0, 3)).unwrap(), Some(20.0));
            assert_eq!(cloned.value(), None);
            assert_eq!(cloned.compute(&bar(90.0, 3)).unwrap(), Some(40.0));
        }
    }

    mod config {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn helpers_set_source() {
            assert_eq!(SmaConfig::close(nz(10)).source(), PriceSource::Close);
            assert_eq!(SmaConfig::hl2(nz(10)).source(), PriceSource::HL2);
            assert_eq!(SmaConfig::ohlc4(nz(10)).source(), PriceSource::OHLC4);
        }

        #[test]
        fn build_fails_without_length() {
            let err = SmaConfig::builder().build().unwrap_err();
            assert_eq!(
                err.to_string(),
                "invalid configuration for SMA: length is required"
            );
        }

        #[test]
        fn builder_sets_fields() {
            let config = SmaConfig::builder()
                .length(nz(5))
                .source(PriceSource::HLC3)
                .build()
                .unwrap();
            assert_eq!(config, SmaConfig::with_source(nz(5), PriceSource::HLC3));
        }

        #[test]
        fn display_config() {
            assert_eq!(
                SmaConfig::close(nz(20)).to_string(),
                "SmaConfig(20, Close)"
            );
        }

        #[test]
        fn eq_and_hash() {
            let mut set = HashSet::new();
            set.insert(SmaConfig::close(nz(20)));

            assert!(set.contains(&SmaConfig::close(nz(20))));
            assert!(!set.contains(&SmaConfig::close(nz(10))));
        }
    }
}
