use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result, bar_clock::BarClock, indicator::length_config,
    price_window::PriceWindow,
};

length_config!(
    /// Configuration for the Weighted Moving Average ([`Wma`]) indicator.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::WmaConfig;
    /// use std::num::NonZero;
    ///
    /// let config = WmaConfig::close(NonZero::new(9).unwrap());
    /// assert_eq!(config.length(), 9);
    /// ```
    WmaConfig,
    WmaConfigBuilder,
    "WMA",
    PriceSource::Close
);

impl WmaConfig {
    /// WMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// WMA on an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Linearly weighted sum of `values` (oldest first), divided by the weight
/// total `n(n + 1) / 2`. The newest value weighs `n`.
#[inline]
pub(crate) fn weighted_mean(values: impl Iterator<Item = Price>, denominator: f64) -> Price {
    let mut weight = 0.0;
    values.fold(0.0, |acc, value| {
        weight += 1.0;
        value.mul_add(weight, acc)
    }) / denominator
}

/// Weighted Moving Average (WMA).
///
/// Linear weights `1..=n`, newest heaviest:
///
/// ```text
/// WMA = Σ(i × price_i) / (n × (n + 1) / 2)
/// ```
///
/// The weighted sum is recomputed over the window on every tick, O(n).
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Wma, WmaConfig};
/// use std::num::NonZero;
///
/// let mut wma = Wma::new(WmaConfig::close(NonZero::new(3).unwrap()));
///
/// wma.compute(&Bar::from_value(1.0, 1))?;
/// wma.compute(&Bar::from_value(2.0, 2))?;
/// // (1×1 + 2×2 + 3×3) / 6
/// assert_eq!(wma.compute(&Bar::from_value(3.0, 3))?, Some(14.0 / 6.0));
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Wma {
    config: WmaConfig,
    clock: BarClock,
    window: PriceWindow,
    denominator: f64,
    current: Option<Price>,
}

impl Indicator for Wma {
    type Config = WmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let n = config.length as f64;

        Self {
            config,
            clock: BarClock::default(),
            window: PriceWindow::new(config.length),
            denominator: n * (n + 1.0) / 2.0,
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        self.window.update(price, is_next_bar);

        self.current = self
            .window
            .is_ready()
            .then(|| weighted_mean(self.window.values(), self.denominator));

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Wma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WMA({}, {})", self.config.length, self.config.source)
    }
}
