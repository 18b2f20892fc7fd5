use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result,
    bar_clock::BarClock,
    indicator::length_config,
    price_window::{PriceWindow, PriceWindowWithSumOfSquares},
};

length_config!(
    /// Configuration for the rolling Standard Deviation ([`StdDev`])
    /// indicator.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::StdDevConfig;
    /// use std::num::NonZero;
    ///
    /// let config = StdDevConfig::close(NonZero::new(20).unwrap());
    /// assert_eq!(config.length(), 20);
    /// ```
    StdDevConfig,
    StdDevConfigBuilder,
    "StdDev",
    PriceSource::Close
);

impl StdDevConfig {
    /// Standard deviation of closing prices.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// Standard deviation of an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Population standard deviation over a rolling window.
///
/// Same running sums as [`Bb`](crate::Bb): `σ = √((Σx² − Σx × mean) / n)`,
/// with the variance clamped at zero so rounding never produces `NaN`.
#[derive(Clone, Debug)]
pub struct StdDev {
    config: StdDevConfig,
    clock: BarClock,
    window: PriceWindowWithSumOfSquares,
    length: f64,
    current: Option<Price>,
}

impl Indicator for StdDev {
    type Config = StdDevConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            window: PriceWindow::with_sum_of_squares(config.length),
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

        self.current = self
            .window
            .sum()
            .zip(self.window.sum_of_squares())
            .map(|(sum, sum_of_squares)| {
                if self.window.flat_value().is_some() {
                    return 0.0;
                }
                let mean = sum / self.length;
                (sum.mul_add(-mean, sum_of_squares) / self.length)
                    .max(0.0)
                    .sqrt()
            });

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for StdDev {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StdDev({}, {})", self.config.length, self.config.source)
    }
}
