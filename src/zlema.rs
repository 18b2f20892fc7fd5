use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result, RingBuffer, bar_clock::BarClock, ema::Smoother,
    indicator::length_config,
};

length_config!(
    /// Configuration for the Zero-Lag Exponential Moving Average ([`Zlema`])
    /// indicator.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::ZlemaConfig;
    /// use std::num::NonZero;
    ///
    /// let config = ZlemaConfig::close(NonZero::new(20).unwrap());
    /// assert_eq!(config.lag(), 9);
    /// ```
    ZlemaConfig,
    ZlemaConfigBuilder,
    "ZLEMA",
    PriceSource::Close
);

impl ZlemaConfig {
    /// ZLEMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// ZLEMA on an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }

    /// De-lagging distance: `(length − 1) / 2`, rounded down.
    #[inline]
    #[must_use]
    pub fn lag(&self) -> usize {
        (self.length - 1) / 2
    }
}

/// Zero-Lag Exponential Moving Average (ZLEMA).
///
/// An EMA (`α = 2 / (length + 1)`) fed with a de-lagged price:
///
/// ```text
/// input = 2 × price − price[lag]
/// ```
///
/// Seeded with the SMA of the raw prices over the first `length` bars, so
/// the first output lands on bar `length`.
#[derive(Clone, Debug)]
pub struct Zlema {
    config: ZlemaConfig,
    clock: BarClock,
    history: RingBuffer,
    smoother: Smoother,
}

impl Indicator for Zlema {
    type Config = ZlemaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let length = NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN);

        Self {
            config,
            clock: BarClock::default(),
            history: RingBuffer::new(config.lag() + 1),
            #[allow(clippy::cast_precision_loss)]
            smoother: Smoother::new(length, config.source, 2.0 / (config.length + 1) as f64),
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        self.history.update(price, is_next_bar);
        let lagged = self.history.oldest().unwrap_or(price);

        self.smoother
            .update(kline, is_next_bar, 2.0f64.mul_add(price, -lagged))
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.smoother.value()
    }
}

impl Display for Zlema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ZLEMA({}, {})", self.config.length, self.config.source)
    }
}
