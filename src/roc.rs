use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result, RingBuffer, bar_clock::BarClock,
    indicator::length_config,
};

length_config!(
    /// Configuration for the Rate of Change ([`Roc`]) indicator.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::RocConfig;
    /// use std::num::NonZero;
    ///
    /// let config = RocConfig::close(NonZero::new(9).unwrap());
    /// assert_eq!(config.length(), 9);
    /// ```
    RocConfig,
    RocConfigBuilder,
    "ROC",
    PriceSource::Close
);

impl RocConfig {
    /// ROC on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// ROC on an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Rate of Change (ROC), in percent.
///
/// ```text
/// ROC = 100 × (price − price[length]) / price[length]
/// ```
///
/// First output on bar `length + 1`. A zero reference price yields `0`.
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Roc, RocConfig};
/// use std::num::NonZero;
///
/// let mut roc = Roc::new(RocConfig::close(NonZero::new(2).unwrap()));
///
/// roc.compute(&Bar::from_value(50.0, 1))?;
/// roc.compute(&Bar::from_value(60.0, 2))?;
/// assert_eq!(roc.compute(&Bar::from_value(55.0, 3))?, Some(10.0));
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Roc {
    config: RocConfig,
    clock: BarClock,
    window: RingBuffer,
    current: Option<Price>,
}

impl Indicator for Roc {
    type Config = RocConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            window: RingBuffer::new(config.length + 1),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        self.window.update(price, is_next_bar);

        self.current = match self.window.oldest() {
            Some(reference) if self.window.is_full() => Some(if reference == 0.0 {
                0.0
            } else {
                100.0 * (price - reference) / reference
            }),
            _ => None,
        };

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Roc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ROC({}, {})", self.config.length, self.config.source)
    }
}
