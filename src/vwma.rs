use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result, bar_clock::BarClock, indicator::length_config,
    price_window::PriceWindow,
};

length_config!(
    /// Configuration for the Volume-Weighted Moving Average ([`Vwma`])
    /// indicator.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::VwmaConfig;
    /// use std::num::NonZero;
    ///
    /// let config = VwmaConfig::close(NonZero::new(20).unwrap());
    /// assert_eq!(config.length(), 20);
    /// ```
    VwmaConfig,
    VwmaConfigBuilder,
    "VWMA",
    PriceSource::Close
);

impl VwmaConfig {
    /// VWMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// VWMA on an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Volume-Weighted Moving Average (VWMA).
///
/// ```text
/// VWMA = Σ(price × volume) / Σ volume
/// ```
///
/// When the window holds no volume at all, VWMA falls back to the plain mean
/// of the window's prices.
#[derive(Clone, Debug)]
pub struct Vwma {
    config: VwmaConfig,
    clock: BarClock,
    prices: PriceWindow,
    weighted: PriceWindow,
    volumes: PriceWindow,
    length: f64,
    current: Option<Price>,
}

impl Indicator for Vwma {
    type Config = VwmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            prices: PriceWindow::new(config.length),
            weighted: PriceWindow::new(config.length),
            volumes: PriceWindow::new(config.length),
            #[allow(clippy::cast_precision_loss)]
            length: config.length as f64,
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());
        let volume = kline.volume();

        self.prices.update(price, is_next_bar);
        self.weighted.update(price * volume, is_next_bar);
        self.volumes.update(volume, is_next_bar);

        self.current = match (self.weighted.sum(), self.volumes.sum(), self.prices.sum()) {
            (Some(weighted), Some(volume), _) if volume > 0.0 => Some(weighted / volume),
            (_, _, Some(prices)) => Some(prices / self.length),
            _ => None,
        };

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Vwma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VWMA({}, {})", self.config.length, self.config.source)
    }
}
