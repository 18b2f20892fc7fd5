use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result, bar_clock::BarClock, indicator::length_config,
    price_window::PriceWindow,
};

/// Lambert's scaling constant: puts most readings within ±100.
const SCALE: f64 = 0.015;

length_config!(
    /// Configuration for the Commodity Channel Index ([`Cci`]).
    ///
    /// The source defaults to [`PriceSource::HLC3`], the typical price.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::{CciConfig, PriceSource};
    /// use std::num::NonZero;
    ///
    /// let config = CciConfig::typical(NonZero::new(20).unwrap());
    /// assert_eq!(config.source(), PriceSource::HLC3);
    /// ```
    CciConfig,
    CciConfigBuilder,
    "CCI",
    PriceSource::HLC3
);

impl CciConfig {
    /// CCI on the typical price `(high + low + close) / 3`.
    #[must_use]
    pub fn typical(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::HLC3)
    }

    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Commodity Channel Index (CCI).
///
/// ```text
/// mean     = SMA(length) of tp
/// mean_dev = Σ|tp − mean| / length
/// CCI      = (tp − mean) / (0.015 × mean_dev)
/// ```
///
/// A window with zero mean deviation yields `0`. The mean and mean deviation
/// are recomputed from the window on every update, so each call is O(length).
#[derive(Clone, Debug)]
pub struct Cci {
    config: CciConfig,
    clock: BarClock,
    window: PriceWindow,
    length: f64,
    current: Option<Price>,
}

impl Indicator for Cci {
    type Config = CciConfig;
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

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        self.window.update(price, is_next_bar);

        self.current = self.window.is_ready().then(|| {
            if self.window.flat_value().is_some() {
                return 0.0;
            }

            let mean = self.window.values().sum::<f64>() / self.length;
            let mean_dev = self
                .window
                .values()
                .map(|value| (value - mean).abs())
                .sum::<f64>()
                / self.length;

            if mean_dev == 0.0 {
                0.0
            } else {
                (price - mean) / (SCALE * mean_dev)
            }
        });

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Cci {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CCI({}, {})", self.config.length, self.config.source)
    }
}
