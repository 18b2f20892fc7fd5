use std::{fmt::Display, num::NonZero};

use crate::{
    Ema, EmaConfig, Indicator, Ohlcv, Price, PriceSource, Result,
    bar_clock::BarClock,
    indicator::{feed, length_config},
};

length_config!(
    /// Configuration for the Double Exponential Moving Average ([`Dema`])
    /// indicator.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::DemaConfig;
    /// use std::num::NonZero;
    ///
    /// let config = DemaConfig::close(NonZero::new(20).unwrap());
    /// assert_eq!(config.length(), 20);
    /// ```
    DemaConfig,
    DemaConfigBuilder,
    "DEMA",
    PriceSource::Close
);

impl DemaConfig {
    /// DEMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// DEMA on an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Double Exponential Moving Average (DEMA).
///
/// ```text
/// DEMA = 2 × EMA(price) − EMA(EMA(price))
/// ```
///
/// The inner EMA only receives values once the outer one has seeded, so the
/// first output lands on bar `2 × length − 1`.
#[derive(Clone, Debug)]
pub struct Dema {
    config: DemaConfig,
    clock: BarClock,
    ema: Ema,
    ema_of_ema: Ema,
    current: Option<Price>,
}

impl Indicator for Dema {
    type Config = DemaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let length = NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN);

        Self {
            config,
            clock: BarClock::default(),
            ema: Ema::new(EmaConfig::with_source(length, config.source)),
            ema_of_ema: Ema::new(EmaConfig::close(length)),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        self.clock.advance(kline, &self.config)?;
        let open_time = kline.open_time();

        let e1 = self.ema.compute(kline)?;
        let e2 = feed(&mut self.ema_of_ema, e1, open_time)?;

        self.current = e1.zip(e2).map(|(e1, e2)| 2.0f64.mul_add(e1, -e2));

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Dema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DEMA({}, {})", self.config.length, self.config.source)
    }
}
