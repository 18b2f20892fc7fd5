use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result, Wma, WmaConfig,
    bar_clock::BarClock,
    indicator::{feed, length_config},
};

length_config!(
    /// Configuration for the Hull Moving Average ([`Hma`]) indicator.
    ///
    /// Length must be at least 2.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::{HmaConfig, IndicatorConfig, IndicatorConfigBuilder};
    /// use std::num::NonZero;
    ///
    /// let config = HmaConfig::builder().length(NonZero::new(9).unwrap()).build()?;
    /// assert_eq!(config.length(), 9);
    ///
    /// assert!(HmaConfig::builder().length(NonZero::new(1).unwrap()).build().is_err());
    /// # Ok::<(), quantedge_ta::Error>(())
    /// ```
    HmaConfig,
    HmaConfigBuilder,
    "HMA",
    PriceSource::Close,
    min_length = 2
);

impl HmaConfig {
    fn half_length(&self) -> NonZero<usize> {
        NonZero::new(self.length / 2).unwrap_or(NonZero::<usize>::MIN)
    }

    fn sqrt_length(&self) -> NonZero<usize> {
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let root = (self.length as f64).sqrt() as usize;
        NonZero::new(root).unwrap_or(NonZero::<usize>::MIN)
    }
}

/// Hull Moving Average (HMA).
///
/// ```text
/// HMA = WMA(⌊√n⌋) of (2 × WMA(n / 2) − WMA(n))
/// ```
///
/// First output on bar `n + ⌊√n⌋ − 1`.
#[derive(Clone, Debug)]
pub struct Hma {
    config: HmaConfig,
    clock: BarClock,
    half: Wma,
    full: Wma,
    hull: Wma,
    current: Option<Price>,
}

impl Indicator for Hma {
    type Config = HmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let length = NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN);

        Self {
            config,
            clock: BarClock::default(),
            half: Wma::new(WmaConfig::with_source(config.half_length(), config.source)),
            full: Wma::new(WmaConfig::with_source(length, config.source)),
            hull: Wma::new(WmaConfig::close(config.sqrt_length())),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        self.clock.advance(kline, &self.config)?;

        let half = self.half.compute(kline)?;
        let full = self.full.compute(kline)?;
        let raw = half.zip(full).map(|(half, full)| 2.0f64.mul_add(half, -full));

        self.current = feed(&mut self.hull, raw, kline.open_time())?;

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Hma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HMA({}, {})", self.config.length, self.config.source)
    }
}
