use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, Result, Sma, SmaConfig,
    bar_clock::BarClock,
    indicator::feed,
    param::{Param, required},
};

const DEFAULT_VOLUME_DIV: f64 = 10_000.0;

/// Configuration for the Ease of Movement ([`Emv`]) indicator.
///
/// # Example
///
/// ```
/// use quantedge_ta::{EmvConfig, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// let config = EmvConfig::builder()
///     .length(NonZero::new(14).unwrap())
///     .volume_div(10_000.0)
///     .build()?;
/// assert_eq!(config.volume_div(), 10_000.0);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmvConfig {
    length: usize,
    volume_div: Param,
}

impl IndicatorConfig for EmvConfig {
    type Builder = EmvConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        EmvConfigBuilder {
            length: None,
            volume_div: DEFAULT_VOLUME_DIV,
        }
    }
}

impl EmvConfig {
    /// Smoothing length.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Volume scale applied before the box ratio.
    #[inline]
    #[must_use]
    pub fn volume_div(&self) -> f64 {
        self.volume_div.get()
    }
}

impl Display for EmvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmvConfig({}, {})", self.length, self.volume_div)
    }
}

/// Builder for [`EmvConfig`]. Defaults: `volume_div` = `10000`.
pub struct EmvConfigBuilder {
    length: Option<usize>,
    volume_div: f64,
}

impl EmvConfigBuilder {
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }

    /// Must be positive.
    #[inline]
    #[must_use]
    pub fn volume_div(mut self, volume_div: f64) -> Self {
        self.volume_div = volume_div;
        self
    }
}

impl IndicatorConfigBuilder<EmvConfig> for EmvConfigBuilder {
    fn build(self) -> Result<EmvConfig> {
        Ok(EmvConfig {
            length: required(self.length, "EMV", "length")?,
            volume_div: Param::positive("EMV", "volume_div", self.volume_div)?,
        })
    }
}

/// Ease of Movement (EMV).
///
/// ```text
/// distance = (high + low) / 2 − (prev_high + prev_low) / 2
/// box      = (volume / volume_div) / (high − low)
/// EMV      = SMA(length) of distance / box
/// ```
///
/// A bar with zero volume or zero range contributes `0`. First output on bar
/// `length + 1`.
#[derive(Clone, Debug)]
pub struct Emv {
    config: EmvConfig,
    clock: BarClock,
    sma: Sma,
}

impl Indicator for Emv {
    type Config = EmvConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            sma: Sma::new(SmaConfig::close(
                NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN),
            )),
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        self.clock.advance(kline, &self.config)?;

        let raw = self.clock.previous().map(|prev| {
            let range = kline.high() - kline.low();
            let volume = kline.volume();

            if range == 0.0 || volume == 0.0 {
                return 0.0;
            }

            let distance =
                f64::midpoint(kline.high(), kline.low()) - f64::midpoint(prev.high, prev.low);
            let box_ratio = (volume / self.config.volume_div.get()) / range;

            distance / box_ratio
        });

        feed(&mut self.sma, raw, kline.open_time())
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.sma.value()
    }
}

impl Display for Emv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMV({}, {})", self.config.length, self.config.volume_div)
    }
}
