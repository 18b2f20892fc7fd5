use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Result,
    bar_clock::BarClock,
    param::{Param, required},
    price_window::PriceWindow,
};

const DEFAULT_OFFSET: f64 = 0.85;
const DEFAULT_SIGMA: f64 = 6.0;

/// Configuration for the Arnaud Legoux Moving Average ([`Alma`]).
///
/// # Example
///
/// ```
/// use quantedge_ta::{AlmaConfig, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// let config = AlmaConfig::builder()
///     .length(NonZero::new(9).unwrap())
///     .offset(0.85)
///     .sigma(6.0)
///     .build()?;
/// assert_eq!(config.length(), 9);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AlmaConfig {
    length: usize,
    offset: Param,
    sigma: Param,
    source: PriceSource,
}

impl IndicatorConfig for AlmaConfig {
    type Builder = AlmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        AlmaConfigBuilder::new()
    }
}

impl AlmaConfig {
    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Position of the Gaussian peak within the window, `0` = oldest bar,
    /// `1` = newest.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset.get()
    }

    /// Sharpness: the Gaussian width is `length / sigma`.
    #[inline]
    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.sigma.get()
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// ALMA on closing price with offset 0.85 and sigma 6.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self {
            length: length.get(),
            offset: Param::from_validated(DEFAULT_OFFSET),
            sigma: Param::from_validated(DEFAULT_SIGMA),
            source: PriceSource::Close,
        }
    }

    /// Normalised Gaussian weights, oldest bar first.
    fn weights(&self) -> Vec<f64> {
        #[allow(clippy::cast_precision_loss)]
        let n = self.length as f64;
        let m = self.offset.get() * (n - 1.0);
        let s = n / self.sigma.get();

        let raw: Vec<f64> = (0..self.length)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let d = i as f64 - m;
                (-(d * d) / (2.0 * s * s)).exp()
            })
            .collect();
        let total: f64 = raw.iter().sum();

        raw.into_iter().map(|w| w / total).collect()
    }
}

impl Display for AlmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AlmaConfig({}, {}, {}, {})",
            self.length, self.offset, self.sigma, self.source
        )
    }
}

/// Builder for [`AlmaConfig`].
///
/// Defaults: offset = `0.85`, sigma = `6.0`, source = [`PriceSource::Close`].
pub struct AlmaConfigBuilder {
    length: Option<usize>,
    offset: f64,
    sigma: f64,
    source: PriceSource,
}

impl AlmaConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            offset: DEFAULT_OFFSET,
            sigma: DEFAULT_SIGMA,
            source: PriceSource::Close,
        }
    }

    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }

    /// Must lie in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Must be positive.
    #[inline]
    #[must_use]
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<AlmaConfig> for AlmaConfigBuilder {
    fn build(self) -> Result<AlmaConfig> {
        Ok(AlmaConfig {
            length: required(self.length, "ALMA", "length")?,
            offset: Param::in_range("ALMA", "offset", self.offset, 0.0, 1.0)?,
            sigma: Param::positive("ALMA", "sigma", self.sigma)?,
            source: self.source,
        })
    }
}

/// Arnaud Legoux Moving Average (ALMA).
///
/// A Gaussian-weighted average over the window. The bell is centred at
/// `offset × (length − 1)` (counted from the oldest bar) with standard
/// deviation `length / sigma`:
///
/// ```text
/// w_i  = exp(−(i − m)² / (2s²))
/// ALMA = Σ w_i × price_i / Σ w_i
/// ```
///
/// Weights are computed once at construction.
#[derive(Clone, Debug)]
pub struct Alma {
    config: AlmaConfig,
    clock: BarClock,
    window: PriceWindow,
    weights: Vec<f64>,
    current: Option<Price>,
}

impl Indicator for Alma {
    type Config = AlmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            window: PriceWindow::new(config.length),
            weights: config.weights(),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        self.window.update(price, is_next_bar);

        self.current = self.window.is_ready().then(|| {
            self.window
                .values()
                .zip(&self.weights)
                .fold(0.0, |acc, (price, weight)| price.mul_add(*weight, acc))
        });

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Alma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ALMA({}, {}, {}, {})",
            self.config.length, self.config.offset, self.config.sigma, self.config.source
        )
    }
}
