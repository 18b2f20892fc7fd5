use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, OutputFields, Price, PriceSource,
    Result,
    bar_clock::BarClock,
    param::{Param, required},
    price_window::{PriceWindow, PriceWindowWithSumOfSquares},
};

const DEFAULT_STD_DEV: f64 = 2.0;

/// Configuration for the Bollinger Bands ([`Bb`]) indicator.
///
/// # Convergence
///
/// Bollinger Bands use an SMA for the middle band. Like SMA, values are exact
/// once the window is full, there is no warm-up bias to suppress.
///
/// # Example
///
/// ```
/// use quantedge_ta::{BbConfig, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// // Default: close, 2.0 std devs
/// let config = BbConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .build()?;
///
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.std_dev(), 2.0);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BbConfig {
    length: usize,
    source: PriceSource,
    std_dev: Param,
}

impl IndicatorConfig for BbConfig {
    type Builder = BbConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        BbConfigBuilder::new()
    }
}

impl BbConfig {
    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Price source extracted from each bar.
    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// Standard deviation multiplier for the upper and lower bands.
    #[inline]
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.std_dev.get()
    }

    /// BB(20, Close, 2σ), the standard Bollinger Bands setting.
    #[must_use]
    pub fn default_20() -> Self {
        Self::close(NonZero::new(20).unwrap_or(NonZero::<usize>::MIN))
    }

    /// BB with custom length, close price, 2σ.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self {
            length: length.get(),
            source: PriceSource::Close,
            std_dev: Param::from_validated(DEFAULT_STD_DEV),
        }
    }
}

impl Display for BbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BbConfig({}, {}, {})",
            self.length, self.source, self.std_dev
        )
    }
}

/// Builder for [`BbConfig`].
///
/// Defaults: source = [`PriceSource::Close`],
/// `std_dev` = `2.0`.
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct BbConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
    std_dev: f64,
}

impl BbConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            source: PriceSource::Close,
            std_dev: DEFAULT_STD_DEV,
        }
    }

    /// Sets the indicator window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length.get());
        self
    }

    /// Sets the price source.
    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    /// Sets the band multiplier. Must be positive and finite.
    #[inline]
    #[must_use]
    pub fn std_dev(mut self, std_dev: f64) -> Self {
        self.std_dev = std_dev;
        self
    }
}

impl IndicatorConfigBuilder<BbConfig> for BbConfigBuilder {
    fn build(self) -> Result<BbConfig> {
        Ok(BbConfig {
            length: required(self.length, "BB", "length")?,
            source: self.source,
            std_dev: Param::positive("BB", "std_dev", self.std_dev)?,
        })
    }
}

/// Bollinger Bands output: upper, middle, and lower bands.
///
/// The middle band is the SMA. Upper and lower bands are offset by
/// `std_dev × σ`, where `σ` is the population standard deviation of the window.
///
/// ```text
/// upper  = SMA + k × σ
/// middle = SMA
/// lower  = SMA − k × σ
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BbValue {
    upper: Price,
    middle: Price,
    lower: Price,
}

impl BbValue {
    /// Upper band: `SMA + k × σ`.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Price {
        self.upper
    }

    /// Middle band: SMA of the window.
    #[inline]
    #[must_use]
    pub fn middle(&self) -> Price {
        self.middle
    }

    /// Lower band: `SMA − k × σ`.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Price {
        self.lower
    }

    /// Band width: `upper − lower`.
    ///
    /// Useful for measuring volatility. Narrow width indicates
    /// consolidation (Bollinger squeeze); wide width indicates
    /// high volatility.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl OutputFields for BbValue {
    const NAMES: &'static [&'static str] = &["upper", "middle", "lower"];

    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>) {
        out.push(value.map(Self::upper));
        out.push(value.map(Self::middle));
        out.push(value.map(Self::lower));
    }
}

impl Display for BbValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB(u: {}, m: {}, l: {})",
            self.upper, self.middle, self.lower
        )
    }
}

/// Bollinger Bands (BB).
///
/// A volatility indicator consisting of three bands: a simple moving average
/// (middle) with upper and lower bands offset by a configurable number of
/// standard deviations.
///
/// Uses a running sum and sum of squares for O(1) updates per tick. The
/// variance is clamped at zero before the square root, so `lower ≤ middle ≤
/// upper` holds for any input.
///
/// Supports live repainting: feeding a bar with the same `open_time` replaces
/// the current value without advancing the window.
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Bb, BbConfig};
/// use std::num::NonZero;
///
/// let mut bb = Bb::new(BbConfig::close(NonZero::new(2).unwrap()));
///
/// bb.compute(&Bar::from_value(3.0, 1))?;
/// let value = bb.compute(&Bar::from_value(5.0, 2))?.unwrap();
///
/// assert_eq!(value.middle(), 4.0);
/// assert_eq!(value.upper(), 6.0);
/// assert_eq!(value.lower(), 2.0);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Bb {
    config: BbConfig,
    clock: BarClock,
    length: f64,
    window: PriceWindowWithSumOfSquares,
    current: Option<BbValue>,
}

impl Indicator for Bb {
    type Config = BbConfig;
    type Output = BbValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            #[allow(clippy::cast_precision_loss)]
            length: config.length as f64,
            window: PriceWindow::with_sum_of_squares(config.length),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<BbValue>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        self.window.update(price, is_next_bar);

        let flat = self.window.flat_value();
        self.current = match (self.window.sum(), self.window.sum_of_squares(), flat) {
            // A flat window has no spread, however the running sums drifted.
            (_, _, Some(value)) => Some(BbValue {
                upper: value,
                middle: value,
                lower: value,
            }),
            (Some(sum), Some(sum_of_squares), None) => {
                let mean = sum / self.length;

                // Variance = (Σx² − Σx × mean) / n; exact zero for constant input
                let variance = sum.mul_add(-mean, sum_of_squares) / self.length;
                let std_dev = variance.max(0.0).sqrt() * self.config.std_dev.get();

                Some(BbValue {
                    upper: mean + std_dev,
                    middle: mean,
                    lower: mean - std_dev,
                })
            }
            _ => None,
        };

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<BbValue> {
        self.current
    }
}

impl Display for Bb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB({}, {}, {})",
            self.config.length, self.config.source, self.config.std_dev,
        )
    }
}
