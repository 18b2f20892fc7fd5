use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, OutputFields, Price, Result, Sma,
    SmaConfig,
    bar_clock::BarClock,
    indicator::feed,
    param::required,
    price_window::PriceWindow,
};

/// Configuration for the Stochastic Oscillator ([`Stoch`]).
///
/// # Example
///
/// ```
/// use quantedge_ta::{IndicatorConfig, IndicatorConfigBuilder, StochConfig};
/// use std::num::NonZero;
///
/// let config = StochConfig::builder()
///     .length(NonZero::new(14).unwrap())
///     .smoothing(NonZero::new(3).unwrap())
///     .build()?;
/// assert_eq!(config.smoothing(), 3);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct StochConfig {
    length: usize,
    smoothing: usize,
}

impl IndicatorConfig for StochConfig {
    type Builder = StochConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        StochConfigBuilder {
            length: None,
            smoothing: None,
        }
    }
}

impl StochConfig {
    /// Look-back window for the highest high and lowest low.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// SMA length applied to `%K` to produce `%D`.
    #[inline]
    #[must_use]
    pub fn smoothing(&self) -> usize {
        self.smoothing
    }
}

impl Display for StochConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StochConfig({}, {})", self.length, self.smoothing)
    }
}

/// Builder for [`StochConfig`]. Both lengths are required.
pub struct StochConfigBuilder {
    length: Option<usize>,
    smoothing: Option<usize>,
}

impl StochConfigBuilder {
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn smoothing(mut self, smoothing: NonZero<usize>) -> Self {
        self.smoothing = Some(smoothing.get());
        self
    }
}

impl IndicatorConfigBuilder<StochConfig> for StochConfigBuilder {
    fn build(self) -> Result<StochConfig> {
        Ok(StochConfig {
            length: required(self.length, "Stoch", "length")?,
            smoothing: required(self.smoothing, "Stoch", "smoothing")?,
        })
    }
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochValue {
    k: Price,
    d: Option<Price>,
}

impl StochValue {
    /// Fast line, in `[0, 100]`.
    #[inline]
    #[must_use]
    pub fn k(&self) -> Price {
        self.k
    }

    /// Slow line: SMA of `%K`. `None` until the smoothing window fills.
    #[inline]
    #[must_use]
    pub fn d(&self) -> Option<Price> {
        self.d
    }
}

impl OutputFields for StochValue {
    const NAMES: &'static [&'static str] = &["k", "d"];

    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>) {
        out.push(value.map(Self::k));
        out.push(value.and_then(Self::d));
    }
}

impl Display for StochValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.d {
            Some(d) => write!(f, "Stoch(k: {}, d: {d})", self.k),
            None => write!(f, "Stoch(k: {}, d: -)", self.k),
        }
    }
}

/// Position of `value` within `[low, high]`, scaled to `[0, 100]`.
///
/// A collapsed range yields the midpoint, `50`.
#[inline]
pub(crate) fn stochastic(value: Price, low: Price, high: Price) -> Price {
    let range = high - low;
    if range == 0.0 {
        50.0
    } else {
        (100.0 * (value - low) / range).clamp(0.0, 100.0)
    }
}

/// Stochastic Oscillator.
///
/// ```text
/// %K = 100 × (close − lowest low) / (highest high − lowest low)
/// %D = SMA(smoothing) of %K
/// ```
///
/// `%K` is first defined on bar `length`, `%D` on bar
/// `length + smoothing − 1`. A flat window reports `%K = 50`.
#[derive(Clone, Debug)]
pub struct Stoch {
    config: StochConfig,
    clock: BarClock,
    highs: PriceWindow,
    lows: PriceWindow,
    d: Sma,
    current: Option<StochValue>,
}

impl Indicator for Stoch {
    type Config = StochConfig;
    type Output = StochValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            highs: PriceWindow::new(config.length),
            lows: PriceWindow::new(config.length),
            d: Sma::new(SmaConfig::close(
                NonZero::new(config.smoothing).unwrap_or(NonZero::<usize>::MIN),
            )),
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<StochValue>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;

        self.highs.update(kline.high(), is_next_bar);
        self.lows.update(kline.low(), is_next_bar);

        let k = self
            .highs
            .max()
            .zip(self.lows.min())
            .map(|(high, low)| stochastic(kline.close(), low, high));
        let d = feed(&mut self.d, k, kline.open_time())?;

        self.current = k.map(|k| StochValue { k, d });

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<StochValue> {
        self.current
    }
}

impl Display for Stoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stoch({}, {})", self.config.length, self.config.smoothing)
    }
}
