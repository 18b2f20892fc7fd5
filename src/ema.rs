use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Result, Sma,
    SmaConfig, bar_clock::BarClock, param::required,
};

/// Configuration for the Exponential Moving Average ([`Ema`])
/// indicator.
///
/// # Convergence
///
/// EMA has infinite memory: the initial seed value (SMA of the
/// first `length` bars) influences all subsequent values. With
/// `enforce_convergence` enabled, [`Ema::compute`] returns
/// `None` until the seed's contribution decays below 1%.
///
/// For EMA(20), that's 63 bars (`3 × (length + 1)`).
/// Without enforcement, values are returned as soon as the
/// SMA seed is ready (after `length` bars).
///
/// # Example
///
/// ```
/// use quantedge_ta::{EmaConfig, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// let config = EmaConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .enforce_convergence(true)
///     .build()?;
///
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.required_bars_to_converge(), 63);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmaConfig {
    length: usize,
    source: PriceSource,
    convergence: bool,
    bars_to_converge: usize,
}

impl IndicatorConfig for EmaConfig {
    type Builder = EmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        EmaConfigBuilder::new()
    }
}

impl EmaConfig {
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

    /// When `true`, [`Ema::compute`] returns `None` until
    /// [`required_bars_to_converge`](Self::required_bars_to_converge) bars have
    /// been processed. Default: `false`.
    #[inline]
    #[must_use]
    pub fn enforce_convergence(&self) -> bool {
        self.convergence
    }

    /// Number of bars needed before the EMA output is reported.
    ///
    /// When convergence is not enforced, this equals the window length.
    /// When enforced, this is `3 × (length + 1)`, the number of bars
    /// until the SMA seed's influence decays below 1%.
    #[must_use]
    pub fn required_bars_to_converge(&self) -> usize {
        self.bars_to_converge
    }

    /// EMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// EMA on median price: `(high + low) / 2`.
    #[must_use]
    pub fn hl2(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::HL2)
    }

    /// EMA on an arbitrary price source, convergence not enforced.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
            convergence: false,
            bars_to_converge: length.get(),
        }
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmaConfig({}, {})", self.length, self.source)
    }
}

/// Builder for [`EmaConfig`].
///
/// Defaults: source = [`PriceSource::Close`],
/// convergence enforcement = `false`.
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct EmaConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
    convergence: bool,
}

impl EmaConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            source: PriceSource::Close,
            convergence: false,
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

    /// Enables or disables convergence enforcement.
    #[inline]
    #[must_use]
    pub fn enforce_convergence(mut self, enforce: bool) -> Self {
        self.convergence = enforce;
        self
    }
}

impl IndicatorConfigBuilder<EmaConfig> for EmaConfigBuilder {
    fn build(self) -> Result<EmaConfig> {
        let length = required(self.length, "EMA", "length")?;
        let bars_to_converge = if self.convergence {
            3 * (length + 1)
        } else {
            length
        };

        Ok(EmaConfig {
            length,
            source: self.source,
            convergence: self.convergence,
            bars_to_converge,
        })
    }
}

/// SMA-seeded recursive smoother: `next = prev + α × (price − prev)`.
///
/// Shared by [`Ema`], [`Smma`](crate::Smma) and [`Zlema`](crate::Zlema),
/// which differ only in `α` and in what they feed after seeding.
#[derive(Clone, Debug)]
pub(crate) struct Smoother {
    seed: Option<Sma>,
    alpha: f64,
    previous: Price,
    current: Option<Price>,
}

impl Smoother {
    pub fn new(length: NonZero<usize>, source: PriceSource, alpha: f64) -> Self {
        Self {
            seed: Some(Sma::new(SmaConfig::with_source(length, source))),
            alpha,
            previous: 0.0,
            current: None,
        }
    }

    /// Seeds with the SMA of the raw source price, then smooths `price`.
    ///
    /// `is_next_bar` comes from the owner's clock; the seed SMA runs its own.
    #[inline]
    pub fn update(
        &mut self,
        kline: &impl Ohlcv,
        is_next_bar: bool,
        price: Price,
    ) -> Result<Option<Price>> {
        if is_next_bar && self.seed.as_ref().is_some_and(|sma| sma.value().is_some()) {
            self.seed = None;
        }

        if let Some(sma) = &mut self.seed {
            self.current = sma.compute(kline)?;
        } else {
            if is_next_bar && let Some(current) = self.current {
                self.previous = current;
            }
            self.current = Some(self.alpha.mul_add(price - self.previous, self.previous));
        }

        Ok(self.current)
    }

    #[inline]
    pub fn value(&self) -> Option<Price> {
        self.current
    }
}

/// Exponential Moving Average (EMA).
///
/// A weighted moving average that gives more weight to recent
/// prices. Uses the standard smoothing factor
/// `α = 2 / (length + 1)`. Each value is computed as:
///
/// ```text
/// EMA = α × price + (1 − α) × prev_EMA
/// ```
///
/// The first `length` bars are collected to compute an SMA
/// seed value. After seeding, the SMA state is dropped and
/// the EMA runs with O(1) constant memory per tick via a
/// single fused multiply-add.
///
/// Supports live repainting: feeding a bar with the same
/// `open_time` recomputes from the previous EMA without
/// advancing state.
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Ema, EmaConfig};
/// use std::num::NonZero;
///
/// let mut ema = Ema::new(EmaConfig::close(NonZero::new(3).unwrap()));
///
/// // Seeding phase: collecting SMA
/// assert_eq!(ema.compute(&Bar::from_value(2.0, 1))?, None);
/// assert_eq!(ema.compute(&Bar::from_value(4.0, 2))?, None);
///
/// // SMA seed = (2 + 4 + 6) / 3 = 4.0
/// assert_eq!(ema.compute(&Bar::from_value(6.0, 3))?, Some(4.0));
///
/// // EMA(3) α = 0.5: 8 × 0.5 + 4 × 0.5 = 6.0
/// assert_eq!(ema.compute(&Bar::from_value(8.0, 4))?, Some(6.0));
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
    clock: BarClock,
    smoother: Smoother,
    seen_bars: usize,
}

impl Indicator for Ema {
    type Config = EmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let length = NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN);

        Self {
            config,
            clock: BarClock::default(),
            #[allow(clippy::cast_precision_loss)]
            smoother: Smoother::new(length, config.source, 2.0 / (config.length + 1) as f64),
            seen_bars: 0,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        self.smoother.update(kline, is_next_bar, price)?;

        if is_next_bar && self.seen_bars < self.config.bars_to_converge {
            self.seen_bars += 1;
        }

        Ok(self.value())
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        if self.seen_bars >= self.config.bars_to_converge {
            self.smoother.value()
        } else {
            None
        }
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({}, {})", self.config.length, self.config.source)
    }
}
