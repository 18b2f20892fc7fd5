use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Result,
    RingBuffer,
    bar_clock::BarClock,
    param::{ordered_lengths, required},
};

/// Configuration for Kaufman's Adaptive Moving Average ([`Kama`]).
///
/// # Example
///
/// ```
/// use quantedge_ta::{IndicatorConfig, IndicatorConfigBuilder, KamaConfig};
/// use std::num::NonZero;
///
/// let config = KamaConfig::builder()
///     .length(NonZero::new(14).unwrap())
///     .fast(NonZero::new(2).unwrap())
///     .slow(NonZero::new(30).unwrap())
///     .build()?;
/// assert_eq!(config.length(), 14);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct KamaConfig {
    length: usize,
    fast: usize,
    slow: usize,
    source: PriceSource,
}

impl IndicatorConfig for KamaConfig {
    type Builder = KamaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        KamaConfigBuilder::new()
    }
}

impl KamaConfig {
    /// Efficiency-ratio window (number of price changes).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Fastest EMA period the smoothing constant can reach.
    #[inline]
    #[must_use]
    pub fn fast(&self) -> usize {
        self.fast
    }

    /// Slowest EMA period the smoothing constant can reach.
    #[inline]
    #[must_use]
    pub fn slow(&self) -> usize {
        self.slow
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }
}

impl Display for KamaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KamaConfig({}, {}, {}, {})",
            self.length, self.fast, self.slow, self.source
        )
    }
}

/// Builder for [`KamaConfig`].
///
/// Defaults: fast = 2, slow = 30, source = [`PriceSource::Close`].
pub struct KamaConfigBuilder {
    length: Option<usize>,
    fast: usize,
    slow: usize,
    source: PriceSource,
}

impl KamaConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            fast: 2,
            slow: 30,
            source: PriceSource::Close,
        }
    }

    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn fast(mut self, fast: NonZero<usize>) -> Self {
        self.fast = fast.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn slow(mut self, slow: NonZero<usize>) -> Self {
        self.slow = slow.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<KamaConfig> for KamaConfigBuilder {
    fn build(self) -> Result<KamaConfig> {
        let length = required(self.length, "KAMA", "length")?;
        ordered_lengths("KAMA", self.fast, self.slow)?;

        Ok(KamaConfig {
            length,
            fast: self.fast,
            slow: self.slow,
            source: self.source,
        })
    }
}

/// Kaufman's Adaptive Moving Average (KAMA).
///
/// The efficiency ratio over the last `length` changes,
///
/// ```text
/// ER = |price − price[length]| / Σ|price_i − price_{i−1}|
/// ```
///
/// blends between the fast and slow EMA constants:
///
/// ```text
/// sc   = (ER × (2/(fast+1) − 2/(slow+1)) + 2/(slow+1))²
/// KAMA = prev + sc × (price − prev)
/// ```
///
/// `prev` is the previous KAMA or, on the first output (bar `length + 1`),
/// the previous price. A window with zero volatility has `ER = 0`.
#[derive(Clone, Debug)]
pub struct Kama {
    config: KamaConfig,
    clock: BarClock,
    window: RingBuffer,
    fast_sc: f64,
    slow_sc: f64,
    committed: Option<Price>,
    current: Option<Price>,
}

impl Indicator for Kama {
    type Config = KamaConfig;
    type Output = Price;

    #[allow(clippy::cast_precision_loss)]
    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            window: RingBuffer::new(config.length + 1),
            fast_sc: 2.0 / (config.fast + 1) as f64,
            slow_sc: 2.0 / (config.slow + 1) as f64,
            committed: None,
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        if is_next_bar {
            self.committed = self.current;
        }
        self.window.update(price, is_next_bar);

        if !self.window.is_full() {
            return Ok(None);
        }

        let volatility: f64 = self
            .window
            .values()
            .zip(self.window.values().skip(1))
            .map(|(older, newer)| (newer - older).abs())
            .sum();
        let oldest = self.window.oldest().unwrap_or(price);
        let previous_input = self.window.values().rev().nth(1).unwrap_or(price);

        let er = if volatility > 0.0 {
            (price - oldest).abs() / volatility
        } else {
            0.0
        };
        let sc = er.mul_add(self.fast_sc - self.slow_sc, self.slow_sc).powi(2);
        let prev = self.committed.unwrap_or(previous_input);

        self.current = Some(sc.mul_add(price - prev, prev));

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Kama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KAMA({}, {}, {}, {})",
            self.config.length, self.config.fast, self.config.slow, self.config.source
        )
    }
}
