use std::{fmt::Display, num::NonZero};

use crate::{
    Ema, EmaConfig, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, OutputFields,
    Price, PriceSource, Result,
    indicator::feed,
    param::{ordered_lengths, required},
};

/// Configuration for the Moving Average Convergence Divergence ([`Macd`])
/// indicator.
///
/// # Example
///
/// ```
/// use quantedge_ta::{IndicatorConfig, IndicatorConfigBuilder, MacdConfig};
/// use std::num::NonZero;
///
/// let config = MacdConfig::builder()
///     .fast(NonZero::new(12).unwrap())
///     .slow(NonZero::new(26).unwrap())
///     .signal(NonZero::new(9).unwrap())
///     .build()?;
/// assert_eq!(config, MacdConfig::default_12_26_9());
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct MacdConfig {
    fast: usize,
    slow: usize,
    signal: usize,
    source: PriceSource,
}

impl IndicatorConfig for MacdConfig {
    type Builder = MacdConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        MacdConfigBuilder {
            fast: None,
            slow: None,
            signal: None,
            source: PriceSource::Close,
        }
    }
}

impl MacdConfig {
    /// Fast EMA length.
    #[inline]
    #[must_use]
    pub fn fast(&self) -> usize {
        self.fast
    }

    /// Slow EMA length.
    #[inline]
    #[must_use]
    pub fn slow(&self) -> usize {
        self.slow
    }

    /// Signal line EMA length.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> usize {
        self.signal
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// MACD(12, 26, 9) on close.
    #[must_use]
    pub fn default_12_26_9() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
            source: PriceSource::Close,
        }
    }
}

impl Display for MacdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacdConfig({}, {}, {}, {})",
            self.fast, self.slow, self.signal, self.source
        )
    }
}

/// Builder for [`MacdConfig`].
///
/// All three lengths are required and `fast < slow`. Source defaults to
/// [`PriceSource::Close`].
pub struct MacdConfigBuilder {
    fast: Option<usize>,
    slow: Option<usize>,
    signal: Option<usize>,
    source: PriceSource,
}

impl MacdConfigBuilder {
    #[inline]
    #[must_use]
    pub fn fast(mut self, fast: NonZero<usize>) -> Self {
        self.fast = Some(fast.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn slow(mut self, slow: NonZero<usize>) -> Self {
        self.slow = Some(slow.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn signal(mut self, signal: NonZero<usize>) -> Self {
        self.signal = Some(signal.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<MacdConfig> for MacdConfigBuilder {
    fn build(self) -> Result<MacdConfig> {
        let fast = required(self.fast, "MACD", "fast")?;
        let slow = required(self.slow, "MACD", "slow")?;
        ordered_lengths("MACD", fast, slow)?;

        Ok(MacdConfig {
            fast,
            slow,
            signal: required(self.signal, "MACD", "signal")?,
            source: self.source,
        })
    }
}

/// MACD output.
///
/// `signal` and `histogram` trail `macd` by `signal − 1` bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    macd: Price,
    signal: Option<Price>,
    histogram: Option<Price>,
}

impl MacdValue {
    /// `EMA(fast) − EMA(slow)`.
    #[inline]
    #[must_use]
    pub fn macd(&self) -> Price {
        self.macd
    }

    /// EMA of the MACD line.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> Option<Price> {
        self.signal
    }

    /// `macd − signal`.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> Option<Price> {
        self.histogram
    }
}

impl OutputFields for MacdValue {
    const NAMES: &'static [&'static str] = &["macd", "signal", "histogram"];

    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>) {
        out.push(value.map(Self::macd));
        out.push(value.and_then(Self::signal));
        out.push(value.and_then(Self::histogram));
    }
}

impl Display for MacdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MACD(macd: {}", self.macd)?;
        match self.signal.zip(self.histogram) {
            Some((signal, histogram)) => write!(f, ", signal: {signal}, hist: {histogram})"),
            None => write!(f, ", signal: -, hist: -)"),
        }
    }
}

/// Moving Average Convergence Divergence (MACD).
///
/// ```text
/// macd      = EMA(fast) − EMA(slow)
/// signal    = EMA(signal) of macd
/// histogram = macd − signal
/// ```
///
/// `macd` is first defined on bar `slow`, `signal` and `histogram` on bar
/// `slow + signal − 1`.
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Macd, MacdConfig};
///
/// let mut macd = Macd::new(MacdConfig::default_12_26_9());
/// for t in 1..=40 {
///     macd.compute(&Bar::from_value(100.0 + t as f64, t))?;
/// }
/// let value = macd.value().unwrap();
/// assert!(value.macd() > 0.0);
/// assert!(value.histogram().is_some());
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Macd {
    config: MacdConfig,
    fast: Ema,
    slow: Ema,
    signal: Ema,
    current: Option<MacdValue>,
}

impl Indicator for Macd {
    type Config = MacdConfig;
    type Output = MacdValue;

    fn new(config: Self::Config) -> Self {
        let ema = |length: usize, source: PriceSource| {
            Ema::new(EmaConfig::with_source(
                NonZero::new(length).unwrap_or(NonZero::<usize>::MIN),
                source,
            ))
        };

        Self {
            config,
            fast: ema(config.fast, config.source),
            slow: ema(config.slow, config.source),
            signal: ema(config.signal, PriceSource::Close),
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<MacdValue>> {
        let slow = self.slow.compute(kline)?;
        let fast = self.fast.compute(kline)?;

        let macd = fast.zip(slow).map(|(fast, slow)| fast - slow);
        let signal = feed(&mut self.signal, macd, kline.open_time())?;

        self.current = macd.map(|macd| MacdValue {
            macd,
            signal,
            histogram: signal.map(|signal| macd - signal),
        });

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<MacdValue> {
        self.current
    }
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({}, {}, {}, {})",
            self.config.fast, self.config.slow, self.config.signal, self.config.source
        )
    }
}
