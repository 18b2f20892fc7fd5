use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, OutputFields, Price, PriceSource,
    Result, Rsi, RsiConfig, Sma, SmaConfig,
    bar_clock::BarClock,
    indicator::feed,
    param::required,
    price_window::PriceWindow,
    stoch::stochastic,
};

/// Configuration for the Stochastic RSI ([`StochRsi`]) indicator.
///
/// # Example
///
/// ```
/// use quantedge_ta::{IndicatorConfig, IndicatorConfigBuilder, StochRsiConfig};
/// use std::num::NonZero;
///
/// let config = StochRsiConfig::builder()
///     .rsi_length(NonZero::new(14).unwrap())
///     .stoch_length(NonZero::new(14).unwrap())
///     .k_smoothing(NonZero::new(3).unwrap())
///     .d_smoothing(NonZero::new(3).unwrap())
///     .build()?;
/// assert_eq!(config.rsi_length(), 14);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct StochRsiConfig {
    rsi_length: usize,
    stoch_length: usize,
    k_smoothing: usize,
    d_smoothing: usize,
    source: PriceSource,
}

impl IndicatorConfig for StochRsiConfig {
    type Builder = StochRsiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        StochRsiConfigBuilder {
            rsi_length: None,
            stoch_length: None,
            k_smoothing: None,
            d_smoothing: None,
            source: PriceSource::Close,
        }
    }
}

impl StochRsiConfig {
    #[inline]
    #[must_use]
    pub fn rsi_length(&self) -> usize {
        self.rsi_length
    }

    /// Look-back window over the RSI stream.
    #[inline]
    #[must_use]
    pub fn stoch_length(&self) -> usize {
        self.stoch_length
    }

    #[inline]
    #[must_use]
    pub fn k_smoothing(&self) -> usize {
        self.k_smoothing
    }

    #[inline]
    #[must_use]
    pub fn d_smoothing(&self) -> usize {
        self.d_smoothing
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }
}

impl Display for StochRsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StochRsiConfig({}, {}, {}, {}, {})",
            self.rsi_length, self.stoch_length, self.k_smoothing, self.d_smoothing, self.source
        )
    }
}

/// Builder for [`StochRsiConfig`].
///
/// All four lengths are required. Source defaults to
/// [`PriceSource::Close`].
pub struct StochRsiConfigBuilder {
    rsi_length: Option<usize>,
    stoch_length: Option<usize>,
    k_smoothing: Option<usize>,
    d_smoothing: Option<usize>,
    source: PriceSource,
}

impl StochRsiConfigBuilder {
    #[inline]
    #[must_use]
    pub fn rsi_length(mut self, length: NonZero<usize>) -> Self {
        self.rsi_length = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn stoch_length(mut self, length: NonZero<usize>) -> Self {
        self.stoch_length = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn k_smoothing(mut self, length: NonZero<usize>) -> Self {
        self.k_smoothing = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn d_smoothing(mut self, length: NonZero<usize>) -> Self {
        self.d_smoothing = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<StochRsiConfig> for StochRsiConfigBuilder {
    fn build(self) -> Result<StochRsiConfig> {
        Ok(StochRsiConfig {
            rsi_length: required(self.rsi_length, "StochRSI", "rsi_length")?,
            stoch_length: required(self.stoch_length, "StochRSI", "stoch_length")?,
            k_smoothing: required(self.k_smoothing, "StochRSI", "k_smoothing")?,
            d_smoothing: required(self.d_smoothing, "StochRSI", "d_smoothing")?,
            source: self.source,
        })
    }
}

/// Stochastic RSI output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochRsiValue {
    k: Price,
    d: Option<Price>,
}

impl StochRsiValue {
    /// Smoothed stochastic of RSI, in `[0, 100]`.
    #[inline]
    #[must_use]
    pub fn k(&self) -> Price {
        self.k
    }

    /// SMA of `k`; `None` until its window fills.
    #[inline]
    #[must_use]
    pub fn d(&self) -> Option<Price> {
        self.d
    }
}

impl OutputFields for StochRsiValue {
    const NAMES: &'static [&'static str] = &["k", "d"];

    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>) {
        out.push(value.map(Self::k));
        out.push(value.and_then(Self::d));
    }
}

impl Display for StochRsiValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.d {
            Some(d) => write!(f, "StochRSI(k: {}, d: {d})", self.k),
            None => write!(f, "StochRSI(k: {}, d: -)", self.k),
        }
    }
}

/// Stochastic RSI.
///
/// The stochastic oscillator applied to the RSI stream instead of prices:
///
/// ```text
/// raw = 100 × (RSI − min RSI) / (max RSI − min RSI)    over stoch_length
/// k   = SMA(k_smoothing) of raw
/// d   = SMA(d_smoothing) of k
/// ```
///
/// A flat RSI window reports `raw = 50`.
#[derive(Clone, Debug)]
pub struct StochRsi {
    config: StochRsiConfig,
    clock: BarClock,
    rsi: Rsi,
    window: PriceWindow,
    k: Sma,
    d: Sma,
    current: Option<StochRsiValue>,
}

impl Indicator for StochRsi {
    type Config = StochRsiConfig;
    type Output = StochRsiValue;

    fn new(config: Self::Config) -> Self {
        let length = |n: usize| NonZero::new(n).unwrap_or(NonZero::<usize>::MIN);

        Self {
            config,
            clock: BarClock::default(),
            rsi: Rsi::new(RsiConfig::with_source(
                length(config.rsi_length),
                config.source,
            )),
            window: PriceWindow::new(config.stoch_length),
            k: Sma::new(SmaConfig::close(length(config.k_smoothing))),
            d: Sma::new(SmaConfig::close(length(config.d_smoothing))),
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<StochRsiValue>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;

        let raw = self.rsi.compute(kline)?.and_then(|rsi| {
            self.window.update(rsi, is_next_bar);
            self.window
                .max()
                .zip(self.window.min())
                .map(|(high, low)| stochastic(rsi, low, high))
        });

        let open_time = kline.open_time();
        let k = feed(&mut self.k, raw, open_time)?;
        let d = feed(&mut self.d, k, open_time)?;

        self.current = k.map(|k| StochRsiValue { k, d });

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<StochRsiValue> {
        self.current
    }
}

impl Display for StochRsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StochRSI({}, {}, {}, {}, {})",
            self.config.rsi_length,
            self.config.stoch_length,
            self.config.k_smoothing,
            self.config.d_smoothing,
            self.config.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{feed_bars, feed_closes, nz, warm_up, wave_bars};

    fn stoch_rsi(rsi: usize, stoch: usize, k: usize, d: usize) -> StochRsi {
        StochRsi::new(
            StochRsiConfig::builder()
                .rsi_length(nz(rsi))
                .stoch_length(nz(stoch))
                .k_smoothing(nz(k))
                .d_smoothing(nz(d))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn warm_up_stacks_every_stage() {
        // RSI first at bar 15, raw at bar 28, k at bar 30, d at bar 32
        let outputs = feed_bars(&mut stoch_rsi(14, 14, 3, 3), &wave_bars(60));
        assert_eq!(warm_up(&outputs), 29);
        let without_d = outputs.iter().take_while(|v| v.is_none_or(|v| v.d().is_none()));
        assert_eq!(without_d.count(), 31);
    }

    #[test]
    fn stays_in_bounds() {
        let outputs = feed_bars(&mut stoch_rsi(5, 5, 2, 2), &wave_bars(80));
        for value in outputs.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value.k()));
            assert!(value.d().is_none_or(|d| (0.0..=100.0).contains(&d)));
        }
    }

    #[test]
    fn flat_rsi_is_midpoint() {
        // Monotonic rise pins RSI at 100
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let outputs = feed_closes(&mut stoch_rsi(3, 3, 1, 1), &closes);
        let last = outputs[19].unwrap();
        assert_eq!(last.k(), 50.0);
        assert_eq!(last.d(), Some(50.0));
    }

    #[test]
    fn missing_length_is_rejected() {
        let err = StochRsiConfig::builder()
            .rsi_length(nz(14))
            .stoch_length(nz(14))
            .k_smoothing(nz(3))
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn display() {
        assert_eq!(
            stoch_rsi(14, 14, 3, 3).to_string(),
            "StochRSI(14, 14, 3, 3, Close)"
        );
    }
}
