use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Result, Sma,
    SmaConfig,
    param::{ordered_lengths, required},
};

/// Configuration for the Awesome Oscillator ([`Ao`]).
///
/// # Example
///
/// ```
/// use quantedge_ta::{AoConfig, IndicatorConfig, IndicatorConfigBuilder, PriceSource};
/// use std::num::NonZero;
///
/// let config = AoConfig::builder()
///     .fast(NonZero::new(5).unwrap())
///     .slow(NonZero::new(34).unwrap())
///     .build()?;
/// assert_eq!(config.source(), PriceSource::HL2);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AoConfig {
    fast: usize,
    slow: usize,
    source: PriceSource,
}

impl IndicatorConfig for AoConfig {
    type Builder = AoConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        AoConfigBuilder {
            fast: None,
            slow: None,
            source: PriceSource::HL2,
        }
    }
}

impl AoConfig {
    #[inline]
    #[must_use]
    pub fn fast(&self) -> usize {
        self.fast
    }

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

impl Display for AoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AoConfig({}, {}, {})", self.fast, self.slow, self.source)
    }
}

/// Builder for [`AoConfig`].
///
/// Both lengths are required and `fast < slow`. Source defaults to
/// [`PriceSource::HL2`].
pub struct AoConfigBuilder {
    fast: Option<usize>,
    slow: Option<usize>,
    source: PriceSource,
}

impl AoConfigBuilder {
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
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<AoConfig> for AoConfigBuilder {
    fn build(self) -> Result<AoConfig> {
        let fast = required(self.fast, "AO", "fast")?;
        let slow = required(self.slow, "AO", "slow")?;
        ordered_lengths("AO", fast, slow)?;

        Ok(AoConfig {
            fast,
            slow,
            source: self.source,
        })
    }
}

/// Awesome Oscillator (AO).
///
/// ```text
/// AO = SMA(fast) − SMA(slow)      of the median price by default
/// ```
///
/// First output on bar `slow`.
#[derive(Clone, Debug)]
pub struct Ao {
    config: AoConfig,
    fast: Sma,
    slow: Sma,
    current: Option<Price>,
}

impl Indicator for Ao {
    type Config = AoConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let sma = |length: usize| {
            Sma::new(SmaConfig::with_source(
                NonZero::new(length).unwrap_or(NonZero::<usize>::MIN),
                config.source,
            ))
        };

        Self {
            config,
            fast: sma(config.fast),
            slow: sma(config.slow),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        // Both SMAs read the same bar; their clocks reject out-of-order input
        // before either has moved.
        let slow = self.slow.compute(kline)?;
        let fast = self.fast.compute(kline)?;

        self.current = fast.zip(slow).map(|(fast, slow)| fast - slow);

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Ao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AO({}, {}, {})",
            self.config.fast, self.config.slow, self.config.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error,
        test_util::{assert_approx, bar, feed_bars, nz, ohlc, warm_up, wave_bars},
    };

    fn ao(fast: usize, slow: usize) -> Ao {
        Ao::new(
            AoConfig::builder()
                .fast(nz(fast))
                .slow(nz(slow))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn first_output_at_slow() {
        let outputs = feed_bars(&mut ao(5, 34), &wave_bars(50));
        assert_eq!(warm_up(&outputs), 33);
    }

    #[test]
    fn difference_of_median_price_averages() {
        let bars = [
            ohlc(0.0, 4.0, 2.0, 0.0, 1),  // hl2 3
            ohlc(0.0, 6.0, 4.0, 0.0, 2),  // hl2 5
            ohlc(0.0, 10.0, 6.0, 0.0, 3), // hl2 8
        ];
        let outputs = feed_bars(&mut ao(1, 3), &bars);
        // 8 − 16/3
        assert_approx!(outputs[2].unwrap(), 8.0 / 3.0);
    }

    #[test]
    fn ordering_violation_leaves_both_averages_intact() {
        let mut ao = ao(1, 2);
        ao.compute(&bar(10.0, 5)).unwrap();
        ao.compute(&bar(20.0, 6)).unwrap();
        let err = ao.compute(&bar(30.0, 4)).unwrap_err();
        assert!(matches!(err, Error::OrderingViolation { last: 6, got: 4, .. }));
        // (30) − (20 + 30) / 2
        assert_eq!(ao.compute(&bar(30.0, 7)).unwrap(), Some(5.0));
    }

    #[test]
    fn equal_lengths_are_rejected() {
        let err = AoConfig::builder()
            .fast(nz(5))
            .slow(nz(5))
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn display() {
        assert_eq!(ao(5, 34).to_string(), "AO(5, 34, HL2)");
    }
}
