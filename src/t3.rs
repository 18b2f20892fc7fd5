use std::{fmt::Display, num::NonZero};

use crate::{
    Ema, EmaConfig, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource,
    Result,
    bar_clock::BarClock,
    indicator::feed,
    param::{Param, required},
};

const DEFAULT_FACTOR: f64 = 0.7;

/// Configuration for the Tillson T3 moving average ([`T3`]).
///
/// # Example
///
/// ```
/// use quantedge_ta::{IndicatorConfig, IndicatorConfigBuilder, T3Config};
/// use std::num::NonZero;
///
/// let config = T3Config::builder()
///     .length(NonZero::new(5).unwrap())
///     .factor(0.7)
///     .build()?;
/// assert_eq!(config.length(), 5);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct T3Config {
    length: usize,
    factor: Param,
    source: PriceSource,
}

impl IndicatorConfig for T3Config {
    type Builder = T3ConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        T3ConfigBuilder::new()
    }
}

impl T3Config {
    /// Length of each of the six chained EMAs.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Volume factor `a`, in `(0, 1]`.
    #[inline]
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor.get()
    }

    /// Price source extracted from each bar.
    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// T3 on closing price with the customary factor of 0.7.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self {
            length: length.get(),
            factor: Param::from_validated(DEFAULT_FACTOR),
            source: PriceSource::Close,
        }
    }
}

impl Display for T3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "T3Config({}, {}, {})",
            self.length, self.factor, self.source
        )
    }
}

/// Builder for [`T3Config`].
///
/// Defaults: factor = `0.7`, source = [`PriceSource::Close`].
pub struct T3ConfigBuilder {
    length: Option<usize>,
    factor: f64,
    source: PriceSource,
}

impl T3ConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            factor: DEFAULT_FACTOR,
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
    pub fn factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<T3Config> for T3ConfigBuilder {
    fn build(self) -> Result<T3Config> {
        let length = required(self.length, "T3", "length")?;
        let factor = Param::positive("T3", "factor", self.factor)?;
        let factor = Param::in_range("T3", "factor", factor.get(), 0.0, 1.0)?;

        Ok(T3Config {
            length,
            factor,
            source: self.source,
        })
    }
}

/// Tillson T3 moving average.
///
/// Six EMAs chained one into the next, combined with coefficients derived
/// from the volume factor `a`:
///
/// ```text
/// c1 = −a³
/// c2 = 3a² + 3a³
/// c3 = −6a² − 3a − 3a³
/// c4 = 1 + 3a + a³ + 3a²
/// T3 = c1·E6 + c2·E5 + c3·E4 + c4·E3
/// ```
///
/// The coefficients sum to one, so a constant input is reproduced. First
/// output on bar `6 × length − 5`.
#[derive(Clone, Debug)]
pub struct T3 {
    config: T3Config,
    clock: BarClock,
    emas: [Ema; 6],
    coefficients: [f64; 4],
    current: Option<Price>,
}

impl Indicator for T3 {
    type Config = T3Config;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let length = NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN);
        let first = Ema::new(EmaConfig::with_source(length, config.source));
        let chained = Ema::new(EmaConfig::close(length));

        let a = config.factor.get();
        let (a2, a3) = (a * a, a * a * a);

        Self {
            config,
            clock: BarClock::default(),
            emas: [
                first,
                chained.clone(),
                chained.clone(),
                chained.clone(),
                chained.clone(),
                chained,
            ],
            coefficients: [
                -a3,
                3.0 * a2 + 3.0 * a3,
                -6.0 * a2 - 3.0 * a - 3.0 * a3,
                1.0 + 3.0 * a + a3 + 3.0 * a2,
            ],
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        self.clock.advance(kline, &self.config)?;
        let open_time = kline.open_time();

        let mut values = [None; 6];
        let mut upstream = self.emas[0].compute(kline)?;
        values[0] = upstream;
        for (ema, slot) in self.emas[1..].iter_mut().zip(&mut values[1..]) {
            upstream = feed(ema, upstream, open_time)?;
            *slot = upstream;
        }

        let [c1, c2, c3, c4] = self.coefficients;
        self.current = match values {
            [_, _, Some(e3), Some(e4), Some(e5), Some(e6)] => {
                Some(c1 * e6 + c2 * e5 + c3 * e4 + c4 * e3)
            }
            _ => None,
        };

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for T3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "T3({}, {}, {})",
            self.config.length, self.config.factor, self.config.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_near, feed_closes, nz, warm_up};

    fn t3(length: usize) -> T3 {
        T3::new(T3Config::close(nz(length)))
    }

    #[test]
    fn first_output_at_six_length_minus_five() {
        let outputs = feed_closes(&mut t3(3), &[1.0; 20]);
        assert_eq!(warm_up(&outputs), 12);
    }

    #[test]
    fn constant_input_is_reproduced() {
        let outputs = feed_closes(&mut t3(2), &[50.0; 20]);
        for value in outputs.iter().flatten() {
            assert_near!(*value, 50.0, 1e-9);
        }
    }

    #[test]
    fn coefficients_sum_to_one() {
        let t3 = t3(5);
        assert_near!(t3.coefficients.iter().sum::<f64>(), 1.0, 1e-12);
    }

    #[test]
    fn factor_must_be_in_unit_interval() {
        for factor in [0.0, -0.2, 1.5, f64::NAN] {
            let err = T3Config::builder()
                .length(nz(5))
                .factor(factor)
                .build()
                .unwrap_err();
            assert!(err.is_configuration(), "{factor}");
        }
        assert!(T3Config::builder().length(nz(5)).factor(1.0).build().is_ok());
    }

    #[test]
    fn display() {
        assert_eq!(t3(5).to_string(), "T3(5, 0.7, Close)");
    }
}
