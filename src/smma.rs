use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result, bar_clock::BarClock, ema::Smoother,
    indicator::length_config,
};

length_config!(
    /// Configuration for the Smoothed Moving Average ([`Smma`]) indicator.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::SmmaConfig;
    /// use std::num::NonZero;
    ///
    /// let config = SmmaConfig::close(NonZero::new(14).unwrap());
    /// assert_eq!(config.length(), 14);
    /// ```
    SmmaConfig,
    SmmaConfigBuilder,
    "SMMA",
    PriceSource::Close
);

impl SmmaConfig {
    /// SMMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// SMMA on an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Smoothed (Wilder) Moving Average.
///
/// Seeded with the SMA of the first `length` values, then
/// `SMMA = prev + (price − prev) / length`. Equivalent to an EMA with
/// `α = 1 / length`.
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Smma, SmmaConfig};
/// use std::num::NonZero;
///
/// let mut smma = Smma::new(SmmaConfig::close(NonZero::new(2).unwrap()));
///
/// assert_eq!(smma.compute(&Bar::from_value(2.0, 1))?, None);
/// assert_eq!(smma.compute(&Bar::from_value(4.0, 2))?, Some(3.0));
/// assert_eq!(smma.compute(&Bar::from_value(7.0, 3))?, Some(5.0));
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Smma {
    config: SmmaConfig,
    clock: BarClock,
    smoother: Smoother,
}

impl Indicator for Smma {
    type Config = SmmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let length = NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN);

        Self {
            config,
            clock: BarClock::default(),
            #[allow(clippy::cast_precision_loss)]
            smoother: Smoother::new(length, config.source, 1.0 / config.length as f64),
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        self.smoother.update(kline, is_next_bar, price)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.smoother.value()
    }
}

impl Display for Smma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMMA({}, {})", self.config.length, self.config.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, bar, feed_closes, nz, warm_up};

    fn smma(length: usize) -> Smma {
        Smma::new(SmmaConfig::close(nz(length)))
    }

    #[test]
    fn seeds_with_sma() {
        let outputs = feed_closes(&mut smma(3), &[3.0, 6.0, 9.0]);
        assert_eq!(warm_up(&outputs), 2);
        assert_eq!(outputs[2], Some(6.0));
    }

    #[test]
    fn wilder_recursion() {
        // seed 6; bar 4: 6 + (12 - 6) / 3 = 8
        let outputs = feed_closes(&mut smma(3), &[3.0, 6.0, 9.0, 12.0]);
        assert_approx!(outputs[3].unwrap(), 8.0);
    }

    #[test]
    fn repaint_recomputes_from_committed_value() {
        let mut smma = smma(2);
        feed_closes(&mut smma, &[2.0, 4.0]); // seed 3
        smma.compute(&bar(100.0, 3)).unwrap();
        // 3 + (7 - 3) / 2 = 5
        assert_eq!(smma.compute(&bar(7.0, 3)).unwrap(), Some(5.0));
        // 5 + (9 - 5) / 2 = 7
        assert_eq!(smma.compute(&bar(9.0, 4)).unwrap(), Some(7.0));
    }

    #[test]
    fn constant_input_is_exact() {
        let outputs = feed_closes(&mut smma(14), &[42.0; 40]);
        assert!(outputs[13..].iter().all(|v| *v == Some(42.0)));
    }

    #[test]
    fn display() {
        assert_eq!(smma(14).to_string(), "SMMA(14, Close)");
    }
}
