use std::{fmt::Display, num::NonZero};

use crate::{
    Ema, EmaConfig, Indicator, Ohlcv, Price, PriceSource, Result,
    bar_clock::BarClock,
    indicator::{feed, length_config},
};

length_config!(
    /// Configuration for the Triple Exponential Moving Average ([`Tema`])
    /// indicator.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::TemaConfig;
    /// use std::num::NonZero;
    ///
    /// let config = TemaConfig::close(NonZero::new(20).unwrap());
    /// assert_eq!(config.length(), 20);
    /// ```
    TemaConfig,
    TemaConfigBuilder,
    "TEMA",
    PriceSource::Close
);

impl TemaConfig {
    /// TEMA on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// TEMA on an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Triple Exponential Moving Average (TEMA).
///
/// ```text
/// TEMA = 3 × E1 − 3 × E2 + E3
/// E1 = EMA(price), E2 = EMA(E1), E3 = EMA(E2)
/// ```
///
/// First output on bar `3 × length − 2`.
#[derive(Clone, Debug)]
pub struct Tema {
    config: TemaConfig,
    clock: BarClock,
    e1: Ema,
    e2: Ema,
    e3: Ema,
    current: Option<Price>,
}

impl Indicator for Tema {
    type Config = TemaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let length = NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN);

        Self {
            config,
            clock: BarClock::default(),
            e1: Ema::new(EmaConfig::with_source(length, config.source)),
            e2: Ema::new(EmaConfig::close(length)),
            e3: Ema::new(EmaConfig::close(length)),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        self.clock.advance(kline, &self.config)?;
        let open_time = kline.open_time();

        let e1 = self.e1.compute(kline)?;
        let e2 = feed(&mut self.e2, e1, open_time)?;
        let e3 = feed(&mut self.e3, e2, open_time)?;

        self.current = match (e1, e2, e3) {
            (Some(e1), Some(e2), Some(e3)) => Some(3.0 * (e1 - e2) + e3),
            _ => None,
        };

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Tema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TEMA({}, {})", self.config.length, self.config.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{bar, feed_closes, nz, warm_up};

    fn tema(length: usize) -> Tema {
        Tema::new(TemaConfig::close(nz(length)))
    }

    #[test]
    fn first_output_at_three_length_minus_two() {
        let outputs = feed_closes(&mut tema(4), &[3.0; 20]);
        assert_eq!(warm_up(&outputs), 9);
    }

    #[test]
    fn constant_input_is_exact() {
        let outputs = feed_closes(&mut tema(3), &[12.25; 20]);
        assert!(outputs[6..].iter().all(|v| *v == Some(12.25)));
    }

    #[test]
    fn tracks_linear_trend_without_lag() {
        // TEMA removes the lag of a linear ramp once all three EMAs are seeded
        // and have settled.
        let closes: Vec<f64> = (1..=200).map(f64::from).collect();
        let outputs = feed_closes(&mut tema(5), &closes);
        let last = outputs[199].unwrap();
        assert!((last - 200.0).abs() < 1e-6, "{last}");
    }

    #[test]
    fn repaint_propagates_through_chain() {
        let mut live = tema(2);
        let mut clean = tema(2);
        for (close, t) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().zip(1..) {
            live.compute(&bar(close, t)).unwrap();
            clean.compute(&bar(close, t)).unwrap();
        }
        live.compute(&bar(50.0, 6)).unwrap();
        assert_eq!(
            live.compute(&bar(9.0, 6)).unwrap(),
            clean.compute(&bar(9.0, 6)).unwrap()
        );
    }

    #[test]
    fn display() {
        assert_eq!(tema(9).to_string(), "TEMA(9, Close)");
    }
}
