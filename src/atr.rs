use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, Ohlcv, Price, PriceSource, Result, Smma, SmmaConfig,
    bar_clock::BarClock,
    indicator::{feed, period_config},
};

period_config!(
    /// Configuration for the Average True Range ([`Atr`]) indicator.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::AtrConfig;
    /// use std::num::NonZero;
    ///
    /// let config = AtrConfig::new(NonZero::new(14).unwrap());
    /// assert_eq!(config.length(), 14);
    /// ```
    AtrConfig,
    AtrConfigBuilder,
    "ATR"
);

/// True range of `kline` against the previous bar's close, or `None` on the
/// first bar.
#[inline]
pub(crate) fn true_range(kline: &impl Ohlcv, prev_close: Option<Price>) -> Option<Price> {
    prev_close.map(|_| PriceSource::TrueRange.extract(kline, prev_close))
}

/// Average True Range (ATR).
///
/// True range needs the previous close, so it is defined from the second bar
/// on:
///
/// ```text
/// TR  = max(high − low, |high − prev_close|, |low − prev_close|)
/// ATR = SMMA(length) of TR
/// ```
///
/// First output on bar `length + 1`.
///
/// # Example
///
/// ```
/// use quantedge_ta::{Atr, AtrConfig, Bar};
/// use std::num::NonZero;
///
/// let mut atr = Atr::new(AtrConfig::new(NonZero::new(2).unwrap()));
///
/// assert_eq!(atr.compute(&Bar::new(10.0, 12.0, 9.0, 11.0).at(1))?, None);
/// assert_eq!(atr.compute(&Bar::new(11.0, 13.0, 10.0, 12.0).at(2))?, None);
/// // TR = 3, 3 → 3
/// assert_eq!(atr.compute(&Bar::new(12.0, 14.0, 11.0, 13.0).at(3))?, Some(3.0));
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Atr {
    config: AtrConfig,
    clock: BarClock,
    smma: Smma,
}

impl Indicator for Atr {
    type Config = AtrConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            smma: Smma::new(SmmaConfig::close(
                NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN),
            )),
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        self.clock.advance(kline, &self.config)?;
        let tr = true_range(kline, self.clock.prev_close());

        feed(&mut self.smma, tr, kline.open_time())
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.smma.value()
    }
}

impl Display for Atr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ATR({})", self.config.length)
    }
}
