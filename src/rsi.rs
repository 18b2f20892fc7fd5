use std::{fmt::Display, num::NonZero};

use crate::{
    Bar, Indicator, Ohlcv, Price, PriceSource, Result, Smma, SmmaConfig, bar_clock::BarClock,
    indicator::length_config,
};

length_config!(
    /// Configuration for the Relative Strength Index ([`Rsi`])
    /// indicator.
    ///
    /// RSI uses Wilder's smoothing, which has infinite memory: the
    /// SMA seed (first `length` price changes) influences all
    /// subsequent values. Output begins at bar `length + 1`.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::RsiConfig;
    /// use std::num::NonZero;
    ///
    /// let config = RsiConfig::close(NonZero::new(14).unwrap());
    /// assert_eq!(config.length(), 14);
    /// ```
    RsiConfig,
    RsiConfigBuilder,
    "RSI",
    PriceSource::Close
);

impl RsiConfig {
    /// RSI on closing price.
    #[must_use]
    pub fn close(length: NonZero<usize>) -> Self {
        Self::with_source(length, PriceSource::Close)
    }

    /// RSI on an arbitrary price source.
    #[must_use]
    pub fn with_source(length: NonZero<usize>, source: PriceSource) -> Self {
        Self {
            length: length.get(),
            source,
        }
    }
}

/// Relative Strength Index (RSI) with Wilder's smoothing.
///
/// Measures the speed and magnitude of recent price changes on
/// a 0–100 scale. Values above 70 are conventionally considered
/// overbought; below 30, oversold.
///
/// Gains and losses between consecutive bars are smoothed with two
/// [`Smma`]s (SMA seed over the first `length` changes, then
/// `α = 1 / length`):
///
/// ```text
/// RSI = 100 × avg_gain / (avg_gain + avg_loss)
/// ```
///
/// When the average loss is zero (including a flat series), RSI is 100.
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Rsi, RsiConfig};
/// use std::num::NonZero;
///
/// let mut rsi = Rsi::new(RsiConfig::close(NonZero::new(3).unwrap()));
///
/// // Seeding: need 3 price changes (4 bars)
/// assert_eq!(rsi.compute(&Bar::from_value(10.0, 1))?, None);
/// assert_eq!(rsi.compute(&Bar::from_value(12.0, 2))?, None);
/// assert_eq!(rsi.compute(&Bar::from_value(11.0, 3))?, None);
///
/// // Bar 4: changes = +2, −1, +2 → avg_gain=4/3, avg_loss=1/3 → RSI=80
/// let rsi = rsi.compute(&Bar::from_value(13.0, 4))?.unwrap();
/// assert!((rsi - 80.0).abs() < 1e-10);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
    clock: BarClock,
    prev_price: Option<Price>,
    cur_price: Option<Price>,
    gains: Smma,
    losses: Smma,
    current: Option<Price>,
}

impl Indicator for Rsi {
    type Config = RsiConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let length = NonZero::new(config.length).unwrap_or(NonZero::<usize>::MIN);
        let smoothing = SmmaConfig::close(length);

        Self {
            config,
            clock: BarClock::default(),
            prev_price: None,
            cur_price: None,
            gains: Smma::new(smoothing),
            losses: Smma::new(smoothing),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        let price = self.config.source.extract(kline, self.clock.prev_close());

        if is_next_bar {
            self.prev_price = self.cur_price;
        }
        self.cur_price = Some(price);

        let Some(prev_price) = self.prev_price else {
            return Ok(None);
        };

        let (gain, loss) = Self::gain_and_loss(prev_price, price);
        let open_time = kline.open_time();
        let avg_gain = self.gains.compute(&Bar::from_value(gain, open_time))?;
        let avg_loss = self.losses.compute(&Bar::from_value(loss, open_time))?;

        self.current = avg_gain
            .zip(avg_loss)
            .map(|(avg_gain, avg_loss)| Self::rsi_from_averages(avg_gain, avg_loss));

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Rsi {
    #[inline]
    fn gain_and_loss(prev_price: Price, price: Price) -> (Price, Price) {
        let change = price - prev_price;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        (gain, loss)
    }

    #[inline]
    fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss <= 0.0 {
            100.0
        } else {
            (100.0 * avg_gain / (avg_gain + avg_loss)).clamp(0.0, 100.0)
        }
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({}, {})", self.config.length, self.config.source)
    }
}
