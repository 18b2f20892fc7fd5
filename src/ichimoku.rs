use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, OutputFields, Price, Result,
    RingBuffer, bar_clock::BarClock, price_window::PriceWindow,
};

/// Configuration for the Ichimoku Kinkō Hyō ([`Ichimoku`]) indicator.
///
/// The three periods size the high/low windows. `chikou_lag` and
/// `senkou_lookup` are the bar offsets applied to the lagging line and to the
/// two cloud lines; consumers that want to plot the lines at their original
/// positions shift them back by these amounts.
///
/// # Example
///
/// ```
/// use quantedge_ta::{IchimokuConfig, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// let config = IchimokuConfig::builder()
///     .tenkan(NonZero::new(9).unwrap())
///     .kijun(NonZero::new(26).unwrap())
///     .senkou_slow(NonZero::new(52).unwrap())
///     .build()?;
/// assert_eq!(config, IchimokuConfig::default_9_26_52());
/// assert_eq!(config.senkou_lookup(), 26);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct IchimokuConfig {
    tenkan: usize,
    kijun: usize,
    senkou_slow: usize,
    chikou_lag: usize,
    senkou_lookup: usize,
}

impl IndicatorConfig for IchimokuConfig {
    type Builder = IchimokuConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        IchimokuConfigBuilder {
            tenkan: None,
            kijun: None,
            senkou_slow: None,
            chikou_lag: 26,
            senkou_lookup: 26,
        }
    }
}

impl IchimokuConfig {
    /// Conversion line window.
    #[inline]
    #[must_use]
    pub fn tenkan(&self) -> usize {
        self.tenkan
    }

    /// Base line window.
    #[inline]
    #[must_use]
    pub fn kijun(&self) -> usize {
        self.kijun
    }

    /// Slow cloud line window.
    #[inline]
    #[must_use]
    pub fn senkou_slow(&self) -> usize {
        self.senkou_slow
    }

    /// Bars between a close and its appearance on the lagging line.
    #[inline]
    #[must_use]
    pub fn chikou_lag(&self) -> usize {
        self.chikou_lag
    }

    /// Bars between computing a cloud value and reporting it.
    #[inline]
    #[must_use]
    pub fn senkou_lookup(&self) -> usize {
        self.senkou_lookup
    }

    /// The classic 9/26/52 setting with 26-bar offsets.
    #[must_use]
    pub fn default_9_26_52() -> Self {
        Self {
            tenkan: 9,
            kijun: 26,
            senkou_slow: 52,
            chikou_lag: 26,
            senkou_lookup: 26,
        }
    }
}

impl Display for IchimokuConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IchimokuConfig({}, {}, {}, {}, {})",
            self.tenkan, self.kijun, self.senkou_slow, self.chikou_lag, self.senkou_lookup
        )
    }
}

/// Builder for [`IchimokuConfig`].
///
/// The three windows are required. Both offsets default to `26` and may be
/// zero.
pub struct IchimokuConfigBuilder {
    tenkan: Option<usize>,
    kijun: Option<usize>,
    senkou_slow: Option<usize>,
    chikou_lag: usize,
    senkou_lookup: usize,
}

impl IchimokuConfigBuilder {
    #[inline]
    #[must_use]
    pub fn tenkan(mut self, length: NonZero<usize>) -> Self {
        self.tenkan = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn kijun(mut self, length: NonZero<usize>) -> Self {
        self.kijun = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn senkou_slow(mut self, length: NonZero<usize>) -> Self {
        self.senkou_slow = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn chikou_lag(mut self, bars: usize) -> Self {
        self.chikou_lag = bars;
        self
    }

    #[inline]
    #[must_use]
    pub fn senkou_lookup(mut self, bars: usize) -> Self {
        self.senkou_lookup = bars;
        self
    }
}

impl IndicatorConfigBuilder<IchimokuConfig> for IchimokuConfigBuilder {
    fn build(self) -> Result<IchimokuConfig> {
        Ok(IchimokuConfig {
            tenkan: required(self.tenkan, "tenkan")?,
            kijun: required(self.kijun, "kijun")?,
            senkou_slow: required(self.senkou_slow, "senkou_slow")?,
            chikou_lag: self.chikou_lag,
            senkou_lookup: self.senkou_lookup,
        })
    }
}

fn required(value: Option<usize>, name: &str) -> Result<usize> {
    crate::param::required(value, "Ichimoku", name)
}

/// Ichimoku output.
///
/// Conversion and base lines describe the current bar. The cloud lines were
/// computed `senkou_lookup` bars ago, the lagging line is the close of
/// `chikou_lag` bars ago; each is `None` until that much history exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IchimokuValue {
    conversion_line: Price,
    base_line: Price,
    cloud_leading_fast_line: Option<Price>,
    cloud_leading_slow_line: Option<Price>,
    lagging_line: Option<Price>,
}

impl IchimokuValue {
    /// Tenkan-sen: midpoint of the `tenkan` high/low range.
    #[inline]
    #[must_use]
    pub fn conversion_line(&self) -> Price {
        self.conversion_line
    }

    /// Kijun-sen: midpoint of the `kijun` high/low range.
    #[inline]
    #[must_use]
    pub fn base_line(&self) -> Price {
        self.base_line
    }

    /// Senkou span A: `(conversion + base) / 2`, shifted.
    #[inline]
    #[must_use]
    pub fn cloud_leading_fast_line(&self) -> Option<Price> {
        self.cloud_leading_fast_line
    }

    /// Senkou span B: midpoint of the `senkou_slow` range, shifted.
    #[inline]
    #[must_use]
    pub fn cloud_leading_slow_line(&self) -> Option<Price> {
        self.cloud_leading_slow_line
    }

    /// Chikou span: the lagged close.
    #[inline]
    #[must_use]
    pub fn lagging_line(&self) -> Option<Price> {
        self.lagging_line
    }
}

impl OutputFields for IchimokuValue {
    const NAMES: &'static [&'static str] = &[
        "conversion_line",
        "base_line",
        "cloud_leading_fast_line",
        "cloud_leading_slow_line",
        "lagging_line",
    ];

    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>) {
        out.push(value.map(Self::conversion_line));
        out.push(value.map(Self::base_line));
        out.push(value.and_then(Self::cloud_leading_fast_line));
        out.push(value.and_then(Self::cloud_leading_slow_line));
        out.push(value.and_then(Self::lagging_line));
    }
}

impl Display for IchimokuValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ichimoku(conversion: {}, base: {})",
            self.conversion_line, self.base_line
        )
    }
}

/// Highest high and lowest low over a window, reduced to their midpoint.
#[derive(Clone, Debug)]
struct MidRange {
    highs: PriceWindow,
    lows: PriceWindow,
}

impl MidRange {
    fn new(length: usize) -> Self {
        Self {
            highs: PriceWindow::new(length),
            lows: PriceWindow::new(length),
        }
    }

    fn update(&mut self, kline: &impl Ohlcv, is_next_bar: bool) -> Option<Price> {
        self.highs.update(kline.high(), is_next_bar);
        self.lows.update(kline.low(), is_next_bar);

        self.highs
            .max()
            .zip(self.lows.min())
            .map(|(high, low)| f64::midpoint(high, low))
    }
}

/// Ichimoku Kinkō Hyō.
///
/// ```text
/// conversion = (HH + LL) / 2 over tenkan
/// base       = (HH + LL) / 2 over kijun
/// fast cloud = (conversion + base) / 2,     reported senkou_lookup bars later
/// slow cloud = (HH + LL) / 2 over senkou_slow, reported senkou_lookup bars later
/// lagging    = close of chikou_lag bars ago
/// ```
///
/// The output is defined once both the conversion and base lines are.
#[derive(Clone, Debug)]
pub struct Ichimoku {
    config: IchimokuConfig,
    clock: BarClock,
    conversion: MidRange,
    base: MidRange,
    slow: MidRange,
    fast_cloud: RingBuffer<Option<Price>>,
    slow_cloud: RingBuffer<Option<Price>>,
    closes: RingBuffer,
    current: Option<IchimokuValue>,
}

/// Oldest buffered value once the buffer spans its full offset.
fn shifted<T: Copy + Default>(buffer: &RingBuffer<T>) -> Option<T> {
    buffer.is_full().then(|| buffer.oldest()).flatten()
}

impl Indicator for Ichimoku {
    type Config = IchimokuConfig;
    type Output = IchimokuValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            conversion: MidRange::new(config.tenkan),
            base: MidRange::new(config.kijun),
            slow: MidRange::new(config.senkou_slow),
            fast_cloud: RingBuffer::new(config.senkou_lookup + 1),
            slow_cloud: RingBuffer::new(config.senkou_lookup + 1),
            closes: RingBuffer::new(config.chikou_lag + 1),
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<IchimokuValue>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;

        let conversion = self.conversion.update(kline, is_next_bar);
        let base = self.base.update(kline, is_next_bar);
        let slow = self.slow.update(kline, is_next_bar);

        let fast = conversion
            .zip(base)
            .map(|(conversion, base)| f64::midpoint(conversion, base));
        self.fast_cloud.update(fast, is_next_bar);
        self.slow_cloud.update(slow, is_next_bar);
        self.closes.update(kline.close(), is_next_bar);

        self.current = conversion.zip(base).map(|(conversion_line, base_line)| {
            IchimokuValue {
                conversion_line,
                base_line,
                cloud_leading_fast_line: shifted(&self.fast_cloud).flatten(),
                cloud_leading_slow_line: shifted(&self.slow_cloud).flatten(),
                lagging_line: shifted(&self.closes),
            }
        });

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<IchimokuValue> {
        self.current
    }
}

impl Display for Ichimoku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ichimoku({}, {}, {}, {}, {})",
            self.config.tenkan,
            self.config.kijun,
            self.config.senkou_slow,
            self.config.chikou_lag,
            self.config.senkou_lookup
        )
    }
}
