use std::fmt::Display;

use crate::{
    Bar, Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, OutputFields, Price,
    Result, RingBuffer,
    bar_clock::BarClock,
    param::Param,
};

const DEFAULT_INIT_AF: f64 = 0.02;
const DEFAULT_AF_INCREMENT: f64 = 0.02;
const DEFAULT_MAX_AF: f64 = 0.2;

/// Configuration for the Parabolic Stop and Reverse ([`ParabolicSar`])
/// indicator.
///
/// # Example
///
/// ```
/// use quantedge_ta::{IndicatorConfig, IndicatorConfigBuilder, ParabolicSarConfig};
///
/// let config = ParabolicSarConfig::builder().max_af(0.3).build()?;
/// assert_eq!(config.init_af(), 0.02);
/// assert_eq!(config.max_af(), 0.3);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ParabolicSarConfig {
    init_af: Param,
    af_increment: Param,
    max_af: Param,
}

impl IndicatorConfig for ParabolicSarConfig {
    type Builder = ParabolicSarConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        ParabolicSarConfigBuilder {
            init_af: DEFAULT_INIT_AF,
            af_increment: DEFAULT_AF_INCREMENT,
            max_af: DEFAULT_MAX_AF,
        }
    }
}

impl ParabolicSarConfig {
    /// Acceleration factor at the start of every trend.
    #[inline]
    #[must_use]
    pub fn init_af(&self) -> f64 {
        self.init_af.get()
    }

    /// Added to the acceleration factor on each new extreme.
    #[inline]
    #[must_use]
    pub fn af_increment(&self) -> f64 {
        self.af_increment.get()
    }

    /// Cap for the acceleration factor.
    #[inline]
    #[must_use]
    pub fn max_af(&self) -> f64 {
        self.max_af.get()
    }
}

impl Default for ParabolicSarConfig {
    /// Wilder's 0.02 / 0.02 / 0.2.
    fn default() -> Self {
        Self {
            init_af: Param::from_validated(DEFAULT_INIT_AF),
            af_increment: Param::from_validated(DEFAULT_AF_INCREMENT),
            max_af: Param::from_validated(DEFAULT_MAX_AF),
        }
    }
}

impl Display for ParabolicSarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ParabolicSarConfig({}, {}, {})",
            self.init_af, self.af_increment, self.max_af
        )
    }
}

/// Builder for [`ParabolicSarConfig`].
///
/// Defaults: `init_af` = `0.02`, `af_increment` = `0.02`, `max_af` = `0.2`.
/// All three must be positive and `max_af ≥ init_af`.
pub struct ParabolicSarConfigBuilder {
    init_af: f64,
    af_increment: f64,
    max_af: f64,
}

impl ParabolicSarConfigBuilder {
    #[inline]
    #[must_use]
    pub fn init_af(mut self, value: f64) -> Self {
        self.init_af = value;
        self
    }

    #[inline]
    #[must_use]
    pub fn af_increment(mut self, value: f64) -> Self {
        self.af_increment = value;
        self
    }

    #[inline]
    #[must_use]
    pub fn max_af(mut self, value: f64) -> Self {
        self.max_af = value;
        self
    }
}

impl IndicatorConfigBuilder<ParabolicSarConfig> for ParabolicSarConfigBuilder {
    fn build(self) -> Result<ParabolicSarConfig> {
        let init_af = Param::positive("ParabolicSAR", "init_af", self.init_af)?;
        let af_increment = Param::positive("ParabolicSAR", "af_increment", self.af_increment)?;
        let max_af = Param::positive("ParabolicSAR", "max_af", self.max_af)?;

        if max_af.get() < init_af.get() {
            return Err(Error::configuration(
                "ParabolicSAR",
                format!("max_af ({max_af}) must not be below init_af ({init_af})"),
            ));
        }

        Ok(ParabolicSarConfig {
            init_af,
            af_increment,
            max_af,
        })
    }
}

/// Direction of the current SAR regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SarTrend {
    Up,
    Down,
}

impl SarTrend {
    /// `+1` for an uptrend, `−1` for a downtrend.
    #[inline]
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }
}

impl Display for SarTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// Parabolic SAR output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolicSarValue {
    value: Price,
    trend: SarTrend,
    extreme_point: Price,
    accel_factor: f64,
}

impl ParabolicSarValue {
    /// The stop-and-reverse level.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Price {
        self.value
    }

    #[inline]
    #[must_use]
    pub fn trend(&self) -> SarTrend {
        self.trend
    }

    /// Highest high of an uptrend, lowest low of a downtrend.
    #[inline]
    #[must_use]
    pub fn extreme_point(&self) -> Price {
        self.extreme_point
    }

    #[inline]
    #[must_use]
    pub fn accel_factor(&self) -> f64 {
        self.accel_factor
    }
}

impl OutputFields for ParabolicSarValue {
    /// `trend` is written as its [`sign`](SarTrend::sign).
    const NAMES: &'static [&'static str] = &["value", "trend", "extreme_point", "accel_factor"];

    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>) {
        out.push(value.map(Self::value));
        out.push(value.map(|v| v.trend.sign()));
        out.push(value.map(Self::extreme_point));
        out.push(value.map(Self::accel_factor));
    }
}

impl Display for ParabolicSarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SAR({}, {}, ep: {}, af: {})",
            self.value, self.trend, self.extreme_point, self.accel_factor
        )
    }
}

/// Parabolic Stop and Reverse (SAR).
///
/// The second bar opens the first regime: up when its high exceeds the first
/// bar's high (SAR starts at the first low, the extreme at the second high),
/// down otherwise. Each later bar moves the SAR toward the extreme:
///
/// ```text
/// sar = prev_sar + af × (ep − prev_sar)
/// ```
///
/// clamped to stay below the two previous lows in an uptrend (above the two
/// previous highs in a downtrend). A bar that crosses the SAR reverses the
/// regime: the SAR jumps to the old extreme, the extreme becomes the bar's
/// low (high) and `af` resets. Otherwise a new extreme raises `af` by
/// `af_increment`, up to `max_af`.
///
/// First output on bar 2.
#[derive(Clone, Debug)]
pub struct ParabolicSar {
    config: ParabolicSarConfig,
    clock: BarClock,
    bars: RingBuffer<Bar>,
    committed: Option<ParabolicSarValue>,
    current: Option<ParabolicSarValue>,
}

impl ParabolicSar {
    fn open_regime(&self, first: &Bar, second: &Bar) -> ParabolicSarValue {
        let (trend, value, extreme_point) = if second.high > first.high {
            (SarTrend::Up, first.low, second.high)
        } else {
            (SarTrend::Down, first.high, second.low)
        };

        ParabolicSarValue {
            value,
            trend,
            extreme_point,
            accel_factor: self.config.init_af.get(),
        }
    }

    fn advance(&self, prev: ParabolicSarValue, bar: &Bar) -> ParabolicSarValue {
        let init_af = self.config.init_af.get();
        let accelerated = (prev.accel_factor + self.config.af_increment.get())
            .min(self.config.max_af.get());
        let sar = prev
            .accel_factor
            .mul_add(prev.extreme_point - prev.value, prev.value);
        // Every bar before the current one, newest first; at most two.
        let history = self.bars.values().rev().skip(1);

        match prev.trend {
            SarTrend::Up => {
                let sar = history.map(|b| b.low).fold(sar, f64::min);

                if bar.low < sar {
                    ParabolicSarValue {
                        value: prev.extreme_point,
                        trend: SarTrend::Down,
                        extreme_point: bar.low,
                        accel_factor: init_af,
                    }
                } else if bar.high > prev.extreme_point {
                    ParabolicSarValue {
                        value: sar,
                        trend: SarTrend::Up,
                        extreme_point: bar.high,
                        accel_factor: accelerated,
                    }
                } else {
                    ParabolicSarValue { value: sar, ..prev }
                }
            }
            SarTrend::Down => {
                let sar = history.map(|b| b.high).fold(sar, f64::max);

                if bar.high > sar {
                    ParabolicSarValue {
                        value: prev.extreme_point,
                        trend: SarTrend::Up,
                        extreme_point: bar.high,
                        accel_factor: init_af,
                    }
                } else if bar.low < prev.extreme_point {
                    ParabolicSarValue {
                        value: sar,
                        trend: SarTrend::Down,
                        extreme_point: bar.low,
                        accel_factor: accelerated,
                    }
                } else {
                    ParabolicSarValue { value: sar, ..prev }
                }
            }
        }
    }
}

impl Indicator for ParabolicSar {
    type Config = ParabolicSarConfig;
    type Output = ParabolicSarValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            bars: RingBuffer::new(3),
            committed: None,
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<ParabolicSarValue>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;
        if is_next_bar {
            self.committed = self.current;
        }

        let bar = Bar::from_ohlcv(kline);
        self.bars.update(bar, is_next_bar);

        self.current = match (self.committed, self.clock.previous()) {
            (Some(prev), _) => Some(self.advance(prev, &bar)),
            (None, Some(first)) => Some(self.open_regime(first, &bar)),
            (None, None) => None,
        };

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<ParabolicSarValue> {
        self.current
    }
}

impl Display for ParabolicSar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ParabolicSAR({}, {}, {})",
            self.config.init_af, self.config.af_increment, self.config.max_af
        )
    }
}
