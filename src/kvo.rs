use std::{fmt::Display, num::NonZero};

use crate::{
    Ema, EmaConfig, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, Result,
    bar_clock::BarClock,
    indicator::feed,
    param::{ordered_lengths, required},
};

/// Configuration for the Klinger Volume Oscillator ([`Kvo`]).
///
/// # Example
///
/// ```
/// use quantedge_ta::{IndicatorConfig, IndicatorConfigBuilder, KvoConfig};
/// use std::num::NonZero;
///
/// let config = KvoConfig::builder()
///     .fast(NonZero::new(34).unwrap())
///     .slow(NonZero::new(55).unwrap())
///     .build()?;
/// assert_eq!((config.fast(), config.slow()), (34, 55));
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct KvoConfig {
    fast: usize,
    slow: usize,
}

impl IndicatorConfig for KvoConfig {
    type Builder = KvoConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        KvoConfigBuilder {
            fast: None,
            slow: None,
        }
    }
}

impl KvoConfig {
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
}

impl Display for KvoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KvoConfig({}, {})", self.fast, self.slow)
    }
}

/// Builder for [`KvoConfig`]. Both lengths are required; `fast < slow`.
pub struct KvoConfigBuilder {
    fast: Option<usize>,
    slow: Option<usize>,
}

impl KvoConfigBuilder {
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
}

impl IndicatorConfigBuilder<KvoConfig> for KvoConfigBuilder {
    fn build(self) -> Result<KvoConfig> {
        let fast = required(self.fast, "KVO", "fast")?;
        let slow = required(self.slow, "KVO", "slow")?;
        ordered_lengths("KVO", fast, slow)?;

        Ok(KvoConfig { fast, slow })
    }
}

/// Trend direction and cumulative measurement of one bar.
#[derive(Clone, Copy, Debug)]
struct Measurement {
    trend: f64,
    cm: f64,
}

/// Klinger Volume Oscillator (KVO).
///
/// From the second bar on, each bar gets a trend (`+1` when `high + low +
/// close` rose against the previous bar, `−1` otherwise) and a volume force:
///
/// ```text
/// dm = high − low
/// cm = prev_cm + dm    while the trend holds
///      prev_dm + dm    when it flips (and on the first trend bar)
/// VF = volume × |2 × (dm / cm − 1)| × trend × 100     (0 when cm = 0)
/// KVO = EMA(fast) of VF − EMA(slow) of VF
/// ```
///
/// First output on bar `slow + 1`.
#[derive(Clone, Debug)]
pub struct Kvo {
    config: KvoConfig,
    clock: BarClock,
    committed: Option<Measurement>,
    latest: Option<Measurement>,
    fast: Ema,
    slow: Ema,
    current: Option<Price>,
}

impl Indicator for Kvo {
    type Config = KvoConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        let ema = |length: usize| {
            Ema::new(EmaConfig::close(
                NonZero::new(length).unwrap_or(NonZero::<usize>::MIN),
            ))
        };

        Self {
            config,
            clock: BarClock::default(),
            committed: None,
            latest: None,
            fast: ema(config.fast),
            slow: ema(config.slow),
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Price>> {
        if self.clock.advance(kline, &self.config)? {
            self.committed = self.latest;
        }

        let Some(prev) = self.clock.previous() else {
            return Ok(None);
        };

        let hlc = kline.high() + kline.low() + kline.close();
        let trend = if hlc > prev.high + prev.low + prev.close {
            1.0
        } else {
            -1.0
        };
        let dm = kline.high() - kline.low();
        let cm = match self.committed {
            Some(committed) if committed.trend == trend => committed.cm + dm,
            _ => prev.high - prev.low + dm,
        };
        self.latest = Some(Measurement { trend, cm });

        let volume_force = if cm == 0.0 {
            0.0
        } else {
            kline.volume() * (2.0 * (dm / cm - 1.0)).abs() * trend * 100.0
        };

        let open_time = kline.open_time();
        let fast = feed(&mut self.fast, Some(volume_force), open_time)?;
        let slow = feed(&mut self.slow, Some(volume_force), open_time)?;

        self.current = fast.zip(slow).map(|(fast, slow)| fast - slow);

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Kvo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KVO({}, {})", self.config.fast, self.config.slow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Bar,
        test_util::{assert_approx, feed_bars, nz, warm_up, wave_bars},
    };

    fn kvo(fast: usize, slow: usize) -> Kvo {
        Kvo::new(
            KvoConfig::builder()
                .fast(nz(fast))
                .slow(nz(slow))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn first_output_at_slow_plus_one() {
        let outputs = feed_bars(&mut kvo(3, 5), &wave_bars(20));
        assert_eq!(warm_up(&outputs), 5);
    }

    #[test]
    fn volume_force_follows_cumulative_measurement() {
        // Length 1 EMAs pass the volume force through; fast − slow is 0, so
        // inspect the cm bookkeeping directly.
        let mut kvo = kvo(1, 2);
        let bars = [
            Bar::new(10.0, 12.0, 8.0, 10.0).at(1).with_volume(100.0),
            Bar::new(10.0, 13.0, 9.0, 12.0).at(2).with_volume(100.0), // up, dm 4
            Bar::new(12.0, 15.0, 12.0, 14.0).at(3).with_volume(100.0), // up, dm 3
            Bar::new(14.0, 14.0, 10.0, 11.0).at(4).with_volume(100.0), // down, dm 4
        ];
        for bar in &bars[..2] {
            kvo.compute(bar).unwrap();
        }
        // first trend bar: cm = prev_dm + dm = 4 + 4
        assert_approx!(kvo.latest.unwrap().cm, 8.0);
        kvo.compute(&bars[2]).unwrap();
        // trend holds: 8 + 3
        assert_approx!(kvo.latest.unwrap().cm, 11.0);
        kvo.compute(&bars[3]).unwrap();
        // flip: prev_dm 3 + dm 4
        assert_approx!(kvo.latest.unwrap().cm, 7.0);
        assert_eq!(kvo.latest.unwrap().trend, -1.0);
    }

    #[test]
    fn repaint_uses_committed_measurement() {
        let bars = wave_bars(12);
        let mut live = kvo(2, 3);
        let mut clean = kvo(2, 3);
        for bar in &bars[..11] {
            live.compute(bar).unwrap();
            clean.compute(bar).unwrap();
        }
        let mut spike = bars[11];
        spike.high += 50.0;
        live.compute(&spike).unwrap();
        assert_eq!(
            live.compute(&bars[11]).unwrap(),
            clean.compute(&bars[11]).unwrap()
        );
    }

    #[test]
    fn zero_range_bars_have_no_force() {
        let bars: Vec<Bar> = (1..=6)
            .map(|t| Bar::from_value(100.0, t).with_volume(500.0))
            .collect();
        let outputs = feed_bars(&mut kvo(2, 3), &bars);
        assert_eq!(outputs[5], Some(0.0));
    }

    #[test]
    fn fast_must_be_below_slow() {
        let err = KvoConfig::builder()
            .fast(nz(55))
            .slow(nz(34))
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn display() {
        assert_eq!(kvo(34, 55).to_string(), "KVO(34, 55)");
    }
}
