use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, OutputFields, Price, PriceSource,
    Result, Smma, SmmaConfig,
    bar_clock::BarClock,
    indicator::feed,
    param::required,
};

/// Configuration for the Average Directional Index ([`Adx`]).
///
/// # Example
///
/// ```
/// use quantedge_ta::{AdxConfig, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// let config = AdxConfig::builder()
///     .di_length(NonZero::new(14).unwrap())
///     .adx_length(NonZero::new(14).unwrap())
///     .build()?;
/// assert_eq!(config.di_length(), 14);
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AdxConfig {
    di_length: usize,
    adx_length: usize,
}

impl IndicatorConfig for AdxConfig {
    type Builder = AdxConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        AdxConfigBuilder {
            di_length: None,
            adx_length: None,
        }
    }
}

impl AdxConfig {
    /// Smoothing length for directional movement and true range.
    #[inline]
    #[must_use]
    pub fn di_length(&self) -> usize {
        self.di_length
    }

    /// Smoothing length for DX.
    #[inline]
    #[must_use]
    pub fn adx_length(&self) -> usize {
        self.adx_length
    }
}

impl Display for AdxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdxConfig({}, {})", self.di_length, self.adx_length)
    }
}

/// Builder for [`AdxConfig`]. Both lengths are required.
pub struct AdxConfigBuilder {
    di_length: Option<usize>,
    adx_length: Option<usize>,
}

impl AdxConfigBuilder {
    #[inline]
    #[must_use]
    pub fn di_length(mut self, length: NonZero<usize>) -> Self {
        self.di_length = Some(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn adx_length(mut self, length: NonZero<usize>) -> Self {
        self.adx_length = Some(length.get());
        self
    }
}

impl IndicatorConfigBuilder<AdxConfig> for AdxConfigBuilder {
    fn build(self) -> Result<AdxConfig> {
        Ok(AdxConfig {
            di_length: required(self.di_length, "ADX", "di_length")?,
            adx_length: required(self.adx_length, "ADX", "adx_length")?,
        })
    }
}

/// ADX output: trend strength and the two directional indicators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxValue {
    adx: Option<Price>,
    plus_di: Price,
    minus_di: Price,
}

impl AdxValue {
    /// Smoothed DX. `None` until `adx_length` DX values have been seen.
    #[inline]
    #[must_use]
    pub fn adx(&self) -> Option<Price> {
        self.adx
    }

    /// `+DI`, in `[0, 100]`.
    #[inline]
    #[must_use]
    pub fn plus_di(&self) -> Price {
        self.plus_di
    }

    /// `−DI`, in `[0, 100]`.
    #[inline]
    #[must_use]
    pub fn minus_di(&self) -> Price {
        self.minus_di
    }
}

impl OutputFields for AdxValue {
    const NAMES: &'static [&'static str] = &["adx", "plus_di", "minus_di"];

    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>) {
        out.push(value.and_then(Self::adx));
        out.push(value.map(Self::plus_di));
        out.push(value.map(Self::minus_di));
    }
}

impl Display for AdxValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.adx {
            Some(adx) => write!(f, "ADX(adx: {adx}")?,
            None => write!(f, "ADX(adx: -")?,
        }
        write!(f, ", +di: {}, -di: {})", self.plus_di, self.minus_di)
    }
}

/// `(+DM, −DM)` of a bar against the previous one. Only the larger positive
/// move counts; a tie counts for neither.
#[inline]
fn directional_movement(kline: &impl Ohlcv, prev_high: Price, prev_low: Price) -> (Price, Price) {
    let up = kline.high() - prev_high;
    let down = prev_low - kline.low();

    let plus = if up > down && up > 0.0 { up } else { 0.0 };
    let minus = if down > up && down > 0.0 { down } else { 0.0 };

    (plus, minus)
}

/// `100 × part / whole`, or `0` for an empty whole.
#[inline]
fn percent_of(part: Price, whole: Price) -> Price {
    if whole == 0.0 { 0.0 } else { 100.0 * part / whole }
}

/// Average Directional Index (ADX) with the directional indicators.
///
/// ```text
/// +DI = 100 × SMMA(+DM) / SMMA(TR)
/// −DI = 100 × SMMA(−DM) / SMMA(TR)
/// DX  = 100 × |+DI − −DI| / (+DI + −DI)
/// ADX = SMMA(adx_length) of DX
/// ```
///
/// Directional movement needs the previous bar: `±DI` are first defined on
/// bar `di_length + 1`, ADX on bar `di_length + adx_length`. A bar range of
/// zero reports `0` for both DI, and DX is `0` when both DI are `0`.
#[derive(Clone, Debug)]
pub struct Adx {
    config: AdxConfig,
    clock: BarClock,
    plus_dm: Smma,
    minus_dm: Smma,
    true_range: Smma,
    adx: Smma,
    current: Option<AdxValue>,
}

impl Indicator for Adx {
    type Config = AdxConfig;
    type Output = AdxValue;

    fn new(config: Self::Config) -> Self {
        let smma = |length: usize| {
            Smma::new(SmmaConfig::close(
                NonZero::new(length).unwrap_or(NonZero::<usize>::MIN),
            ))
        };

        Self {
            config,
            clock: BarClock::default(),
            plus_dm: smma(config.di_length),
            minus_dm: smma(config.di_length),
            true_range: smma(config.di_length),
            adx: smma(config.adx_length),
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<AdxValue>> {
        self.clock.advance(kline, &self.config)?;

        let Some(prev) = self.clock.previous().copied() else {
            return Ok(None);
        };

        let open_time = kline.open_time();
        let (plus, minus) = directional_movement(kline, prev.high, prev.low);
        let tr = PriceSource::TrueRange.extract(kline, Some(prev.close));

        let plus = feed(&mut self.plus_dm, Some(plus), open_time)?;
        let minus = feed(&mut self.minus_dm, Some(minus), open_time)?;
        let tr = feed(&mut self.true_range, Some(tr), open_time)?;

        let Some(((plus, minus), tr)) = plus.zip(minus).zip(tr) else {
            return Ok(None);
        };

        let plus_di = percent_of(plus, tr);
        let minus_di = percent_of(minus, tr);
        let dx = percent_of((plus_di - minus_di).abs(), plus_di + minus_di);

        self.current = Some(AdxValue {
            adx: feed(&mut self.adx, Some(dx), open_time)?,
            plus_di,
            minus_di,
        });

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<AdxValue> {
        self.current
    }
}

impl Display for Adx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ADX({}, {})",
            self.config.di_length, self.config.adx_length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, bar, feed_bars, nz, ohlc, warm_up, wave_bars};

    fn adx(di: usize, adx: usize) -> Adx {
        Adx::new(
            AdxConfig::builder()
                .di_length(nz(di))
                .adx_length(nz(adx))
                .build()
                .unwrap(),
        )
    }

    mod movement {
        use super::*;

        #[test]
        fn larger_move_wins() {
            let bar = ohlc(0.0, 12.0, 7.0, 0.0, 1);
            // up 2, down 1
            assert_eq!(directional_movement(&bar, 10.0, 8.0), (2.0, 0.0));
            // up −1, down 3
            assert_eq!(directional_movement(&bar, 13.0, 10.0), (0.0, 3.0));
        }

        #[test]
        fn tie_counts_for_neither() {
            let bar = ohlc(0.0, 12.0, 6.0, 0.0, 1);
            assert_eq!(directional_movement(&bar, 10.0, 8.0), (0.0, 0.0));
        }
    }

    mod convergence {
        use super::*;

        #[test]
        fn di_then_adx() {
            let outputs = feed_bars(&mut adx(14, 14), &wave_bars(60));
            assert_eq!(warm_up(&outputs), 14);
            let without_adx = outputs
                .iter()
                .take_while(|v| v.is_none_or(|v| v.adx().is_none()));
            assert_eq!(without_adx.count(), 27);
        }
    }

    #[test]
    fn steady_uptrend_has_no_minus_di() {
        let bars: Vec<_> = (1..=10u32)
            .map(|t| {
                let base = f64::from(t) * 2.0;
                ohlc(base, base + 1.0, base - 1.0, base + 0.5, u64::from(t))
            })
            .collect();
        let outputs = feed_bars(&mut adx(2, 2), &bars);
        let last = outputs[9].unwrap();
        // +DM 2 and TR max(2, 2.5, 0.5) = 2.5 on every bar
        assert_approx!(last.plus_di(), 80.0);
        assert_eq!(last.minus_di(), 0.0);
        assert_approx!(last.adx().unwrap(), 100.0);
    }

    #[test]
    fn flat_bars_are_zero() {
        let bars: Vec<_> = (1..=6).map(|t| bar(50.0, t)).collect();
        let outputs = feed_bars(&mut adx(2, 2), &bars);
        assert_eq!(
            outputs[5],
            Some(AdxValue {
                adx: Some(0.0),
                plus_di: 0.0,
                minus_di: 0.0
            })
        );
    }

    #[test]
    fn output_fields() {
        let mut out = Vec::new();
        let value = AdxValue {
            adx: None,
            plus_di: 25.0,
            minus_di: 10.0,
        };
        AdxValue::write_fields(Some(&value), &mut out);
        assert_eq!(out, vec![None, Some(25.0), Some(10.0)]);
    }

    #[test]
    fn display() {
        assert_eq!(adx(14, 14).to_string(), "ADX(14, 14)");
    }
}
