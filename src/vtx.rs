use std::fmt::Display;

use crate::{
    Indicator, Ohlcv, OutputFields, Price, PriceSource, Result,
    bar_clock::BarClock,
    indicator::period_config,
    price_window::PriceWindow,
};

period_config!(
    /// Configuration for the Vortex Indicator ([`Vtx`]).
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_ta::VtxConfig;
    /// use std::num::NonZero;
    ///
    /// let config = VtxConfig::new(NonZero::new(14).unwrap());
    /// assert_eq!(config.length(), 14);
    /// ```
    VtxConfig,
    VtxConfigBuilder,
    "VTX"
);

/// Vortex output: positive and negative trend movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VtxValue {
    plus: Price,
    minus: Price,
}

impl VtxValue {
    /// `VI+`: upward movement relative to true range.
    #[inline]
    #[must_use]
    pub fn plus(&self) -> Price {
        self.plus
    }

    /// `VI−`: downward movement relative to true range.
    #[inline]
    #[must_use]
    pub fn minus(&self) -> Price {
        self.minus
    }
}

impl OutputFields for VtxValue {
    const NAMES: &'static [&'static str] = &["plus_vtx", "minus_vtx"];

    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>) {
        out.push(value.map(Self::plus));
        out.push(value.map(Self::minus));
    }
}

impl Display for VtxValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VTX(+: {}, -: {})", self.plus, self.minus)
    }
}

/// Vortex Indicator (VTX).
///
/// ```text
/// VM+ = |high − prev_low|
/// VM− = |low − prev_high|
/// VI+ = Σ VM+ / Σ TR        over length bars
/// VI− = Σ VM− / Σ TR
/// ```
///
/// Movements need the previous bar, so the first output is on bar
/// `length + 1`. Both lines are `0` when the summed true range is `0`.
#[derive(Clone, Debug)]
pub struct Vtx {
    config: VtxConfig,
    clock: BarClock,
    plus: PriceWindow,
    minus: PriceWindow,
    true_range: PriceWindow,
    current: Option<VtxValue>,
}

impl Indicator for Vtx {
    type Config = VtxConfig;
    type Output = VtxValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            clock: BarClock::default(),
            plus: PriceWindow::new(config.length),
            minus: PriceWindow::new(config.length),
            true_range: PriceWindow::new(config.length),
            current: None,
        }
    }

    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<VtxValue>> {
        let is_next_bar = self.clock.advance(kline, &self.config)?;

        let Some(prev) = self.clock.previous() else {
            return Ok(None);
        };

        let tr = PriceSource::TrueRange.extract(kline, Some(prev.close));
        self.plus.update((kline.high() - prev.low).abs(), is_next_bar);
        self.minus.update((kline.low() - prev.high).abs(), is_next_bar);
        self.true_range.update(tr, is_next_bar);

        self.current = match (self.plus.sum(), self.minus.sum(), self.true_range.sum()) {
            (Some(_), Some(_), Some(tr)) if tr == 0.0 => Some(VtxValue {
                plus: 0.0,
                minus: 0.0,
            }),
            (Some(plus), Some(minus), Some(tr)) => Some(VtxValue {
                plus: plus / tr,
                minus: minus / tr,
            }),
            _ => None,
        };

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<VtxValue> {
        self.current
    }
}

impl Display for Vtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VTX({})", self.config.length)
    }
}
