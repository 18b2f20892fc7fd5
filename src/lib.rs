//! Streaming technical analysis indicators for Rust.
//!
//! Indicators accept any type implementing [`Ohlcv`] and return
//! typed results. Values are `None` until enough data has been
//! received for convergence. A bar with the same `open_time` as the
//! previous one repaints the current bar; an earlier one is rejected.
//!
//! Each indicator type ([`Sma`], [`Macd`], [`Ichimoku`], …) exposes
//! [`new`](Sma::new), [`compute`](Sma::compute), and
//! [`value`](Sma::value) as inherent methods, so no trait import is
//! needed. Import [`Indicator`] only for generic code.
//!
//! For many indicators over one stream, describe them as
//! [`IndicatorSpec`]s (deserializable with `serde`) and drive them with an
//! [`Engine`], which records every output in an aligned [`Table`].

mod adx;
mod alma;
mod ao;
mod atr;
mod bar_clock;
mod bb;
mod cci;
mod chain;
mod dema;
mod ema;
mod emv;
mod engine;
mod error;
mod hma;
mod ichimoku;
mod indicator;
mod kama;
mod kvo;
mod macd;
mod ohlcv;
mod parabolic_sar;
mod param;
mod price_source;
mod price_window;
mod registry;
mod ring_buffer;
mod roc;
mod rsi;
mod sma;
mod smma;
mod std_dev;
mod stoch;
mod stoch_rsi;
mod t3;
mod table;
mod tema;
mod vtx;
mod vwma;
mod wma;
mod zlema;

pub use crate::chain::Chain;
pub use crate::engine::Engine;
pub use crate::error::{Error, Result};
pub use crate::indicator::{
    DynIndicator, Indicator, IndicatorConfig, IndicatorConfigBuilder, OutputFields,
};
pub use crate::ohlcv::{Bar, Ohlcv, Price, Timestamp};
pub use crate::price_source::PriceSource;
pub use crate::registry::{IndicatorKind, IndicatorSpec};
pub use crate::ring_buffer::RingBuffer;
pub use crate::table::{Series, Table};

pub use crate::adx::{Adx, AdxConfig, AdxConfigBuilder, AdxValue};
pub use crate::alma::{Alma, AlmaConfig, AlmaConfigBuilder};
pub use crate::ao::{Ao, AoConfig, AoConfigBuilder};
pub use crate::atr::{Atr, AtrConfig, AtrConfigBuilder};
pub use crate::bb::{Bb, BbConfig, BbConfigBuilder, BbValue};
pub use crate::cci::{Cci, CciConfig, CciConfigBuilder};
pub use crate::dema::{Dema, DemaConfig, DemaConfigBuilder};
pub use crate::ema::{Ema, EmaConfig, EmaConfigBuilder};
pub use crate::emv::{Emv, EmvConfig, EmvConfigBuilder};
pub use crate::hma::{Hma, HmaConfig, HmaConfigBuilder};
pub use crate::ichimoku::{Ichimoku, IchimokuConfig, IchimokuConfigBuilder, IchimokuValue};
pub use crate::kama::{Kama, KamaConfig, KamaConfigBuilder};
pub use crate::kvo::{Kvo, KvoConfig, KvoConfigBuilder};
pub use crate::macd::{Macd, MacdConfig, MacdConfigBuilder, MacdValue};
pub use crate::parabolic_sar::{
    ParabolicSar, ParabolicSarConfig, ParabolicSarConfigBuilder, ParabolicSarValue, SarTrend,
};
pub use crate::roc::{Roc, RocConfig, RocConfigBuilder};
pub use crate::rsi::{Rsi, RsiConfig, RsiConfigBuilder};
pub use crate::sma::{Sma, SmaConfig, SmaConfigBuilder};
pub use crate::smma::{Smma, SmmaConfig, SmmaConfigBuilder};
pub use crate::std_dev::{StdDev, StdDevConfig, StdDevConfigBuilder};
pub use crate::stoch::{Stoch, StochConfig, StochConfigBuilder, StochValue};
pub use crate::stoch_rsi::{StochRsi, StochRsiConfig, StochRsiConfigBuilder, StochRsiValue};
pub use crate::t3::{T3, T3Config, T3ConfigBuilder};
pub use crate::tema::{Tema, TemaConfig, TemaConfigBuilder};
pub use crate::vtx::{Vtx, VtxConfig, VtxConfigBuilder, VtxValue};
pub use crate::vwma::{Vwma, VwmaConfig, VwmaConfigBuilder};
pub use crate::wma::{Wma, WmaConfig, WmaConfigBuilder};
pub use crate::zlema::{Zlema, ZlemaConfig, ZlemaConfigBuilder};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute`].
            ///
            /// # Errors
            ///
            /// [`Error::OrderingViolation`] when the bar precedes the last
            /// bar seen.
            #[inline]
            pub fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<$output>> {
                <Self as Indicator>::compute(self, kline)
            }

            /// See [`Indicator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> Option<$output> {
                <Self as Indicator>::value(self)
            }
        }
    };
}

impl_indicator_methods!(Sma, SmaConfig, Price);
impl_indicator_methods!(Ema, EmaConfig, Price);
impl_indicator_methods!(Wma, WmaConfig, Price);
impl_indicator_methods!(Smma, SmmaConfig, Price);
impl_indicator_methods!(Dema, DemaConfig, Price);
impl_indicator_methods!(Tema, TemaConfig, Price);
impl_indicator_methods!(T3, T3Config, Price);
impl_indicator_methods!(Zlema, ZlemaConfig, Price);
impl_indicator_methods!(Alma, AlmaConfig, Price);
impl_indicator_methods!(Hma, HmaConfig, Price);
impl_indicator_methods!(Kama, KamaConfig, Price);
impl_indicator_methods!(Vwma, VwmaConfig, Price);
impl_indicator_methods!(Bb, BbConfig, BbValue);
impl_indicator_methods!(StdDev, StdDevConfig, Price);
impl_indicator_methods!(Atr, AtrConfig, Price);
impl_indicator_methods!(Kvo, KvoConfig, Price);
impl_indicator_methods!(Emv, EmvConfig, Price);
impl_indicator_methods!(Rsi, RsiConfig, Price);
impl_indicator_methods!(Stoch, StochConfig, StochValue);
impl_indicator_methods!(StochRsi, StochRsiConfig, StochRsiValue);
impl_indicator_methods!(Cci, CciConfig, Price);
impl_indicator_methods!(Roc, RocConfig, Price);
impl_indicator_methods!(Vtx, VtxConfig, VtxValue);
impl_indicator_methods!(Ao, AoConfig, Price);
impl_indicator_methods!(Macd, MacdConfig, MacdValue);
impl_indicator_methods!(Adx, AdxConfig, AdxValue);
impl_indicator_methods!(Ichimoku, IchimokuConfig, IchimokuValue);
impl_indicator_methods!(ParabolicSar, ParabolicSarConfig, ParabolicSarValue);

#[cfg(test)]
mod test_util;
