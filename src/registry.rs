use serde::Deserialize;

use crate::{
    Adx, AdxConfig, Alma, AlmaConfig, Ao, AoConfig, Atr, AtrConfig, Bb, BbConfig, Cci, CciConfig,
    Chain, Dema, DemaConfig, DynIndicator, Ema, EmaConfig, Emv, EmvConfig, Error, Hma, HmaConfig,
    Ichimoku, IchimokuConfig, Indicator, IndicatorConfig, IndicatorConfigBuilder, Kama,
    KamaConfig, Kvo, KvoConfig, Macd, MacdConfig, ParabolicSar, ParabolicSarConfig, PriceSource,
    Result, Roc, RocConfig, Rsi, RsiConfig, Sma, SmaConfig, Smma, SmmaConfig, StdDev,
    StdDevConfig, Stoch, StochConfig, StochRsi, StochRsiConfig, T3, T3Config, Tema, TemaConfig,
    Vtx, VtxConfig, Vwma, VwmaConfig, Wma, WmaConfig, Zlema, ZlemaConfig, param::length,
};

/// Every indicator kind with its parameters.
///
/// Deserializes from a map tagged by `kind`, with parameters named after
/// their role (`period`, `fast_period`, `std_dev_mult`, …):
///
/// ```
/// use quantedge_ta::IndicatorKind;
///
/// let kind: IndicatorKind =
///     serde_json::from_str(r#"{ "kind": "bb", "period": 20, "std_dev_mult": 2.5 }"#)?;
/// assert_eq!(kind.label(), "BB");
/// # Ok::<(), serde_json::Error>(())
/// ```
///
/// Price-based kinds accept an optional `source` (default `close`; `hlc3`
/// for CCI, `hl2` for AO). Optional parameters take their textbook defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Ema {
        period: usize,
        #[serde(default)]
        source: PriceSource,
        #[serde(default)]
        enforce_convergence: bool,
    },
    Wma {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Smma {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Dema {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Tema {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    T3 {
        period: usize,
        #[serde(default = "defaults::t3_factor")]
        factor: f64,
        #[serde(default)]
        source: PriceSource,
    },
    Zlema {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Alma {
        period: usize,
        #[serde(default = "defaults::alma_offset")]
        offset: f64,
        #[serde(default = "defaults::alma_sigma")]
        sigma: f64,
        #[serde(default)]
        source: PriceSource,
    },
    Hma {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Kama {
        period: usize,
        #[serde(default = "defaults::kama_fast")]
        fast_ema_constant_period: usize,
        #[serde(default = "defaults::kama_slow")]
        slow_ema_constant_period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Vwma {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Bb {
        period: usize,
        #[serde(default = "defaults::std_dev_mult")]
        std_dev_mult: f64,
        #[serde(default)]
        source: PriceSource,
    },
    StdDev {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Atr {
        period: usize,
    },
    Kvo {
        fast_period: usize,
        slow_period: usize,
    },
    Emv {
        period: usize,
        #[serde(default = "defaults::volume_div")]
        volume_div: f64,
    },
    Rsi {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Stoch {
        period: usize,
        #[serde(default = "defaults::one")]
        smoothing_period: usize,
    },
    StochRsi {
        rsi_period: usize,
        stoch_period: usize,
        k_smoothing_period: usize,
        d_smoothing_period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Cci {
        period: usize,
        #[serde(default = "defaults::typical_price")]
        source: PriceSource,
    },
    Roc {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Vtx {
        period: usize,
    },
    Ao {
        fast_period: usize,
        slow_period: usize,
        #[serde(default = "defaults::median_price")]
        source: PriceSource,
    },
    Macd {
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Adx {
        di_period: usize,
        adx_period: usize,
    },
    Ichimoku {
        tenkan_period: usize,
        kijun_period: usize,
        senkou_slow_period: usize,
        chikou_lag_period: usize,
        senkou_lookup_period: usize,
    },
    ParabolicSar {
        #[serde(default = "defaults::init_accel_factor")]
        init_accel_factor: f64,
        #[serde(default = "defaults::accel_factor_inc")]
        accel_factor_inc: f64,
        #[serde(default = "defaults::max_accel_factor")]
        max_accel_factor: f64,
    },
}

mod defaults {
    use crate::PriceSource;

    pub fn t3_factor() -> f64 {
        0.7
    }

    pub fn alma_offset() -> f64 {
        0.85
    }

    pub fn alma_sigma() -> f64 {
        6.0
    }

    pub fn kama_fast() -> usize {
        2
    }

    pub fn kama_slow() -> usize {
        30
    }

    pub fn std_dev_mult() -> f64 {
        2.0
    }

    pub fn volume_div() -> f64 {
        10_000.0
    }

    pub fn one() -> usize {
        1
    }

    pub fn typical_price() -> PriceSource {
        PriceSource::HLC3
    }

    pub fn median_price() -> PriceSource {
        PriceSource::HL2
    }

    pub fn init_accel_factor() -> f64 {
        0.02
    }

    pub fn accel_factor_inc() -> f64 {
        0.02
    }

    pub fn max_accel_factor() -> f64 {
        0.2
    }
}

fn boxed<I>(config: I::Config) -> Box<dyn DynIndicator>
where
    I: Indicator + Send + 'static,
{
    Box::new(I::new(config))
}

impl IndicatorKind {
    /// Short indicator name, used as the default column name.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sma { .. } => "SMA",
            Self::Ema { .. } => "EMA",
            Self::Wma { .. } => "WMA",
            Self::Smma { .. } => "SMMA",
            Self::Dema { .. } => "DEMA",
            Self::Tema { .. } => "TEMA",
            Self::T3 { .. } => "T3",
            Self::Zlema { .. } => "ZLEMA",
            Self::Alma { .. } => "ALMA",
            Self::Hma { .. } => "HMA",
            Self::Kama { .. } => "KAMA",
            Self::Vwma { .. } => "VWMA",
            Self::Bb { .. } => "BB",
            Self::StdDev { .. } => "StdDev",
            Self::Atr { .. } => "ATR",
            Self::Kvo { .. } => "KVO",
            Self::Emv { .. } => "EMV",
            Self::Rsi { .. } => "RSI",
            Self::Stoch { .. } => "Stoch",
            Self::StochRsi { .. } => "StochRSI",
            Self::Cci { .. } => "CCI",
            Self::Roc { .. } => "ROC",
            Self::Vtx { .. } => "VTX",
            Self::Ao { .. } => "AO",
            Self::Macd { .. } => "MACD",
            Self::Adx { .. } => "ADX",
            Self::Ichimoku { .. } => "Ichimoku",
            Self::ParabolicSar { .. } => "ParabolicSAR",
        }
    }

    /// Validates the parameters and constructs the indicator.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for a zero period or any parameter the
    /// indicator's config builder rejects.
    #[allow(clippy::too_many_lines)]
    pub fn build(&self) -> Result<Box<dyn DynIndicator>> {
        let label = self.label();
        let period = |value: usize| length(label, "period", value);

        let indicator = match *self {
            Self::Sma { period: p, source } => boxed::<Sma>(
                SmaConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Ema {
                period: p,
                source,
                enforce_convergence,
            } => boxed::<Ema>(
                EmaConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .enforce_convergence(enforce_convergence)
                    .build()?,
            ),
            Self::Wma { period: p, source } => boxed::<Wma>(
                WmaConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Smma { period: p, source } => boxed::<Smma>(
                SmmaConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Dema { period: p, source } => boxed::<Dema>(
                DemaConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Tema { period: p, source } => boxed::<Tema>(
                TemaConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::T3 {
                period: p,
                factor,
                source,
            } => boxed::<T3>(
                T3Config::builder()
                    .length(period(p)?)
                    .factor(factor)
                    .source(source)
                    .build()?,
            ),
            Self::Zlema { period: p, source } => boxed::<Zlema>(
                ZlemaConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Alma {
                period: p,
                offset,
                sigma,
                source,
            } => boxed::<Alma>(
                AlmaConfig::builder()
                    .length(period(p)?)
                    .offset(offset)
                    .sigma(sigma)
                    .source(source)
                    .build()?,
            ),
            Self::Hma { period: p, source } => boxed::<Hma>(
                HmaConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Kama {
                period: p,
                fast_ema_constant_period,
                slow_ema_constant_period,
                source,
            } => boxed::<Kama>(
                KamaConfig::builder()
                    .length(period(p)?)
                    .fast(length(label, "fast_ema_constant_period", fast_ema_constant_period)?)
                    .slow(length(label, "slow_ema_constant_period", slow_ema_constant_period)?)
                    .source(source)
                    .build()?,
            ),
            Self::Vwma { period: p, source } => boxed::<Vwma>(
                VwmaConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Bb {
                period: p,
                std_dev_mult,
                source,
            } => boxed::<Bb>(
                BbConfig::builder()
                    .length(period(p)?)
                    .std_dev(std_dev_mult)
                    .source(source)
                    .build()?,
            ),
            Self::StdDev { period: p, source } => boxed::<StdDev>(
                StdDevConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Atr { period: p } => boxed::<Atr>(AtrConfig::new(period(p)?)),
            Self::Kvo {
                fast_period,
                slow_period,
            } => boxed::<Kvo>(
                KvoConfig::builder()
                    .fast(length(label, "fast_period", fast_period)?)
                    .slow(length(label, "slow_period", slow_period)?)
                    .build()?,
            ),
            Self::Emv {
                period: p,
                volume_div,
            } => boxed::<Emv>(
                EmvConfig::builder()
                    .length(period(p)?)
                    .volume_div(volume_div)
                    .build()?,
            ),
            Self::Rsi { period: p, source } => boxed::<Rsi>(
                RsiConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Stoch {
                period: p,
                smoothing_period,
            } => boxed::<Stoch>(
                StochConfig::builder()
                    .length(period(p)?)
                    .smoothing(length(label, "smoothing_period", smoothing_period)?)
                    .build()?,
            ),
            Self::StochRsi {
                rsi_period,
                stoch_period,
                k_smoothing_period,
                d_smoothing_period,
                source,
            } => boxed::<StochRsi>(
                StochRsiConfig::builder()
                    .rsi_length(length(label, "rsi_period", rsi_period)?)
                    .stoch_length(length(label, "stoch_period", stoch_period)?)
                    .k_smoothing(length(label, "k_smoothing_period", k_smoothing_period)?)
                    .d_smoothing(length(label, "d_smoothing_period", d_smoothing_period)?)
                    .source(source)
                    .build()?,
            ),
            Self::Cci { period: p, source } => boxed::<Cci>(
                CciConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Roc { period: p, source } => boxed::<Roc>(
                RocConfig::builder()
                    .length(period(p)?)
                    .source(source)
                    .build()?,
            ),
            Self::Vtx { period: p } => boxed::<Vtx>(VtxConfig::new(period(p)?)),
            Self::Ao {
                fast_period,
                slow_period,
                source,
            } => boxed::<Ao>(
                AoConfig::builder()
                    .fast(length(label, "fast_period", fast_period)?)
                    .slow(length(label, "slow_period", slow_period)?)
                    .source(source)
                    .build()?,
            ),
            Self::Macd {
                fast_period,
                slow_period,
                signal_period,
                source,
            } => boxed::<Macd>(
                MacdConfig::builder()
                    .fast(length(label, "fast_period", fast_period)?)
                    .slow(length(label, "slow_period", slow_period)?)
                    .signal(length(label, "signal_period", signal_period)?)
                    .source(source)
                    .build()?,
            ),
            Self::Adx {
                di_period,
                adx_period,
            } => boxed::<Adx>(
                AdxConfig::builder()
                    .di_length(length(label, "di_period", di_period)?)
                    .adx_length(length(label, "adx_period", adx_period)?)
                    .build()?,
            ),
            Self::Ichimoku {
                tenkan_period,
                kijun_period,
                senkou_slow_period,
                chikou_lag_period,
                senkou_lookup_period,
            } => boxed::<Ichimoku>(
                IchimokuConfig::builder()
                    .tenkan(length(label, "tenkan_period", tenkan_period)?)
                    .kijun(length(label, "kijun_period", kijun_period)?)
                    .senkou_slow(length(label, "senkou_slow_period", senkou_slow_period)?)
                    .chikou_lag(chikou_lag_period)
                    .senkou_lookup(senkou_lookup_period)
                    .build()?,
            ),
            Self::ParabolicSar {
                init_accel_factor,
                accel_factor_inc,
                max_accel_factor,
            } => boxed::<ParabolicSar>(
                ParabolicSarConfig::builder()
                    .init_af(init_accel_factor)
                    .af_increment(accel_factor_inc)
                    .max_af(max_accel_factor)
                    .build()?,
            ),
        };

        Ok(indicator)
    }
}

/// One column of an [`Engine`](crate::Engine): an indicator kind, an
/// optional column name and, for chained indicators, the upstream spec whose
/// output it consumes.
///
/// ```
/// use quantedge_ta::IndicatorSpec;
///
/// // EMA(9) of the MACD signal line, stored as "signal_ema"
/// let spec: IndicatorSpec = serde_json::from_str(
///     r#"{
///         "name": "signal_ema",
///         "kind": "ema",
///         "period": 9,
///         "input": {
///             "kind": "macd",
///             "fast_period": 12,
///             "slow_period": 26,
///             "signal_period": 9
///         },
///         "field": "signal"
///     }"#,
/// )?;
/// assert_eq!(spec.name(), "signal_ema");
/// assert!(spec.build().is_ok());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct IndicatorSpec {
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    kind: IndicatorKind,
    #[serde(default)]
    input: Option<Box<IndicatorSpec>>,
    #[serde(default)]
    field: Option<String>,
}

impl IndicatorSpec {
    /// Unnamed, unchained spec; the column takes the kind's label.
    #[must_use]
    pub fn new(kind: IndicatorKind) -> Self {
        Self {
            name: None,
            kind,
            input: None,
            field: None,
        }
    }

    /// Sets the column name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Feeds this indicator from `input`'s `field` output (its first field
    /// when `None`) instead of from the bar stream.
    #[must_use]
    pub fn chained(mut self, input: IndicatorSpec, field: Option<&str>) -> Self {
        self.input = Some(Box::new(input));
        self.field = field.map(str::to_owned);
        self
    }

    /// Column name: the explicit name, or the kind's label.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.kind.label())
    }

    #[must_use]
    pub fn kind(&self) -> &IndicatorKind {
        &self.kind
    }

    #[must_use]
    pub fn input(&self) -> Option<&IndicatorSpec> {
        self.input.as_deref()
    }

    /// Builds the indicator, wrapping it in a [`Chain`] when it has an input.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for invalid parameters, an unknown upstream
    /// field, or a `field` given without an `input`.
    pub fn build(&self) -> Result<Box<dyn DynIndicator>> {
        let indicator = self.kind.build()?;

        match (&self.input, &self.field) {
            (Some(input), field) => Ok(Box::new(Chain::new(
                input.build()?,
                field.as_deref(),
                indicator,
            )?)),
            (None, Some(field)) => Err(Error::configuration(
                self.name(),
                format!("field `{field}` selected without an input"),
            )),
            (None, None) => Ok(indicator),
        }
    }

    /// One column per supported kind, with common default parameters.
    #[must_use]
    pub fn default_suite() -> Vec<IndicatorSpec> {
        use IndicatorKind as K;
        use PriceSource::Close;

        [
            K::Ema {
                period: 9,
                source: Close,
                enforce_convergence: false,
            },
            K::Adx {
                di_period: 14,
                adx_period: 14,
            },
            K::Sma {
                period: 9,
                source: Close,
            },
            K::Atr { period: 14 },
            K::Ao {
                fast_period: 5,
                slow_period: 34,
                source: PriceSource::HL2,
            },
            K::Bb {
                period: 20,
                std_dev_mult: 2.0,
                source: Close,
            },
            K::Cci {
                period: 20,
                source: PriceSource::HLC3,
            },
            K::Emv {
                period: 14,
                volume_div: 10_000.0,
            },
            K::Ichimoku {
                tenkan_period: 9,
                kijun_period: 26,
                senkou_slow_period: 52,
                chikou_lag_period: 26,
                senkou_lookup_period: 26,
            },
            K::Kvo {
                fast_period: 34,
                slow_period: 55,
            },
            K::Alma {
                period: 9,
                offset: 0.85,
                sigma: 6.0,
                source: Close,
            },
            K::Dema {
                period: 9,
                source: Close,
            },
            K::Hma {
                period: 9,
                source: Close,
            },
            K::Kama {
                period: 14,
                fast_ema_constant_period: 2,
                slow_ema_constant_period: 30,
                source: Close,
            },
            K::Smma {
                period: 7,
                source: Close,
            },
            K::T3 {
                period: 5,
                factor: 0.7,
                source: Close,
            },
            K::Tema {
                period: 9,
                source: Close,
            },
            K::Vwma {
                period: 20,
                source: Close,
            },
            K::Wma {
                period: 9,
                source: Close,
            },
            K::Zlema {
                period: 14,
                source: Close,
            },
            K::Macd {
                fast_period: 12,
                slow_period: 26,
                signal_period: 9,
                source: Close,
            },
            K::ParabolicSar {
                init_accel_factor: 0.02,
                accel_factor_inc: 0.02,
                max_accel_factor: 0.2,
            },
            K::Roc {
                period: 9,
                source: Close,
            },
            K::Rsi {
                period: 14,
                source: Close,
            },
            K::StdDev {
                period: 20,
                source: Close,
            },
            K::Stoch {
                period: 14,
                smoothing_period: 1,
            },
            K::StochRsi {
                rsi_period: 14,
                stoch_period: 14,
                k_smoothing_period: 3,
                d_smoothing_period: 3,
                source: Close,
            },
            K::Vtx { period: 14 },
        ]
        .into_iter()
        .map(IndicatorSpec::new)
        .collect()
    }
}

impl From<IndicatorKind> for IndicatorSpec {
    fn from(kind: IndicatorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::wave_bars;
    use std::collections::HashSet;

    fn parse(json: &str) -> IndicatorSpec {
        serde_json::from_str(json).unwrap()
    }

    mod deserialization {
        use super::*;

        #[test]
        fn applies_documented_defaults() {
            let spec = parse(r#"{ "kind": "alma", "period": 9 }"#);
            assert_eq!(
                spec.kind(),
                &IndicatorKind::Alma {
                    period: 9,
                    offset: 0.85,
                    sigma: 6.0,
                    source: PriceSource::Close,
                }
            );
        }

        #[test]
        fn kind_specific_default_source() {
            let cci = parse(r#"{ "kind": "cci", "period": 20 }"#);
            assert!(matches!(
                cci.kind(),
                IndicatorKind::Cci {
                    source: PriceSource::HLC3,
                    ..
                }
            ));
            let ao = parse(r#"{ "kind": "ao", "fast_period": 5, "slow_period": 34 }"#);
            assert!(matches!(
                ao.kind(),
                IndicatorKind::Ao {
                    source: PriceSource::HL2,
                    ..
                }
            ));
        }

        #[test]
        fn snake_case_tags() {
            let spec = parse(r#"{ "kind": "parabolic_sar" }"#);
            assert_eq!(spec.name(), "ParabolicSAR");
            let spec = parse(
                r#"{ "kind": "stoch_rsi", "rsi_period": 14, "stoch_period": 14,
                     "k_smoothing_period": 3, "d_smoothing_period": 3 }"#,
            );
            assert_eq!(spec.name(), "StochRSI");
        }

        #[test]
        fn unknown_kind_is_rejected() {
            let result = serde_json::from_str::<IndicatorSpec>(r#"{ "kind": "supertrend" }"#);
            assert!(result.is_err());
        }

        #[test]
        fn missing_parameter_is_rejected() {
            let result = serde_json::from_str::<IndicatorSpec>(r#"{ "kind": "macd" }"#);
            assert!(result.is_err());
        }
    }

    mod building {
        use super::*;

        #[test]
        fn zero_period_is_configuration_error() {
            let err = IndicatorKind::Sma {
                period: 0,
                source: PriceSource::Close,
            }
            .build()
            .unwrap_err();
            assert!(err.is_configuration());
            assert!(err.to_string().contains("period"));
        }

        #[test]
        fn builder_validation_applies() {
            let err = IndicatorKind::Bb {
                period: 20,
                std_dev_mult: -1.0,
                source: PriceSource::Close,
            }
            .build()
            .unwrap_err();
            assert!(err.is_configuration());
        }

        #[test]
        fn field_without_input_is_rejected() {
            let spec = parse(r#"{ "kind": "sma", "period": 3, "field": "upper" }"#);
            assert!(spec.build().unwrap_err().is_configuration());
        }

        #[test]
        fn chained_spec_builds_chain() {
            let spec = IndicatorSpec::new(IndicatorKind::Sma {
                period: 3,
                source: PriceSource::Close,
            })
            .chained(
                IndicatorSpec::new(IndicatorKind::Bb {
                    period: 5,
                    std_dev_mult: 2.0,
                    source: PriceSource::Close,
                }),
                Some("upper"),
            )
            .named("bb_upper_sma");
            let indicator = spec.build().unwrap();
            assert_eq!(spec.name(), "bb_upper_sma");
            assert_eq!(indicator.fields(), &["value"]);
            assert_eq!(indicator.to_string(), "SMA(3, Close) <- BB(5, Close, 2).upper");
        }
    }

    mod default_suite {
        use super::*;

        #[test]
        fn covers_every_kind_once() {
            let suite = IndicatorSpec::default_suite();
            let names: HashSet<&str> = suite.iter().map(IndicatorSpec::name).collect();
            assert_eq!(suite.len(), 28);
            assert_eq!(names.len(), 28);
        }

        #[test]
        fn every_spec_builds_and_runs() {
            let bars = wave_bars(120);
            for spec in IndicatorSpec::default_suite() {
                let mut indicator = spec.build().unwrap();
                for bar in &bars {
                    indicator.step(bar).unwrap();
                }
                let mut out = Vec::new();
                indicator.write_latest(&mut out);
                assert_eq!(out.len(), indicator.fields().len());
                assert!(out[0].is_some(), "{} not converged", spec.name());
            }
        }
    }
}
