use std::fmt::Display;

use crate::{Bar, DynIndicator, Error, Price, Result};

/// Feeds one output field of an upstream indicator into a downstream one.
///
/// Each upstream value becomes a synthetic bar ([`Bar::from_value`]) carrying
/// the upstream bar's `open_time`, so repaints propagate. While the selected
/// field is `None` the downstream indicator is not fed and stays in warm-up.
///
/// Chains nest: a `Chain` is itself a [`DynIndicator`].
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Chain, DynIndicator, Ema, EmaConfig, Rsi, RsiConfig};
/// use std::num::NonZero;
///
/// let length = |n| NonZero::new(n).unwrap();
/// // EMA(3) of RSI(5)
/// let mut chain = Chain::new(
///     Box::new(Rsi::new(RsiConfig::close(length(5)))),
///     None,
///     Box::new(Ema::new(EmaConfig::close(length(3)))),
/// )?;
///
/// for t in 1..=20 {
///     chain.step(&Bar::from_value(100.0 + (t % 4) as f64, t))?;
/// }
/// let mut latest = Vec::new();
/// chain.write_latest(&mut latest);
/// assert!(latest[0].is_some());
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Debug)]
pub struct Chain {
    upstream: Box<dyn DynIndicator>,
    downstream: Box<dyn DynIndicator>,
    field: usize,
    scratch: Vec<Option<Price>>,
}

impl Chain {
    /// Chains `downstream` onto the `field` output of `upstream`, or onto its
    /// first field when `field` is `None`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when `upstream` has no field named `field`.
    pub fn new(
        upstream: Box<dyn DynIndicator>,
        field: Option<&str>,
        downstream: Box<dyn DynIndicator>,
    ) -> Result<Self> {
        let fields = upstream.fields();
        let index = match field {
            None => 0,
            Some(name) => fields.iter().position(|f| *f == name).ok_or_else(|| {
                Error::configuration(
                    &upstream,
                    format!("no output field `{name}`, expected one of {fields:?}"),
                )
            })?,
        };

        Ok(Self {
            scratch: Vec::with_capacity(fields.len()),
            upstream,
            downstream,
            field: index,
        })
    }

    /// Name of the upstream field feeding the downstream indicator.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.upstream.fields()[self.field]
    }
}

impl DynIndicator for Chain {
    fn fields(&self) -> &'static [&'static str] {
        self.downstream.fields()
    }

    fn step(&mut self, bar: &Bar) -> Result<()> {
        self.upstream.step(bar)?;

        self.scratch.clear();
        self.upstream.write_latest(&mut self.scratch);

        match self.scratch.get(self.field).copied().flatten() {
            Some(value) => self
                .downstream
                .step(&Bar::from_value(value, bar.open_time)),
            None => Ok(()),
        }
    }

    fn write_latest(&self, out: &mut Vec<Option<Price>>) {
        self.downstream.write_latest(out);
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <- {}.{}", self.downstream, self.upstream, self.field())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Bb, BbConfig, Ema, EmaConfig, Indicator, Rsi, RsiConfig, Sma, SmaConfig,
        test_util::{bar, nz, wave_bars},
    };

    fn latest(indicator: &dyn DynIndicator) -> Vec<Option<Price>> {
        let mut out = Vec::new();
        indicator.write_latest(&mut out);
        out
    }

    mod construction {
        use super::*;

        #[test]
        fn defaults_to_first_field() {
            let chain = Chain::new(
                Box::new(Bb::new(BbConfig::close(nz(3)))),
                None,
                Box::new(Sma::new(SmaConfig::close(nz(2)))),
            )
            .unwrap();
            assert_eq!(chain.field(), "upper");
            assert_eq!(chain.fields(), &["value"]);
        }

        #[test]
        fn unknown_field_is_rejected() {
            let err = Chain::new(
                Box::new(Bb::new(BbConfig::close(nz(3)))),
                Some("width"),
                Box::new(Sma::new(SmaConfig::close(nz(2)))),
            )
            .unwrap_err();
            assert!(err.is_configuration());
            assert!(err.to_string().contains("width"));
        }
    }

    mod feeding {
        use super::*;

        #[test]
        fn matches_manual_chaining() {
            let bars = wave_bars(40);
            let mut chain = Chain::new(
                Box::new(Rsi::new(RsiConfig::close(nz(5)))),
                None,
                Box::new(Ema::new(EmaConfig::close(nz(3)))),
            )
            .unwrap();
            let mut rsi = Rsi::new(RsiConfig::close(nz(5)));
            let mut ema = Ema::new(EmaConfig::close(nz(3)));

            for bar in &bars {
                chain.step(bar).unwrap();
                if let Some(value) = rsi.compute(bar).unwrap() {
                    ema.compute(&Bar::from_value(value, bar.open_time)).unwrap();
                }
                assert_eq!(latest(&chain), vec![ema.value()]);
            }
        }

        #[test]
        fn selected_field_feeds_downstream() {
            let mut chain = Chain::new(
                Box::new(Bb::new(BbConfig::close(nz(2)))),
                Some("lower"),
                Box::new(Sma::new(SmaConfig::close(nz(1)))),
            )
            .unwrap();
            chain.step(&bar(3.0, 1)).unwrap();
            chain.step(&bar(5.0, 2)).unwrap();
            // mean 4, σ 1, k 2
            assert_eq!(latest(&chain), vec![Some(2.0)]);
        }

        #[test]
        fn downstream_warm_up_waits_for_upstream() {
            let mut chain = Chain::new(
                Box::new(Sma::new(SmaConfig::close(nz(4)))),
                None,
                Box::new(Sma::new(SmaConfig::close(nz(3)))),
            )
            .unwrap();
            let defined: Vec<bool> = (1..=8)
                .map(|t| {
                    chain.step(&bar(10.0, t)).unwrap();
                    latest(&chain)[0].is_some()
                })
                .collect();
            // upstream first at bar 4, downstream three upstream values later
            assert_eq!(defined.iter().take_while(|d| !**d).count(), 5);
        }

        #[test]
        fn upstream_ordering_error_propagates() {
            let mut chain = Chain::new(
                Box::new(Sma::new(SmaConfig::close(nz(1)))),
                None,
                Box::new(Sma::new(SmaConfig::close(nz(1)))),
            )
            .unwrap();
            chain.step(&bar(1.0, 5)).unwrap();
            let err = chain.step(&bar(1.0, 4)).unwrap_err();
            assert!(err.is_ordering_violation());
        }
    }

    #[test]
    fn display_names_both_ends() {
        let chain = Chain::new(
            Box::new(Rsi::new(RsiConfig::close(nz(14)))),
            None,
            Box::new(Ema::new(EmaConfig::close(nz(9)))),
        )
        .unwrap();
        assert_eq!(chain.to_string(), "EMA(9, Close) <- RSI(14, Close).value");
    }
}
