mod fixtures;

use fixtures::{assert_near, closes, load_bars, nz};
use quantedge_ta::{
    Bar, Bb, BbConfig, Cci, CciConfig, Ema, EmaConfig, Engine, Error, IndicatorKind,
    IndicatorSpec, PriceSource, Roc, RocConfig, Sma, SmaConfig, StdDev, StdDevConfig, Vtx,
    VtxConfig, Vwma, VwmaConfig, Wma, WmaConfig,
};

mod constant_stream {
    use super::*;

    #[test]
    fn averages_equal_the_constant() {
        let bars = closes(&[100.0; 50]);
        let mut sma = Sma::new(SmaConfig::close(nz(9)));
        let mut ema = Ema::new(EmaConfig::close(nz(9)));
        let mut wma = Wma::new(WmaConfig::close(nz(9)));

        for (i, bar) in bars.iter().enumerate() {
            let values = [
                sma.compute(bar).unwrap(),
                ema.compute(bar).unwrap(),
                wma.compute(bar).unwrap(),
            ];
            for value in values {
                if i >= 8 {
                    assert_eq!(value, Some(100.0), "bar {i}");
                } else {
                    assert_eq!(value, None, "bar {i}");
                }
            }
        }
    }

    #[test]
    fn std_dev_is_zero() {
        let mut std_dev = StdDev::new(StdDevConfig::close(nz(20)));
        let outputs: Vec<_> = closes(&[100.0; 50])
            .iter()
            .map(|bar| std_dev.compute(bar).unwrap())
            .collect();

        assert!(outputs[..19].iter().all(Option::is_none));
        assert!(outputs[19..].iter().all(|v| *v == Some(0.0)));
    }
}

/// The fixture's moving bars, then `count` flat bars without volume.
fn moving_then_flat(count: u64) -> (Vec<Bar>, f64) {
    let mut bars = load_bars();
    let last = *bars.last().expect("non-empty fixture");
    bars.extend((1..=count).map(|k| Bar::from_value(last.close, last.open_time + k * 3_600_000)));
    (bars, last.close)
}

mod flat_after_movement {
    use super::*;

    #[test]
    fn dispersion_drops_to_exactly_zero() {
        let (bars, level) = moving_then_flat(40);
        let mut std_dev = StdDev::new(StdDevConfig::close(nz(20)));
        let mut bb = Bb::new(BbConfig::close(nz(20)));
        let mut cci = Cci::new(CciConfig::typical(nz(20)));

        for bar in &bars {
            std_dev.compute(bar).unwrap();
            bb.compute(bar).unwrap();
            cci.compute(bar).unwrap();
        }

        assert_eq!(std_dev.value(), Some(0.0));
        assert_eq!(bb.value().map(|v| (v.width(), v.middle())), Some((0.0, level)));
        assert_eq!(cci.value(), Some(0.0));
    }

    #[test]
    fn vortex_is_zero_without_true_range() {
        let (bars, _) = moving_then_flat(40);
        let mut vtx = Vtx::new(VtxConfig::new(nz(14)));
        for bar in &bars {
            vtx.compute(bar).unwrap();
        }

        let value = vtx.value().unwrap();
        assert_eq!((value.plus(), value.minus()), (0.0, 0.0));
    }

    #[test]
    fn vwma_falls_back_to_the_mean_once_volume_is_gone() {
        let (bars, level) = moving_then_flat(40);
        let mut vwma = Vwma::new(VwmaConfig::close(nz(20)));
        for bar in &bars {
            vwma.compute(bar).unwrap();
        }

        assert_near(vwma.value().unwrap(), level, 1e-9, "VWMA on a drained window");
    }
}

#[test]
fn rate_of_change_over_a_ramp() {
    let ramp: Vec<f64> = (1..=100).map(f64::from).collect();
    let mut roc = Roc::new(RocConfig::close(nz(9)));

    let outputs: Vec<_> = closes(&ramp)
        .iter()
        .map(|bar| roc.compute(bar).unwrap())
        .collect();

    assert!(outputs[..9].iter().all(Option::is_none));
    assert_near(outputs[9].unwrap(), (10.0 - 1.0) / 1.0 * 100.0, 1e-12, "ROC at bar 10");
    assert_near(outputs[99].unwrap(), (100.0 - 91.0) / 91.0 * 100.0, 1e-12, "ROC at bar 100");
}

mod out_of_order {
    use super::*;

    #[test]
    fn every_indicator_rejects_an_earlier_bar() {
        let earlier = Bar::from_value(99.0, 4);
        for spec in IndicatorSpec::default_suite() {
            let mut indicator = spec.build().unwrap();
            indicator.step(&Bar::from_value(100.0, 5)).unwrap();

            let err = indicator.step(&earlier).unwrap_err();
            assert!(
                matches!(err, Error::OrderingViolation { last: 5, got: 4, .. }),
                "{}: {err}",
                spec.name()
            );
        }
    }

    #[test]
    fn engine_rejects_an_earlier_bar() {
        let mut engine = Engine::from_specs(&IndicatorSpec::default_suite()).unwrap();
        engine.push(&Bar::from_value(100.0, 5)).unwrap();

        let err = engine.push(&Bar::from_value(100.0, 4)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "engine: bar at open_time 4 arrived after bar at 5"
        );
        assert_eq!(engine.table().len(), 1);
    }

    #[test]
    fn rejected_bar_leaves_state_untouched() {
        let mut sma = Sma::new(SmaConfig::close(nz(2)));
        sma.compute(&Bar::from_value(10.0, 1)).unwrap();
        sma.compute(&Bar::from_value(20.0, 2)).unwrap();
        assert!(sma.compute(&Bar::from_value(1_000.0, 1)).is_err());
        assert_eq!(sma.value(), Some(15.0));
        assert_eq!(sma.compute(&Bar::from_value(30.0, 3)).unwrap(), Some(25.0));
    }
}

mod short_history {
    use super::*;

    #[test]
    fn single_bar_defines_nothing() {
        let mut engine = Engine::from_specs(&IndicatorSpec::default_suite()).unwrap();
        engine
            .push(&Bar::new(100.0, 101.0, 99.0, 100.5).with_volume(10.0).at(1))
            .unwrap();

        let table = engine.table();
        assert_eq!(table.len(), 1);
        for series in table {
            assert_eq!(series.warm_up(), 1, "{}", series.name());
        }
    }

    #[test]
    fn series_are_as_long_as_the_input() {
        let specs = [
            IndicatorKind::Sma {
                period: 9,
                source: PriceSource::Close,
            },
            IndicatorKind::Bb {
                period: 20,
                std_dev_mult: 2.0,
                source: PriceSource::Close,
            },
            IndicatorKind::Rsi {
                period: 14,
                source: PriceSource::Close,
            },
            IndicatorKind::Macd {
                fast_period: 12,
                slow_period: 26,
                signal_period: 9,
                source: PriceSource::Close,
            },
        ]
        .map(IndicatorSpec::new);
        let mut engine = Engine::from_specs(&specs).unwrap();
        engine.run(&closes(&[1.0, 2.0, 3.0, 4.0])).unwrap();

        let table = engine.into_table();
        assert_eq!(table.index(), &[1, 2, 3, 4]);
        for series in &table {
            for field in series.fields() {
                assert_eq!(series.field(field).unwrap(), &[None; 4]);
            }
        }
    }
}
