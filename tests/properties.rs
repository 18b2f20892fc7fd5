mod fixtures;

use fixtures::{closes, latest, nz};
use proptest::prelude::*;
use quantedge_ta::{
    Bar, Bb, BbConfig, Chain, DynIndicator, Ema, EmaConfig, IndicatorConfig,
    IndicatorConfigBuilder, IndicatorSpec, Macd, MacdConfig, Rsi, RsiConfig, Sma, SmaConfig,
};

fn arb_closes(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1_000.0_f64, len)
}

fn arb_bars(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec(
        (
            1.0..1_000.0_f64,
            1.0..1_000.0_f64,
            0.0..10.0_f64,
            0.0..10.0_f64,
            0.0..10_000.0_f64,
        ),
        len,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .zip(1..)
            .map(|((open, close, up, down, volume), t)| {
                Bar::new(open, open.max(close) + up, open.min(close) - down, close)
                    .with_volume(volume)
                    .at(t)
            })
            .collect()
    })
}

proptest! {
    /// SMA(n) is `None` for the first `n - 1` bars and defined from then on.
    #[test]
    fn warm_up_is_exact(length in 1..30usize, extra in 1..60usize, seed in arb_closes(90..91)) {
        let mut sma = Sma::new(SmaConfig::close(nz(length)));
        let bars = closes(&seed[..length - 1 + extra]);

        for (i, bar) in bars.iter().enumerate() {
            let value = sma.compute(bar).unwrap();
            prop_assert_eq!(value.is_some(), i + 1 >= length, "bar {}", i);
        }
    }

    /// Once an indicator converges it never reports `None` again.
    #[test]
    fn converged_stays_converged(bars in arb_bars(1..120)) {
        for spec in IndicatorSpec::default_suite() {
            let mut indicator = spec.build().unwrap();
            let mut converged = false;
            for bar in &bars {
                indicator.step(bar).unwrap();
                let defined = latest(indicator.as_ref())[0].is_some();
                prop_assert!(defined || !converged, "{} lost its value", spec.name());
                converged |= defined;
            }
        }
    }

    #[test]
    fn ema_of_constant_is_the_constant(
        constant in -1_000_000..1_000_000i32,
        length in 1..50usize,
        extra in 0..40usize,
    ) {
        let constant = f64::from(constant);
        let mut ema = Ema::new(EmaConfig::close(nz(length)));

        for bar in closes(&vec![constant; length + extra]) {
            if let Some(value) = ema.compute(&bar).unwrap() {
                prop_assert_eq!(value, constant);
            }
        }
        prop_assert_eq!(ema.value(), Some(constant));
    }

    #[test]
    fn macd_histogram_is_macd_minus_signal(
        values in arb_closes(1..150),
        fast in 2..10usize,
        spread in 1..20usize,
        signal in 1..10usize,
    ) {
        let config = MacdConfig::builder()
            .fast(nz(fast))
            .slow(nz(fast + spread))
            .signal(nz(signal))
            .build()
            .unwrap();
        let mut macd = Macd::new(config);

        for bar in closes(&values) {
            let Some(value) = macd.compute(&bar).unwrap() else { continue };
            prop_assert_eq!(value.signal().is_some(), value.histogram().is_some());
            if let (Some(signal), Some(histogram)) = (value.signal(), value.histogram()) {
                prop_assert_eq!(histogram, value.macd() - signal);
            }
        }
    }

    #[test]
    fn bollinger_bands_are_ordered(
        values in arb_closes(1..150),
        length in 1..30usize,
        std_dev in 0.1..5.0_f64,
    ) {
        let config = BbConfig::builder()
            .length(nz(length))
            .std_dev(std_dev)
            .build()
            .unwrap();
        let mut bb = Bb::new(config);

        for bar in closes(&values) {
            if let Some(value) = bb.compute(&bar).unwrap() {
                prop_assert!(value.lower() <= value.middle());
                prop_assert!(value.middle() <= value.upper());
            }
        }
    }

    #[test]
    fn rsi_is_bounded(values in arb_closes(1..200), length in 1..30usize) {
        let mut rsi = Rsi::new(RsiConfig::close(nz(length)));

        for bar in closes(&values) {
            if let Some(value) = rsi.compute(&bar).unwrap() {
                prop_assert!((0.0..=100.0).contains(&value), "RSI {}", value);
            }
        }
    }

    /// A chained indicator warms up after its upstream, by its own warm-up.
    #[test]
    fn composite_warm_up_stacks(
        values in arb_closes(1..120),
        upstream in 1..20usize,
        downstream in 1..20usize,
    ) {
        let sma = |length| -> Box<dyn DynIndicator> {
            Box::new(Sma::new(SmaConfig::close(nz(length))))
        };
        let mut alone = sma(upstream);
        let mut chain = Chain::new(sma(upstream), None, sma(downstream)).unwrap();

        let mut upstream_warm_up = None;
        let mut chain_warm_up = None;
        for (i, bar) in closes(&values).iter().enumerate() {
            alone.step(bar).unwrap();
            chain.step(bar).unwrap();
            if upstream_warm_up.is_none() && latest(alone.as_ref())[0].is_some() {
                upstream_warm_up = Some(i);
            }
            if chain_warm_up.is_none() && latest(&chain)[0].is_some() {
                chain_warm_up = Some(i);
            }
        }

        match (upstream_warm_up, chain_warm_up) {
            (_, None) => {}
            (None, Some(_)) => prop_assert!(false, "chain converged before its upstream"),
            (Some(up), Some(down)) => {
                prop_assert!(down >= up);
                prop_assert_eq!(down, up + downstream - 1);
            }
        }
    }
}
