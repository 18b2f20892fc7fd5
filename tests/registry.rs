mod fixtures;

use fixtures::load_bars;
use quantedge_ta::{Engine, IndicatorSpec};

const SUITE: &str = r#"[
    { "kind": "sma", "period": 20 },
    { "name": "EMA_fast", "kind": "ema", "period": 9 },
    { "kind": "bb", "period": 20, "std_dev_mult": 2.5, "source": "hlc3" },
    { "kind": "macd", "fast_period": 12, "slow_period": 26, "signal_period": 9 },
    {
        "name": "RSI_EMA",
        "kind": "ema",
        "period": 5,
        "input": { "kind": "rsi", "period": 14 }
    },
    { "kind": "parabolic_sar" }
]"#;

fn suite() -> Vec<IndicatorSpec> {
    serde_json::from_str(SUITE).unwrap()
}

#[test]
fn json_suite_builds_named_columns() {
    let engine = Engine::from_specs(&suite()).unwrap();
    let names: Vec<_> = engine.table().iter().map(|s| s.name().to_owned()).collect();
    assert_eq!(
        names,
        ["SMA", "EMA_fast", "BB", "MACD", "RSI_EMA", "ParabolicSAR"]
    );
}

#[test]
fn invalid_spec_fails_before_any_bar() {
    let specs: Vec<IndicatorSpec> = serde_json::from_str(
        r#"[
            { "kind": "sma", "period": 20 },
            { "kind": "macd", "fast_period": 26, "slow_period": 12, "signal_period": 9 }
        ]"#,
    )
    .unwrap();
    let err = Engine::from_specs(&specs).unwrap_err();
    assert!(err.is_configuration(), "{err}");
}

#[test]
fn unknown_upstream_field_is_rejected() {
    let specs: Vec<IndicatorSpec> = serde_json::from_str(
        r#"[{
            "kind": "sma",
            "period": 3,
            "input": { "kind": "macd", "fast_period": 12, "slow_period": 26, "signal_period": 9 },
            "field": "hist"
        }]"#,
    )
    .unwrap();
    let err = Engine::from_specs(&specs).unwrap_err();
    assert!(err.to_string().contains("hist"), "{err}");
}

#[test]
fn fixture_replay_warm_up() {
    let bars = load_bars();
    let mut engine = Engine::from_specs(&suite()).unwrap();
    engine.run(&bars).unwrap();

    let table = engine.table();
    assert_eq!(table.len(), bars.len());
    assert_eq!(
        table.warm_up_report(),
        vec![
            ("SMA", 19),
            ("EMA_fast", 8),
            ("BB", 19),
            ("MACD", 25),
            // RSI from bar 15, EMA of it five values later
            ("RSI_EMA", 18),
            ("ParabolicSAR", 1),
        ]
    );

    let macd = table.series("MACD").unwrap();
    assert_eq!(macd.field("signal").unwrap().iter().take_while(|v| v.is_none()).count(), 33);
}

#[test]
fn default_suite_over_fixture() {
    let bars = load_bars();
    let mut engine = Engine::from_specs(&IndicatorSpec::default_suite()).unwrap();
    engine.run(&bars).unwrap();

    for (name, warm_up) in engine.table().warm_up_report() {
        assert!(warm_up < 100, "{name} still warming up after {warm_up} bars");
    }
}

mod csv_export {
    use super::*;

    fn exported() -> String {
        let mut engine = Engine::from_specs(&suite()).unwrap();
        engine.run(&load_bars()[..40]).unwrap();

        let mut out = Vec::new();
        engine.table().write_csv(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn header_flattens_fields() {
        let csv = exported();
        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "open_time,SMA,EMA_fast,BB_upper,BB_middle,BB_lower,\
             MACD_macd,MACD_signal,MACD_histogram,RSI_EMA,\
             ParabolicSAR_value,ParabolicSAR_trend,ParabolicSAR_extreme_point,\
             ParabolicSAR_accel_factor"
        );
    }

    #[test]
    fn one_record_per_bar_with_empty_warm_up_cells() {
        let csv = exported();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

        assert_eq!(records.len(), 40);
        assert!(records.iter().all(|r| r.len() == 14));

        let first = &records[0];
        assert_eq!(&first[0], "1704067200000");
        assert!(first.iter().skip(1).all(str::is_empty));

        let last = &records[39];
        assert!(last.iter().all(|cell| !cell.is_empty()));
        assert!(matches!(&last[11], "1" | "-1"));
    }
}
