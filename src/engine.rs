use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::{
    Bar, DynIndicator, Error, IndicatorSpec, Ohlcv, Price, Result, Series, Table, Timestamp,
};

const ENGINE: &str = "engine";

/// One registered indicator and its scratch row.
#[derive(Debug)]
struct Slot {
    indicator: Box<dyn DynIndicator>,
    halted: bool,
    row: Vec<Option<Price>>,
}

impl Slot {
    /// Steps the indicator and appends its row to `series`. A failing
    /// indicator is halted; it and every later row of its series are `None`.
    fn step(&mut self, bar: &Bar, series: &mut Series) -> Result<()> {
        if self.halted {
            series.push_empty();
            return Ok(());
        }

        match self.indicator.step(bar) {
            Ok(()) => {
                self.row.clear();
                self.indicator.write_latest(&mut self.row);
                series.push_row(&self.row);
                Ok(())
            }
            Err(err) => {
                warn!(series = series.name(), error = %err, "indicator halted");
                self.halted = true;
                series.push_empty();
                Err(err)
            }
        }
    }
}

/// Drives a set of named indicators over one bar stream and records their
/// outputs in an aligned [`Table`].
///
/// Each pushed bar becomes one table row. The table is append-only, so the
/// engine accepts strictly increasing `open_time`s only; feed repaints to
/// individual indicators instead.
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Engine, IndicatorSpec};
///
/// let mut engine = Engine::from_specs(&IndicatorSpec::default_suite())?;
/// let bars: Vec<Bar> = (1..=100)
///     .map(|t| {
///         let close = 100.0 + (t as f64 * 0.3).sin();
///         Bar::new(close, close + 1.0, close - 1.0, close)
///             .with_volume(1_000.0)
///             .at(t)
///     })
///     .collect();
///
/// engine.run(&bars)?;
///
/// let table = engine.table();
/// assert_eq!(table.len(), 100);
/// assert!(table.series("SMA").unwrap().latest("value").is_some());
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    slots: Vec<Slot>,
    table: Table,
    last_open_time: Option<Timestamp>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and registers every spec, in order, under its column name.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an invalid spec or a duplicate name.
    pub fn from_specs(specs: &[IndicatorSpec]) -> Result<Self> {
        let mut engine = Self::new();
        for spec in specs {
            let indicator = spec.build()?;
            debug!(name = spec.name(), indicator = %indicator, "built from spec");
            engine.add(spec.name(), indicator)?;
        }
        Ok(engine)
    }

    /// Registers `indicator` under `name`. Rows already in the table are
    /// back-filled with `None`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when `name` is already taken.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        indicator: Box<dyn DynIndicator>,
    ) -> Result<&mut Self> {
        let name = name.into();
        if self.table.series(&name).is_some() {
            return Err(Error::configuration(
                &indicator,
                format!("duplicate column name `{name}`"),
            ));
        }

        debug!(name = %name, indicator = %indicator, "indicator registered");

        let fields = indicator.fields();
        self.table
            .series
            .push(Series::new(name, fields, self.table.len()));
        self.slots.push(Slot {
            indicator,
            halted: false,
            row: Vec::with_capacity(fields.len()),
        });

        Ok(self)
    }

    /// Feeds one bar to every indicator and appends a row.
    ///
    /// # Errors
    ///
    /// [`Error::OrderingViolation`] (indicator `"engine"`) when `open_time`
    /// is not after the last accepted bar; nothing is recorded. An
    /// indicator's own error halts that indicator, the row is still
    /// appended, and the first such error is returned.
    pub fn push(&mut self, kline: &impl Ohlcv) -> Result<()> {
        let open_time = kline.open_time();
        self.check_order(self.last_open_time, open_time)?;

        let bar = Bar::from_ohlcv(kline);
        self.table.index.push(open_time);
        self.last_open_time = Some(open_time);

        let mut first_error = None;
        for (slot, series) in self.slots.iter_mut().zip(&mut self.table.series) {
            if let Err(err) = slot.step(&bar, series) {
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Replays a batch of bars.
    ///
    /// The whole batch is validated before any indicator sees it; indicators
    /// then run in parallel, each over the full batch. Produces the same
    /// table as pushing the bars one by one.
    ///
    /// # Errors
    ///
    /// [`Error::OrderingViolation`] (indicator `"engine"`) when the batch is
    /// not strictly increasing or does not follow the last accepted bar;
    /// nothing is recorded. Otherwise the first indicator error, as in
    /// [`push`](Self::push).
    pub fn run<K>(&mut self, klines: &[K]) -> Result<()>
    where
        K: Ohlcv + Sync,
    {
        let mut last = self.last_open_time;
        for kline in klines {
            let open_time = kline.open_time();
            self.check_order(last, open_time)?;
            last = Some(open_time);
        }

        let bars: Vec<Bar> = klines.par_iter().map(Bar::from_ohlcv).collect();
        self.table.index.extend(bars.iter().map(|bar| bar.open_time));
        self.last_open_time = last;

        let errors: Vec<Error> = self
            .slots
            .par_iter_mut()
            .zip(self.table.series.par_iter_mut())
            .filter_map(|(slot, series)| {
                series.reserve(bars.len());
                let mut first_error = None;
                for bar in &bars {
                    if let Err(err) = slot.step(bar, series) {
                        first_error.get_or_insert(err);
                    }
                }
                first_error
            })
            .collect();

        trace!(
            bars = bars.len(),
            indicators = self.slots.len(),
            failed = errors.len(),
            "batch replayed"
        );

        errors.into_iter().next().map_or(Ok(()), Err)
    }

    /// Latest row of the named series, one cell per output field.
    #[must_use]
    pub fn latest(&self, name: &str) -> Option<Vec<Option<Price>>> {
        let series = self.table.series(name)?;
        Some(
            series
                .fields()
                .iter()
                .map(|field| series.latest(field))
                .collect(),
        )
    }

    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    #[must_use]
    pub fn into_table(self) -> Table {
        self.table
    }

    fn check_order(&self, last: Option<Timestamp>, got: Timestamp) -> Result<()> {
        match last {
            Some(last) if got <= last => {
                warn!(last, got, rows = self.table.len(), "bar rejected");
                Err(Error::ordering(ENGINE, last, got))
            }
            _ => Ok(()),
        }
    }
}
