use std::io;

use crate::{Price, Result, Timestamp};

/// Output columns of one indicator: one column per output field, each as
/// long as the table index.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    name: String,
    fields: &'static [&'static str],
    columns: Vec<Vec<Option<Price>>>,
}

impl Series {
    /// Empty series back-filled with `rows` rows of `None`.
    pub(crate) fn new(name: String, fields: &'static [&'static str], rows: usize) -> Self {
        Self {
            name,
            fields,
            columns: fields.iter().map(|_| vec![None; rows]).collect(),
        }
    }

    /// Appends one row. `cells` holds one value per field, in field order.
    pub(crate) fn push_row(&mut self, cells: &[Option<Price>]) {
        debug_assert_eq!(cells.len(), self.columns.len());
        for (column, cell) in self.columns.iter_mut().zip(cells) {
            column.push(*cell);
        }
    }

    /// Appends a row with every field `None`.
    pub(crate) fn push_empty(&mut self) {
        for column in &mut self.columns {
            column.push(None);
        }
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        for column in &mut self.columns {
            column.reserve(additional);
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output field names, in column order.
    #[must_use]
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Column of the named output field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&[Option<Price>]> {
        self.fields
            .iter()
            .position(|field| *field == name)
            .map(|index| self.columns[index].as_slice())
    }

    /// Column of the first output field; the whole series for scalar
    /// indicators.
    #[must_use]
    pub fn values(&self) -> &[Option<Price>] {
        self.columns.first().map_or(&[], Vec::as_slice)
    }

    /// Value of the named field in the last row.
    #[must_use]
    pub fn latest(&self, field: &str) -> Option<Price> {
        self.field(field)?.last().copied().flatten()
    }

    /// Number of leading rows in which no field is defined.
    #[must_use]
    pub fn warm_up(&self) -> usize {
        let rows = self.columns.first().map_or(0, Vec::len);
        (0..rows)
            .take_while(|&row| self.columns.iter().all(|column| column[row].is_none()))
            .count()
    }

    fn write_row(&self, row: usize, record: &mut Vec<String>) {
        for column in &self.columns {
            record.push(column[row].map(|v| v.to_string()).unwrap_or_default());
        }
    }
}

/// Indicator outputs aligned on bar `open_time`.
///
/// Append-only: every series has exactly one entry per index row, `None`
/// while its indicator warms up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub(crate) index: Vec<Timestamp>,
    pub(crate) series: Vec<Series>,
}

impl Table {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// `open_time` of every row.
    #[must_use]
    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    #[must_use]
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|series| series.name == name)
    }

    /// Series in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    /// Flattened column names: the series name for single-field series,
    /// `name_field` otherwise.
    ///
    /// ```
    /// use quantedge_ta::{Engine, IndicatorKind, IndicatorSpec, PriceSource};
    ///
    /// let engine = Engine::from_specs(&[
    ///     IndicatorSpec::new(IndicatorKind::Sma { period: 9, source: PriceSource::Close }),
    ///     IndicatorSpec::new(IndicatorKind::Vtx { period: 14 }),
    /// ])?;
    /// assert_eq!(
    ///     engine.table().column_names(),
    ///     ["SMA", "VTX_plus_vtx", "VTX_minus_vtx"],
    /// );
    /// # Ok::<(), quantedge_ta::Error>(())
    /// ```
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.series
            .iter()
            .flat_map(|series| {
                let scalar = series.fields.len() == 1;
                series.fields.iter().map(move |field| {
                    if scalar {
                        series.name.clone()
                    } else {
                        format!("{}_{field}", series.name)
                    }
                })
            })
            .collect()
    }

    /// Warm-up length of every series, in registration order.
    #[must_use]
    pub fn warm_up_report(&self) -> Vec<(&str, usize)> {
        self.series
            .iter()
            .map(|series| (series.name(), series.warm_up()))
            .collect()
    }

    /// Writes the table as CSV: an `open_time` column followed by
    /// [`column_names`](Self::column_names). `None` cells are empty.
    ///
    /// # Errors
    ///
    /// [`Error::Export`](crate::Error::Export) when writing fails.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(1 + self.series.len());
        header.push("open_time".to_owned());
        header.extend(self.column_names());
        writer.write_record(&header)?;

        let mut record = Vec::with_capacity(header.len());
        for (row, open_time) in self.index.iter().enumerate() {
            record.clear();
            record.push(open_time.to_string());
            for series in &self.series {
                series.write_row(row, &mut record);
            }
            writer.write_record(&record)?;
        }

        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}
