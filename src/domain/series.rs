//! Date-indexed table types shared by every component.
//!
//! `TimeSeriesTable` is the canonical exchange format: a strictly
//! ascending `NaiveDate` index plus one or more `Option<f64>` value
//! columns. `RawTable` is the untyped shape adapters hand to the
//! formatter before any parsing has happened.

use crate::domain::error::LiquidityError;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Untyped tabular input as read from a file or returned by a provider.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A single named value column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: &str, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.to_string(),
            values,
        }
    }
}

/// Ordering of a date index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Ascending,
    Descending,
    Unordered,
}

/// Classify a date sequence. Duplicates count as `Unordered`; empty and
/// single-row sequences count as `Ascending`.
pub fn classify_order(dates: &[NaiveDate]) -> DateOrder {
    if dates.windows(2).all(|w| w[0] < w[1]) {
        DateOrder::Ascending
    } else if dates.windows(2).all(|w| w[0] > w[1]) {
        DateOrder::Descending
    } else {
        DateOrder::Unordered
    }
}

/// An ordered sequence of rows keyed by a strictly ascending date index.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    index_name: String,
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl TimeSeriesTable {
    /// Build a table, enforcing the index invariant: ascending input
    /// passes through, strictly descending input is reversed, anything
    /// else is rejected. Repair-by-sort belongs to the formatter, not
    /// here.
    pub fn from_parts(
        index_name: &str,
        mut dates: Vec<NaiveDate>,
        mut columns: Vec<Column>,
    ) -> Result<Self, LiquidityError> {
        for column in &columns {
            if column.values.len() != dates.len() {
                return Err(LiquidityError::MalformedInput {
                    column: column.name.clone(),
                    reason: format!(
                        "column has {} values for {} dates",
                        column.values.len(),
                        dates.len()
                    ),
                });
            }
        }
        match classify_order(&dates) {
            DateOrder::Ascending => {}
            DateOrder::Descending => {
                dates.reverse();
                for column in &mut columns {
                    column.values.reverse();
                }
            }
            DateOrder::Unordered => {
                return Err(LiquidityError::OrderingViolation {
                    context: "table construction".to_string(),
                });
            }
        }
        Ok(Self::from_sorted_unchecked(index_name, dates, columns))
    }

    /// Construct without validating order. For call sites that have
    /// already established the invariant.
    pub(crate) fn from_sorted_unchecked(
        index_name: &str,
        dates: Vec<NaiveDate>,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            index_name: index_name.to_string(),
            dates,
            columns,
        }
    }

    /// Single-column convenience constructor.
    pub fn from_column(
        index_name: &str,
        dates: Vec<NaiveDate>,
        name: &str,
        values: Vec<Option<f64>>,
    ) -> Result<Self, LiquidityError> {
        Self::from_parts(index_name, dates, vec![Column::new(name, values)])
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn set_index_name(&mut self, name: &str) {
        self.index_name = name.to_string();
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<&Column, LiquidityError> {
        self.column(name).ok_or_else(|| LiquidityError::MissingColumn {
            column: name.to_string(),
        })
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), LiquidityError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == from)
            .ok_or_else(|| LiquidityError::MissingColumn {
                column: from.to_string(),
            })?;
        column.name = to.to_string();
        Ok(())
    }

    /// Project to a subset of columns, in the requested order.
    pub fn select(&self, names: &[&str]) -> Result<Self, LiquidityError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(self.require_column(name)?.clone());
        }
        Ok(Self::from_sorted_unchecked(
            &self.index_name,
            self.dates.clone(),
            columns,
        ))
    }

    /// Append a derived column. Length must match the index.
    pub fn push_column(
        &mut self,
        name: &str,
        values: Vec<Option<f64>>,
    ) -> Result<(), LiquidityError> {
        if values.len() != self.dates.len() {
            return Err(LiquidityError::MalformedInput {
                column: name.to_string(),
                reason: format!(
                    "column has {} values for {} dates",
                    values.len(),
                    self.dates.len()
                ),
            });
        }
        self.columns.push(Column::new(name, values));
        Ok(())
    }

    pub fn map_column(
        &mut self,
        name: &str,
        f: impl Fn(f64) -> f64,
    ) -> Result<(), LiquidityError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| LiquidityError::MissingColumn {
                column: name.to_string(),
            })?;
        for value in column.values.iter_mut() {
            if let Some(v) = value {
                *v = f(*v);
            }
        }
        Ok(())
    }

    /// Propagate the last known value forward into subsequent gaps.
    pub fn forward_fill(&mut self, name: &str) -> Result<(), LiquidityError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| LiquidityError::MissingColumn {
                column: name.to_string(),
            })?;
        let mut last = None;
        for value in column.values.iter_mut() {
            match *value {
                Some(v) => last = Some(v),
                None => *value = last,
            }
        }
        Ok(())
    }

    pub fn forward_fill_all(&mut self) {
        for column in &mut self.columns {
            let mut last = None;
            for value in column.values.iter_mut() {
                match *value {
                    Some(v) => last = Some(v),
                    None => *value = last,
                }
            }
        }
    }

    /// Replace remaining gaps in one column with a constant.
    pub fn fill_missing(&mut self, name: &str, fill: f64) -> Result<(), LiquidityError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| LiquidityError::MissingColumn {
                column: name.to_string(),
            })?;
        for value in column.values.iter_mut() {
            if value.is_none() {
                *value = Some(fill);
            }
        }
        Ok(())
    }

    fn filter_rows(&self, keep: impl Fn(usize) -> bool) -> Self {
        let kept: Vec<usize> = (0..self.dates.len()).filter(|&i| keep(i)).collect();
        let dates = kept.iter().map(|&i| self.dates[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: kept.iter().map(|&i| c.values[i]).collect(),
            })
            .collect();
        Self::from_sorted_unchecked(&self.index_name, dates, columns)
    }

    /// Rows with a value in `name`.
    pub fn drop_missing_in(&self, name: &str) -> Result<Self, LiquidityError> {
        let column = self.require_column(name)?;
        let present: Vec<bool> = column.values.iter().map(|v| v.is_some()).collect();
        Ok(self.filter_rows(|i| present[i]))
    }

    /// Rows where every column has a value.
    pub fn drop_incomplete(&self) -> Self {
        self.filter_rows(|i| self.columns.iter().all(|c| c.values[i].is_some()))
    }

    /// Rows inside the (inclusive) date window.
    pub fn slice_dates(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.filter_rows(|i| {
            let d = self.dates[i];
            start.is_none_or(|s| d >= s) && end.is_none_or(|e| d <= e)
        })
    }

    /// Last `n` rows.
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.dates.len().saturating_sub(n);
        self.filter_rows(|i| i >= skip)
    }

    /// Left join on the date index: `other`'s columns are aligned onto
    /// this table's dates by exact match. Column names present on both
    /// sides get the respective suffix appended.
    pub fn left_join(&self, other: &Self, lsuffix: &str, rsuffix: &str) -> Self {
        let overlap: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| other.column(&c.name).is_some())
            .map(|c| c.name.as_str())
            .collect();
        let mut columns: Vec<Column> = self
            .columns
            .iter()
            .map(|c| Column {
                name: if overlap.contains(&c.name.as_str()) {
                    format!("{}{}", c.name, lsuffix)
                } else {
                    c.name.clone()
                },
                values: c.values.clone(),
            })
            .collect();
        for c in &other.columns {
            let name = if overlap.contains(&c.name.as_str()) {
                format!("{}{}", c.name, rsuffix)
            } else {
                c.name.clone()
            };
            let values = self
                .dates
                .iter()
                .map(|d| other.dates.binary_search(d).ok().and_then(|i| c.values[i]))
                .collect();
            columns.push(Column { name, values });
        }
        Self::from_sorted_unchecked(&self.index_name, self.dates.clone(), columns)
    }

    /// Concatenate tables on the date axis (outer union of dates; gaps
    /// become absent values). Column names must be unique across inputs.
    pub fn concat_columns(tables: &[TimeSeriesTable]) -> Result<Self, LiquidityError> {
        let index_name = tables
            .first()
            .map(|t| t.index_name.clone())
            .unwrap_or_else(|| crate::domain::fields::DATE.to_string());
        let dates: Vec<NaiveDate> = tables
            .iter()
            .flat_map(|t| t.dates.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut columns: Vec<Column> = Vec::new();
        for table in tables {
            for c in &table.columns {
                if columns.iter().any(|existing| existing.name == c.name) {
                    return Err(LiquidityError::MalformedInput {
                        column: c.name.clone(),
                        reason: "duplicate column name across concatenated tables".to_string(),
                    });
                }
                let values = dates
                    .iter()
                    .map(|d| table.dates.binary_search(d).ok().and_then(|i| c.values[i]))
                    .collect();
                columns.push(Column {
                    name: c.name.clone(),
                    values,
                });
            }
        }
        Ok(Self::from_sorted_unchecked(&index_name, dates, columns))
    }

    /// Row-wise sum across all columns, skipping absent values.
    pub fn sum_rows(&self) -> Vec<Option<f64>> {
        (0..self.dates.len())
            .map(|i| {
                Some(
                    self.columns
                        .iter()
                        .filter_map(|c| c.values[i])
                        .sum::<f64>(),
                )
            })
            .collect()
    }

    /// Serialize as CSV: index column first, `%Y-%m-%d` dates, absent
    /// cells empty. This is the on-disk cache format.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), LiquidityError> {
        let mut out = csv::Writer::from_writer(writer);
        let mut header = vec![self.index_name.clone()];
        header.extend(self.columns.iter().map(|c| c.name.clone()));
        out.write_record(&header).map_err(csv_write_error)?;
        for i in 0..self.dates.len() {
            let mut record = vec![self.dates[i].format(DATE_FORMAT).to_string()];
            for column in &self.columns {
                record.push(match column.values[i] {
                    Some(v) => format!("{v}"),
                    None => String::new(),
                });
            }
            out.write_record(&record).map_err(csv_write_error)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_csv_path(&self, path: &Path) -> Result<(), LiquidityError> {
        let file = File::create(path)?;
        self.write_csv(file)
    }

    /// Deserialize from the CSV cache format. The first column is
    /// restored as the date index; the ascending invariant is enforced
    /// on load.
    pub fn read_csv<R: Read>(reader: R, source: &str) -> Result<Self, LiquidityError> {
        let mut input = csv::Reader::from_reader(reader);
        let headers: Vec<String> = input
            .headers()
            .map_err(|e| read_error(source, &e))?
            .iter()
            .map(String::from)
            .collect();
        if headers.is_empty() {
            return Err(LiquidityError::TableRead {
                path: source.to_string(),
                reason: "empty header".to_string(),
            });
        }
        let index_name = headers[0].clone();
        let mut dates = Vec::new();
        let mut columns: Vec<Column> = headers[1..]
            .iter()
            .map(|name| Column::new(name, Vec::new()))
            .collect();
        for record in input.records() {
            let record = record.map_err(|e| read_error(source, &e))?;
            let date_cell = record.get(0).unwrap_or_default();
            let date =
                NaiveDate::parse_from_str(date_cell, DATE_FORMAT).map_err(|e| {
                    LiquidityError::TableRead {
                        path: source.to_string(),
                        reason: format!("invalid date {date_cell:?}: {e}"),
                    }
                })?;
            dates.push(date);
            for (j, column) in columns.iter_mut().enumerate() {
                let cell = record.get(j + 1).unwrap_or_default();
                if cell.is_empty() {
                    column.values.push(None);
                } else {
                    let value = cell.parse::<f64>().map_err(|e| LiquidityError::TableRead {
                        path: source.to_string(),
                        reason: format!("invalid number {cell:?}: {e}"),
                    })?;
                    column.values.push(Some(value));
                }
            }
        }
        Self::from_parts(&index_name, dates, columns)
    }

    pub fn read_csv_path(path: &Path) -> Result<Self, LiquidityError> {
        let file = File::open(path)?;
        Self::read_csv(file, &path.display().to_string())
    }
}

fn csv_write_error(e: csv::Error) -> LiquidityError {
    LiquidityError::Io(std::io::Error::other(e))
}

fn read_error(source: &str, e: &csv::Error) -> LiquidityError {
    LiquidityError::TableRead {
        path: source.to_string(),
        reason: e.to_string(),
    }
}

impl fmt::Display for TimeSeriesTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}", self.index_name)?;
        for column in &self.columns {
            write!(f, " {:>16}", column.name)?;
        }
        writeln!(f)?;
        for i in 0..self.dates.len() {
            write!(f, "{:<12}", self.dates[i].format(DATE_FORMAT))?;
            for column in &self.columns {
                match column.values[i] {
                    Some(v) => write!(f, " {v:>16.4}")?,
                    None => write!(f, " {:>16}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
