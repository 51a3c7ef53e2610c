//! Raw-table normalization into the canonical date-indexed shape.
//!
//! The formatter is the repair boundary for date ordering: it may sort.
//! Windowed computations downstream reject unsorted input instead.

use crate::domain::error::LiquidityError;
use crate::domain::fields;
use crate::domain::series::{DATE_FORMAT, Column, DateOrder, RawTable, TimeSeriesTable, classify_order};
use chrono::NaiveDate;

/// Cells treated as absent rather than malformed during numeric
/// coercion. FRED publishes "." for missing observations.
const MISSING_MARKERS: [&str; 4] = ["", ".", "NaN", "nan"];

/// Declarative post-processing recipe for provider output. Steps run
/// in a fixed order: rename, date-index promotion, numeric coercion,
/// order repair, projection, index relabel.
#[derive(Debug, Clone, Default)]
pub struct SeriesFormat {
    renames: Vec<(String, String)>,
    index_column: Option<String>,
    strict_numeric: Vec<String>,
    output_columns: Option<Vec<String>>,
    index_label: Option<String>,
}

impl SeriesFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, from: &str, to: &str) -> Self {
        self.renames.push((from.to_string(), to.to_string()));
        self
    }

    /// Column promoted to the date index. Defaults to `Date`.
    pub fn index_column(mut self, name: &str) -> Self {
        self.index_column = Some(name.to_string());
        self
    }

    /// Columns where a non-numeric, non-missing cell is an error rather
    /// than an absent value.
    pub fn strict_numeric(mut self, names: &[&str]) -> Self {
        self.strict_numeric = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Project the output to this subset of columns, in order.
    pub fn output(mut self, names: &[&str]) -> Self {
        self.output_columns = Some(names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Relabel the index in the output.
    pub fn index_label(mut self, name: &str) -> Self {
        self.index_label = Some(name.to_string());
        self
    }

    pub fn apply(&self, raw: &RawTable) -> Result<TimeSeriesTable, LiquidityError> {
        let headers: Vec<String> = raw
            .headers
            .iter()
            .map(|h| {
                self.renames
                    .iter()
                    .find(|(from, _)| from == h)
                    .map(|(_, to)| to.clone())
                    .unwrap_or_else(|| h.clone())
            })
            .collect();

        let index_name = self
            .index_column
            .clone()
            .unwrap_or_else(|| fields::DATE.to_string());
        let index_pos = headers
            .iter()
            .position(|h| *h == index_name)
            .ok_or_else(|| LiquidityError::MissingColumn {
                column: index_name.clone(),
            })?;

        let mut dates = Vec::with_capacity(raw.rows.len());
        let mut columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index_pos)
            .map(|(_, name)| Column::new(name, Vec::with_capacity(raw.rows.len())))
            .collect();

        for row in &raw.rows {
            if row.len() != headers.len() {
                return Err(LiquidityError::MalformedInput {
                    column: index_name.clone(),
                    reason: format!(
                        "row has {} cells for {} columns",
                        row.len(),
                        headers.len()
                    ),
                });
            }
            let date_cell = row[index_pos].trim();
            let date = NaiveDate::parse_from_str(date_cell, DATE_FORMAT).map_err(|e| {
                LiquidityError::MalformedInput {
                    column: index_name.clone(),
                    reason: format!("invalid date {date_cell:?}: {e}"),
                }
            })?;
            dates.push(date);

            let mut column_iter = columns.iter_mut();
            for (i, cell) in row.iter().enumerate() {
                if i == index_pos {
                    continue;
                }
                let column = match column_iter.next() {
                    Some(c) => c,
                    None => break,
                };
                let name = column.name.clone();
                column.values.push(self.coerce(&name, cell)?);
            }
        }

        // Order repair: the one place a full sort is allowed.
        match classify_order(&dates) {
            DateOrder::Ascending => {}
            DateOrder::Descending => {
                dates.reverse();
                for column in &mut columns {
                    column.values.reverse();
                }
            }
            DateOrder::Unordered => {
                let mut order: Vec<usize> = (0..dates.len()).collect();
                order.sort_by_key(|&i| dates[i]);
                dates = order.iter().map(|&i| dates[i]).collect();
                for column in &mut columns {
                    column.values = order.iter().map(|&i| column.values[i]).collect();
                }
            }
        }
        if let Some(w) = dates.windows(2).find(|w| w[0] == w[1]) {
            return Err(LiquidityError::MalformedInput {
                column: index_name.clone(),
                reason: format!("duplicate date {}", w[0].format(DATE_FORMAT)),
            });
        }

        if let Some(output) = &self.output_columns {
            let mut selected = Vec::with_capacity(output.len());
            for name in output {
                let column = columns
                    .iter()
                    .find(|c| c.name == *name)
                    .ok_or_else(|| LiquidityError::MissingColumn {
                        column: name.clone(),
                    })?;
                selected.push(column.clone());
            }
            columns = selected;
        }

        let label = self.index_label.clone().unwrap_or(index_name);
        Ok(TimeSeriesTable::from_sorted_unchecked(&label, dates, columns))
    }

    fn coerce(&self, column: &str, cell: &str) -> Result<Option<f64>, LiquidityError> {
        let cell = cell.trim();
        if MISSING_MARKERS.contains(&cell) {
            return Ok(None);
        }
        match cell.parse::<f64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) if self.strict_numeric.iter().any(|c| c == column) => {
                Err(LiquidityError::MalformedInput {
                    column: column.to_string(),
                    reason: format!("non-numeric value {cell:?}"),
                })
            }
            Err(_) => Ok(None),
        }
    }
}
