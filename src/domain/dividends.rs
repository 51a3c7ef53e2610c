//! Trailing-twelve-month distribution aggregation.

use crate::domain::error::LiquidityError;
use crate::domain::fields;
use crate::domain::series::{DateOrder, TimeSeriesTable, classify_order};
use chrono::Duration;

/// Augment a distribution event table with a `TTM_Dividend` column: per
/// row, the sum of amounts in the left-open trailing window
/// `(date - 365 days, date]`, defined only when at least
/// `distribution_frequency` observations fall inside the window.
///
/// With `include_partial_window == false`, rows inside the ramp-up
/// period (before `first_date + 365 days`) are dropped: during the
/// first year the window cannot represent a full year of cadence, so a
/// yield derived from it would understate the annual payout.
///
/// This is the rejection boundary for ordering: unsorted input is an
/// error, never repaired, so upstream data-quality bugs surface here.
pub fn compute_ttm(
    table: &TimeSeriesTable,
    distribution_frequency: usize,
    include_partial_window: bool,
) -> Result<TimeSeriesTable, LiquidityError> {
    if classify_order(table.dates()) != DateOrder::Ascending {
        return Err(LiquidityError::OrderingViolation {
            context: "trailing distribution sum".to_string(),
        });
    }
    let events = table.require_column(fields::DIVIDENDS)?;
    let dates = table.dates();

    let mut ttm: Vec<Option<f64>> = Vec::with_capacity(dates.len());
    let mut start = 0usize;
    for i in 0..dates.len() {
        let cutoff = dates[i] - Duration::days(365);
        while dates[start] <= cutoff {
            start += 1;
        }
        // Re-sum the sparse window each row instead of maintaining a
        // running total; windows are at most a year of events and the
        // output must be reproducible bit-for-bit.
        let mut sum = 0.0;
        let mut observed = 0usize;
        for value in &events.values[start..=i] {
            if let Some(amount) = value {
                sum += amount;
                observed += 1;
            }
        }
        ttm.push(if observed >= distribution_frequency {
            Some(sum)
        } else {
            None
        });
    }

    let mut out = table.clone();
    out.push_column(fields::TTM_DIVIDEND, ttm)?;
    if !include_partial_window {
        if let Some(first) = out.first_date() {
            out = out.slice_dates(Some(first + Duration::days(365)), None);
        }
    }
    Ok(out)
}
