//! Distribution yield derived from prices and trailing payouts.

use crate::domain::error::LiquidityError;
use crate::domain::fields;
use crate::domain::series::TimeSeriesTable;

/// Yield series: trailing distribution income as a percentage of price.
///
/// The `TTM_Dividend` column is aligned onto the price dates and
/// forward-filled; a trailing sum stays valid until the next
/// distribution supersedes it. Dates with no distribution history at
/// all yield 0%. Prices are mandatory: a missing price cell fails the
/// computation instead of producing a silent gap.
pub fn compute_dividend_yield(
    prices: &TimeSeriesTable,
    distributions: &TimeSeriesTable,
) -> Result<TimeSeriesTable, LiquidityError> {
    let price_column = prices.require_column(fields::PRICE)?;
    if let Some(i) = price_column.values.iter().position(|v| v.is_none()) {
        return Err(LiquidityError::MalformedInput {
            column: fields::PRICE.to_string(),
            reason: format!("price is mandatory but absent on {}", prices.dates()[i]),
        });
    }

    let trailing = distributions.select(&[fields::TTM_DIVIDEND])?;
    let mut joined = prices.left_join(&trailing, "", "");
    joined.forward_fill(fields::TTM_DIVIDEND)?;
    joined.fill_missing(fields::TTM_DIVIDEND, 0.0)?;

    let trailing_values = joined.require_column(fields::TTM_DIVIDEND)?.values.clone();
    let yields = price_column
        .values
        .iter()
        .zip(&trailing_values)
        .map(|(price, trailing)| {
            price.map(|p| trailing.unwrap_or(0.0) / p * 100.0)
        })
        .collect();

    TimeSeriesTable::from_column(
        prices.index_name(),
        prices.dates().to_vec(),
        fields::YIELD,
        yields,
    )
}
