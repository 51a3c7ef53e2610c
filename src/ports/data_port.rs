//! Market data provider port trait.
//!
//! One closed capability interface for every upstream source; the
//! concrete provider is selected by configuration. Fetch timeout and
//! retry policy live behind this seam, not in the core.

use crate::domain::error::LiquidityError;
use crate::domain::series::TimeSeriesTable;

pub trait MarketDataPort {
    /// Daily closing prices, `Close` column.
    fn get_prices(&self, symbol: &str) -> Result<TimeSeriesTable, LiquidityError>;

    /// Cash distribution events, `Dividends` column; sparse.
    fn get_dividends(&self, symbol: &str) -> Result<TimeSeriesTable, LiquidityError>;

    /// Published treasury yield for a maturity label, `Yield` column.
    fn get_treasury_yield(&self, maturity: &str) -> Result<TimeSeriesTable, LiquidityError>;

    /// Macro series by id, `Close` column.
    fn get_macro_series(&self, series_id: &str) -> Result<TimeSeriesTable, LiquidityError>;
}
