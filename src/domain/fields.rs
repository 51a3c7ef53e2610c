//! Canonical column names shared by providers, computations and the
//! on-disk cache format.

pub const DATE: &str = "Date";
pub const CLOSE: &str = "Close";
/// Price means the closing price throughout.
pub const PRICE: &str = CLOSE;
pub const DIVIDENDS: &str = "Dividends";
pub const TTM_DIVIDEND: &str = "TTM_Dividend";
pub const YIELD: &str = "Yield";
pub const SPREAD: &str = "Spread";
pub const RATIO: &str = "Ratio";
pub const LIQUIDITY_INDEX: &str = "Liquidity Index";
