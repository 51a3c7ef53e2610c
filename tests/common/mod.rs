#![allow(dead_code)]

use chrono::NaiveDate;
use liquidity::domain::error::LiquidityError;
use liquidity::domain::fields;
use liquidity::domain::series::TimeSeriesTable;
use liquidity::ports::data_port::MarketDataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn table(dates: &[NaiveDate], name: &str, values: &[f64]) -> TimeSeriesTable {
    TimeSeriesTable::from_column(
        fields::DATE,
        dates.to_vec(),
        name,
        values.iter().map(|v| Some(*v)).collect(),
    )
    .unwrap()
}

/// The 15th of `count` consecutive months starting January of
/// `start_year`.
pub fn monthly_dates(start_year: i32, count: usize) -> Vec<NaiveDate> {
    (0..count)
        .map(|i| {
            let year = start_year + (i as i32) / 12;
            let month = 1 + (i as u32) % 12;
            NaiveDate::from_ymd_opt(year, month, 15).unwrap()
        })
        .collect()
}

#[derive(Default)]
pub struct MockMarketDataPort {
    prices: HashMap<String, TimeSeriesTable>,
    dividends: HashMap<String, TimeSeriesTable>,
    treasury: HashMap<String, TimeSeriesTable>,
    macros: HashMap<String, TimeSeriesTable>,
    calls: RefCell<HashMap<String, usize>>,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices(mut self, symbol: &str, table: TimeSeriesTable) -> Self {
        self.prices.insert(symbol.to_string(), table);
        self
    }

    pub fn with_dividends(mut self, symbol: &str, table: TimeSeriesTable) -> Self {
        self.dividends.insert(symbol.to_string(), table);
        self
    }

    pub fn with_treasury(mut self, maturity: &str, table: TimeSeriesTable) -> Self {
        self.treasury.insert(maturity.to_string(), table);
        self
    }

    pub fn with_macro(mut self, series_id: &str, table: TimeSeriesTable) -> Self {
        self.macros.insert(series_id.to_string(), table);
        self
    }

    pub fn calls_for(&self, kind: &str) -> usize {
        self.calls.borrow().get(kind).copied().unwrap_or(0)
    }

    fn record(&self, kind: &str) {
        *self.calls.borrow_mut().entry(kind.to_string()).or_insert(0) += 1;
    }

    fn lookup(
        map: &HashMap<String, TimeSeriesTable>,
        key: &str,
        kind: &str,
    ) -> Result<TimeSeriesTable, LiquidityError> {
        map.get(key)
            .cloned()
            .ok_or_else(|| LiquidityError::DataNotAvailable {
                symbol: key.to_string(),
                kind: kind.to_string(),
            })
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn get_prices(&self, symbol: &str) -> Result<TimeSeriesTable, LiquidityError> {
        self.record("prices");
        Self::lookup(&self.prices, symbol, "prices")
    }

    fn get_dividends(&self, symbol: &str) -> Result<TimeSeriesTable, LiquidityError> {
        self.record("dividends");
        Self::lookup(&self.dividends, symbol, "dividends")
    }

    fn get_treasury_yield(&self, maturity: &str) -> Result<TimeSeriesTable, LiquidityError> {
        self.record("treasury");
        Self::lookup(&self.treasury, maturity, "treasury yield")
    }

    fn get_macro_series(&self, series_id: &str) -> Result<TimeSeriesTable, LiquidityError> {
        self.record("macro");
        Self::lookup(&self.macros, series_id, "macro")
    }
}
