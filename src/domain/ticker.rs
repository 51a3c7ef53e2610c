//! Per-instrument orchestration of cached market data retrieval.

use crate::domain::cache::{CacheConfig, PersistentMemoCache};
use crate::domain::dividends;
use crate::domain::error::LiquidityError;
use crate::domain::metadata::{self, AssetDescriptor};
use crate::domain::series::TimeSeriesTable;
use crate::domain::yields;
use crate::ports::data_port::MarketDataPort;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Prices,
    Dividends,
    Yields,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            DataKind::Prices => "prices",
            DataKind::Dividends => "dividends",
            DataKind::Yields => "yields",
        };
        write!(f, "{kind}")
    }
}

/// One instrument's view over the provider, with each data kind cached
/// independently under `"{symbol}-{kind}"`.
pub struct Ticker<'a> {
    symbol: String,
    metadata: AssetDescriptor,
    provider: &'a dyn MarketDataPort,
    cache: PersistentMemoCache,
}

impl<'a> Ticker<'a> {
    pub fn new(
        symbol: &str,
        provider: &'a dyn MarketDataPort,
        cache_config: &CacheConfig,
    ) -> Result<Self, LiquidityError> {
        let metadata = metadata::get_instrument_metadata(symbol)?;
        Ok(Self {
            symbol: symbol.to_string(),
            metadata,
            provider,
            cache: PersistentMemoCache::new(cache_config)?,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn metadata(&self) -> &AssetDescriptor {
        &self.metadata
    }

    pub fn cache_key(&self, kind: DataKind) -> String {
        format!("{}-{}", self.symbol, kind)
    }

    pub fn prices(&mut self) -> Result<TimeSeriesTable, LiquidityError> {
        let key = self.cache_key(DataKind::Prices);
        let provider = self.provider;
        let symbol = self.symbol.clone();
        self.cache
            .get_or_compute(&key, || provider.get_prices(&symbol))
    }

    /// The cached value is the TTM-augmented distribution table, so the
    /// expensive window scan runs once per store lifetime.
    pub fn dividends(&mut self) -> Result<TimeSeriesTable, LiquidityError> {
        let key = self.cache_key(DataKind::Dividends);
        let provider = self.provider;
        let symbol = self.symbol.clone();
        let frequency = self.metadata.distribution_frequency;
        self.cache.get_or_compute(&key, || {
            let events = provider.get_dividends(&symbol)?;
            dividends::compute_ttm(&events, frequency, false)
        })
    }

    /// Yield-native instruments pass the provider's published series
    /// through; everything else derives the yield from prices and
    /// distributions, which must resolve first.
    pub fn yields(&mut self) -> Result<TimeSeriesTable, LiquidityError> {
        let key = self.cache_key(DataKind::Yields);
        if self.metadata.is_yield_native() {
            let maturity = self.metadata.maturity.clone().ok_or_else(|| {
                LiquidityError::InvalidMetadata {
                    symbol: self.symbol.clone(),
                    reason: "yield-native instrument without a maturity".to_string(),
                }
            })?;
            let provider = self.provider;
            self.cache
                .get_or_compute(&key, || provider.get_treasury_yield(&maturity))
        } else {
            let prices = self.prices()?;
            let distributions = self.dividends()?;
            self.cache.get_or_compute(&key, || {
                yields::compute_dividend_yield(&prices, &distributions)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields;
    use chrono::NaiveDate;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct StubProvider {
        prices: Option<TimeSeriesTable>,
        dividends: Option<TimeSeriesTable>,
        treasury: Option<TimeSeriesTable>,
        price_calls: Cell<usize>,
        dividend_calls: Cell<usize>,
        treasury_calls: Cell<usize>,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                prices: None,
                dividends: None,
                treasury: None,
                price_calls: Cell::new(0),
                dividend_calls: Cell::new(0),
                treasury_calls: Cell::new(0),
            }
        }

        fn with_prices(mut self, table: TimeSeriesTable) -> Self {
            self.prices = Some(table);
            self
        }

        fn with_dividends(mut self, table: TimeSeriesTable) -> Self {
            self.dividends = Some(table);
            self
        }

        fn with_treasury(mut self, table: TimeSeriesTable) -> Self {
            self.treasury = Some(table);
            self
        }
    }

    impl MarketDataPort for StubProvider {
        fn get_prices(&self, symbol: &str) -> Result<TimeSeriesTable, LiquidityError> {
            self.price_calls.set(self.price_calls.get() + 1);
            self.prices
                .clone()
                .ok_or_else(|| LiquidityError::DataNotAvailable {
                    symbol: symbol.to_string(),
                    kind: "prices".to_string(),
                })
        }

        fn get_dividends(&self, symbol: &str) -> Result<TimeSeriesTable, LiquidityError> {
            self.dividend_calls.set(self.dividend_calls.get() + 1);
            self.dividends
                .clone()
                .ok_or_else(|| LiquidityError::DataNotAvailable {
                    symbol: symbol.to_string(),
                    kind: "dividends".to_string(),
                })
        }

        fn get_treasury_yield(&self, maturity: &str) -> Result<TimeSeriesTable, LiquidityError> {
            self.treasury_calls.set(self.treasury_calls.get() + 1);
            self.treasury
                .clone()
                .ok_or_else(|| LiquidityError::DataNotAvailable {
                    symbol: maturity.to_string(),
                    kind: "treasury yield".to_string(),
                })
        }

        fn get_macro_series(&self, series_id: &str) -> Result<TimeSeriesTable, LiquidityError> {
            Err(LiquidityError::DataNotAvailable {
                symbol: series_id.to_string(),
                kind: "macro".to_string(),
            })
        }
    }

    fn monthly_dividends() -> TimeSeriesTable {
        let rows: Vec<(NaiveDate, f64)> = (0..18)
            .map(|i| {
                let year = 2020 + (i / 12);
                let month = 1 + (i % 12);
                (d(&format!("{year}-{month:02}-15")), 0.1)
            })
            .collect();
        TimeSeriesTable::from_column(
            fields::DATE,
            rows.iter().map(|(date, _)| *date).collect(),
            fields::DIVIDENDS,
            rows.iter().map(|(_, v)| Some(*v)).collect(),
        )
        .unwrap()
    }

    fn prices_on_dividend_dates() -> TimeSeriesTable {
        TimeSeriesTable::from_column(
            fields::DATE,
            vec![d("2021-01-15"), d("2021-02-15"), d("2021-03-15")],
            fields::PRICE,
            vec![Some(60.0), Some(80.0), Some(120.0)],
        )
        .unwrap()
    }

    #[test]
    fn unknown_symbol_fails_construction() {
        let provider = StubProvider::new();
        let result = Ticker::new("ZZZ", &provider, &CacheConfig::disabled());
        assert!(matches!(result, Err(LiquidityError::UnknownInstrument { .. })));
    }

    #[test]
    fn prices_are_fetched_once_per_instance() {
        let provider = StubProvider::new().with_prices(prices_on_dividend_dates());
        let mut ticker = Ticker::new("HYG", &provider, &CacheConfig::disabled()).unwrap();
        ticker.prices().unwrap();
        ticker.prices().unwrap();
        assert_eq!(provider.price_calls.get(), 1);
    }

    #[test]
    fn dividends_cache_the_ttm_augmented_table() {
        let provider = StubProvider::new().with_dividends(monthly_dividends());
        let mut ticker = Ticker::new("HYG", &provider, &CacheConfig::disabled()).unwrap();
        let table = ticker.dividends().unwrap();
        assert!(table.column(fields::TTM_DIVIDEND).is_some());
        assert_eq!(table.first_date(), Some(d("2021-01-15")));
        let first = table.column(fields::TTM_DIVIDEND).unwrap().values[0].unwrap();
        assert!((first - 1.2).abs() < 1e-12);
    }

    #[test]
    fn computed_yield_uses_prices_and_distributions() {
        let provider = StubProvider::new()
            .with_prices(prices_on_dividend_dates())
            .with_dividends(monthly_dividends());
        let mut ticker = Ticker::new("HYG", &provider, &CacheConfig::disabled()).unwrap();
        let table = ticker.yields().unwrap();
        assert_eq!(table.column_names(), vec![fields::YIELD]);
        // TTM of 1.2 against a price of 60 is a 2% yield.
        let first = table.column(fields::YIELD).unwrap().values[0].unwrap();
        assert!((first - 2.0).abs() < 1e-9);
        assert_eq!(provider.price_calls.get(), 1);
        assert_eq!(provider.dividend_calls.get(), 1);
    }

    #[test]
    fn treasury_yields_pass_through_the_published_series() {
        let published = TimeSeriesTable::from_column(
            fields::DATE,
            vec![d("2021-01-04"), d("2021-01-05")],
            fields::YIELD,
            vec![Some(0.93), Some(0.96)],
        )
        .unwrap();
        let provider = StubProvider::new().with_treasury(published.clone());
        let mut ticker = Ticker::new("UST_10Y", &provider, &CacheConfig::disabled()).unwrap();
        let table = ticker.yields().unwrap();
        assert_eq!(table, published);
        assert_eq!(provider.treasury_calls.get(), 1);
        assert_eq!(provider.price_calls.get(), 0);
        assert_eq!(provider.dividend_calls.get(), 0);
    }

    #[test]
    fn persistent_cache_survives_instances() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig::persistent(dir.path());

        let provider = StubProvider::new().with_prices(prices_on_dividend_dates());
        let mut first = Ticker::new("HYG", &provider, &config).unwrap();
        first.prices().unwrap();
        assert!(dir.path().join("HYG-prices.csv").exists());

        let cold_provider = StubProvider::new();
        let mut second = Ticker::new("HYG", &cold_provider, &config).unwrap();
        let table = second.prices().unwrap();
        assert_eq!(table, prices_on_dividend_dates());
        assert_eq!(cold_provider.price_calls.get(), 0);
    }

    #[test]
    fn provider_failure_propagates_untouched() {
        let provider = StubProvider::new();
        let mut ticker = Ticker::new("LQD", &provider, &CacheConfig::disabled()).unwrap();
        let result = ticker.prices();
        assert!(matches!(result, Err(LiquidityError::DataNotAvailable { .. })));
    }

    #[test]
    fn cache_keys_follow_the_symbol_kind_scheme() {
        let provider = StubProvider::new();
        let ticker = Ticker::new("HYG", &provider, &CacheConfig::disabled()).unwrap();
        assert_eq!(ticker.cache_key(DataKind::Prices), "HYG-prices");
        assert_eq!(ticker.cache_key(DataKind::Dividends), "HYG-dividends");
        assert_eq!(ticker.cache_key(DataKind::Yields), "HYG-yields");
    }
}
