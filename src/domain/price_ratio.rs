//! Relative price strength between two instruments.

use crate::domain::cache::CacheConfig;
use crate::domain::error::LiquidityError;
use crate::domain::fields;
use crate::domain::series::TimeSeriesTable;
use crate::domain::ticker::Ticker;
use crate::ports::data_port::MarketDataPort;

pub struct PriceRatio<'a> {
    target: Ticker<'a>,
    benchmark: Ticker<'a>,
}

impl<'a> PriceRatio<'a> {
    pub fn new(
        target: &str,
        benchmark: &str,
        provider: &'a dyn MarketDataPort,
        cache_config: &CacheConfig,
    ) -> Result<Self, LiquidityError> {
        Ok(Self {
            target: Ticker::new(target, provider, cache_config)?,
            benchmark: Ticker::new(benchmark, provider, cache_config)?,
        })
    }

    pub fn target(&self) -> &str {
        self.target.symbol()
    }

    pub fn benchmark(&self) -> &str {
        self.benchmark.symbol()
    }

    /// Closing prices joined on date, forward-filled, narrowed to the
    /// overlap, plus the target-over-benchmark `Ratio` column.
    pub fn ratio(&mut self) -> Result<TimeSeriesTable, LiquidityError> {
        let target_prices = self.target.prices()?.drop_missing_in(fields::PRICE)?;
        let benchmark_prices = self.benchmark.prices()?.drop_missing_in(fields::PRICE)?;

        let mut joined = target_prices.left_join(
            &benchmark_prices,
            self.target.symbol(),
            self.benchmark.symbol(),
        );
        joined.forward_fill_all();
        let mut joined = joined.drop_incomplete();

        let target_column = format!("{}{}", fields::PRICE, self.target.symbol());
        let benchmark_column = format!("{}{}", fields::PRICE, self.benchmark.symbol());
        let target_values = joined.require_column(&target_column)?.values.clone();
        let benchmark_values = joined.require_column(&benchmark_column)?.values.clone();
        let ratio = target_values
            .iter()
            .zip(&benchmark_values)
            .map(|(t, b)| match (t, b) {
                (Some(t), Some(b)) => Some(t / b),
                _ => None,
            })
            .collect();
        joined.push_column(fields::RATIO, ratio)?;
        Ok(joined)
    }
}
