//! Pairwise yield spread between an instrument and a benchmark.

use crate::domain::cache::CacheConfig;
use crate::domain::error::LiquidityError;
use crate::domain::fields;
use crate::domain::series::TimeSeriesTable;
use crate::domain::ticker::Ticker;
use crate::ports::data_port::MarketDataPort;

pub struct YieldSpread<'a> {
    target: Ticker<'a>,
    benchmark: Ticker<'a>,
}

impl<'a> YieldSpread<'a> {
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

    /// Both yield series joined on date (symbol-suffixed columns),
    /// forward-filled, narrowed to the overlap, plus the signed
    /// target-minus-benchmark `Spread` column.
    pub fn spread(&mut self) -> Result<TimeSeriesTable, LiquidityError> {
        let target_yields = self.target.yields()?.drop_missing_in(fields::YIELD)?;
        let benchmark_yields = self.benchmark.yields()?.drop_missing_in(fields::YIELD)?;

        let mut joined = target_yields.left_join(
            &benchmark_yields,
            self.target.symbol(),
            self.benchmark.symbol(),
        );
        joined.forward_fill_all();
        let mut joined = joined.drop_incomplete();

        let target_column = format!("{}{}", fields::YIELD, self.target.symbol());
        let benchmark_column = format!("{}{}", fields::YIELD, self.benchmark.symbol());
        let target_values = joined.require_column(&target_column)?.values.clone();
        let benchmark_values = joined.require_column(&benchmark_column)?.values.clone();
        let spread = target_values
            .iter()
            .zip(&benchmark_values)
            .map(|(t, b)| match (t, b) {
                (Some(t), Some(b)) => Some(t - b),
                _ => None,
            })
            .collect();
        joined.push_column(fields::SPREAD, spread)?;
        Ok(joined)
    }
}
