//! Composite liquidity index over configured macro series.
//!
//! Each component is normalized to signed billions of USD, then the
//! index is the row-wise sum of whatever components overlap after
//! forward-filling.

use crate::domain::cache::{CacheConfig, PersistentMemoCache};
use crate::domain::error::LiquidityError;
use crate::domain::fields;
use crate::domain::metadata::{self, FxQuote, MacroSeriesDescriptor};
use crate::domain::series::{Column, TimeSeriesTable};
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;

const TARGET_CURRENCY: &str = "USD";

pub struct LiquidityIndexEngine<'a> {
    provider: &'a dyn MarketDataPort,
    cache: PersistentMemoCache,
    components: Vec<MacroSeriesDescriptor>,
    fx_quotes: Vec<FxQuote>,
}

impl<'a> LiquidityIndexEngine<'a> {
    /// Engine over the default component set and FX table.
    pub fn new(
        provider: &'a dyn MarketDataPort,
        cache_config: &CacheConfig,
    ) -> Result<Self, LiquidityError> {
        Self::with_components(
            provider,
            cache_config,
            metadata::default_liquidity_components(),
            metadata::default_fx_quotes(),
        )
    }

    pub fn with_components(
        provider: &'a dyn MarketDataPort,
        cache_config: &CacheConfig,
        components: Vec<MacroSeriesDescriptor>,
        fx_quotes: Vec<FxQuote>,
    ) -> Result<Self, LiquidityError> {
        Ok(Self {
            provider,
            cache: PersistentMemoCache::new(cache_config)?,
            components,
            fx_quotes,
        })
    }

    /// The liquidity index table over the requested window: one
    /// normalized column per component plus the `Liquidity Index` sum.
    /// `start`/`end` bound the output, not the underlying fetches.
    pub fn compute(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<TimeSeriesTable, LiquidityError> {
        let components = self.components.clone();
        let mut processed = Vec::with_capacity(components.len());
        for component in &components {
            let mut table = self.fetch_series(&component.series_id)?;
            table.rename_column(fields::CLOSE, &component.label)?;
            table = self.convert_currency(table, &component.label, &component.currency)?;
            let factor = component.unit.to_billions_factor() * f64::from(component.sign);
            table.map_column(&component.label, |v| v * factor)?;
            processed.push(table.slice_dates(start, end));
        }

        let mut combined = TimeSeriesTable::concat_columns(&processed)?;
        combined.forward_fill_all();
        let mut combined = combined.drop_incomplete();
        let totals = combined.sum_rows();
        combined.push_column(fields::LIQUIDITY_INDEX, totals)?;
        Ok(combined)
    }

    fn fetch_series(&mut self, series_id: &str) -> Result<TimeSeriesTable, LiquidityError> {
        let key = format!("{series_id}-macro");
        let provider = self.provider;
        let id = series_id.to_string();
        self.cache
            .get_or_compute(&key, || provider.get_macro_series(&id))
    }

    /// Convert one column into USD. A direct quote (`cur` per USD)
    /// divides, an inverse quote (USD per `cur`) multiplies. The rate
    /// is aligned as-of each row's date; rows before the first
    /// published rate are dropped, so final coverage depends on the FX
    /// series' granularity.
    fn convert_currency(
        &mut self,
        table: TimeSeriesTable,
        column: &str,
        currency: &str,
    ) -> Result<TimeSeriesTable, LiquidityError> {
        if currency == TARGET_CURRENCY {
            return Ok(table);
        }
        let direct = self
            .fx_quotes
            .iter()
            .find(|q| q.numerator == currency && q.denominator == TARGET_CURRENCY)
            .cloned();
        let inverse = self
            .fx_quotes
            .iter()
            .find(|q| q.numerator == TARGET_CURRENCY && q.denominator == currency)
            .cloned();
        let (quote, divide) = match (direct, inverse) {
            (Some(quote), _) => (quote, true),
            (None, Some(quote)) => (quote, false),
            (None, None) => {
                return Err(LiquidityError::UnsupportedConversion {
                    from: currency.to_string(),
                    to: TARGET_CURRENCY.to_string(),
                });
            }
        };

        let fx = self.fetch_series(&quote.series_id)?;
        let rates = fx.require_column(fields::CLOSE)?;
        let values = table.require_column(column)?;

        let mut out_dates = Vec::with_capacity(table.len());
        let mut out_values = Vec::with_capacity(table.len());
        let mut fx_pos = 0usize;
        let mut last_rate: Option<f64> = None;
        for (i, date) in table.dates().iter().enumerate() {
            while fx_pos < fx.len() && fx.dates()[fx_pos] <= *date {
                if let Some(rate) = rates.values[fx_pos] {
                    last_rate = Some(rate);
                }
                fx_pos += 1;
            }
            let Some(rate) = last_rate else {
                continue;
            };
            out_dates.push(*date);
            out_values.push(values.values[i].map(|v| {
                if divide { v / rate } else { v * rate }
            }));
        }
        Ok(TimeSeriesTable::from_sorted_unchecked(
            table.index_name(),
            out_dates,
            vec![Column::new(column, out_values)],
        ))
    }
}
