//! Local CSV-directory market data adapter.
//!
//! Layout under the data directory:
//!   {symbol}/prices.csv      Date,Close
//!   {symbol}/dividends.csv   Date,Dividends
//!   treasury/{maturity}.csv  Date,Yield
//!   macro/{series}.csv       Date,Close

use crate::domain::error::LiquidityError;
use crate::domain::fields;
use crate::domain::format::SeriesFormat;
use crate::domain::series::RawTable;
use crate::domain::series::TimeSeriesTable;
use crate::ports::data_port::MarketDataPort;
use std::path::{Path, PathBuf};

pub struct LocalDataAdapter {
    data_dir: PathBuf,
}

impl LocalDataAdapter {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn read_raw(&self, path: &Path, symbol: &str, kind: &str) -> Result<RawTable, LiquidityError> {
        if !path.exists() {
            return Err(LiquidityError::DataNotAvailable {
                symbol: symbol.to_string(),
                kind: kind.to_string(),
            });
        }
        let mut reader = csv::Reader::from_path(path).map_err(|e| LiquidityError::TableRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let headers = reader
            .headers()
            .map_err(|e| LiquidityError::TableRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
            .iter()
            .map(String::from)
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| LiquidityError::TableRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            rows.push(record.iter().map(String::from).collect());
        }
        Ok(RawTable { headers, rows })
    }
}

impl MarketDataPort for LocalDataAdapter {
    fn get_prices(&self, symbol: &str) -> Result<TimeSeriesTable, LiquidityError> {
        let path = self.data_dir.join(symbol).join("prices.csv");
        let raw = self.read_raw(&path, symbol, "prices")?;
        SeriesFormat::new()
            .strict_numeric(&[fields::CLOSE])
            .output(&[fields::CLOSE])
            .apply(&raw)
    }

    fn get_dividends(&self, symbol: &str) -> Result<TimeSeriesTable, LiquidityError> {
        let path = self.data_dir.join(symbol).join("dividends.csv");
        let raw = self.read_raw(&path, symbol, "dividends")?;
        SeriesFormat::new()
            .strict_numeric(&[fields::DIVIDENDS])
            .output(&[fields::DIVIDENDS])
            .apply(&raw)
    }

    fn get_treasury_yield(&self, maturity: &str) -> Result<TimeSeriesTable, LiquidityError> {
        let path = self.data_dir.join("treasury").join(format!("{maturity}.csv"));
        let raw = self.read_raw(&path, maturity, "treasury yield")?;
        SeriesFormat::new()
            .strict_numeric(&[fields::YIELD])
            .output(&[fields::YIELD])
            .apply(&raw)
    }

    fn get_macro_series(&self, series_id: &str) -> Result<TimeSeriesTable, LiquidityError> {
        let path = self.data_dir.join("macro").join(format!("{series_id}.csv"));
        let raw = self.read_raw(&path, series_id, "macro")?;
        SeriesFormat::new()
            .output(&[fields::CLOSE])
            .apply(&raw)
    }
}
