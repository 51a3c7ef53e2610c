//! Static instrument and macro-series metadata.

use crate::domain::error::LiquidityError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Stock,
    Etf,
    Index,
    Treasury,
    Crypto,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetClass::Stock => "Stock",
            AssetClass::Etf => "ETF",
            AssetClass::Index => "Index",
            AssetClass::Treasury => "Treasury",
            AssetClass::Crypto => "Crypto",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    pub symbol: String,
    pub name: String,
    pub class: AssetClass,
    pub subtype: String,
    pub currency: Option<String>,
    pub distributing: bool,
    pub distribution_frequency: usize,
    /// Treasury maturity label understood by the provider, e.g. "10year".
    pub maturity: Option<String>,
}

impl AssetDescriptor {
    /// Whether the provider publishes this instrument's yield directly,
    /// instead of it being derived from prices and distributions.
    pub fn is_yield_native(&self) -> bool {
        self.class == AssetClass::Treasury
    }
}

fn asset(
    symbol: &str,
    name: &str,
    class: AssetClass,
    subtype: &str,
    currency: Option<&str>,
    distribution_frequency: usize,
    maturity: Option<&str>,
) -> AssetDescriptor {
    AssetDescriptor {
        symbol: symbol.to_string(),
        name: name.to_string(),
        class,
        subtype: subtype.to_string(),
        currency: currency.map(String::from),
        distributing: distribution_frequency > 0,
        distribution_frequency,
        maturity: maturity.map(String::from),
    }
}

/// All instruments the system knows about.
pub fn instrument_catalog() -> Vec<AssetDescriptor> {
    vec![
        asset(
            "HYG",
            "iShares iBoxx $ High Yield Corporate Bond ETF",
            AssetClass::Etf,
            "Bonds",
            Some("USD"),
            12,
            None,
        ),
        asset(
            "LQD",
            "iShares iBoxx $ Investment Grade Corporate Bond ETF",
            AssetClass::Etf,
            "Bonds",
            Some("USD"),
            12,
            None,
        ),
        asset(
            "UST_10Y",
            "Interest Rate On 10-Year US Treasury",
            AssetClass::Treasury,
            "Yield",
            None,
            0,
            Some("10year"),
        ),
        asset("SPX", "S&P 500", AssetClass::Index, "Stocks", None, 0, None),
        asset("NDX", "Nasdaq-100", AssetClass::Index, "Stocks", None, 0, None),
        asset("BTC", "Bitcoin", AssetClass::Crypto, "Spot", Some("USD"), 0, None),
        asset("ETH", "Ethereum", AssetClass::Crypto, "Spot", Some("USD"), 0, None),
    ]
}

pub fn get_instrument_metadata(symbol: &str) -> Result<AssetDescriptor, LiquidityError> {
    instrument_catalog()
        .into_iter()
        .find(|a| a.symbol == symbol)
        .ok_or_else(|| LiquidityError::UnknownInstrument {
            symbol: symbol.to_string(),
        })
}

/// Published unit of a macro series. Normalization target is billions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Millions,
    Billions,
    Trillions,
}

impl Unit {
    pub fn to_billions_factor(self) -> f64 {
        match self {
            Unit::Millions => 1e-3,
            Unit::Billions => 1.0,
            Unit::Trillions => 1e3,
        }
    }
}

/// One macro series feeding the liquidity index.
#[derive(Debug, Clone)]
pub struct MacroSeriesDescriptor {
    pub label: String,
    pub series_id: String,
    pub unit: Unit,
    pub currency: String,
    /// +1 contributes liquidity, -1 drains it.
    pub sign: i8,
}

impl MacroSeriesDescriptor {
    pub fn new(label: &str, series_id: &str, unit: Unit, currency: &str, sign: i8) -> Self {
        Self {
            label: label.to_string(),
            series_id: series_id.to_string(),
            unit,
            currency: currency.to_string(),
            sign,
        }
    }
}

/// A published FX rate series: one `denominator` unit costs the quoted
/// number of `numerator` units.
#[derive(Debug, Clone)]
pub struct FxQuote {
    pub numerator: String,
    pub denominator: String,
    pub series_id: String,
}

impl FxQuote {
    pub fn new(numerator: &str, denominator: &str, series_id: &str) -> Self {
        Self {
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
            series_id: series_id.to_string(),
        }
    }
}

/// Component set of the net-liquidity model: central bank balance
/// sheets and reserves add liquidity, the reverse-repo facility and the
/// Treasury General Account drain it.
pub fn default_liquidity_components() -> Vec<MacroSeriesDescriptor> {
    vec![
        MacroSeriesDescriptor::new("ECB Balance Sheet", "ECBASSETSW", Unit::Millions, "EUR", 1),
        MacroSeriesDescriptor::new("Fed Balance Sheet", "WALCL", Unit::Millions, "USD", 1),
        MacroSeriesDescriptor::new("Reserve Balances", "WRESBAL", Unit::Billions, "USD", 1),
        MacroSeriesDescriptor::new("Reverse Repo", "RRPONTSYD", Unit::Billions, "USD", -1),
        MacroSeriesDescriptor::new(
            "Treasury General Account",
            "WTREGEN",
            Unit::Billions,
            "USD",
            -1,
        ),
    ]
}

pub fn default_fx_quotes() -> Vec<FxQuote> {
    vec![
        FxQuote::new("USD", "EUR", "DEXUSEU"),
        FxQuote::new("JPY", "USD", "DEXJPUS"),
    ]
}
