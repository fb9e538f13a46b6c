use crate::config;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub enum SecurityType {
    Equity,
    Indices,
}

#[derive(Debug, Clone)]
pub struct Security {
    pub symbol: String,
    pub security_type: SecurityType,
}

impl Security {
    pub fn equity(symbol: String) -> Self {
        Self { symbol, security_type: SecurityType::Equity }
    }

    pub fn index(symbol: String) -> Self {
        Self { symbol, security_type: SecurityType::Indices }
    }

    /// Normalize a user-supplied symbol and classify it. Index membership
    /// is checked against the fixed set; anything else is an equity.
    pub fn resolve(raw: &str) -> Self {
        let symbol = raw.trim().to_uppercase();
        if config::NSE_INDICES.contains(&symbol.as_str()) {
            Self::index(symbol)
        } else {
            Self::equity(symbol)
        }
    }
}

/// Toplevel response from the option chain API. Everything is optional
/// here; `validate` decides what counts as usable data.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainResponse {
    pub records: Option<RawRecords>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRecords {
    #[serde(rename = "underlyingValue")]
    pub underlying_value: Option<f64>,

    #[serde(rename = "expiryDates")]
    pub expiry_dates: Option<Vec<String>>,

    pub data: Option<Vec<OptionData>>,
}

/// Option data for one strike price.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionData {
    #[serde(rename = "strikePrice")]
    pub strike_price: Option<f64>,

    #[serde(rename = "CE")]
    pub call: Option<OptionSide>,

    #[serde(rename = "PE")]
    pub put: Option<OptionSide>,
}

/// One side (CE or PE) of a strike.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionSide {
    #[serde(rename = "openInterest")]
    pub open_interest: Option<f64>,
}

/// A validated option chain payload.
#[derive(Debug, Clone)]
pub struct OptionChain {
    pub underlying_value: f64,
    pub expiry_dates: Vec<String>,
    pub data: Vec<OptionData>,
}

impl ChainResponse {
    /// A missing `records` envelope, expiry list, or strike list means the
    /// provider returned no usable data. That is a data condition, not a
    /// parse error, so it maps to `None` rather than an `Err`.
    pub fn validate(self) -> Option<OptionChain> {
        let records = self.records?;
        let expiry_dates = records.expiry_dates?;
        let data = records.data?;

        Some(OptionChain {
            underlying_value: records.underlying_value.unwrap_or(0.0),
            expiry_dates,
            data,
        })
    }
}
