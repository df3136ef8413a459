use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::wire;
use crate::errors::CoreError;

/// Income category of an asset, as the API spells it in the `asset` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetKind {
    /// Bonds, deposits and other instruments with a contracted yield.
    FixedIncome,
    /// Stocks, funds and other instruments with a market-driven yield.
    VariableIncome,
}

impl AssetKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::FixedIncome => "FIXED_INCOME",
            AssetKind::VariableIncome => "VARIABLE_INCOME",
        }
    }

    /// Parse the wire value or a short CLI spelling (`fixed`, `variable`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "FIXED_INCOME" | "FIXED" => Some(AssetKind::FixedIncome),
            "VARIABLE_INCOME" | "VARIABLE" => Some(AssetKind::VariableIncome),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::FixedIncome => write!(f, "Fixed income"),
            AssetKind::VariableIncome => write!(f, "Variable income"),
        }
    }
}

/// One holding inside a wallet, exactly as the server reports it.
///
/// The client derives nothing from these values except display formatting;
/// the raw `asset` string is kept so unknown categories survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAsset {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,

    /// Ticker, ISIN or bond code.
    #[serde(default)]
    pub identifier: String,

    /// Server-side classification (e.g. "STOCK", "CDB", "TREASURY").
    #[serde(default)]
    pub class: String,

    #[serde(default)]
    pub name: String,

    /// Broker or bank holding the asset.
    #[serde(default)]
    pub custody: String,

    /// Income category; see [`WalletAsset::kind`].
    #[serde(default)]
    pub asset: String,

    #[serde(default)]
    pub currency: String,

    #[serde(default, deserialize_with = "wire::amount")]
    pub total: f64,

    #[serde(rename = "yield", default, deserialize_with = "wire::amount")]
    pub yield_rate: f64,

    #[serde(default, deserialize_with = "wire::optional_date")]
    pub acquired: Option<NaiveDate>,
}

impl WalletAsset {
    #[must_use]
    pub fn kind(&self) -> Option<AssetKind> {
        AssetKind::parse(&self.asset)
    }

    #[must_use]
    pub fn display_total(&self) -> String {
        format_money(self.total, &self.currency)
    }

    #[must_use]
    pub fn display_yield(&self) -> String {
        format!("{:.2}%", self.yield_rate)
    }
}

/// Body of `POST /assets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub wallet_id: String,
    pub asset: AssetKind,
    pub identifier: String,
    pub class: String,
    pub name: String,
    pub custody: String,
    pub currency: String,
    pub total: f64,
    #[serde(rename = "yield")]
    pub yield_rate: f64,
    pub acquired: NaiveDate,
}

impl NewAsset {
    /// Reject obviously broken input before it goes over the wire.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("wallet", &self.wallet_id),
            ("identifier", &self.identifier),
            ("name", &self.name),
            ("currency", &self.currency),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Validation(format!("{field} is required")));
            }
        }
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(CoreError::Validation(format!(
                "total must be a non-negative number, got {}",
                self.total
            )));
        }
        if !self.yield_rate.is_finite() {
            return Err(CoreError::Validation("yield must be a finite number".into()));
        }
        Ok(())
    }
}

/// Format an amount with two decimals, thousands separators and the currency code.
#[must_use]
pub fn format_money(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let currency = currency.trim();
    if currency.is_empty() {
        format!("{sign}{grouped}.{frac_part}")
    } else {
        format!("{sign}{grouped}.{frac_part} {}", currency.to_uppercase())
    }
}
