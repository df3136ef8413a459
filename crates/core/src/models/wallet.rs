use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::asset::{format_money, WalletAsset};
use super::wire;
use crate::errors::CoreError;

/// A named container of assets with an aggregate value.
///
/// Assets are never decoded together with the wallet: they stay empty until
/// [`Wallet::replace_assets`] is called with the result of a per-wallet fetch,
/// and every fetch replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,

    pub name: String,

    /// Aggregate value as computed by the server.
    #[serde(default, deserialize_with = "wire::amount")]
    pub sum: f64,

    #[serde(default, deserialize_with = "wire::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_deserializing, default)]
    assets: Vec<WalletAsset>,

    #[serde(skip)]
    assets_loaded: bool,
}

impl Wallet {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sum: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sum,
            created_at: None,
            assets: Vec::new(),
            assets_loaded: false,
        }
    }

    #[must_use]
    pub fn assets(&self) -> &[WalletAsset] {
        &self.assets
    }

    /// Whether the asset list reflects a fetch (it may still be empty).
    #[must_use]
    pub fn assets_loaded(&self) -> bool {
        self.assets_loaded
    }

    /// Swap in a freshly fetched asset list. Nothing is merged.
    pub fn replace_assets(&mut self, assets: Vec<WalletAsset>) {
        self.assets = assets;
        self.assets_loaded = true;
    }

    /// Forget fetched assets so the next expand fetches them again.
    pub fn clear_assets(&mut self) {
        self.assets.clear();
        self.assets_loaded = false;
    }

    #[must_use]
    pub fn display_sum(&self) -> String {
        format_money(self.sum, "")
    }
}

/// Body of `POST /wallets` and `PATCH /wallets/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletName {
    pub name: String,
}

impl WalletName {
    /// Trimmed, non-empty wallet name.
    pub fn new(name: &str) -> Result<Self, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("wallet name is required".into()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}

/// `GET /wallets` body: a bare array, or `{ wallets: [...] }`.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletList(pub Vec<Wallet>);

impl<'de> Deserialize<'de> for WalletList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        wire::list(deserializer, "wallets").map(WalletList)
    }
}

impl WalletList {
    #[must_use]
    pub fn into_vec(self) -> Vec<Wallet> {
        self.0
    }
}

/// `GET /wallets/{id}/assets` body: `{ assets: [...] }`, or a bare array.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetList(pub Vec<WalletAsset>);

impl<'de> Deserialize<'de> for AssetList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        wire::list(deserializer, "assets").map(AssetList)
    }
}

impl AssetList {
    #[must_use]
    pub fn into_vec(self) -> Vec<WalletAsset> {
        self.0
    }
}
