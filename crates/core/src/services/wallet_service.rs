use crate::errors::CoreError;
use crate::models::asset::WalletAsset;
use crate::models::dashboard::DashboardView;
use crate::models::wallet::Wallet;

/// Applies fetch results and row clicks to a [`DashboardView`].
///
/// Pure view logic, no I/O. The facade performs the fetches and hands the
/// results over.
pub struct WalletService;

impl WalletService {
    pub fn new() -> Self {
        Self
    }

    /// Replace the whole wallet list with a fresh fetch.
    ///
    /// Fetched wallets arrive without assets. Expansion survives for wallets that
    /// still exist; the ids returned are those whose assets must be fetched again.
    pub fn apply_wallet_list(&self, view: &mut DashboardView, wallets: Vec<Wallet>) -> Vec<String> {
        view.wallets = wallets;
        view.expanded
            .retain(|id| view.wallets.iter().any(|w| &w.id == id));
        view.expanded.iter().cloned().collect()
    }

    /// Replace one wallet's asset list entirely.
    pub fn apply_assets(
        &self,
        view: &mut DashboardView,
        wallet_id: &str,
        assets: Vec<WalletAsset>,
    ) -> Result<(), CoreError> {
        let wallet = view
            .wallet_mut(wallet_id)
            .ok_or_else(|| CoreError::Validation(format!("unknown wallet {wallet_id:?}")))?;
        wallet.replace_assets(assets);
        Ok(())
    }

    /// Flip a row open/closed. Returns `true` when the row is now expanded.
    /// Collapsing discards the assets so the next expand shows fresh data.
    pub fn toggle(&self, view: &mut DashboardView, wallet_id: &str) -> Result<bool, CoreError> {
        let wallet = view
            .wallets
            .iter_mut()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| CoreError::Validation(format!("unknown wallet {wallet_id:?}")))?;
        if view.expanded.remove(wallet_id) {
            wallet.clear_assets();
            Ok(false)
        } else {
            view.expanded.insert(wallet_id.to_string());
            Ok(true)
        }
    }

    /// Forget everything, e.g. after logout.
    pub fn clear(&self, view: &mut DashboardView) {
        view.wallets.clear();
        view.expanded.clear();
    }
}

impl Default for WalletService {
    fn default() -> Self {
        Self::new()
    }
}
