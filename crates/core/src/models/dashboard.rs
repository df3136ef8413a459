use std::collections::BTreeSet;

use super::wallet::Wallet;

/// What the dashboard currently shows: the wallet list and which rows are expanded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub wallets: Vec<Wallet>,

    /// Ids of expanded wallet rows. Only ids present in `wallets` are kept.
    pub expanded: BTreeSet<String>,
}

impl DashboardView {
    #[must_use]
    pub fn wallet(&self, wallet_id: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.id == wallet_id)
    }

    pub fn wallet_mut(&mut self, wallet_id: &str) -> Option<&mut Wallet> {
        self.wallets.iter_mut().find(|w| w.id == wallet_id)
    }

    #[must_use]
    pub fn is_expanded(&self, wallet_id: &str) -> bool {
        self.expanded.contains(wallet_id)
    }

    /// Sum of every wallet's aggregate value.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.wallets.iter().map(|w| w.sum).sum()
    }
}
