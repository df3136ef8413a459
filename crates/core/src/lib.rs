pub mod errors;
pub mod models;
pub mod services;
pub mod storage;
pub mod transport;

use std::sync::Arc;

use models::{
    asset::{NewAsset, WalletAsset},
    auth::{Credentials, NewUser},
    dashboard::DashboardView,
    wallet::{Wallet, WalletName},
};
use services::{
    api_client::ApiClient,
    session_store::{LoginRedirect, SessionStore},
    wallet_service::WalletService,
};
use transport::{reqwest_transport::ReqwestTransport, traits::HttpTransport};

use errors::{CoreError, ErrorKind};

/// Outcome of a mutation the server accepted.
///
/// The wallet list is re-fetched after every mutation. When that re-fetch
/// fails the mutation still happened; `refresh_error` says the view is stale.
#[derive(Debug, Default)]
pub struct Applied {
    pub refresh_error: Option<CoreError>,
}

impl Applied {
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.refresh_error.is_some()
    }
}

/// Main entry point for the wallet-dashboard core library.
///
/// Owns the API client, the session it authenticates with, and the dashboard
/// view state. It is also the one place that reacts to authentication
/// failures: a 401 from any authenticated call clears the session and fires
/// the [`LoginRedirect`] hook, once per expired session.
#[must_use]
pub struct WalletDashboard<T: HttpTransport = ReqwestTransport> {
    client: Arc<ApiClient<T>>,
    view: DashboardView,
    wallet_service: WalletService,
    redirect: Option<Box<dyn LoginRedirect>>,
}

impl<T: HttpTransport> std::fmt::Debug for WalletDashboard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletDashboard")
            .field("base_url", &self.client.config().base_url)
            .field("authenticated", &self.client.session().is_authenticated())
            .field("wallets", &self.view.wallets.len())
            .field("expanded", &self.view.expanded.len())
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> WalletDashboard<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self {
            client: Arc::new(client),
            view: DashboardView::default(),
            wallet_service: WalletService::new(),
            redirect: None,
        }
    }

    /// Install the hook invoked when the server ends the session.
    pub fn with_redirect(mut self, redirect: Box<dyn LoginRedirect>) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Shared handle for spawning background fetches (see [`services::view_scope`]).
    #[must_use]
    pub fn client(&self) -> Arc<ApiClient<T>> {
        Arc::clone(&self.client)
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    #[must_use]
    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    #[must_use]
    pub fn wallets(&self) -> &[Wallet] {
        &self.view.wallets
    }

    #[must_use]
    pub fn wallet(&self, wallet_id: &str) -> Option<&Wallet> {
        self.view.wallet(wallet_id)
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Exchange credentials for a token and store it.
    ///
    /// A 401 here means wrong credentials, not an expired session, so it does
    /// not trigger the login redirect.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), CoreError> {
        let token = self.client.login(credentials).await?;
        self.session().login(&token)?;
        tracing::info!(login = %credentials.login, "logged in");
        Ok(())
    }

    /// Create an account. Returns the server's confirmation message, if any.
    pub async fn signup(&self, user: &NewUser) -> Result<Option<String>, CoreError> {
        self.client.create_user(user).await
    }

    /// Drop the token and everything fetched with it.
    pub fn logout(&mut self) -> Result<(), CoreError> {
        self.session().logout()?;
        self.wallet_service.clear(&mut self.view);
        Ok(())
    }

    /// React to a failed authenticated call.
    ///
    /// On an authentication failure the session is expired and, if that call
    /// was the one to end it, the redirect hook fires. A rejection of a request
    /// sent under an earlier session is ignored. Other failures are left for
    /// the caller to surface.
    pub fn handle_error(&mut self, error: &CoreError) {
        if error.kind() != ErrorKind::Authentication {
            return;
        }
        let expired = match error.session_epoch() {
            Some(epoch) => self.session().expire_epoch(epoch),
            None => self.session().expire(),
        };
        if expired {
            self.wallet_service.clear(&mut self.view);
            if let Some(redirect) = &self.redirect {
                redirect.redirect_to_login();
            }
        }
    }

    fn guard<R>(&mut self, result: Result<R, CoreError>) -> Result<R, CoreError> {
        if let Err(e) = &result {
            self.handle_error(e);
        }
        result
    }

    // ── Wallets ─────────────────────────────────────────────────────

    /// Re-fetch the entire wallet list, then the assets of rows still expanded.
    ///
    /// A row whose assets fail to load is collapsed and the refresh carries on;
    /// only a failed list fetch or an ended session fails the refresh.
    pub async fn refresh_wallets(&mut self) -> Result<&[Wallet], CoreError> {
        let fetched = self.client.list_wallets().await;
        let wallets = self.guard(fetched)?;
        let to_reload = self.wallet_service.apply_wallet_list(&mut self.view, wallets);
        for wallet_id in to_reload {
            let loaded = self.load_assets(&wallet_id).await.map(|_| ());
            if let Err(e) = loaded {
                if e.kind() == ErrorKind::Authentication {
                    return Err(e);
                }
                tracing::warn!(
                    wallet = %wallet_id,
                    error = %e,
                    "collapsing row whose assets failed to load"
                );
                self.view.expanded.remove(&wallet_id);
            }
        }
        Ok(&self.view.wallets)
    }

    async fn refresh_after_mutation(&mut self) -> Applied {
        let refresh_error = self.refresh_wallets().await.err();
        if let Some(e) = &refresh_error {
            tracing::warn!(
                error = %e,
                "mutation applied but the wallet list could not be refreshed"
            );
        }
        Applied { refresh_error }
    }

    /// Fetch one wallet's assets and replace its list entirely.
    pub async fn load_assets(&mut self, wallet_id: &str) -> Result<&[WalletAsset], CoreError> {
        let fetched = self.client.wallet_assets(wallet_id).await;
        let assets = self.guard(fetched)?;
        self.apply_assets(wallet_id, assets)?;
        Ok(self
            .view
            .wallet(wallet_id)
            .map(Wallet::assets)
            .unwrap_or_default())
    }

    /// Store assets fetched elsewhere (e.g. from a [`services::view_scope::ViewScope`]).
    pub fn apply_assets(
        &mut self,
        wallet_id: &str,
        assets: Vec<WalletAsset>,
    ) -> Result<(), CoreError> {
        self.wallet_service.apply_assets(&mut self.view, wallet_id, assets)
    }

    /// Expand-on-click: expanding a row fetches its assets.
    /// Returns whether the row is expanded afterwards.
    pub async fn toggle_wallet(&mut self, wallet_id: &str) -> Result<bool, CoreError> {
        let expanded = self.wallet_service.toggle(&mut self.view, wallet_id)?;
        if expanded {
            let loaded = self.load_assets(wallet_id).await.map(|_| ());
            if let Err(e) = loaded {
                // Leave the row collapsed so the next click retries.
                self.view.expanded.remove(wallet_id);
                return Err(e);
            }
        }
        Ok(expanded)
    }

    /// `Err` only when the server did not accept the change; see [`Applied`].
    pub async fn create_wallet(&mut self, name: &str) -> Result<Applied, CoreError> {
        let name = WalletName::new(name)?;
        let created = self.client.create_wallet(&name).await;
        self.guard(created)?;
        Ok(self.refresh_after_mutation().await)
    }

    pub async fn rename_wallet(
        &mut self,
        wallet_id: &str,
        name: &str,
    ) -> Result<Applied, CoreError> {
        let name = WalletName::new(name)?;
        let renamed = self.client.rename_wallet(wallet_id, &name).await;
        self.guard(renamed)?;
        Ok(self.refresh_after_mutation().await)
    }

    pub async fn delete_wallet(&mut self, wallet_id: &str) -> Result<Applied, CoreError> {
        let deleted = self.client.delete_wallet(wallet_id).await;
        self.guard(deleted)?;
        Ok(self.refresh_after_mutation().await)
    }

    // ── Assets ──────────────────────────────────────────────────────

    /// Create an asset, then re-fetch the wallet list. The asset's wallet is
    /// expanded so its new contents are visible.
    pub async fn create_asset(&mut self, asset: &NewAsset) -> Result<Applied, CoreError> {
        let created = self.client.create_asset(asset).await;
        self.guard(created)?;
        self.view.expanded.insert(asset.wallet_id.clone());
        Ok(self.refresh_after_mutation().await)
    }
}

impl WalletDashboard<ReqwestTransport> {
    /// Dashboard over HTTP with the session restored from `storage`.
    pub fn connect(
        config: models::settings::ClientConfig,
        storage: Arc<dyn storage::manager::DurableStore>,
    ) -> Result<Self, CoreError> {
        let session = Arc::new(SessionStore::open(storage, config.token_key.clone())?);
        let client = ApiClient::new(config, session)?;
        Ok(Self::new(client))
    }
}
