use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::CoreError;
use crate::models::asset::{NewAsset, WalletAsset};
use crate::models::auth::{Credentials, LoginResponse, NewUser, SignupResponse};
use crate::models::settings::ClientConfig;
use crate::models::wallet::{AssetList, Wallet, WalletList, WalletName};
use crate::services::session_store::SessionStore;
use crate::transport::reqwest_transport::ReqwestTransport;
use crate::transport::traits::{ApiRequest, ApiResponse, HttpTransport, Method};

/// Client for the wallets REST API.
///
/// Two interceptors wrap every call:
/// - on the way out, [`ApiClient::prepare`] adds the JSON content type and, when
///   the session holds a token, `Authorization: Bearer <token>`;
/// - on the way back, [`normalize_response`] passes 2xx responses through and
///   turns everything else into a [`CoreError`] with a readable message.
///
/// A 401 comes back as [`CoreError::Unauthorized`]. The client does not clear
/// the session or redirect; that decision belongs to the session owner
/// ([`crate::WalletDashboard`]).
pub struct ApiClient<T: HttpTransport = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
    session: Arc<SessionStore>,
}

impl ApiClient<ReqwestTransport> {
    /// Client over a real HTTP connection.
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Result<Self, CoreError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport, session))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T, session: Arc<SessionStore>) -> Self {
        Self {
            config,
            transport,
            session,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Interceptors ────────────────────────────────────────────────

    /// Request interceptor: build the outgoing request with the token current *now*.
    pub fn prepare(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<ApiRequest, CoreError> {
        self.prepare_in_session(method, segments, body)
            .map(|(request, _)| request)
    }

    /// Also returns the session epoch the request was prepared under.
    fn prepare_in_session(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<(ApiRequest, u64), CoreError> {
        let (token, epoch) = self.session.snapshot();
        let mut request = ApiRequest::new(method, self.config.url_for(segments)?);
        request.set_header("Content-Type", "application/json");
        request.set_header("Accept", "application/json");
        if let Some(token) = token {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
        request.body = body;
        Ok((request, epoch))
    }

    /// Prepare, dispatch and normalize one call.
    ///
    /// A 401 carries the session epoch it was dispatched under (see
    /// [`SessionStore::expire_epoch`]).
    pub async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<ApiResponse, CoreError> {
        let (request, epoch) = self.prepare_in_session(method, segments, body)?;
        tracing::debug!(
            %method,
            url = %request.url,
            authenticated = request.header("Authorization").is_some(),
            "dispatching request"
        );

        let response = match self.transport.send(request).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%method, error = %e, "request got no response");
                return Err(e);
            }
        };

        normalize_response(response)
            .map_err(|e| e.with_session_epoch(epoch))
            .inspect_err(|e| {
                tracing::warn!(
                    %method,
                    status = ?e.status(),
                    message = %e.message(),
                    "request failed"
                );
            })
    }

    async fn send_json<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<R, CoreError> {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| CoreError::Serialization(format!("Failed to encode request body: {e}")))?;
        let response = self.send(method, segments, body).await?;
        decode_body(&response)
    }

    // ── Endpoints ───────────────────────────────────────────────────

    /// `POST /login`: exchange credentials for an access token.
    /// The session is not touched here.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, CoreError> {
        let resp: Option<LoginResponse> = self
            .send_json(Method::Post, &["login"], Some(credentials))
            .await?;
        resp.and_then(|r| r.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CoreError::UnexpectedResponse("No access token received from server".into())
            })
    }

    /// `POST /users`: create an account. Returns the server's message, if any.
    pub async fn create_user(&self, user: &NewUser) -> Result<Option<String>, CoreError> {
        user.validate()?;
        let resp: Option<SignupResponse> = self
            .send_json(Method::Post, &["users"], Some(user))
            .await
            .or_else(|e| match e {
                // Some servers answer 201 with a bare string or id.
                CoreError::Deserialization(_) => Ok(None),
                other => Err(other),
            })?;
        Ok(resp.and_then(|r| r.message))
    }

    /// `GET /wallets`: every wallet, without assets.
    pub async fn list_wallets(&self) -> Result<Vec<Wallet>, CoreError> {
        let list: WalletList = self
            .send_json::<(), _>(Method::Get, &["wallets"], None)
            .await?;
        Ok(list.into_vec())
    }

    /// `GET /wallets/{id}/assets`.
    pub async fn wallet_assets(&self, wallet_id: &str) -> Result<Vec<WalletAsset>, CoreError> {
        let list: AssetList = self
            .send_json::<(), _>(Method::Get, &["wallets", wallet_id, "assets"], None)
            .await?;
        Ok(list.into_vec())
    }

    /// `POST /wallets`.
    pub async fn create_wallet(&self, name: &WalletName) -> Result<(), CoreError> {
        self.send_json::<_, Value>(Method::Post, &["wallets"], Some(name))
            .await
            .map(drop)
    }

    /// `PATCH /wallets/{id}`.
    pub async fn rename_wallet(&self, wallet_id: &str, name: &WalletName) -> Result<(), CoreError> {
        self.send_json::<_, Value>(Method::Patch, &["wallets", wallet_id], Some(name))
            .await
            .map(drop)
    }

    /// `DELETE /wallets/{id}`.
    pub async fn delete_wallet(&self, wallet_id: &str) -> Result<(), CoreError> {
        self.send_json::<(), Value>(Method::Delete, &["wallets", wallet_id], None)
            .await
            .map(drop)
    }

    /// `POST /assets`: create a fixed- or variable-income asset.
    pub async fn create_asset(&self, asset: &NewAsset) -> Result<(), CoreError> {
        asset.validate()?;
        self.send_json::<_, Value>(Method::Post, &["assets"], Some(asset))
            .await
            .map(drop)
    }
}

// ── Response handling ───────────────────────────────────────────────

/// Response interceptor: successes pass through untouched, failures are normalized.
///
/// - 401 → [`CoreError::Unauthorized`] with the server's message, if it sent one;
/// - other statuses → [`CoreError::Api`] with the best message available
///   (see [`extract_error_message`]), or [`CoreError::Http`] when there is none.
pub fn normalize_response(response: ApiResponse) -> Result<ApiResponse, CoreError> {
    if response.is_success() {
        return Ok(response);
    }

    if response.status == 401 {
        return Err(CoreError::unauthorized(server_message(&response)));
    }

    match extract_error_message(&response) {
        Some(message) => Err(CoreError::Api {
            status: response.status,
            message,
        }),
        None => Err(CoreError::Http {
            status: response.status,
        }),
    }
}

/// Best human-readable message for a failed response, in priority order:
/// `message`, `error`, `detail`, a plain-text body, then the status text.
#[must_use]
pub fn extract_error_message(response: &ApiResponse) -> Option<String> {
    server_message(response).or_else(|| {
        let text = response.status_text.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

/// What the server itself said: a JSON `message`/`error`/`detail` field, or a
/// plain-text body. HTML error pages are not messages.
fn server_message(response: &ApiResponse) -> Option<String> {
    let body = response.body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["message", "error", "detail"].iter().find_map(|field| {
            map.get(*field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }),
        Ok(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Ok(_) => None,
        Err(_) if looks_like_html(response, body) => None,
        Err(_) => Some(body.to_string()),
    }
}

fn looks_like_html(response: &ApiResponse, body: &str) -> bool {
    response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"))
        || body.starts_with('<')
}

/// Parse a success body. An empty body decodes as JSON `null`.
fn decode_body<R: DeserializeOwned>(response: &ApiResponse) -> Result<R, CoreError> {
    let body = response.body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| {
        CoreError::Deserialization(format!(
            "Unexpected response body (HTTP {}): {e}",
            response.status
        ))
    })
}
