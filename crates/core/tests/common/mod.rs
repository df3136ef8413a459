// ═══════════════════════════════════════════════════════════════════
// Shared test helpers — scripted transport, redirect counter
// ═══════════════════════════════════════════════════════════════════
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use wallet_dashboard_core::errors::CoreError;
use wallet_dashboard_core::models::settings::ClientConfig;
use wallet_dashboard_core::services::api_client::ApiClient;
use wallet_dashboard_core::services::session_store::{LoginRedirect, SessionStore};
use wallet_dashboard_core::transport::traits::{ApiRequest, ApiResponse, HttpTransport};

pub const BASE_URL: &str = "http://api.test/v1";

/// Transport that replays scripted responses in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, CoreError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: ApiResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(json_response(status, &body))
    }

    pub fn push_unreachable(&self) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(CoreError::Connectivity("connection refused".into())));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, CoreError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CoreError::Connectivity("no scripted response".into())))
    }
}

pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

pub fn json_response(status: u16, body: &Value) -> ApiResponse {
    ApiResponse {
        status,
        status_text: status_text(status).to_string(),
        content_type: Some("application/json".into()),
        body: body.to_string(),
    }
}

pub fn text_response(status: u16, status_text: &str, body: &str) -> ApiResponse {
    ApiResponse {
        status,
        status_text: status_text.to_string(),
        content_type: Some("text/plain; charset=utf-8".into()),
        body: body.to_string(),
    }
}

pub fn empty_response(status: u16) -> ApiResponse {
    ApiResponse {
        status,
        status_text: status_text(status).to_string(),
        content_type: None,
        body: String::new(),
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new(BASE_URL).unwrap()
}

/// Client over a fresh mock transport and an in-memory session.
pub fn mock_client() -> ApiClient<MockTransport> {
    ApiClient::with_transport(config(), MockTransport::new(), Arc::new(SessionStore::in_memory()))
}

pub fn mock_client_with_session(session: Arc<SessionStore>) -> ApiClient<MockTransport> {
    ApiClient::with_transport(config(), MockTransport::new(), session)
}

/// Counts login redirects.
#[derive(Clone, Default)]
pub struct CountingRedirect {
    count: Arc<AtomicUsize>,
}

impl CountingRedirect {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for CountingRedirect {
    fn redirect_to_login(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
