// ═══════════════════════════════════════════════════════════════════
// API Client Tests — interceptors, error normalization, endpoints
// ═══════════════════════════════════════════════════════════════════

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use common::{
    empty_response, json_response, mock_client, mock_client_with_session, text_response,
};
use wallet_dashboard_core::errors::{CoreError, ErrorKind};
use wallet_dashboard_core::models::asset::{AssetKind, NewAsset};
use wallet_dashboard_core::models::auth::{Credentials, NewUser, Role};
use wallet_dashboard_core::models::wallet::WalletName;
use wallet_dashboard_core::services::api_client::{extract_error_message, normalize_response};
use wallet_dashboard_core::services::session_store::SessionStore;
use wallet_dashboard_core::transport::traits::{ApiResponse, Method};

// ═══════════════════════════════════════════════════════════════════
// Request interceptor
// ═══════════════════════════════════════════════════════════════════

mod request_interceptor {
    use super::*;

    #[tokio::test]
    async fn bearer_header_when_token_present() {
        let session = Arc::new(SessionStore::in_memory());
        session.login("tok123").unwrap();
        let client = mock_client_with_session(session);
        client.transport().push_json(200, json!([]));

        client.list_wallets().await.unwrap();

        let req = client.transport().last_request();
        assert_eq!(req.header("Authorization"), Some("Bearer tok123"));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn no_authorization_header_without_token() {
        let client = mock_client();
        client.transport().push_json(200, json!([]));

        client.list_wallets().await.unwrap();

        let req = client.transport().last_request();
        assert_eq!(req.header("Authorization"), None);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn token_is_read_at_dispatch_time() {
        let session = Arc::new(SessionStore::in_memory());
        let client = mock_client_with_session(Arc::clone(&session));
        client.transport().push_json(200, json!([])).push_json(200, json!([]));

        session.login("first").unwrap();
        client.list_wallets().await.unwrap();
        session.login("second").unwrap();
        client.list_wallets().await.unwrap();

        let reqs = client.transport().requests();
        assert_eq!(reqs[0].header("Authorization"), Some("Bearer first"));
        assert_eq!(reqs[1].header("Authorization"), Some("Bearer second"));
    }

    #[test]
    fn prepare_builds_absolute_url() {
        let client = mock_client();
        let req = client
            .prepare(Method::Delete, &["wallets", "42"], None)
            .unwrap();
        assert_eq!(req.method, Method::Delete);
        assert_eq!(req.url, "http://api.test/v1/wallets/42");
        assert!(req.body.is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Response interceptor
// ═══════════════════════════════════════════════════════════════════

mod response_interceptor {
    use super::*;

    fn html_response(status: u16, status_text: &str) -> ApiResponse {
        ApiResponse {
            status,
            status_text: status_text.into(),
            content_type: Some("text/html".into()),
            body: "<html><body>Bad Gateway</body></html>".into(),
        }
    }

    #[test]
    fn success_passes_through_unchanged() {
        let resp = json_response(201, &json!({"id": 1}));
        assert_eq!(normalize_response(resp.clone()).unwrap(), resp);
    }

    #[test]
    fn message_field_wins() {
        let resp = json_response(400, &json!({"message": "X", "error": "Y", "detail": "Z"}));
        let err = normalize_response(resp).unwrap_err();
        assert_eq!(err.message(), "X");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.kind(), ErrorKind::Rejected);
    }

    #[test]
    fn error_field_when_no_message() {
        let resp = json_response(409, &json!({"error": "Y", "detail": "Z"}));
        assert_eq!(normalize_response(resp).unwrap_err().message(), "Y");
    }

    #[test]
    fn detail_field_when_nothing_else() {
        let resp = json_response(422, &json!({"detail": "Z"}));
        assert_eq!(normalize_response(resp).unwrap_err().message(), "Z");
    }

    #[test]
    fn blank_fields_are_skipped() {
        let resp = json_response(400, &json!({"message": "  ", "error": "Y"}));
        assert_eq!(normalize_response(resp).unwrap_err().message(), "Y");
    }

    #[test]
    fn non_string_fields_are_skipped() {
        let resp = json_response(400, &json!({"message": {"code": 1}, "detail": "Z"}));
        assert_eq!(normalize_response(resp).unwrap_err().message(), "Z");
    }

    #[test]
    fn plain_text_body() {
        let resp = text_response(500, "Internal Server Error", "database is down\n");
        assert_eq!(normalize_response(resp).unwrap_err().message(), "database is down");
    }

    #[test]
    fn json_string_body() {
        let resp = json_response(400, &json!("wallet name taken"));
        assert_eq!(normalize_response(resp).unwrap_err().message(), "wallet name taken");
    }

    #[test]
    fn status_text_when_body_has_no_message() {
        let resp = json_response(404, &json!({"timestamp": "2024-01-01"}));
        assert_eq!(normalize_response(resp).unwrap_err().message(), "Not Found");

        let resp = html_response(502, "Bad Gateway");
        assert_eq!(extract_error_message(&resp).as_deref(), Some("Bad Gateway"));
    }

    #[test]
    fn raw_status_when_nothing_readable() {
        let resp = ApiResponse {
            status: 599,
            status_text: String::new(),
            content_type: None,
            body: String::new(),
        };
        let err = normalize_response(resp).unwrap_err();
        assert!(matches!(err, CoreError::Http { status: 599 }));
        assert_eq!(err.message(), "HTTP 599");
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn unauthorized_uses_server_message() {
        let resp = json_response(401, &json!({"message": "Token expired"}));
        let err = normalize_response(resp).unwrap_err();
        assert!(matches!(
            &err,
            CoreError::Unauthorized { message: Some(m), .. } if m == "Token expired"
        ));
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn unauthorized_defaults_when_silent() {
        let err = normalize_response(empty_response(401)).unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized { message: None, .. }));
        assert_eq!(err.message(), "Unauthorized");
    }

    #[tokio::test]
    async fn no_response_is_connectivity() {
        let client = mock_client();
        client.transport().push_unreachable();

        let err = client.list_wallets().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert_eq!(err.message(), "No response from server");
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn client_never_touches_the_session_on_401() {
        let session = Arc::new(SessionStore::in_memory());
        session.login("tok").unwrap();
        let client = mock_client_with_session(Arc::clone(&session));
        client.transport().push(empty_response(401));

        assert!(client.list_wallets().await.is_err());
        assert_eq!(session.token().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn unauthorized_carries_dispatch_epoch() {
        let session = Arc::new(SessionStore::in_memory());
        session.login("tok").unwrap();
        let epoch = session.epoch();
        let client = mock_client_with_session(Arc::clone(&session));
        client.transport().push(empty_response(401));

        let err = client.list_wallets().await.unwrap_err();
        assert_eq!(err.session_epoch(), Some(epoch));
    }

    #[tokio::test]
    async fn other_failures_carry_no_epoch() {
        let client = mock_client();
        client.transport().push_json(500, json!({"message": "boom"}));
        let err = client.list_wallets().await.unwrap_err();
        assert_eq!(err.session_epoch(), None);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let client = mock_client();
        client.transport().push(text_response(200, "OK", "not json"));
        let err = client.list_wallets().await.unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Endpoints
// ═══════════════════════════════════════════════════════════════════

mod endpoints {
    use super::*;

    #[tokio::test]
    async fn login_posts_credentials_and_returns_token() {
        let client = mock_client();
        client.transport().push_json(200, json!({"accessToken": "tok123"}));

        let token = client.login(&Credentials::new("a", "b").unwrap()).await.unwrap();
        assert_eq!(token, "tok123");

        let req = client.transport().last_request();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.url, "http://api.test/v1/login");
        assert_eq!(req.body, Some(json!({"login": "a", "password": "b"})));
    }

    #[tokio::test]
    async fn login_without_token_in_body() {
        let client = mock_client();
        client.transport().push_json(200, json!({}));
        let err = client.login(&Credentials::new("a", "b").unwrap()).await.unwrap_err();
        assert!(matches!(err, CoreError::UnexpectedResponse(_)));

        client.transport().push_json(200, json!({"accessToken": ""}));
        assert!(client.login(&Credentials::new("a", "b").unwrap()).await.is_err());
    }

    #[tokio::test]
    async fn login_rejected() {
        let client = mock_client();
        client.transport().push(empty_response(401));
        let err = client.login(&Credentials::new("a", "bad").unwrap()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    fn user() -> NewUser {
        NewUser {
            login: "ana".into(),
            password: "pw".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn create_user_posts_to_users() {
        let client = mock_client();
        client.transport().push_json(201, json!({"message": "User created"}));

        let message = client.create_user(&user()).await.unwrap();
        assert_eq!(message.as_deref(), Some("User created"));

        let req = client.transport().last_request();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.url, "http://api.test/v1/users");
        assert_eq!(req.body.as_ref().unwrap()["role"], "ROLE_ADMIN");
        assert_eq!(req.body.as_ref().unwrap()["email"], "ana@example.com");
    }

    #[tokio::test]
    async fn create_user_accepts_empty_or_odd_bodies() {
        let client = mock_client();
        client.transport().push(empty_response(201));
        assert_eq!(client.create_user(&user()).await.unwrap(), None);

        client.transport().push_json(201, json!(17));
        assert_eq!(client.create_user(&user()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_user_validates_before_sending() {
        let client = mock_client();
        let mut bad = user();
        bad.email = "nope".into();
        assert!(matches!(client.create_user(&bad).await, Err(CoreError::Validation(_))));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn create_user_surfaces_server_rejection() {
        let client = mock_client();
        client.transport().push_json(409, json!({"message": "Login already in use"}));
        let err = client.create_user(&user()).await.unwrap_err();
        assert_eq!(err.message(), "Login already in use");
    }

    #[tokio::test]
    async fn list_wallets_decodes_both_shapes() {
        let client = mock_client();
        client
            .transport()
            .push_json(200, json!([{"id": 1, "name": "A", "sum": 10}]))
            .push_json(200, json!({"wallets": [{"id": "2", "name": "B"}]}));

        let first = client.list_wallets().await.unwrap();
        assert_eq!(first[0].id, "1");
        let second = client.list_wallets().await.unwrap();
        assert_eq!(second[0].name, "B");

        let req = client.transport().last_request();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.url, "http://api.test/v1/wallets");
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn wallet_assets_path() {
        let client = mock_client();
        client
            .transport()
            .push_json(200, json!({"assets": [{"id": "2", "name": "Bond"}]}));

        let assets = client.wallet_assets("1").await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, "2");
        assert_eq!(
            client.transport().last_request().url,
            "http://api.test/v1/wallets/1/assets"
        );
    }

    #[tokio::test]
    async fn wallet_mutations() {
        let client = mock_client();
        client
            .transport()
            .push_json(201, json!({"id": 3, "name": "New"}))
            .push(empty_response(204))
            .push(empty_response(204));

        client.create_wallet(&WalletName::new("New").unwrap()).await.unwrap();
        client
            .rename_wallet("3", &WalletName::new("Renamed").unwrap())
            .await
            .unwrap();
        client.delete_wallet("3").await.unwrap();

        let reqs = client.transport().requests();
        assert_eq!(reqs[0].method, Method::Post);
        assert_eq!(reqs[0].url, "http://api.test/v1/wallets");
        assert_eq!(reqs[0].body, Some(json!({"name": "New"})));

        assert_eq!(reqs[1].method, Method::Patch);
        assert_eq!(reqs[1].url, "http://api.test/v1/wallets/3");
        assert_eq!(reqs[1].body, Some(json!({"name": "Renamed"})));

        assert_eq!(reqs[2].method, Method::Delete);
        assert_eq!(reqs[2].url, "http://api.test/v1/wallets/3");
        assert!(reqs[2].body.is_none());
    }

    #[tokio::test]
    async fn ids_are_path_encoded() {
        let client = mock_client();
        client.transport().push(empty_response(204));
        client.delete_wallet("../users").await.unwrap();
        assert_eq!(
            client.transport().last_request().url,
            "http://api.test/v1/wallets/..%2Fusers"
        );
    }

    fn new_asset() -> NewAsset {
        NewAsset {
            wallet_id: "1".into(),
            asset: AssetKind::VariableIncome,
            identifier: "ITSA4".into(),
            class: "STOCK".into(),
            name: "Itausa".into(),
            custody: "Broker".into(),
            currency: "BRL".into(),
            total: 250.0,
            yield_rate: 4.2,
            acquired: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_asset_posts_to_assets() {
        let client = mock_client();
        client.transport().push_json(201, json!({"id": 99}));

        client.create_asset(&new_asset()).await.unwrap();

        let req = client.transport().last_request();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.url, "http://api.test/v1/assets");
        let body = req.body.unwrap();
        assert_eq!(body["walletId"], "1");
        assert_eq!(body["asset"], "VARIABLE_INCOME");
        assert_eq!(body["acquired"], "2024-01-15");
    }

    #[tokio::test]
    async fn create_asset_validates_before_sending() {
        let client = mock_client();
        let mut bad = new_asset();
        bad.identifier = String::new();
        assert!(client.create_asset(&bad).await.is_err());
        assert!(client.transport().requests().is_empty());
    }
}
