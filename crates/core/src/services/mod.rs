pub mod api_client;
pub mod session_store;
pub mod view_scope;
pub mod wallet_service;
