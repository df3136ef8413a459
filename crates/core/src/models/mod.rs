pub mod asset;
pub mod auth;
pub mod dashboard;
pub mod notification;
pub mod settings;
pub mod wallet;
pub mod wire;
