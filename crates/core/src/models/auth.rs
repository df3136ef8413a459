use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Body of `POST /login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Result<Self, CoreError> {
        let creds = Self {
            login: login.into(),
            password: password.into(),
        };
        if creds.login.trim().is_empty() {
            return Err(CoreError::Validation("Login is required".into()));
        }
        if creds.password.is_empty() {
            return Err(CoreError::Validation("Password is required".into()));
        }
        Ok(creds)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Success body of `POST /login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Role chosen at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_CUSTOMER")]
    Customer,
}

impl Role {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ROLE_ADMIN" | "ADMIN" => Some(Role::Admin),
            "ROLE_CUSTOMER" | "CUSTOMER" => Some(Role::Customer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Customer => write!(f, "Customer"),
        }
    }
}

/// Body of `POST /users`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish()
    }
}

impl NewUser {
    /// Same rules the signup form enforces before submitting.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.login.trim().is_empty() {
            return Err(CoreError::Validation("Login is required".into()));
        }
        if self.password.is_empty() {
            return Err(CoreError::Validation("Password is required".into()));
        }
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Name is required".into()));
        }
        if self.email.trim().is_empty() {
            return Err(CoreError::Validation("Email is required".into()));
        }
        if !is_valid_email(&self.email) {
            return Err(CoreError::Validation("Invalid email address".into()));
        }
        Ok(())
    }
}

/// `local@domain.tld`, case-insensitive: local part of `[A-Z0-9._%+-]`,
/// domain of `[A-Z0-9.-]`, and an alphabetic TLD of at least two letters.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Optional success body of `POST /users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: Option<String>,
}
