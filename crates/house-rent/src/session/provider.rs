use async_trait::async_trait;
use serde::Deserialize;

use super::domain::{Identity, UserId};

/// Assertion handed over by the Google sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedCredential {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// External identity service: credentials in, signed-in identity out.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Creates the account and signs it in.
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn update_display_name(
        &self,
        uid: &UserId,
        display_name: &str,
    ) -> Result<Identity, AuthError>;

    async fn sign_in_federated(&self, credential: &FederatedCredential)
        -> Result<Identity, AuthError>;

    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email address is already registered")]
    EmailInUse,
    #[error("email address is malformed")]
    InvalidEmail,
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("no account for {0}")]
    UnknownUser(String),
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}
