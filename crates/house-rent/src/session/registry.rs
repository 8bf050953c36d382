use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use super::context::{SessionContext, SessionSnapshot};
use super::directory::UserDirectory;
use super::provider::AuthProvider;
use crate::navigation::{self, Access, GuardOutcome};

/// Live sessions keyed by the bearer token the auth provider issued.
pub struct SessionRegistry {
    auth: Arc<dyn AuthProvider>,
    directory: Arc<dyn UserDirectory>,
    sessions: RwLock<HashMap<String, Arc<SessionContext>>>,
}

impl SessionRegistry {
    pub fn new(auth: Arc<dyn AuthProvider>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            auth,
            directory,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// A fresh, anonymous session bound to the registry's providers.
    pub fn open(&self) -> SessionContext {
        SessionContext::new(self.auth.clone(), self.directory.clone())
    }

    /// Stores a signed-in session and returns its token.
    pub async fn admit(&self, context: SessionContext) -> Option<String> {
        let token = context.snapshot().await.identity?.token;
        self.sessions
            .write()
            .await
            .insert(token.clone(), Arc::new(context));
        debug!("session admitted");
        Some(token)
    }

    pub async fn get(&self, token: &str) -> Option<Arc<SessionContext>> {
        self.sessions.read().await.get(token).cloned()
    }

    pub async fn revoke(&self, token: &str) -> Option<Arc<SessionContext>> {
        self.sessions.write().await.remove(token)
    }

    pub async fn from_headers(&self, headers: &HeaderMap) -> Option<Arc<SessionContext>> {
        let token = bearer_token(headers)?;
        self.get(token).await
    }

    /// Snapshot for the request's session, anonymous when there is none.
    pub async fn snapshot_for(&self, headers: &HeaderMap) -> SessionSnapshot {
        match self.from_headers(headers).await {
            Some(context) => context.snapshot().await,
            None => SessionSnapshot::anonymous(),
        }
    }

    /// Runs the page guard for an API request.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        access: Access,
    ) -> Result<SessionSnapshot, AccessError> {
        let snapshot = self.snapshot_for(headers).await;
        match navigation::guard(access, &snapshot) {
            GuardOutcome::Granted => Ok(snapshot),
            GuardOutcome::Loading => Err(AccessError::Loading),
            GuardOutcome::Denied { .. } if !snapshot.is_logged_in() => {
                Err(AccessError::Unauthenticated)
            }
            GuardOutcome::Denied { .. } => Err(AccessError::Forbidden(access)),
        }
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("sign in required")]
    Unauthenticated,
    #[error("{0:?} role required")]
    Forbidden(Access),
    #[error("session is still loading")]
    Loading,
}

impl AccessError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AccessError::Forbidden(_) => StatusCode::FORBIDDEN,
            AccessError::Loading => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": self.to_string(),
            "loginPath": navigation::LOGIN_PATH,
        });
        (self.status(), Json(payload)).into_response()
    }
}
