use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::context::{SessionError, SessionSnapshot};
use super::domain::Role;
use super::provider::{AuthError, FederatedCredential};
use super::registry::{bearer_token, SessionRegistry};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
}

/// Sign-in, registration, and session inspection endpoints.
pub fn session_router(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(login_handler))
        .route("/api/v1/auth/register", post(register_handler))
        .route("/api/v1/auth/google", post(google_handler))
        .route("/api/v1/auth/logout", post(logout_handler))
        .route("/api/v1/auth/session", get(session_handler))
        .with_state(registry)
}

fn signed_in(status: StatusCode, token: String, session: SessionSnapshot) -> Response {
    let payload = json!({
        "token": token,
        "session": session,
    });
    (status, Json(payload)).into_response()
}

pub(crate) fn session_error_response(error: &SessionError) -> Response {
    let status = match error {
        SessionError::Auth(AuthError::InvalidCredentials | AuthError::UnknownUser(_)) => {
            StatusCode::UNAUTHORIZED
        }
        SessionError::Auth(AuthError::EmailInUse) => StatusCode::CONFLICT,
        SessionError::Auth(AuthError::InvalidEmail | AuthError::WeakPassword(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SessionError::Auth(AuthError::Unavailable(_))
        | SessionError::ProfileWrite { .. }
        | SessionError::Store(_) => StatusCode::BAD_GATEWAY,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn login_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    let context = registry.open();
    match context.login(&request.email, &request.password).await {
        Ok(snapshot) => match registry.admit(context).await {
            Some(token) => signed_in(StatusCode::OK, token, snapshot),
            None => StatusCode::UNAUTHORIZED.into_response(),
        },
        Err(error) => session_error_response(&error),
    }
}

pub(crate) async fn register_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    let context = registry.open();
    let outcome = context
        .register(
            &request.email,
            &request.password,
            &request.display_name,
            request.role,
        )
        .await;

    match outcome {
        Ok(snapshot) => match registry.admit(context).await {
            Some(token) => signed_in(StatusCode::CREATED, token, snapshot),
            None => StatusCode::UNAUTHORIZED.into_response(),
        },
        Err(error @ SessionError::ProfileWrite { .. }) => {
            // The identity is signed in regardless; hand the token back with the error.
            let token = registry.admit(context).await;
            let payload = json!({
                "error": error.to_string(),
                "token": token,
            });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        Err(error) => session_error_response(&error),
    }
}

pub(crate) async fn google_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Json(credential): Json<FederatedCredential>,
) -> Response {
    let context = registry.open();
    match context.login_with_google(&credential).await {
        Ok(snapshot) => match registry.admit(context).await {
            Some(token) => signed_in(StatusCode::OK, token, snapshot),
            None => StatusCode::UNAUTHORIZED.into_response(),
        },
        Err(error) => session_error_response(&error),
    }
}

pub(crate) async fn logout_handler(
    State(registry): State<Arc<SessionRegistry>>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = bearer_token(&headers).map(str::to_string) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let Some(context) = registry.revoke(&token).await else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match context.logout().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => session_error_response(&error),
    }
}

pub(crate) async fn session_handler(
    State(registry): State<Arc<SessionRegistry>>,
    headers: HeaderMap,
) -> Response {
    let snapshot = registry.snapshot_for(&headers).await;
    let payload = json!({
        "session": snapshot,
        "isLoggedIn": snapshot.is_logged_in(),
        "isOwner": snapshot.is_owner(),
        "isAdmin": snapshot.is_admin(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}
