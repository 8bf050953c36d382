use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;

use super::dashboard::AdminDashboard;
use super::service::{ModerationError, ModerationService};
use crate::i18n::{LanguageQuery, Translator};
use crate::listings::{Listing, ListingCard, ListingId};
use crate::navigation::Access;
use crate::session::SessionRegistry;
use crate::store::StoreError;

#[derive(Clone)]
pub struct ModerationState {
    pub service: Arc<ModerationService>,
    pub sessions: Arc<SessionRegistry>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VisibilityRequest {
    /// Absent flips the current flag.
    #[serde(default)]
    pub hidden: Option<bool>,
}

pub fn moderation_router(
    service: Arc<ModerationService>,
    sessions: Arc<SessionRegistry>,
) -> Router {
    Router::new()
        .route("/api/v1/admin/listings", get(dashboard_handler))
        .route("/api/v1/admin/listings/stream", get(dashboard_stream_handler))
        .route("/api/v1/admin/stats", get(stats_handler))
        .route(
            "/api/v1/admin/listings/:id",
            axum::routing::delete(delete_handler),
        )
        .route("/api/v1/admin/listings/:id/approve", post(approve_handler))
        .route("/api/v1/admin/listings/:id/reject", post(reject_handler))
        .route(
            "/api/v1/admin/listings/:id/visibility",
            post(visibility_handler),
        )
        .route("/api/v1/admin/listings/:id/review", post(review_handler))
        .with_state(ModerationState { service, sessions })
}

pub(crate) fn moderation_error_response(error: &ModerationError) -> Response {
    let status = match error {
        ModerationError::Lifecycle(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ModerationError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        ModerationError::Store(StoreError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
        ModerationError::Store(_) => StatusCode::BAD_GATEWAY,
        ModerationError::Assistant(error) => error.status(),
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

async fn dashboard(
    service: &ModerationService,
    translator: &Translator,
) -> Result<AdminDashboard, ModerationError> {
    let listings = service.subscribe().await?.current();
    let stats = service.stats(&listings).await?;
    Ok(AdminDashboard::build(&listings, stats, Utc::now(), translator))
}

pub(crate) async fn dashboard_handler(
    State(state): State<ModerationState>,
    headers: HeaderMap,
    Query(language): Query<LanguageQuery>,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Admin).await {
        return denied.into_response();
    }

    let translator = language.translator_or(Default::default());
    match dashboard(&state.service, &translator).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => moderation_error_response(&error),
    }
}

pub(crate) async fn dashboard_stream_handler(
    State(state): State<ModerationState>,
    headers: HeaderMap,
    Query(language): Query<LanguageQuery>,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Admin).await {
        return denied.into_response();
    }

    let subscription = match state.service.subscribe().await {
        Ok(subscription) => subscription,
        Err(error) => return moderation_error_response(&error),
    };

    let translator = language.translator_or(Default::default());
    let service = state.service.clone();
    let events = subscription.into_stream().then(move |listings| {
        let service = service.clone();
        async move {
            let event = match service.stats(&listings).await {
                Ok(stats) => {
                    let view = AdminDashboard::build(&listings, stats, Utc::now(), &translator);
                    Event::default().event("dashboard").json_data(&view)
                }
                Err(error) => Ok(Event::default().event("error").data(error.to_string())),
            };
            Ok::<Event, Infallible>(
                event.unwrap_or_else(|err| Event::default().event("error").data(err.to_string())),
            )
        }
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

pub(crate) async fn stats_handler(
    State(state): State<ModerationState>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Admin).await {
        return denied.into_response();
    }

    let result = match state.service.subscribe().await {
        Ok(subscription) => state.service.stats(&subscription.current()).await,
        Err(error) => Err(error),
    };
    match result {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => moderation_error_response(&error),
    }
}

fn card_response(result: Result<Listing, ModerationError>) -> Response {
    match result {
        Ok(listing) => {
            let card = ListingCard::render(&listing, Utc::now(), &Translator::default());
            (StatusCode::OK, Json(card)).into_response()
        }
        Err(error) => moderation_error_response(&error),
    }
}

pub(crate) async fn approve_handler(
    State(state): State<ModerationState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Admin).await {
        return denied.into_response();
    }
    card_response(state.service.approve(&ListingId(id), Utc::now()).await)
}

pub(crate) async fn reject_handler(
    State(state): State<ModerationState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Admin).await {
        return denied.into_response();
    }
    card_response(
        state
            .service
            .reject(&ListingId(id), &request.reason, Utc::now())
            .await,
    )
}

pub(crate) async fn visibility_handler(
    State(state): State<ModerationState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    request: Option<Json<VisibilityRequest>>,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Admin).await {
        return denied.into_response();
    }
    // No body toggles.
    let hidden = request.and_then(|Json(request)| request.hidden);
    card_response(
        state
            .service
            .set_visibility(&ListingId(id), hidden)
            .await,
    )
}

pub(crate) async fn review_handler(
    State(state): State<ModerationState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Admin).await {
        return denied.into_response();
    }
    match state.service.review(&ListingId(id)).await {
        Ok(result) => (StatusCode::OK, Json(json!({ "result": result }))).into_response(),
        Err(error) => moderation_error_response(&error),
    }
}

pub(crate) async fn delete_handler(
    State(state): State<ModerationState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Admin).await {
        return denied.into_response();
    }
    match state.service.delete(&ListingId(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => moderation_error_response(&error),
    }
}
