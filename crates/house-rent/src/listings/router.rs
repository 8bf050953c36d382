use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
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

use super::filter::{BrowseQuery, ListingFilter};
use super::service::{ListingService, ListingServiceError};
use super::submission::ListingSubmission;
use super::views::{ListingCard, OwnerListingsView};
use crate::i18n::{LanguageQuery, Translator};
use crate::navigation::Access;
use crate::session::SessionRegistry;
use crate::store::StoreError;

#[derive(Clone)]
pub struct ListingsState {
    pub service: Arc<ListingService>,
    pub sessions: Arc<SessionRegistry>,
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub description: String,
}

/// Browse, submit, and my-listings endpoints.
pub fn listing_router(service: Arc<ListingService>, sessions: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route("/api/v1/listings", post(submit_handler))
        .route("/api/v1/listings/browse", get(browse_handler))
        .route("/api/v1/listings/mine", get(mine_handler))
        .route("/api/v1/listings/mine/stream", get(mine_stream_handler))
        .route(
            "/api/v1/listings/improve-description",
            post(improve_description_handler),
        )
        .with_state(ListingsState { service, sessions })
}

pub(crate) fn listing_error_response(error: &ListingServiceError) -> Response {
    let status = match error {
        ListingServiceError::Submission(_) | ListingServiceError::EmptyDescription => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ListingServiceError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        ListingServiceError::Store(StoreError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
        ListingServiceError::Store(_) => StatusCode::BAD_GATEWAY,
        ListingServiceError::Assistant(error) => error.status(),
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn browse_handler(
    State(state): State<ListingsState>,
    Query(query): Query<BrowseQuery>,
    Query(language): Query<LanguageQuery>,
) -> Response {
    let filter = match ListingFilter::from_query(&query) {
        Ok(filter) => filter,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    let now = Utc::now();
    match state.service.browse(&filter, now).await {
        Ok(listings) => {
            let translator = language.translator_or(Default::default());
            let cards: Vec<ListingCard> = listings
                .iter()
                .map(|listing| ListingCard::render(listing, now, &translator))
                .collect();
            let payload = json!({
                "count": cards.len(),
                "listings": cards,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => listing_error_response(&error),
    }
}

pub(crate) async fn submit_handler(
    State(state): State<ListingsState>,
    headers: HeaderMap,
    Json(submission): Json<ListingSubmission>,
) -> Response {
    let session = match state.sessions.authorize(&headers, Access::Owner).await {
        Ok(session) => session,
        Err(denied) => return denied.into_response(),
    };
    let Some(identity) = session.identity else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let now = Utc::now();
    match state.service.submit(&identity, submission, now).await {
        Ok(listing) => {
            let card = ListingCard::render(&listing, now, &Translator::default());
            (StatusCode::CREATED, Json(card)).into_response()
        }
        Err(error) => listing_error_response(&error),
    }
}

pub(crate) async fn mine_handler(
    State(state): State<ListingsState>,
    headers: HeaderMap,
    Query(language): Query<LanguageQuery>,
) -> Response {
    let session = match state.sessions.authorize(&headers, Access::Owner).await {
        Ok(session) => session,
        Err(denied) => return denied.into_response(),
    };
    let Some(identity) = session.identity else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match state.service.my_listings(&identity.uid).await {
        Ok(subscription) => {
            let translator = language.translator_or(Default::default());
            let view = OwnerListingsView::build(&subscription.current(), Utc::now(), &translator);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => listing_error_response(&error),
    }
}

pub(crate) async fn mine_stream_handler(
    State(state): State<ListingsState>,
    headers: HeaderMap,
    Query(language): Query<LanguageQuery>,
) -> Response {
    let session = match state.sessions.authorize(&headers, Access::Owner).await {
        Ok(session) => session,
        Err(denied) => return denied.into_response(),
    };
    let Some(identity) = session.identity else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let subscription = match state.service.my_listings(&identity.uid).await {
        Ok(subscription) => subscription,
        Err(error) => return listing_error_response(&error),
    };

    let translator = language.translator_or(Default::default());
    let events = subscription.into_stream().map(move |snapshot| {
        let view = OwnerListingsView::build(&snapshot, Utc::now(), &translator);
        Ok::<Event, Infallible>(
            Event::default()
                .event("listings")
                .json_data(&view)
                .unwrap_or_else(|err| Event::default().event("error").data(err.to_string())),
        )
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

pub(crate) async fn improve_description_handler(
    State(state): State<ListingsState>,
    headers: HeaderMap,
    Json(request): Json<ImproveRequest>,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Owner).await {
        return denied.into_response();
    }

    match state.service.improve_description(&request.description).await {
        Ok(result) => (StatusCode::OK, Json(json!({ "result": result }))).into_response(),
        Err(error) => listing_error_response(&error),
    }
}
