//! HTTP surface: sign-in, owner submissions, admin moderation, and the access
//! guard, exercised through the merged routers with `tower::ServiceExt`.

mod common {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use house_rent::integrations::UnconfiguredAssistant;
    use house_rent::listings::{listing_router, ListingService};
    use house_rent::moderation::{moderation_router, ModerationService};
    use house_rent::session::{session_router, InMemoryAuthProvider, SessionRegistry};
    use house_rent::store::{InMemoryListingStore, InMemoryUserDirectory};

    pub(super) fn app() -> Router {
        let store = Arc::new(InMemoryListingStore::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let assistant = Arc::new(UnconfiguredAssistant);
        let sessions = Arc::new(SessionRegistry::new(
            Arc::new(InMemoryAuthProvider::new()),
            directory.clone(),
        ));
        let listings = Arc::new(ListingService::new(store.clone(), assistant.clone()));
        let moderation = Arc::new(ModerationService::new(store, directory, assistant));

        session_router(sessions.clone())
            .merge(listing_router(listings, sessions.clone()))
            .merge(moderation_router(moderation, sessions))
    }

    pub(super) async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request builds");

        let response = app.clone().oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    pub(super) async fn register(app: &Router, email: &str, role: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": "selam123",
                "displayName": "Tigist",
                "role": role
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"].as_str().expect("token issued").to_string()
    }

    pub(super) fn submission() -> Value {
        json!({
            "title": "Two Bedroom near Piassa",
            "city": { "mode": "catalog", "value": "addis-ababa" },
            "area": "Piassa",
            "price": 18000,
            "rooms": 2,
            "maxPeople": 4,
            "environment": ["nearTransport"],
            "description": "Second floor, shared compound",
            "images": ["https://img.example/piassa.jpg"],
            "phone": "+251911111111"
        })
    }
}

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::json;

#[tokio::test]
async fn owner_submission_reaches_browse_after_admin_approval() {
    let app = app();
    let owner = register(&app, "owner@example.et", "owner").await;
    let admin = register(&app, "admin@example.et", "admin").await;

    let (status, card) = send(
        &app,
        Method::POST,
        "/api/v1/listings",
        Some(owner.as_str()),
        Some(submission()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["status"], "pending");
    assert_eq!(card["ownerName"], "Tigist");
    let id = card["id"].as_str().expect("listing id").to_string();

    let (_, browse) = send(&app, Method::GET, "/api/v1/listings/browse", None, None).await;
    assert_eq!(browse["count"], 0);

    let (status, approved) = send(
        &app,
        Method::POST,
        &format!("/api/v1/admin/listings/{id}/approve"),
        Some(admin.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, browse) = send(
        &app,
        Method::GET,
        "/api/v1/listings/browse?city=addis-ababa&rooms=2&lang=am",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(browse["count"], 1);
    assert_eq!(browse["listings"][0]["cityLabel"], "አዲስ አበባ");

    let (_, browse) = send(&app, Method::GET, "/api/v1/listings/browse?rooms=3", None, None).await;
    assert_eq!(browse["count"], 0);

    let (status, mine) = send(
        &app,
        Method::GET,
        "/api/v1/listings/mine",
        Some(owner.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["total"], 1);
    assert_eq!(mine["counts"]["approved"], 1);
}

#[tokio::test]
async fn access_guard_distinguishes_anonymous_owner_and_admin() {
    let app = app();
    let owner = register(&app, "owner@example.et", "owner").await;
    let admin = register(&app, "admin@example.et", "admin").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/admin/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["loginPath"], "/login");

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/admin/stats",
        Some(owner.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, stats) = send(
        &app,
        Method::GET,
        "/api/v1/admin/stats",
        Some(admin.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["users"], 2);
    assert_eq!(stats["total"], 0);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/listings",
        Some(admin.as_str()),
        Some(submission()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rejection_requires_a_reason_and_unknown_ids_are_not_found() {
    let app = app();
    let owner = register(&app, "owner@example.et", "owner").await;
    let admin = register(&app, "admin@example.et", "admin").await;
    let (_, card) = send(
        &app,
        Method::POST,
        "/api/v1/listings",
        Some(owner.as_str()),
        Some(submission()),
    )
    .await;
    let id = card["id"].as_str().expect("listing id").to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/admin/listings/{id}/reject"),
        Some(admin.as_str()),
        Some(json!({ "reason": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, rejected) = send(
        &app,
        Method::POST,
        &format!("/api/v1/admin/listings/{id}/reject"),
        Some(admin.as_str()),
        Some(json!({ "reason": "Phone number is unreachable" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["rejectionReason"], "Phone number is unreachable");

    let (status, dashboard) = send(
        &app,
        Method::GET,
        "/api/v1/admin/listings",
        Some(admin.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["stats"]["rejected"], 1);
    assert_eq!(dashboard["pendingReview"].as_array().map(Vec::len), Some(0));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/admin/listings/{id}"),
        Some(admin.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/admin/listings/{id}/visibility"),
        Some(admin.as_str()),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn visibility_without_a_body_toggles_the_hidden_flag() {
    let app = app();
    let owner = register(&app, "owner@example.et", "owner").await;
    let admin = register(&app, "admin@example.et", "admin").await;
    let (_, card) = send(
        &app,
        Method::POST,
        "/api/v1/listings",
        Some(owner.as_str()),
        Some(submission()),
    )
    .await;
    let id = card["id"].as_str().expect("listing id").to_string();
    let uri = format!("/api/v1/admin/listings/{id}/visibility");

    let (status, toggled) = send(&app, Method::POST, &uri, Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["hidden"], true);

    let (status, toggled) = send(&app, Method::POST, &uri, Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["hidden"], false);

    let (status, set) = send(
        &app,
        Method::POST,
        &uri,
        Some(admin.as_str()),
        Some(json!({ "hidden": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(set["hidden"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/admin/listings/nope/visibility",
        Some(admin.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_logout_and_bad_credentials() {
    let app = app();
    register(&app, "owner@example.et", "owner").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "owner@example.et", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "owner@example.et", "password": "selam123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token").to_string();

    let (_, session) = send(
        &app,
        Method::GET,
        "/api/v1/auth/session",
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(session["isOwner"], true);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/logout",
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, session) = send(
        &app,
        Method::GET,
        "/api/v1/auth/session",
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(session["isLoggedIn"], false);
}

#[tokio::test]
async fn invalid_browse_filters_are_bad_requests() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/listings/browse?rooms=many",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/listings/browse?price_min=900&price_max=100",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
