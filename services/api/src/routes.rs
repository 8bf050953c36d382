use crate::infra::AppState;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use mime_guess::mime::Mime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::{debug, info};

use house_rent::catalog::{self, City, EnvironmentOption};
use house_rent::error::AppError;
use house_rent::i18n::{self, Language, LanguageQuery, Lookup};
use house_rent::integrations::{
    upload_batch, AssistRequest, ImageFile, UploadBatch, MAX_IMAGE_BYTES,
};
use house_rent::listings::{listing_router, MAX_IMAGES};
use house_rent::moderation::moderation_router;
use house_rent::navigation::{self, Access, GuardOutcome, MenuEntry, Route};
use house_rent::session::session_router;

use crate::infra::Platform;

/// Room for a full batch plus one oversized file, so size failures are reported per file.
const UPLOAD_BODY_LIMIT: usize = (MAX_IMAGES + 1) * MAX_IMAGE_BYTES + 64 * 1024;

pub(crate) fn with_platform_routes(platform: &Platform) -> Router {
    session_router(platform.sessions.clone())
        .merge(listing_router(
            platform.listings.clone(),
            platform.sessions.clone(),
        ))
        .merge(moderation_router(
            platform.moderation.clone(),
            platform.sessions.clone(),
        ))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/i18n/:key", get(translation_endpoint))
        .route(
            "/api/v1/preferences/language",
            get(language_endpoint).put(set_language_endpoint),
        )
        .route("/api/v1/cities", get(cities_endpoint))
        .route("/api/v1/navigation", get(navigation_endpoint))
        .route("/api/v1/assist", post(assist_endpoint))
        .route(
            "/api/v1/uploads",
            post(upload_endpoint).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn requested_language(state: &AppState, query: &LanguageQuery) -> Language {
    match query.lang {
        Some(language) => language,
        None => state.preference.read().await.language(),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TranslationResponse {
    key: String,
    language: Language,
    text: String,
    found: bool,
}

pub(crate) async fn translation_endpoint(
    Extension(state): Extension<AppState>,
    Path(key): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Json<TranslationResponse> {
    let language = requested_language(&state, &query).await;
    let found = matches!(i18n::lookup(&key, language), Lookup::Found(_));
    let text = i18n::resolve(&key, language).to_string();
    Json(TranslationResponse {
        key,
        language,
        text,
        found,
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct SupportedLanguage {
    code: Language,
    name: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LanguageResponse {
    language: Language,
    supported: Vec<SupportedLanguage>,
}

fn language_response(language: Language) -> LanguageResponse {
    LanguageResponse {
        language,
        supported: Language::ordered()
            .into_iter()
            .map(|code| SupportedLanguage {
                code,
                name: code.native_name(),
            })
            .collect(),
    }
}

pub(crate) async fn language_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<LanguageResponse> {
    let language = state.preference.read().await.language();
    Json(language_response(language))
}

#[derive(Debug, Deserialize)]
pub(crate) struct LanguageUpdate {
    language: Language,
}

pub(crate) async fn set_language_endpoint(
    Extension(state): Extension<AppState>,
    Json(update): Json<LanguageUpdate>,
) -> Result<Json<LanguageResponse>, AppError> {
    let mut preference = state.preference.write().await;
    preference.set_language(update.language)?;
    info!(language = %update.language, "language preference updated");
    Ok(Json(language_response(preference.language())))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CityEntry {
    id: &'static str,
    name: &'static str,
    house_count: u32,
    image: &'static str,
    featured: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CitiesResponse {
    language: Language,
    total_houses: u32,
    cities: Vec<CityEntry>,
    environment_options: Vec<EnvironmentOption>,
}

pub(crate) async fn cities_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Json<CitiesResponse> {
    let language = requested_language(&state, &query).await;
    let featured = catalog::featured_cities();
    let entry = |city: &City| CityEntry {
        id: city.id,
        name: city.display_name(language),
        house_count: city.house_count,
        image: city.image,
        featured: featured.iter().any(|candidate| candidate.id == city.id),
    };

    Json(CitiesResponse {
        language,
        total_houses: catalog::total_house_count(),
        cities: catalog::cities().iter().map(entry).collect(),
        environment_options: catalog::environment_options(language),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct NavigationQuery {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    lang: Option<Language>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NavigationResponse {
    route: Route,
    path: String,
    access: Access,
    guard: GuardOutcome,
    menu: Vec<MenuEntry>,
}

pub(crate) async fn navigation_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(query): Query<NavigationQuery>,
) -> Json<NavigationResponse> {
    let language = requested_language(&state, &LanguageQuery { lang: query.lang }).await;
    let route = Route::parse(query.path.as_deref().unwrap_or("/"));
    let session = state.sessions.snapshot_for(&headers).await;
    let access = route.access();
    let guard = navigation::guard(access, &session);
    debug!(path = %route.path(), ?access, "navigation resolved");

    Json(NavigationResponse {
        path: route.path(),
        access,
        guard,
        menu: navigation::menu(&session, &i18n::Translator::new(language)),
        route,
    })
}

pub(crate) async fn assist_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<AssistRequest>,
) -> Response {
    match state.assistant.complete(&request).await {
        Ok(result) => (StatusCode::OK, Json(json!({ "result": result }))).into_response(),
        Err(error) => (error.status(), Json(json!({ "error": error.to_string() }))).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    urls: Vec<String>,
    failures: usize,
    #[serde(flatten)]
    batch: UploadBatch,
}

fn bad_upload(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Accepts `file` parts and an optional `existing` count of images already on the listing.
pub(crate) async fn upload_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(denied) = state.sessions.authorize(&headers, Access::Owner).await {
        return denied.into_response();
    }

    let mut existing = 0usize;
    let mut files = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return bad_upload(err.to_string()),
        };

        if field.name() == Some("existing") {
            let raw = match field.text().await {
                Ok(raw) => raw,
                Err(err) => return bad_upload(err.to_string()),
            };
            existing = match raw.trim().parse() {
                Ok(count) => count,
                Err(_) => {
                    return bad_upload(format!("existing must be a whole number, got '{raw}'"))
                }
            };
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .and_then(|raw| raw.parse::<Mime>().ok())
            .or_else(|| mime_guess::from_path(&file_name).first());
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => return bad_upload(err.to_string()),
        };
        files.push(ImageFile::new(file_name, content_type, bytes));
    }

    if files.is_empty() {
        return bad_upload("no files were provided".to_string());
    }

    let batch = upload_batch(state.uploader.as_ref(), existing, files).await;
    info!(
        uploaded = batch.urls().len(),
        failed = batch.failures(),
        "image batch processed"
    );
    let response = UploadResponse {
        urls: batch.urls(),
        failures: batch.failures(),
        batch,
    };
    (StatusCode::OK, Json(response)).into_response()
}
