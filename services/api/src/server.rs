use crate::cli::ServeArgs;
use crate::infra::{AppState, Platform};
use crate::routes::with_platform_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use house_rent::config::AppConfig;
use house_rent::error::AppError;
use house_rent::i18n::LanguagePreference;
use house_rent::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub(crate) fn router(platform: &Platform, state: AppState) -> Router {
    with_platform_routes(platform).layer(Extension(state))
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let platform = Platform::build(&config);
    let preference = LanguagePreference::load(&config.preferences.language_path);

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        preference: Arc::new(RwLock::new(preference)),
        sessions: platform.sessions.clone(),
        uploader: platform.uploader.clone(),
        assistant: platform.assistant.clone(),
    };

    let app = router(&platform, app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "house rent marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}
