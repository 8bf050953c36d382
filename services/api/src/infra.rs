use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use house_rent::config::AppConfig;
use house_rent::i18n::LanguagePreference;
use house_rent::integrations::{assistant, HttpImageUploader, ImageUploader, TextAssistant};
use house_rent::listings::ListingService;
use house_rent::moderation::ModerationService;
use house_rent::session::{InMemoryAuthProvider, SessionRegistry};
use house_rent::store::{InMemoryListingStore, InMemoryUserDirectory};
use tokio::sync::RwLock;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) preference: Arc<RwLock<LanguagePreference>>,
    pub(crate) sessions: Arc<SessionRegistry>,
    pub(crate) uploader: Arc<dyn ImageUploader>,
    pub(crate) assistant: Arc<dyn TextAssistant>,
}

/// Stores, providers, and services wired against the in-process backends.
pub(crate) struct Platform {
    pub(crate) store: Arc<InMemoryListingStore>,
    pub(crate) sessions: Arc<SessionRegistry>,
    pub(crate) listings: Arc<ListingService>,
    pub(crate) moderation: Arc<ModerationService>,
    pub(crate) assistant: Arc<dyn TextAssistant>,
    pub(crate) uploader: Arc<dyn ImageUploader>,
}

impl Platform {
    pub(crate) fn build(config: &AppConfig) -> Self {
        let assistant = assistant::from_config(&config.assistant);
        let uploader: Arc<dyn ImageUploader> = Arc::new(HttpImageUploader::new(&config.uploads));
        Self::with_integrations(assistant, uploader)
    }

    pub(crate) fn with_integrations(
        assistant: Arc<dyn TextAssistant>,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        let store = Arc::new(InMemoryListingStore::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let sessions = Arc::new(SessionRegistry::new(
            Arc::new(InMemoryAuthProvider::new()),
            directory.clone(),
        ));
        let listings = Arc::new(ListingService::new(store.clone(), assistant.clone()));
        let moderation = Arc::new(ModerationService::new(
            store.clone(),
            directory,
            assistant.clone(),
        ));

        Self {
            store,
            sessions,
            listings,
            moderation,
            assistant,
            uploader,
        }
    }
}
