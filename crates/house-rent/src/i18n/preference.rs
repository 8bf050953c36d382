use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Language, Translator};

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("unable to write language preference to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to encode language preference: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPreference {
    language: Language,
}

/// Selected display language, persisted to a small JSON file.
#[derive(Debug, Clone)]
pub struct LanguagePreference {
    path: PathBuf,
    language: Language,
}

impl LanguagePreference {
    /// Restores the saved language. Missing or unreadable files yield the default language.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let language = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<StoredPreference>(&raw) {
                Ok(stored) => stored.language,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "ignoring malformed language preference"
                    );
                    Language::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Language::default(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "language preference unreadable");
                Language::default()
            }
        };

        debug!(%language, "language preference restored");
        Self { path, language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn translator(&self) -> Translator {
        Translator::new(self.language)
    }

    /// Switches language and writes it through to disk.
    pub fn set_language(&mut self, language: Language) -> Result<(), PreferenceError> {
        let payload = serde_json::to_string_pretty(&StoredPreference { language })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PreferenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, payload).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })?;

        self.language = language;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn scratch_path(label: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!("house-rent-pref-{}-{label}-{n}", std::process::id()))
            .join("language.json")
    }

    #[test]
    fn missing_file_defaults_to_english() {
        let preference = LanguagePreference::load(scratch_path("missing"));
        assert_eq!(preference.language(), Language::En);
    }

    #[test]
    fn saved_language_is_restored_on_load() {
        let path = scratch_path("roundtrip");
        let mut preference = LanguagePreference::load(&path);
        preference
            .set_language(Language::Om)
            .expect("preference persists");

        let restored = LanguagePreference::load(&path);
        assert_eq!(restored.language(), Language::Om);
        assert_eq!(restored.translator().t("nav.cities"), "Magaalota");

        let _ = fs::remove_dir_all(path.parent().expect("scratch dir"));
    }

    #[test]
    fn malformed_file_falls_back_to_default() {
        let path = scratch_path("malformed");
        fs::create_dir_all(path.parent().expect("scratch dir")).expect("dir created");
        fs::write(&path, "{\"language\": \"fr\"}").expect("file written");

        let preference = LanguagePreference::load(&path);
        assert_eq!(preference.language(), Language::En);

        let _ = fs::remove_dir_all(path.parent().expect("scratch dir"));
    }
}
