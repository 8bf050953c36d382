//! Static three-language text lookup.
//!
//! Keys map to an English, Amharic, and Afaan Oromo variant compiled into the
//! binary. Lookups never fail: unknown keys come back unchanged (with a
//! warning) and empty variants fall back to English.

pub mod preference;
mod table;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub use preference::{LanguagePreference, PreferenceError};

/// Supported display languages. `En` is the default variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Am,
    Om,
}

impl Language {
    pub const fn ordered() -> [Self; 3] {
        [Self::En, Self::Am, Self::Om]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Am => "am",
            Self::Om => "om",
        }
    }

    pub const fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Am => "አማርኛ",
            Self::Om => "Afaan Oromoo",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language code '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "am" => Ok(Self::Am),
            "om" => Ok(Self::Om),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// One string per supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalizedText {
    pub en: &'static str,
    pub am: &'static str,
    pub om: &'static str,
}

impl LocalizedText {
    /// Variant for `language`, or the English variant when that one is empty.
    pub fn get(&self, language: Language) -> &'static str {
        let variant = match language {
            Language::En => self.en,
            Language::Am => self.am,
            Language::Om => self.om,
        };
        if variant.is_empty() {
            self.en
        } else {
            variant
        }
    }
}

/// Outcome of a raw table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found(&'static str),
    Missing,
}

fn translations() -> &'static HashMap<&'static str, LocalizedText> {
    static TABLE: OnceLock<HashMap<&'static str, LocalizedText>> = OnceLock::new();
    TABLE.get_or_init(|| table::TRANSLATIONS.iter().copied().collect())
}

pub fn lookup(key: &str, language: Language) -> Lookup {
    match translations().get(key) {
        Some(text) => Lookup::Found(text.get(language)),
        None => Lookup::Missing,
    }
}

/// Resolves `key` for `language`. Unknown keys are returned verbatim.
pub fn resolve(key: &str, language: Language) -> &str {
    match lookup(key, language) {
        Lookup::Found(text) => text,
        Lookup::Missing => {
            tracing::warn!(key, %language, "translation missing");
            key
        }
    }
}

pub fn contains_key(key: &str) -> bool {
    translations().contains_key(key)
}

/// Resolver bound to a single language, handed to views that render many keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    language: Language,
}

/// `?lang=` query parameter accepted by localized endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LanguageQuery {
    #[serde(default)]
    pub lang: Option<Language>,
}

impl LanguageQuery {
    pub fn translator_or(&self, fallback: Language) -> Translator {
        Translator::new(self.lang.unwrap_or(fallback))
    }
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn t<'k>(&self, key: &'k str) -> &'k str {
        resolve(key, self.language)
    }
}
