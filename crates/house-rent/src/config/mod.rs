use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.cloudinary.com/v1_1/demo/image/upload";
const DEFAULT_UPLOAD_PRESET: &str = "house_rent";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the marketplace service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub preferences: PreferencesConfig,
    pub uploads: UploadConfig,
    pub assistant: AssistantConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let language_path = env::var("LANGUAGE_PREFERENCE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".house-rent/language.json"));

        let upload_endpoint = non_empty_var("IMAGE_UPLOAD_URL")
            .unwrap_or_else(|| DEFAULT_UPLOAD_ENDPOINT.to_string());
        if !upload_endpoint.starts_with("http://") && !upload_endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidEndpoint {
                key: "IMAGE_UPLOAD_URL",
                value: upload_endpoint,
            });
        }
        let upload_preset = non_empty_var("IMAGE_UPLOAD_PRESET")
            .unwrap_or_else(|| DEFAULT_UPLOAD_PRESET.to_string());

        let assistant = AssistantConfig {
            proxy_url: non_empty_var("AI_PROXY_URL"),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_api_base: non_empty_var("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            gemini_model: non_empty_var("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            preferences: PreferencesConfig { language_path },
            uploads: UploadConfig {
                endpoint: upload_endpoint,
                preset: upload_preset,
            },
            assistant,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Where locally persisted client preferences live.
#[derive(Debug, Clone)]
pub struct PreferencesConfig {
    pub language_path: PathBuf,
}

/// Unsigned image upload endpoint and preset name.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub endpoint: String,
    pub preset: String,
}

/// Generative text settings. A Gemini key takes precedence over a proxy URL.
#[derive(Debug, Clone, Default)]
pub struct AssistantConfig {
    pub proxy_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub gemini_model: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidEndpoint { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidEndpoint { key, value } => {
                write!(f, "{key} must be an http(s) URL, found '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidEndpoint { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "LANGUAGE_PREFERENCE_PATH",
            "IMAGE_UPLOAD_URL",
            "IMAGE_UPLOAD_PRESET",
            "AI_PROXY_URL",
            "GEMINI_API_KEY",
            "GEMINI_API_BASE",
            "GEMINI_MODEL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.uploads.preset, "house_rent");
        assert_eq!(config.assistant.gemini_model, "gemini-2.0-flash");
        assert!(config.assistant.gemini_api_key.is_none());
        assert!(config.assistant.proxy_url.is_none());
    }

    #[test]
    fn ansi_output_is_limited_to_development() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        assert!(AppConfig::load().expect("config loads").telemetry.ansi);

        env::set_var("APP_ENV", "production");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert!(!config.telemetry.ansi);

        env::set_var("APP_ENV", "ci");
        assert!(!AppConfig::load().expect("config loads").telemetry.ansi);
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn blank_assistant_settings_are_treated_as_absent() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GEMINI_API_KEY", "   ");
        env::set_var("AI_PROXY_URL", "https://proxy.example/functions/v1/gemini-proxy");
        let config = AppConfig::load().expect("config loads");
        assert!(config.assistant.gemini_api_key.is_none());
        assert_eq!(
            config.assistant.proxy_url.as_deref(),
            Some("https://proxy.example/functions/v1/gemini-proxy")
        );
        reset_env();
    }

    #[test]
    fn rejects_non_http_upload_endpoint() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("IMAGE_UPLOAD_URL", "ftp://uploads.example");
        let err = AppConfig::load().expect_err("endpoint rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidEndpoint {
                key: "IMAGE_UPLOAD_URL",
                ..
            }
        ));
        reset_env();
    }
}
