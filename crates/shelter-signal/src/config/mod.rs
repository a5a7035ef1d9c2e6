use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub cors: CorsConfig,
    pub providers: ProvidersConfig,
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

        let allowed_origins = env::var("APP_CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            cors: CorsConfig { allowed_origins },
            providers: ProvidersConfig::from_env(),
        })
    }
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Origins the browser client is allowed to call the API from.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Credentials and endpoint for a single upstream provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Per-provider configuration. A `None` entry means the key was absent
/// from the environment; the orchestrator degrades that provider's output
/// instead of failing the whole service.
#[derive(Debug, Clone, Default)]
pub struct ProvidersConfig {
    pub rentcast: Option<ProviderConfig>,
    pub census: Option<ProviderConfig>,
    pub gemini: Option<ProviderConfig>,
}

impl ProvidersConfig {
    fn from_env() -> Self {
        Self {
            rentcast: provider_from_env("RENTCAST_API_KEY", "RENTCAST_BASE_URL", RENTCAST_BASE_URL),
            census: provider_from_env("CENSUS_API_KEY", "CENSUS_BASE_URL", CENSUS_BASE_URL),
            gemini: provider_from_env("GEMINI_API_KEY", "GEMINI_BASE_URL", GEMINI_BASE_URL),
        }
    }
}

const RENTCAST_BASE_URL: &str = "https://api.rentcast.io/v1";
const CENSUS_BASE_URL: &str = "https://api.census.gov/data/2020/acs/acs5/profile";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

fn provider_from_env(key_var: &str, url_var: &str, default_url: &str) -> Option<ProviderConfig> {
    let api_key = env::var(key_var).ok().filter(|key| !key.trim().is_empty())?;
    let base_url = env::var(url_var).unwrap_or_else(|_| default_url.to_string());
    Some(ProviderConfig { api_key, base_url })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingApiKey { provider: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingApiKey { provider } => {
                write!(f, "{provider} API key is not configured")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::MissingApiKey { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
