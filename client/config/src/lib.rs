use serde::Deserialize;

/// Base URL used when `MATRIQ_ENV` selects the development environment.
pub const DEV_BASE_URL: &str = "http://localhost:8000/api/v1";
/// Base URL used when `MATRIQ_ENV` selects the production environment.
pub const PROD_BASE_URL: &str = "https://matriq.example.com/api/v1";

/// Which remote deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Self::Development => DEV_BASE_URL,
            Self::Production => PROD_BASE_URL,
        }
    }
}

/// MatriQ client configuration.
///
/// The base URL is fixed at construction; there is no runtime
/// reconfiguration. Upload requests get a much longer timeout than plain
/// JSON calls because the remote recognition step itself may take up to two
/// minutes.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Selected deployment environment
    pub environment: Environment,
    /// API base URL, including the version prefix
    pub base_url: String,
    /// Timeout for JSON requests, in seconds
    pub request_timeout_secs: u64,
    /// Timeout for image upload requests, in seconds
    pub upload_timeout_secs: u64,
    /// Delay before navigating back after a failed detail load, in milliseconds
    pub nav_back_delay_ms: u64,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

impl Config {
    /// Configuration for a given environment with default bounds.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            base_url: environment.default_base_url().to_string(),
            request_timeout_secs: 10,
            upload_timeout_secs: 120,
            nav_back_delay_ms: 1500,
            log_level: "info".to_string(),
        }
    }

    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let environment = std::env::var("MATRIQ_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Development);
        let defaults = Self::for_environment(environment);
        Self {
            environment,
            base_url: std::env::var("MATRIQ_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout_secs: std::env::var("MATRIQ_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            upload_timeout_secs: std::env::var("MATRIQ_UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.upload_timeout_secs),
            nav_back_delay_ms: defaults.nav_back_delay_ms,
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}
