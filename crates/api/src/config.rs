use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub limits: LimitsConfig,
    /// JWT authentication configuration
    pub jwt: JwtAuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Requests per minute per user on authenticated routes. 0 disables.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Send Strict-Transport-Security. Only behind HTTPS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_questions_per_template")]
    pub max_questions_per_template: usize,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Upper bound on rows scanned for export and aggregation.
    #[serde(default = "default_max_export_rows")]
    pub max_export_rows: usize,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    300
}
fn default_max_questions_per_template() -> usize {
    100
}
fn default_max_page_size() -> usize {
    200
}
fn default_max_export_rows() -> usize {
    50_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// RSA private key in PEM format for signing tokens
    pub private_key: String,

    /// RSA public key in PEM format for verifying tokens
    pub public_key: String,

    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: i64,

    /// Clock skew tolerance in seconds
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_refresh_token_expiry() -> i64 {
    2_592_000 // 30 days
}

fn default_jwt_leeway() -> u64 {
    30
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PD__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PD").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration from embedded defaults plus overrides, without
    /// touching the file system.
    #[cfg(test)]
    pub(crate) fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = ""

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [limits]

            [jwt]
            private_key = "test-private-key"
            public_key = "test-public-key"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PD__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.jwt.private_key.is_empty() || self.jwt.public_key.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PD__JWT__PRIVATE_KEY and PD__JWT__PUBLIC_KEY must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.limits.max_questions_per_template == 0
            || self.limits.max_page_size == 0
            || self.limits.max_export_rows == 0
        {
            return Err(ConfigValidationError::InvalidValue(
                "limits must be greater than 0".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(ConfigValidationError::InvalidValue(format!(
                "logging.format must be json or pretty, got {}",
                self.logging.format
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
