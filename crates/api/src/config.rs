use persistence::db::DatabaseConfig;
use serde::Deserialize;
use shared::Secret;
use std::collections::HashMap;
use std::fmt;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub email: EmailConfig,
    /// Key for cryptographic operations.
    pub secret_key: Secret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Mail provider used by the email service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// Logs messages instead of sending them (development).
    Console,
    /// SendGrid v3 mail API.
    Sendgrid,
}

impl fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailProvider::Console => write!(f, "console"),
            EmailProvider::Sendgrid => write!(f, "sendgrid"),
        }
    }
}

/// Email service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Explicit provider; inferred from the API key when unset.
    #[serde(default)]
    pub provider: Option<EmailProvider>,

    /// Sender email address (From header)
    #[serde(default)]
    pub sender_email: String,

    /// Sender name (From header)
    #[serde(default)]
    pub sender_name: Option<String>,

    #[serde(default)]
    pub sendgrid_api_key: Secret,

    #[serde(default = "default_sendgrid_api_url")]
    pub sendgrid_api_url: String,
}

impl EmailConfig {
    /// The configured provider, or SendGrid when an API key is present and
    /// the console otherwise.
    pub fn effective_provider(&self) -> EmailProvider {
        match self.provider {
            Some(provider) => provider,
            None if !self.sendgrid_api_key.is_empty() => EmailProvider::Sendgrid,
            None => EmailProvider::Console,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: None,
            sender_email: String::new(),
            sender_name: None,
            sendgrid_api_key: Secret::default(),
            sendgrid_api_url: default_sendgrid_api_url(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn default_sendgrid_api_url() -> String {
    "https://api.sendgrid.com".to_string()
}

/// Built-in defaults, overridden by the environment bindings.
const DEFAULTS: &str = r#"
    secret_key = ""

    [server]
    host = "0.0.0.0"
    port = 5000
    request_timeout_secs = 30

    [database]
    host = ""
    port = 3306
    user = ""
    password = ""
    name = ""

    [logging]
    level = "info"
    format = "pretty"

    [email]
    sender_email = ""
    sendgrid_api_key = ""
    sendgrid_api_url = "https://api.sendgrid.com"
"#;

/// Environment variables read at startup and the configuration key each sets.
///
/// Required (checked by [`Config::validate`]): `SECRET_KEY`,
/// `FLASK_DATABASE_HOST`, `FLASK_DATABASE_USER`, `FLASK_DATABASE`, and with
/// the SendGrid provider `FROM_EMAIL` and `SENDGRID_API_KEY`. Everything else
/// is optional.
pub const ENV_BINDINGS: &[(&str, &str)] = &[
    ("FROM_EMAIL", "email.sender_email"),
    ("SENDGRID_API_KEY", "email.sendgrid_api_key"),
    ("SECRET_KEY", "secret_key"),
    ("FLASK_DATABASE_HOST", "database.host"),
    ("FLASK_DATABASE_PASSWORD", "database.password"),
    ("FLASK_DATABASE_USER", "database.user"),
    ("FLASK_DATABASE", "database.name"),
    ("FLASK_DATABASE_PORT", "database.port"),
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("REQUEST_TIMEOUT_SECS", "server.request_timeout_secs"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
    ("EMAIL_PROVIDER", "email.provider"),
    ("FROM_NAME", "email.sender_name"),
    ("SENDGRID_API_URL", "email.sendgrid_api_url"),
];

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Loading order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. Environment variables listed in [`ENV_BINDINGS`]
    pub fn load() -> Result<Self, config::ConfigError> {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));

        let cfg = Self::from_env_vars(vars)?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Build configuration from an explicit set of variables.
    ///
    /// Does not validate; [`Config::load`] does.
    pub fn from_env_vars<I, K, V>(vars: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULTS, config::FileFormat::Toml));

        for (var, key) in ENV_BINDINGS {
            if let Some(value) = vars.get(*var) {
                builder = builder.set_override(*key, value.as_str())?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let required = [
            ("FLASK_DATABASE_HOST", self.database.host.as_str()),
            ("FLASK_DATABASE_USER", self.database.user.as_str()),
            ("FLASK_DATABASE", self.database.name.as_str()),
            ("SECRET_KEY", self.secret_key.expose()),
        ];
        for (var, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::MissingRequired(format!(
                    "{var} environment variable must be set"
                )));
            }
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Database port cannot be 0".to_string(),
            ));
        }

        if self.email.effective_provider() == EmailProvider::Sendgrid {
            if self.email.sendgrid_api_key.is_empty() {
                return Err(ConfigValidationError::MissingRequired(
                    "SENDGRID_API_KEY environment variable must be set for the sendgrid provider"
                        .to_string(),
                ));
            }
            if self.email.sender_email.trim().is_empty() {
                return Err(ConfigValidationError::MissingRequired(
                    "FROM_EMAIL environment variable must be set for the sendgrid provider"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
