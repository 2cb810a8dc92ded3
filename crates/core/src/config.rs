use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::extension::ExtendBy;
use crate::errors::ExtensionError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub payment: PaymentConfig,
    pub booking: BookingConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct PaymentConfig {
    pub currency: String,
    pub publishable_key: Option<SecretString>,
}

/// Upper bounds the booking screens put on extension amounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookingConfig {
    pub max_extension_hours: u32,
    pub max_extension_days: u32,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub payment_currency: Option<String>,
    pub session_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig { base_url: "http://localhost:5000/api".to_string(), timeout_secs: 30 },
            payment: PaymentConfig { currency: "EUR".to_string(), publishable_key: None },
            booking: BookingConfig { max_extension_hours: 168, max_extension_days: 30 },
            session: SessionConfig { path: PathBuf::from(".bikerent/session.json") },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl BookingConfig {
    pub fn extension_limit(&self, extend_by: ExtendBy) -> u32 {
        match extend_by {
            ExtendBy::Hour => self.max_extension_hours,
            ExtendBy::Day => self.max_extension_days,
        }
    }

    /// Rejects amounts above the configured bound. Non-positive amounts are
    /// left to the extension calculator.
    pub fn ensure_extension_within(
        &self,
        extend_by: ExtendBy,
        amount: i64,
    ) -> Result<(), ExtensionError> {
        let limit = self.extension_limit(extend_by);
        if amount > i64::from(limit) {
            return Err(ExtensionError::AboveLimit { amount, unit: extend_by.unit(), limit });
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("bikerent.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(api) = patch.api {
            if let Some(base_url) = api.base_url {
                self.api.base_url = base_url;
            }
            if let Some(timeout_secs) = api.timeout_secs {
                self.api.timeout_secs = timeout_secs;
            }
        }

        if let Some(payment) = patch.payment {
            if let Some(currency) = payment.currency {
                self.payment.currency = currency;
            }
            if let Some(publishable_key) = payment.publishable_key {
                self.payment.publishable_key = Some(secret_value(publishable_key));
            }
        }

        if let Some(booking) = patch.booking {
            if let Some(max_extension_hours) = booking.max_extension_hours {
                self.booking.max_extension_hours = max_extension_hours;
            }
            if let Some(max_extension_days) = booking.max_extension_days {
                self.booking.max_extension_days = max_extension_days;
            }
        }

        if let Some(path) = patch.session.and_then(|session| session.path) {
            self.session.path = path;
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BIKERENT_API_BASE_URL") {
            self.api.base_url = value;
        }
        if let Some(value) = read_env("BIKERENT_API_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_u64("BIKERENT_API_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("BIKERENT_PAYMENT_CURRENCY") {
            self.payment.currency = value;
        }
        if let Some(value) = read_env("BIKERENT_PAYMENT_PUBLISHABLE_KEY") {
            self.payment.publishable_key = Some(secret_value(value));
        }

        if let Some(value) = read_env("BIKERENT_BOOKING_MAX_EXTENSION_HOURS") {
            self.booking.max_extension_hours =
                parse_u32("BIKERENT_BOOKING_MAX_EXTENSION_HOURS", &value)?;
        }
        if let Some(value) = read_env("BIKERENT_BOOKING_MAX_EXTENSION_DAYS") {
            self.booking.max_extension_days =
                parse_u32("BIKERENT_BOOKING_MAX_EXTENSION_DAYS", &value)?;
        }

        if let Some(value) = read_env("BIKERENT_SESSION_PATH") {
            self.session.path = PathBuf::from(value);
        }

        let log_level =
            read_env("BIKERENT_LOGGING_LEVEL").or_else(|| read_env("BIKERENT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BIKERENT_LOGGING_FORMAT").or_else(|| read_env("BIKERENT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(api_base_url) = overrides.api_base_url {
            self.api.base_url = api_base_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(payment_currency) = overrides.payment_currency {
            self.payment.currency = payment_currency;
        }
        if let Some(session_path) = overrides.session_path {
            self.session.path = session_path;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_api(&self.api)?;
        validate_payment(&self.payment)?;
        validate_booking(&self.booking)?;
        validate_session(&self.session)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("bikerent.toml"), PathBuf::from("config/bikerent.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_api(api: &ApiConfig) -> Result<(), ConfigError> {
    let base_url = api.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "api.base_url must start with http:// or https://".to_string(),
        ));
    }

    if api.timeout_secs == 0 || api.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "api.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_payment(payment: &PaymentConfig) -> Result<(), ConfigError> {
    let currency = payment.currency.trim();
    if currency.len() != 3 || !currency.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(ConfigError::Validation(format!(
            "payment.currency must be a three-letter ISO code, got `{currency}`"
        )));
    }

    let blank_key = payment
        .publishable_key
        .as_ref()
        .map(|value| value.expose_secret().trim().is_empty())
        .unwrap_or(false);
    if blank_key {
        return Err(ConfigError::Validation(
            "payment.publishable_key must not be blank when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_booking(booking: &BookingConfig) -> Result<(), ConfigError> {
    if booking.max_extension_hours == 0 {
        return Err(ConfigError::Validation(
            "booking.max_extension_hours must be greater than zero".to_string(),
        ));
    }

    if booking.max_extension_days == 0 {
        return Err(ConfigError::Validation(
            "booking.max_extension_days must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("session.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    api: Option<ApiPatch>,
    payment: Option<PaymentPatch>,
    booking: Option<BookingPatch>,
    session: Option<SessionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PaymentPatch {
    currency: Option<String>,
    publishable_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BookingPatch {
    max_extension_hours: Option<u32>,
    max_extension_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
