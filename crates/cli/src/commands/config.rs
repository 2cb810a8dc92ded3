use std::env;
use std::fs;
use std::path::Path;

use bikerent_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct FieldSources<'a> {
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let sources = FieldSources { doc: config_file_doc.as_ref(), path: config_file_path.as_deref() };

    let publishable_key = config
        .payment
        .publishable_key
        .as_ref()
        .map(|key| redact_key(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let fields = [
        ("api.base_url", "BIKERENT_API_BASE_URL", config.api.base_url.clone()),
        ("api.timeout_secs", "BIKERENT_API_TIMEOUT_SECS", config.api.timeout_secs.to_string()),
        ("payment.currency", "BIKERENT_PAYMENT_CURRENCY", config.payment.currency.clone()),
        ("payment.publishable_key", "BIKERENT_PAYMENT_PUBLISHABLE_KEY", publishable_key),
        (
            "booking.max_extension_hours",
            "BIKERENT_BOOKING_MAX_EXTENSION_HOURS",
            config.booking.max_extension_hours.to_string(),
        ),
        (
            "booking.max_extension_days",
            "BIKERENT_BOOKING_MAX_EXTENSION_DAYS",
            config.booking.max_extension_days.to_string(),
        ),
        ("session.path", "BIKERENT_SESSION_PATH", config.session.path.display().to_string()),
        ("logging.level", "BIKERENT_LOGGING_LEVEL", config.logging.level.clone()),
        ("logging.format", "BIKERENT_LOGGING_FORMAT", config.logging.format.as_str().to_string()),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, env_key, value) in fields {
        lines.push(render_line(key_path, &value, field_source(key_path, env_key, &sources)));
    }

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(key_path: &str, env_key: &str, sources: &FieldSources<'_>) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = sources.doc {
        if contains_path(doc, key_path) {
            let file_path = sources
                .path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the `pk_test`/`pk_live` style prefix and hides the rest.
fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.rsplit_once('_') {
        Some((prefix, _)) => format!("{prefix}_***"),
        None => "<redacted>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, redact_key};

    #[test]
    fn publishable_keys_keep_only_their_prefix() {
        assert_eq!(redact_key("pk_test_51Habc"), "pk_test_***");
        assert_eq!(redact_key("opaque"), "<redacted>");
        assert_eq!(redact_key("  "), "<empty>");
    }

    #[test]
    fn dotted_paths_walk_nested_tables() {
        let doc: Value = "[booking]\nmax_extension_days = 7\n".parse().expect("valid toml");
        assert!(contains_path(&doc, "booking.max_extension_days"));
        assert!(!contains_path(&doc, "booking.max_extension_hours"));
    }
}
