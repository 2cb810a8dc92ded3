pub mod config;
pub mod coupon;
pub mod doctor;
pub mod extend;
pub mod quote;
pub mod window;

use bikerent_core::errors::ApplicationError;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_REJECTED: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            user_message: None,
            correlation_id: None,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    /// Reports a failed operation through the interface error layer, so the
    /// payload carries a user-safe message and a correlation id.
    pub fn failure(
        command: &str,
        error_class: &str,
        error: impl Into<ApplicationError>,
        exit_code: u8,
    ) -> Self {
        let error: ApplicationError = error.into();
        let error = error.into_interface(Uuid::new_v4().to_string());
        warn!(
            event_name = "bikerent.cli.command_failed",
            command,
            error_class,
            correlation_id = %error.correlation_id(),
            error = %error,
            "command failed"
        );

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: error.to_string(),
            user_message: Some(error.user_message().to_string()),
            correlation_id: Some(error.correlation_id().to_string()),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

const DATE_TIME_FORMATS: [&str; 4] =
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a local wall-clock value such as `2025-06-01 10:00`.
pub fn parse_date_time(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| format!("`{value}` is not a date-time (expected YYYY-MM-DD HH:MM)"))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("`{value}` is not a date (expected YYYY-MM-DD)"))
}

pub(crate) fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use bikerent_core::errors::{ApplicationError, BookingWindowError};
    use serde_json::Value;

    use super::{parse_date, parse_date_time, CommandResult, EXIT_CONFIG, EXIT_REJECTED};

    #[test]
    fn date_time_accepts_space_or_t_separator() {
        let spaced = parse_date_time("2025-06-01 10:00").expect("spaced form");
        let iso = parse_date_time("2025-06-01T10:00:00").expect("iso form");
        assert_eq!(spaced, iso);
    }

    #[test]
    fn date_time_rejects_date_only_input() {
        let error = parse_date_time("2025-06-01").expect_err("date only");
        assert!(error.contains("YYYY-MM-DD HH:MM"));
        assert!(parse_date("01/06/2025").is_err());
    }

    #[test]
    fn success_payload_omits_missing_data() {
        let result = CommandResult::success("window", "booking window is valid");
        assert_eq!(result.exit_code, 0);
        assert!(!result.output.contains("\"data\""));
    }

    #[test]
    fn domain_failure_carries_user_message_and_correlation_id() {
        let start = parse_date_time("2025-06-01 10:00").expect("valid start");
        let result = CommandResult::failure(
            "window",
            "booking_window",
            BookingWindowError::InvertedRange { start, end: start },
            EXIT_REJECTED,
        );
        assert_eq!(result.exit_code, EXIT_REJECTED);

        let payload: Value = serde_json::from_str(&result.output).expect("valid JSON");
        assert_eq!(payload["status"], "error");
        assert_eq!(
            payload["user_message"],
            "The request could not be processed. Check inputs and try again."
        );
        let correlation_id = payload["correlation_id"].as_str().unwrap_or_default();
        assert_eq!(correlation_id.len(), 36, "expected a uuid, got {correlation_id}");
    }

    #[test]
    fn configuration_failure_is_reported_as_internal() {
        let result = CommandResult::failure(
            "extend",
            "config_validation",
            ApplicationError::Configuration("api.base_url must use http or https".to_string()),
            EXIT_CONFIG,
        );

        let payload: Value = serde_json::from_str(&result.output).expect("valid JSON");
        assert_eq!(payload["user_message"], "An unexpected internal error occurred.");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("internal error:"), "unexpected message: {message}");
    }
}
