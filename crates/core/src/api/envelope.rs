use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStatus {
    #[serde(alias = "ok")]
    Success,
    #[serde(alias = "fail", alias = "failed")]
    Error,
}

/// Body shape shared by every rental API response. Parsed first, then narrowed
/// into the typed entity the caller asked for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub content: Value,
}

impl ApiEnvelope {
    pub fn parse(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body)
            .map_err(|error| ApiError::Malformed(format!("response envelope: {error}")))
    }

    pub fn into_content<T>(self) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let content = self.accepted()?;
        serde_json::from_value(content)
            .map_err(|error| ApiError::Malformed(format!("response content: {error}")))
    }

    fn accepted(self) -> Result<Value, ApiError> {
        match self.status {
            EnvelopeStatus::Success => Ok(self.content),
            EnvelopeStatus::Error if self.message.trim().is_empty() => {
                Err(ApiError::Rejected("request was rejected without a reason".to_string()))
            }
            EnvelopeStatus::Error => Err(ApiError::Rejected(self.message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::ApiError;
    use crate::domain::catalog::Place;

    use super::{ApiEnvelope, EnvelopeStatus};

    #[test]
    fn success_envelope_narrows_into_typed_content() {
        let envelope = ApiEnvelope::parse(
            r#"{"status":"success","message":"ok","content":[{"id":"pl-1","name":"Harbour"}]}"#,
        )
        .expect("envelope should parse");

        let places: Vec<Place> = envelope.into_content().expect("content should narrow");
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Harbour");
        assert_eq!(places[0].city, None);
    }

    #[test]
    fn error_envelope_surfaces_remote_message() {
        let envelope =
            ApiEnvelope::parse(r#"{"status":"error","message":"bike unavailable","content":null}"#)
                .expect("envelope should parse");

        let result: Result<Vec<Place>, ApiError> = envelope.into_content();
        assert_eq!(result, Err(ApiError::Rejected("bike unavailable".to_string())));
    }

    #[test]
    fn status_aliases_are_accepted() {
        let envelope = ApiEnvelope::parse(r#"{"status":"ok"}"#).expect("envelope should parse");
        assert_eq!(envelope.status, EnvelopeStatus::Success);
        assert_eq!(envelope.into_content::<serde_json::Value>(), Ok(serde_json::Value::Null));

        let failed = ApiEnvelope::parse(r#"{"status":"failed"}"#).expect("envelope should parse");
        let result: Result<Vec<Place>, ApiError> = failed.into_content();
        assert!(matches!(result, Err(ApiError::Rejected(message)) if message.contains("without")));
    }

    #[test]
    fn mismatched_content_is_malformed() {
        let envelope =
            ApiEnvelope::parse(r#"{"status":"success","content":{"unexpected":true}}"#)
                .expect("envelope should parse");

        let result: Result<Vec<Place>, ApiError> = envelope.into_content();
        assert!(matches!(result, Err(ApiError::Malformed(message)) if message.contains("content")));
    }

    #[test]
    fn non_envelope_body_is_malformed() {
        assert!(matches!(ApiEnvelope::parse("<html>"), Err(ApiError::Malformed(_))));
    }
}
