use std::time::Duration;

use async_trait::async_trait;
use bikerent_core::api::{
    ApiEnvelope, ApiError, Credentials, ExtensionSubmission, NewBooking, RentalApi, SessionGrant,
};
use bikerent_core::config::ApiConfig;
use bikerent_core::domain::booking::{Booking, BookingId};
use bikerent_core::domain::catalog::{Account, Bike, Place, PlaceId};
use bikerent_core::domain::coupon::{Coupon, CouponCode};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// reqwest adapter for the rental REST API.
#[derive(Clone, Debug)]
pub struct HttpRentalApi {
    base_url: Url,
    client: Client,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginContent {
    token: String,
    account: Account,
}

impl HttpRentalApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|error| {
            ApiError::Transport(format!("invalid api base url `{}`: {error}", config.base_url))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|error| ApiError::Transport(format!("http client setup failed: {error}")))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base url, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::Transport(format!("api base url `{}` cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|error| {
            warn!(
                event_name = "bikerent.api.transport_failed",
                operation,
                error = %error,
                "rental api request failed"
            );
            ApiError::Transport(error.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| ApiError::Transport(error.to_string()))?;
        debug!(
            event_name = "bikerent.api.response",
            operation,
            status = status.as_u16(),
            "rental api responded"
        );

        decode_body(status, &body).map_err(|error| {
            warn!(
                event_name = "bikerent.api.rejected",
                operation,
                status = status.as_u16(),
                error = %error,
                "rental api returned an error"
            );
            error
        })
    }
}

/// Narrows a raw response into the typed content of its envelope.
pub fn decode_body<T>(status: StatusCode, body: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    if !status.is_success() {
        let message = ApiEnvelope::parse(body)
            .ok()
            .map(|envelope| envelope.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("no reason given").to_string());
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthenticated(message));
        }
        return Err(ApiError::Status { status: status.as_u16(), message });
    }

    ApiEnvelope::parse(body)?.into_content()
}

#[async_trait]
impl RentalApi for HttpRentalApi {
    async fn login(&self, credentials: &Credentials) -> Result<SessionGrant, ApiError> {
        let body = LoginBody {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };
        let request = self.client.post(self.endpoint(&["auth", "login"])?).json(&body);
        let content: LoginContent = self.execute(request, "login").await?;

        Ok(SessionGrant { token: content.token.into(), account: content.account })
    }

    async fn profile(&self, token: &SecretString) -> Result<Account, ApiError> {
        let url = self.endpoint(&["auth", "profile"])?;
        let request = self.client.get(url).bearer_auth(token.expose_secret());
        self.execute(request, "profile").await
    }

    async fn list_places(&self) -> Result<Vec<Place>, ApiError> {
        let request = self.client.get(self.endpoint(&["places"])?);
        self.execute(request, "list_places").await
    }

    async fn list_bikes(&self, place_id: Option<&PlaceId>) -> Result<Vec<Bike>, ApiError> {
        let mut request = self.client.get(self.endpoint(&["bikes"])?);
        if let Some(place_id) = place_id {
            request = request.query(&[("placeId", place_id.0.as_str())]);
        }
        self.execute(request, "list_bikes").await
    }

    async fn find_coupon(&self, code: &CouponCode) -> Result<Coupon, ApiError> {
        let request = self.client.get(self.endpoint(&["coupons", code.0.as_str()])?);
        self.execute(request, "find_coupon").await
    }

    async fn list_bookings(&self, token: &SecretString) -> Result<Vec<Booking>, ApiError> {
        let request =
            self.client.get(self.endpoint(&["bookings"])?).bearer_auth(token.expose_secret());
        self.execute(request, "list_bookings").await
    }

    async fn create_booking(
        &self,
        token: &SecretString,
        booking: &NewBooking,
    ) -> Result<Booking, ApiError> {
        let request = self
            .client
            .post(self.endpoint(&["bookings"])?)
            .bearer_auth(token.expose_secret())
            .json(booking);
        self.execute(request, "create_booking").await
    }

    async fn extend_booking(
        &self,
        token: &SecretString,
        submission: &ExtensionSubmission,
    ) -> Result<Booking, ApiError> {
        let url = self.endpoint(&["bookings", submission.booking_id.0.as_str(), "extend"])?;
        let request = self.client.post(url).bearer_auth(token.expose_secret()).json(submission);
        self.execute(request, "extend_booking").await
    }

    async fn cancel_booking(
        &self,
        token: &SecretString,
        booking_id: &BookingId,
    ) -> Result<Booking, ApiError> {
        let url = self.endpoint(&["bookings", booking_id.0.as_str(), "cancel"])?;
        let request = self.client.post(url).bearer_auth(token.expose_secret());
        self.execute(request, "cancel_booking").await
    }
}

#[cfg(test)]
mod tests {
    use bikerent_core::api::{ApiError, Credentials, RentalApi};
    use bikerent_core::config::ApiConfig;
    use bikerent_core::domain::catalog::Place;
    use reqwest::StatusCode;
    use secrecy::ExposeSecret;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::{decode_body, HttpRentalApi};

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0_u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.expect("read request");
            if read == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&raw).to_string();
            let Some(header_end) = text.find("\r\n\r\n") else { continue };
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= header_end + 4 + content_length {
                break;
            }
        }
        String::from_utf8_lossy(&raw).to_string()
    }

    fn api(base_url: &str) -> HttpRentalApi {
        HttpRentalApi::new(&ApiConfig { base_url: base_url.to_string(), timeout_secs: 5 })
            .expect("valid api config")
    }

    #[test]
    fn endpoint_joins_and_encodes_segments() {
        let api = api("https://rent.example.test/api/");

        let url = api.endpoint(&["coupons", "SUMMER 10/OFF"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://rent.example.test/api/coupons/SUMMER%2010%2FOFF");

        let url = api.endpoint(&["bookings", "BK-1", "extend"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://rent.example.test/api/bookings/BK-1/extend");
    }

    #[test]
    fn invalid_base_url_is_a_transport_error() {
        let config = ApiConfig { base_url: "not a url".into(), timeout_secs: 5 };
        let result = HttpRentalApi::new(&config);
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }

    #[test]
    fn unauthorized_status_keeps_envelope_message() {
        let result: Result<Vec<Place>, ApiError> = decode_body(
            StatusCode::UNAUTHORIZED,
            r#"{"status":"error","message":"token expired"}"#,
        );
        assert_eq!(result, Err(ApiError::Unauthenticated("token expired".to_string())));
    }

    #[test]
    fn non_success_status_without_envelope_uses_reason_phrase() {
        let result: Result<Vec<Place>, ApiError> =
            decode_body(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(
            result,
            Err(ApiError::Status { status: 502, message: "Bad Gateway".to_string() })
        );
    }

    #[test]
    fn success_status_with_error_envelope_is_rejected() {
        let result: Result<Vec<Place>, ApiError> =
            decode_body(StatusCode::OK, r#"{"status":"error","message":"no such place"}"#);
        assert_eq!(result, Err(ApiError::Rejected("no such place".to_string())));
    }

    #[tokio::test]
    async fn login_posts_credentials_and_returns_grant() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
        let address = listener.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let request = read_request(&mut socket).await;

            let body = serde_json::json!({
                "status": "success",
                "message": "",
                "content": {
                    "token": "tok-42",
                    "account": { "id": "acc-1", "name": "Ada", "email": "ada@example.test" }
                }
            })
            .to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write response");
            request
        });

        let api = api(&format!("http://{address}/api"));
        let grant = api
            .login(&Credentials {
                email: "ada@example.test".to_string(),
                password: "hunter2".to_string().into(),
            })
            .await
            .expect("login should succeed");

        assert_eq!(grant.token.expose_secret(), "tok-42");
        assert_eq!(grant.account.email, "ada@example.test");

        let request = server.await.expect("server task");
        assert!(request.starts_with("POST /api/auth/login "));
        assert!(request.contains("\"email\":\"ada@example.test\""));
    }
}
