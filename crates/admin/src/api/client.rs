//! HTTP plumbing shared by every endpoint module.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use url::Url;

use super::ApiError;
use crate::session::Session;

const USER_AGENT: &str = concat!("cuztory-admin/", env!("CARGO_PKG_VERSION"));

/// Longest raw body echoed back as an error message.
const MAX_RAW_MESSAGE_CHARS: usize = 300;

/// Cuztory backend REST client.
///
/// Cheap to clone; clones share one connection pool and one session.
#[derive(Clone)]
pub struct AdminApiClient {
    inner: Arc<AdminApiClientInner>,
}

struct AdminApiClientInner {
    client: reqwest::Client,
    /// Base URL without a trailing slash, e.g. `http://localhost:5000/api`
    base_url: String,
    session: Session,
}

impl std::fmt::Debug for AdminApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApiClient")
            .field("base_url", &self.inner.base_url)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl AdminApiClient {
    /// Create a client for `base_url` that authenticates as `session`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: &Url, session: Session) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            inner: Arc::new(AdminApiClientInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
                session,
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Absolute URL for an API path such as `/orders/admin/all`.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// A request with the bearer token attached.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner
            .client
            .request(method, self.url(path))
            .bearer_auth(self.inner.session.token().expose_secret())
    }

    /// Send and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            return Ok(body);
        }

        let error = error_from_response(status, &body);
        tracing::warn!(status = status.as_u16(), error = %error, "Backend rejected request");
        Err(error)
    }

    /// Send and decode a JSON response.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send and discard the response body.
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.request(Method::GET, path)).await
    }
}

/// Map a non-success response to an `ApiError`.
///
/// The message is the body's `message` field, else its `error` field, else
/// the raw body, else the status reason.
pub(crate) fn error_from_response(status: StatusCode, body: &[u8]) -> ApiError {
    let message = body_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .map_or_else(|| status.to_string(), str::to_string)
    });

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Backend {
            status: status.as_u16(),
            message,
        },
    }
}

fn body_message(body: &[u8]) -> Option<String> {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice::<serde_json::Value>(body) {
        let field = ["message", "error"].into_iter().find_map(|key| {
            map.get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        });
        if let Some(field) = field {
            return Some(field.to_string());
        }
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.chars().take(MAX_RAW_MESSAGE_CHARS).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client(base: &str) -> AdminApiClient {
        AdminApiClient::new(
            &Url::parse(base).unwrap(),
            Session::new(SecretString::from("t0k3n")),
        )
        .unwrap()
    }

    #[test]
    fn test_url_joins_with_api_prefix() {
        let client = client("http://localhost:5000/api/");
        assert_eq!(
            client.url("/orders/admin/all"),
            "http://localhost:5000/api/orders/admin/all"
        );
        assert_eq!(
            client.url("collections"),
            "http://localhost:5000/api/collections"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug_output = format!("{:?}", client("http://localhost:5000/api"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("t0k3n"));
    }

    #[test]
    fn test_error_prefers_message_field() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            br#"{"message":"Cannot delete a delivered order","error":"policy"}"#,
        );
        assert!(matches!(
            &err,
            ApiError::Backend { status: 400, message } if message == "Cannot delete a delivered order"
        ));
    }

    #[test]
    fn test_error_falls_back_to_error_field() {
        let err = error_from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"Shiprocket login failed"}"#,
        );
        assert_eq!(err.to_string(), "Shiprocket login failed");
    }

    #[test]
    fn test_error_uses_raw_body_then_reason() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, b"upstream timed out");
        assert_eq!(err.to_string(), "upstream timed out");

        let err = error_from_response(StatusCode::SERVICE_UNAVAILABLE, b"  ");
        assert_eq!(err.to_string(), "Service Unavailable");
    }

    #[test]
    fn test_unauthorized_and_not_found() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, br#"{"message":"Token expired"}"#);
        assert!(matches!(err, ApiError::Unauthorized(m) if m == "Token expired"));

        let err = error_from_response(StatusCode::NOT_FOUND, br#"{"message":"Order not found"}"#);
        assert!(matches!(err, ApiError::NotFound(m) if m == "Order not found"));
    }
}
