use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::settings::Settings;

/// Longest slice of an error body kept in `CoreError::Api`.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Thin wrapper around `reqwest::Client` for the dashboard backend.
///
/// - Every path is resolved against `{api_base_url}{api_prefix}`.
/// - The bearer token (if configured) and session cookies go with every request.
/// - HTTP 401 becomes `CoreError::Unauthorized` carrying the login URL.
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    settings: Settings,
}

impl ApiClient {
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Absolute URL for an API path such as "/operations".
    pub fn url(&self, path: &str) -> String {
        self.settings.api_url(path)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, CoreError> {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(token) = &self.settings.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| CoreError::Config("auth_token contains invalid characters".into()))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        Ok(builder)
    }

    /// Send a request and return the response body of a 2xx answer.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String, CoreError> {
        let mut builder = self.request(method.clone(), path)?;
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        debug!(%method, path, "API request");
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if let Err(e) = Self::check_status(status, &text, path, &self.settings.login_url()) {
            warn!(%method, path, status = status.as_u16(), error = %e, "API request failed");
            return Err(e);
        }
        Ok(text)
    }

    /// Map an HTTP status to the library's error type.
    pub fn check_status(
        status: StatusCode,
        body: &str,
        path: &str,
        login_url: &str,
    ) -> Result<(), CoreError> {
        if status.is_success() {
            return Ok(());
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(CoreError::Unauthorized {
                login_url: login_url.to_string(),
            }),
            StatusCode::NOT_FOUND => Err(CoreError::NotFound(path.to_string())),
            _ => Err(CoreError::Api {
                status: status.as_u16(),
                message: error_message(status, body),
            }),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        let text = self.send(Method::GET, path, None).await?;
        parse_json(&text, path)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let text = self.send(Method::POST, path, Some(body)).await?;
        parse_json(&text, path)
    }

    /// POST without a request body, ignoring whatever the backend answers.
    pub async fn post_empty(&self, path: &str) -> Result<(), CoreError> {
        self.send(Method::POST, path, None).await.map(|_| ())
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let text = self.send(Method::PUT, path, Some(body)).await?;
        parse_json(&text, path)
    }

    pub async fn delete(&self, path: &str) -> Result<(), CoreError> {
        self.send(Method::DELETE, path, None).await.map(|_| ())
    }
}

fn parse_json<T: DeserializeOwned>(text: &str, path: &str) -> Result<T, CoreError> {
    serde_json::from_str(text)
        .map_err(|e| CoreError::Deserialization(format!("Failed to parse response of {path}: {e}")))
}

/// Prefer a `detail`/`message`/`error` field of a JSON error body, fall back
/// to the raw body, then to the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|v| {
        ["detail", "message", "error"]
            .iter()
            .find_map(|key| v.get(*key).and_then(|f| f.as_str()).map(str::to_string))
    });

    let message = match from_json {
        Some(m) => m,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status.canonical_reason().unwrap_or("Unknown error").to_string(),
    };

    truncate_chars(&message, MAX_ERROR_BODY_CHARS)
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
