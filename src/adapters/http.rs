use crate::core::session::SessionManager;
use crate::domain::model::{AdviceResponse, AppInfo, FormData, HealthStatus, TokenResponse};
use crate::domain::ports::{AdviceApi, TokenSource};
use crate::utils::error::{ApiError, ErrorDetail, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

pub const TOKEN_PATH: &str = "/token/request-token";
pub const SUBMIT_ADVICE_PATH: &str = "/tax/submit-advice";
pub const INFO_PATH: &str = "/tax/info";
pub const HEALTH_PATH: &str = "/tax/health";

/// Paths sent without a bearer token. Matching is exact: a trailing slash or
/// query string makes a different path.
pub const UNAUTHENTICATED_PATHS: [&str; 3] = [TOKEN_PATH, INFO_PATH, HEALTH_PATH];

pub fn requires_auth(path: &str) -> bool {
    !UNAUTHENTICATED_PATHS.contains(&path)
}

/// Turns a non-2xx reply into the error callers see.
pub fn normalize_error(status: u16, body: &[u8]) -> ApiError {
    if body.iter().all(u8::is_ascii_whitespace) {
        return ApiError::network(format!("Request failed with status code {}", status));
    }

    let detail = match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => map.get("detail").and_then(ErrorDetail::from_json),
        Ok(serde_json::Value::String(text)) => Some(ErrorDetail::Message(text)),
        Ok(_) => None,
        Err(_) => Some(ErrorDetail::Message(
            String::from_utf8_lossy(body).trim().to_string(),
        )),
    };

    ApiError::Rejected {
        status,
        detail,
        token_rejected: is_auth_failure(status),
    }
}

fn is_auth_failure(status: u16) -> bool {
    status == StatusCode::UNAUTHORIZED.as_u16() || status == StatusCode::FORBIDDEN.as_u16()
}

fn decode<T: DeserializeOwned>(path: &str, value: serde_json::Value) -> std::result::Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::network(format!("Unexpected response from {}: {}", path, e)))
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request; only a missing reply is an error at this level.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        bearer: Option<&str>,
    ) -> std::result::Result<(StatusCode, Vec<u8>), ApiError> {
        let url = self.url(path);
        tracing::debug!("📡 {} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("❌ Request to {} failed: {}", url, e);
            ApiError::network(format!("Network error: {}", e))
        })?;

        let status = response.status();
        tracing::debug!("📡 {} responded with {}", path, status);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("Network error: {}", e)))?;
        Ok((status, bytes.to_vec()))
    }

    fn into_json(
        path: &str,
        status: StatusCode,
        body: &[u8],
    ) -> std::result::Result<serde_json::Value, ApiError> {
        if !status.is_success() {
            return Err(normalize_error(status.as_u16(), body));
        }
        if body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::network(format!("Invalid response body from {}: {}", path, e)))
    }
}

#[async_trait]
impl TokenSource for HttpTransport {
    async fn request_token(&self) -> std::result::Result<TokenResponse, ApiError> {
        let (status, body) = self.execute(Method::GET, TOKEN_PATH, None, None).await?;
        let value = Self::into_json(TOKEN_PATH, status, &body)?;
        decode(TOKEN_PATH, value)
    }
}

/// Client for the tax API. Attaches the session token and reports
/// rejected tokens back to the session.
#[derive(Clone)]
pub struct ApiClient {
    transport: HttpTransport,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(transport: HttpTransport, session: Arc<SessionManager>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub async fn submit_for_advice(
        &self,
        form: &FormData,
    ) -> std::result::Result<AdviceResponse, ApiError> {
        let body = serde_json::to_value(form)
            .map_err(|e| ApiError::network(format!("Could not encode form: {}", e)))?;
        let value = self.send(Method::POST, SUBMIT_ADVICE_PATH, Some(body)).await?;
        if value.is_null() {
            return Ok(AdviceResponse::default());
        }
        decode(SUBMIT_ADVICE_PATH, value)
    }

    pub async fn app_info(&self) -> std::result::Result<AppInfo, ApiError> {
        let value = self.send(Method::GET, INFO_PATH, None).await?;
        decode(INFO_PATH, value)
    }

    pub async fn health(&self) -> std::result::Result<HealthStatus, ApiError> {
        let value = self.send(Method::GET, HEALTH_PATH, None).await?;
        decode(HEALTH_PATH, value)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> std::result::Result<serde_json::Value, ApiError> {
        let authenticated = requires_auth(path);
        let bearer = if authenticated {
            self.session.current_token()
        } else {
            None
        };
        if authenticated && bearer.is_none() {
            tracing::warn!("🔶 No session token cached, sending {} unauthenticated", path);
        }

        let (status, reply) = self
            .transport
            .execute(method, path, body.as_ref(), bearer.as_deref())
            .await?;

        if authenticated && is_auth_failure(status.as_u16()) {
            tracing::warn!("🔑 {} rejected the session token ({})", path, status);
            if let Err(e) = self.session.on_token_rejected(status.as_u16()).await {
                tracing::error!("❌ Could not re-establish session: {}", e);
            }
        }

        HttpTransport::into_json(path, status, &reply)
    }
}

#[async_trait]
impl AdviceApi for ApiClient {
    async fn submit_for_advice(
        &self,
        form: &FormData,
    ) -> std::result::Result<AdviceResponse, ApiError> {
        ApiClient::submit_for_advice(self, form).await
    }
}
