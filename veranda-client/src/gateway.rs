use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

const REFRESH_ENDPOINT: &str = "/auth/refresh-token";

/// All backend traffic goes through here. Credentials ride on the
/// cookie store; a 401/403 triggers one silent refresh followed by
/// one retry of the original request. This is the only module allowed
/// to call the refresh endpoint.
pub struct ApiGateway {
    http: Client,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Session expired: credential refresh was rejected")]
    SessionExpired,

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl ApiGateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        // Validate up front so a bad base URL fails at wiring time,
        // not on the first request
        Url::parse(base_url).map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let http = Client::builder()
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get(&self, path: &str) -> Result<Response, GatewayError> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, GatewayError> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, Some(body)).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, GatewayError> {
        let url = self.endpoint(path)?;
        let response = self.send(method.clone(), url.clone(), body.as_ref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED
            && response.status() != StatusCode::FORBIDDEN
        {
            return Ok(response);
        }

        info!(%url, status = %response.status(), "Credentials rejected, attempting silent refresh");
        let refresh_url = self.endpoint(REFRESH_ENDPOINT)?;
        let refresh = self.http.post(refresh_url).send().await?;
        if !refresh.status().is_success() {
            warn!(status = %refresh.status(), "Credential refresh rejected");
            return Err(GatewayError::SessionExpired);
        }

        // Exactly one retry. If it comes back 401 again the caller
        // sees that response; there is no second refresh.
        let retried = self.send(method, url, body.as_ref()).await?;
        Ok(retried)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}
