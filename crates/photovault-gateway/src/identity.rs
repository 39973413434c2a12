//! REST client for the managed identity provider's facade

use crate::{GatewayError, IdentityGateway, Result, UserIdentity};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument};

/// Configuration for the identity provider connection
#[derive(Clone)]
pub struct IdentityEndpoint {
    /// Facade base URL (e.g., "http://localhost:8080")
    pub api_url: String,
    /// Identity pool identifier
    pub pool_id: String,
    /// Client application identifier
    pub client_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for IdentityEndpoint {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            pool_id: "local-pool".to_string(),
            client_id: "local-client".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("photovault/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl IdentityEndpoint {
    /// Create with a custom facade URL
    pub fn with_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    /// Set the pool and client identifiers
    pub fn with_pool(mut self, pool_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        self.pool_id = pool_id.into();
        self.client_id = client_id.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    subject_id: String,
    email: String,
    #[serde(default)]
    access_token: Option<String>,
}

/// Identity provider client
///
/// Token storage is internal to this gateway and lives only as long as the
/// process; a fresh process has no session until `sign_in` succeeds, which
/// is what `current_session` reports.
pub struct RestIdentityGateway {
    client: Client,
    endpoint: IdentityEndpoint,
    token: Mutex<Option<String>>,
}

impl RestIdentityGateway {
    /// Create a new gateway against the configured facade
    pub fn new(endpoint: IdentityEndpoint) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            endpoint
                .user_agent
                .parse()
                .map_err(|_| GatewayError::Unknown("invalid user agent".to_string()))?,
        );

        let client = Client::builder()
            .timeout(endpoint.timeout)
            .default_headers(headers)
            .build()
            .map_err(GatewayError::from_transport)?;

        Ok(Self {
            client,
            endpoint,
            token: Mutex::new(None),
        })
    }

    /// The bearer token of the active session, for wiring into the storage
    /// gateway
    pub fn access_token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    async fn post(&self, path: &str, body: Value) -> Result<Response> {
        let url = format!("{}{}", self.endpoint.api_url, path);
        let mut req = self.client.post(&url).json(&body);
        if let Some(token) = self.token.lock().clone() {
            req = req.bearer_auth(token);
        }

        debug!("POST {}", url);
        let response = req.send().await.map_err(GatewayError::from_transport)?;
        Self::check(response).await
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ProviderError>(&text) {
            Ok(body) => GatewayError::from_provider_code(&body.code, &body.message),
            Err(_) => GatewayError::Unknown(format!("identity provider returned {status}: {text}")),
        })
    }

    fn auth_body(&self) -> Value {
        json!({
            "pool_id": self.endpoint.pool_id,
            "client_id": self.endpoint.client_id,
        })
    }
}

#[async_trait]
impl IdentityGateway for RestIdentityGateway {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity> {
        let mut body = self.auth_body();
        body["email"] = json!(email);
        body["password"] = json!(password);

        let response = self.post("/auth/sign-in", body).await?;
        let session: SessionBody = response
            .json()
            .await
            .map_err(|e| GatewayError::Unknown(e.to_string()))?;

        *self.token.lock() = session.access_token;
        Ok(UserIdentity {
            subject_id: session.subject_id,
            email: session.email,
        })
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let mut body = self.auth_body();
        body["email"] = json!(email);
        body["password"] = json!(password);
        self.post("/auth/sign-up", body).await?;
        Ok(())
    }

    #[instrument(skip(self, code))]
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()> {
        let mut body = self.auth_body();
        body["email"] = json!(email);
        body["code"] = json!(code);
        self.post("/auth/confirm", body).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resend_confirmation(&self, email: &str) -> Result<()> {
        let mut body = self.auth_body();
        body["email"] = json!(email);
        self.post("/auth/resend-code", body).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn request_password_reset(&self, email: &str) -> Result<()> {
        let mut body = self.auth_body();
        body["email"] = json!(email);
        self.post("/auth/forgot-password", body).await?;
        Ok(())
    }

    #[instrument(skip(self, code, new_password))]
    async fn submit_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut body = self.auth_body();
        body["email"] = json!(email);
        body["code"] = json!(code);
        body["new_password"] = json!(new_password);
        self.post("/auth/confirm-forgot-password", body).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<()> {
        if self.token.lock().is_none() {
            return Ok(());
        }
        self.post("/auth/sign-out", self.auth_body()).await?;
        *self.token.lock() = None;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn current_session(&self) -> Result<UserIdentity> {
        let token = self.token.lock().clone().ok_or(GatewayError::NoActiveSession)?;

        let url = format!("{}/auth/session", self.endpoint.api_url);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(GatewayError::from_transport)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            *self.token.lock() = None;
            return Err(GatewayError::NoActiveSession);
        }

        let response = Self::check(response).await?;
        let session: SessionBody = response
            .json()
            .await
            .map_err(|e| GatewayError::Unknown(e.to_string()))?;

        Ok(UserIdentity {
            subject_id: session.subject_id,
            email: session.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> RestIdentityGateway {
        RestIdentityGateway::new(
            IdentityEndpoint::with_url(server.uri()).with_pool("pool-1", "client-1"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/sign-in"))
            .and(body_partial_json(serde_json::json!({
                "client_id": "client-1",
                "email": "ada@example.com",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subject_id": "u1",
                "email": "ada@example.com",
                "access_token": "tok-1",
            })))
            .mount(&server)
            .await;

        let gateway = gateway(&server);
        let identity = gateway.sign_in("ada@example.com", "pw").await.unwrap();

        assert_eq!(identity.subject_id, "u1");
        assert_eq!(gateway.access_token().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_sign_in_maps_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/sign-in"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": "NotAuthorizedException",
                "message": "Incorrect username or password.",
            })))
            .mount(&server)
            .await;

        let result = gateway(&server).sign_in("ada@example.com", "bad").await;
        assert!(matches!(result, Err(GatewayError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_confirm_maps_code_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/confirm"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": "CodeMismatchException",
                "message": "Invalid verification code provided.",
            })))
            .mount(&server)
            .await;

        let result = gateway(&server).confirm_sign_up("ada@example.com", "000000").await;
        assert!(matches!(result, Err(GatewayError::CodeMismatch)));
    }

    #[tokio::test]
    async fn test_current_session_without_token_skips_network() {
        // No mock mounted: a request would fail loudly.
        let server = MockServer::start().await;
        let result = gateway(&server).current_session().await;
        assert!(matches!(result, Err(GatewayError::NoActiveSession)));
    }

    #[tokio::test]
    async fn test_current_session_unauthorized_clears_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/sign-in"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subject_id": "u1",
                "email": "ada@example.com",
                "access_token": "tok-stale",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/session"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let gateway = gateway(&server);
        gateway.sign_in("ada@example.com", "pw").await.unwrap();

        let result = gateway.current_session().await;
        assert!(matches!(result, Err(GatewayError::NoActiveSession)));
        assert!(gateway.access_token().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_without_session_is_noop() {
        let server = MockServer::start().await;
        gateway(&server).sign_out().await.unwrap();
    }
}
