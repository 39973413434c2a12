//! REST client for the managed object store's facade

use crate::{AccessScope, GatewayError, ObjectStore, ObjectSummary, Result, SignedUrl};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Configuration for the object store connection
#[derive(Clone)]
pub struct StorageEndpoint {
    /// Facade base URL (e.g., "http://localhost:9000")
    pub api_url: String,
    /// Bucket identifier
    pub bucket: String,
    /// Bucket region
    pub region: String,
    /// Default access level applied to every operation
    pub scope: AccessScope,
    /// Bearer token of the signed-in user
    pub access_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for StorageEndpoint {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:9000".to_string(),
            bucket: "photos".to_string(),
            region: "local".to_string(),
            scope: AccessScope::Private,
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl StorageEndpoint {
    /// Create with a custom facade URL
    pub fn with_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    /// Set the bucket and region
    pub fn with_bucket(mut self, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self.region = region.into();
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct ListBody {
    objects: Vec<ObjectSummary>,
}

/// Object store client
#[derive(Clone)]
pub struct RestObjectStore {
    client: Client,
    endpoint: StorageEndpoint,
}

impl RestObjectStore {
    /// Create a new store client against the configured facade
    pub fn new(endpoint: StorageEndpoint) -> Result<Self> {
        let client = Client::builder()
            .timeout(endpoint.timeout)
            .build()
            .map_err(GatewayError::from_transport)?;

        Ok(Self { client, endpoint })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/buckets/{}{}",
            self.endpoint.api_url, self.endpoint.bucket, path
        )
    }

    fn scope_query(&self) -> [(&'static str, String); 2] {
        [
            ("scope", self.endpoint.scope.as_str().to_string()),
            ("region", self.endpoint.region.clone()),
        ]
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.endpoint.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(GatewayError::Unknown(format!(
            "object store returned {status}: {text}"
        )))
    }
}

#[async_trait]
impl ObjectStore for RestObjectStore {
    #[instrument(skip(self))]
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let url = self.url("/objects");
        debug!("GET {}", url);

        let req = self
            .client
            .get(&url)
            .query(&self.scope_query())
            .query(&[("prefix", prefix)]);
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(GatewayError::from_transport)?;
        let response = Self::check(response).await?;

        let body: ListBody = response
            .json()
            .await
            .map_err(|e| GatewayError::Unknown(e.to_string()))?;
        Ok(body.objects)
    }

    #[instrument(skip(self))]
    async fn presign_get(&self, key: &str) -> Result<SignedUrl> {
        let url = self.url("/presign");
        debug!("GET {}", url);

        let req = self
            .client
            .get(&url)
            .query(&self.scope_query())
            .query(&[("key", key)]);
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(GatewayError::from_transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::ResolutionUnavailable(key.to_string()));
        }

        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::Unknown(e.to_string()))
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let url = self.url("/objects");
        debug!("PUT {} ({} bytes)", url, data.len());

        let req = self
            .client
            .put(&url)
            .query(&self.scope_query())
            .query(&[("key", key)])
            .header(header::CONTENT_TYPE, content_type)
            .body(data);
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(GatewayError::from_transport)?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> RestObjectStore {
        RestObjectStore::new(
            StorageEndpoint::with_url(server.uri())
                .with_bucket("photos", "eu-central-1")
                .with_token("tok-1"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_preserves_store_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/buckets/photos/objects"))
            .and(query_param("prefix", "u1/"))
            .and(query_param("scope", "private"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "objects": [
                    { "key": "u1/original/b-two.png" },
                    { "key": "u1/original/a-one.png" },
                ],
            })))
            .mount(&server)
            .await;

        let listed = store(&server).list("u1/").await.unwrap();
        let keys: Vec<_> = listed.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["u1/original/b-two.png", "u1/original/a-one.png"]);
    }

    #[tokio::test]
    async fn test_presign_missing_object_is_resolution_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/buckets/photos/presign"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = store(&server).presign_get("u1/thumbnails/a-one.png").await;
        assert!(matches!(
            result,
            Err(GatewayError::ResolutionUnavailable(key)) if key == "u1/thumbnails/a-one.png"
        ));
    }

    #[tokio::test]
    async fn test_presign_returns_signed_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/buckets/photos/presign"))
            .and(query_param("key", "u1/original/a-one.png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://cdn.example/u1/original/a-one.png?sig=abc",
                "expires_at": "2026-01-01T00:00:00Z",
            })))
            .mount(&server)
            .await;

        let signed = store(&server)
            .presign_get("u1/original/a-one.png")
            .await
            .unwrap();
        assert!(signed.url.contains("sig=abc"));
    }

    #[tokio::test]
    async fn test_put_sends_content_type_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/buckets/photos/objects"))
            .and(query_param("key", "u1/original/a-cat.png"))
            .and(header("content-type", "image/png"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .put("u1/original/a-cat.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
    }
}
