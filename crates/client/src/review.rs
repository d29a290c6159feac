use serde::de::DeserializeOwned;

use npi_inventory::{Location, ReviewClient, ReviewItem, ReviewRequest};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Review backend reached over HTTP with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpReviewClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl HttpReviewClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), api_url, token)
    }

    pub fn with_http(http: reqwest::Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            api_url,
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Check connectivity by hitting the health endpoint.
    pub async fn check_connectivity(&self) -> bool {
        match self.http.get(self.url("/health")).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let resp = check_status(resp).await?;
        resp.json().await.map_err(|e| ClientError::Parse(e.to_string()))
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(status, body = %body, "review API call failed");
    Err(ClientError::Api(status, body))
}

impl ReviewClient for HttpReviewClient {
    type Error = ClientError;

    async fn fetch_queue(&self) -> Result<Vec<ReviewItem>, ClientError> {
        self.get_json("/review").await
    }

    async fn fetch_locations(&self) -> Result<Vec<Location>, ClientError> {
        self.get_json("/locations").await
    }

    async fn submit(&self, request: &ReviewRequest) -> Result<(), ClientError> {
        let resp = self
            .http
            .patch(self.url("/review"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        check_status(resp).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let client = HttpReviewClient::new("http://localhost:8080/", "t");
        assert_eq!(client.url("/review"), "http://localhost:8080/review");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let client = HttpReviewClient::new("http://127.0.0.1:1", "t");
        assert!(!client.check_connectivity().await);
        let err = client.fetch_queue().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
