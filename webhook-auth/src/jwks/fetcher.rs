//! Key set fetcher over HTTP.

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use tracing::{debug, warn};

use super::KeySetFetcher;
use crate::error::{jwks_error, Error, ErrorKind, JwksErrorKind};
use crate::http::{HttpClient, HttpClientBuilder, HttpClientConfig};

/// Fetches key sets with a retrying HTTP client.
pub struct HttpKeySetFetcher {
    client: HttpClient,
}

impl HttpKeySetFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: HttpClientConfig) -> Result<Self, Error> {
        let client = HttpClientBuilder::with_config(config).build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch(&self, url: &str) -> Result<JwkSet, Error> {
        debug!("Fetching key set from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Key set fetch from {} returned {}", url, status);
            return Err(jwks_error(
                JwksErrorKind::FetchFailed,
                &format!("key set endpoint returned {}", status),
            ));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<JwkSet>(&body).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Jwks(JwksErrorKind::InvalidKeySet),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpErrorKind;

    const KEY_SET: &str = r#"{"keys":[{"kty":"EC","crv":"P-256","kid":"key-1","x":"f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU","y":"x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0"}]}"#;

    fn fetcher() -> HttpKeySetFetcher {
        let client = HttpClientBuilder::with_config(HttpClientConfig {
            max_retries: 0,
            ..HttpClientConfig::default()
        })
        .build()
        .unwrap();
        HttpKeySetFetcher::new(client)
    }

    #[tokio::test]
    async fn test_fetch_key_set() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/.well-known/jwks.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(KEY_SET)
            .create_async()
            .await;

        let url = format!("{}/.well-known/jwks.json", server.url());
        let key_set = fetcher().fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert!(key_set.find("key-1").is_some());
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/jwks.json")
            .with_status(404)
            .create_async()
            .await;

        let err = fetcher()
            .fetch(&format!("{}/jwks.json", server.url()))
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwks(JwksErrorKind::FetchFailed));
    }

    #[tokio::test]
    async fn test_invalid_json_is_invalid_key_set() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/jwks.json")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = fetcher()
            .fetch(&format!("{}/jwks.json", server.url()))
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Jwks(JwksErrorKind::InvalidKeySet));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let err = fetcher()
            .fetch("http://127.0.0.1:1/jwks.json")
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Http(HttpErrorKind::Network));
    }
}
