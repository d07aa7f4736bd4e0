use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::error::FetchError;

/// Anything that can resolve a user id to its JSON record.
///
/// The orchestrator is written against this seam so tests can substitute a
/// scripted fetcher for the real HTTP client.
pub trait UserFetcher {
    fn fetch_user(&self, id: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// HTTP client for the remote user endpoint.
///
/// Wraps one pooled `reqwest::Client`, built once per run and shared
/// read-only by every work item. `GET {base_url}/{id}`.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl UserFetcher for ApiClient {
    async fn fetch_user(&self, id: &str) -> Result<Value, FetchError> {
        let url = format!("{}/{id}", self.base_url);
        debug!(%url, "fetching user");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();

        if status.is_server_error() {
            return Err(FetchError::Server {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(FetchError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn success_returns_parsed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/42"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "42", "name": "Alice"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri());
        let payload = client.fetch_user("42").await.unwrap();
        assert_eq!(payload["name"], "Alice");
    }

    #[tokio::test]
    async fn server_error_maps_to_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri());
        let err = client.fetch_user("1").await.unwrap_err();
        assert!(matches!(err, FetchError::Server { status: 503 }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn client_error_maps_to_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri());
        let err = client.fetch_user("1").await.unwrap_err();
        match err {
            FetchError::Rejected { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such user");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_maps_to_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri());
        let err = client.fetch_user("1").await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_network() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = ApiClient::new(&uri);
        let err = client.fetch_user("1").await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("https://api.example.test/users/");
        assert_eq!(client.base_url, "https://api.example.test/users");
    }
}
