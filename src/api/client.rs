use super::types::{Item, ItemId, ItemPatch, NewItem};
use crate::util::{validate_base_url, UrlValidationError};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Request timeout used when the config does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures talking to the todo store.
///
/// Every variant is a flavor of the same thing from the list's point of view:
/// the call did not produce an authoritative answer, so local state stays put.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Network-level error (DNS, connection refused, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Body was not the JSON shape the contract promises
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// The configured store address is unusable
    #[error("Invalid store address: {0}")]
    InvalidBaseUrl(#[from] UrlValidationError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err)
        }
    }
}

/// HTTP client for the `/todos` resource of a remote store.
///
/// Cheap to clone: the underlying `reqwest::Client` shares its connection
/// pool, so background tasks take their own copy.
#[derive(Debug, Clone)]
pub struct TodoClient {
    http: reqwest::Client,
    base: Url,
    collection: Url,
}

impl TodoClient {
    /// Build a client for the store at `base_url` with a pooled HTTP client.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()?;
        Self::with_http_client(http, base_url)
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base = validate_base_url(base_url)?;
        let collection = base.join("todos").map_err(UrlValidationError::from)?;
        tracing::debug!(base = %base, "Configured todo store");
        Ok(Self {
            http,
            base,
            collection,
        })
    }

    /// The normalized store address (always ends in `/`).
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn item_url(&self, id: &ItemId) -> Url {
        let mut url = self.collection.clone();
        // http(s) URLs always have path segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }

    /// `GET /todos`: the full collection in store order.
    pub async fn list(&self) -> Result<Vec<Item>, ApiError> {
        let response = self.http.get(self.collection.clone()).send().await?;
        let items: Vec<Item> = read_json(response).await?;
        tracing::debug!(count = items.len(), "Fetched todo list");
        Ok(items)
    }

    /// `POST /todos`: returns the stored item with its assigned id.
    pub async fn create(&self, item: &NewItem) -> Result<Item, ApiError> {
        let response = self
            .http
            .post(self.collection.clone())
            .json(item)
            .send()
            .await?;
        read_json(response).await
    }

    /// `DELETE /todos/{id}`: the response body is ignored.
    pub async fn delete(&self, id: &ItemId) -> Result<(), ApiError> {
        let response = self.http.delete(self.item_url(id)).send().await?;
        check_status(&response)?;
        Ok(())
    }

    /// `PATCH /todos/{id}`: returns the store's post-update representation.
    pub async fn update(&self, id: &ItemId, patch: &ItemPatch) -> Result<Item, ApiError> {
        let response = self
            .http
            .patch(self.item_url(id))
            .json(patch)
            .send()
            .await?;
        read_json(response).await
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::HttpStatus(status.as_u16()));
    }
    Ok(())
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    check_status(&response)?;
    let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TodoClient {
        TodoClient::new(&server.uri(), DEFAULT_TIMEOUT).unwrap()
    }

    #[tokio::test]
    async fn test_list_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "buy milk", "completed": false},
                {"id": 2, "title": "walk dog", "completed": true}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let items = client_for(&mock_server).list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, ItemId::from(1));
        assert!(items[1].completed);
    }

    #[tokio::test]
    async fn test_list_500_is_http_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1) // no retries
            .mount(&mock_server)
            .await;

        match client_for(&mock_server).list().await {
            Err(ApiError::HttpStatus(500)) => {}
            other => panic!("Expected HttpStatus(500), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_malformed_json_is_decode_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        match client_for(&mock_server).list().await {
            Err(ApiError::Decode(_)) => {}
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_sends_json_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"title": "buy milk", "completed": false})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"id": 9, "title": "buy milk", "completed": false})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let item = client_for(&mock_server)
            .create(&NewItem {
                title: "buy milk".to_string(),
                completed: Some(false),
            })
            .await
            .unwrap();
        assert_eq!(item.id, ItemId::from(9));
    }

    #[tokio::test]
    async fn test_delete_targets_item_path() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/todos/5"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server)
            .delete(&ItemId::from(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_ignores_non_json_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        assert!(client_for(&mock_server)
            .delete(&ItemId::from(5))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_delete_404_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        assert!(matches!(
            client_for(&mock_server).delete(&ItemId::from(5)).await,
            Err(ApiError::HttpStatus(404))
        ));
    }

    #[tokio::test]
    async fn test_update_sends_patch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/todos/3"))
            .and(body_json(json!({"completed": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 3, "title": "t", "completed": true})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let item = client_for(&mock_server)
            .update(&ItemId::from(3), &ItemPatch::completed(true))
            .await
            .unwrap();
        assert!(item.completed);
    }

    #[tokio::test]
    async fn test_base_path_prefix_honored() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            TodoClient::new(&format!("{}/api", mock_server.uri()), DEFAULT_TIMEOUT).unwrap();
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_string_id_is_path_encoded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/todos/a%20b"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server)
            .delete(&ItemId::from("a b"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = TodoClient::new(&mock_server.uri(), Duration::from_millis(50)).unwrap();
        assert!(matches!(client.list().await, Err(ApiError::Timeout)));
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let mock_server = MockServer::start().await;
        let body = "x".repeat(MAX_RESPONSE_SIZE + 1);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        assert!(matches!(
            client_for(&mock_server).list().await,
            Err(ApiError::ResponseTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is almost never listening
        let client = TodoClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            client.list().await,
            Err(ApiError::Network(_)) | Err(ApiError::Timeout)
        ));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            TodoClient::new("ftp://example.com", DEFAULT_TIMEOUT),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }
}
