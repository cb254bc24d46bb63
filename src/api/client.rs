use super::error::ApiError;
use crate::auth::CredentialStore;
use crate::config::ApiConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;

/// Single entry point for every REST call the client makes. Attaches the
/// bearer token, frames JSON bodies, and folds status/body handling into one
/// uniform outcome so callers never touch transport details.
pub struct ApiClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None, HeaderMap::new()).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body), HeaderMap::new())
            .await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, Some(body), HeaderMap::new())
            .await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PATCH, path, Some(body), HeaderMap::new())
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None, HeaderMap::new())
            .await
    }

    /// One network round trip, no retry. Header precedence, lowest to
    /// highest: fixed JSON content type, caller extras, bearer token.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        extra_headers: HeaderMap,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in extra_headers.iter() {
            headers.insert(name, value.clone());
        }
        if let Some(token) = self.credentials.token().await {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        let mut request = self.http.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::into_outcome(response).await
    }

    /// Multipart upload. Only the auth header is attached; reqwest supplies
    /// the multipart content type and boundary.
    pub async fn upload(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.post(&url).multipart(form);
        if let Some(token) = self.credentials.token().await {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::into_outcome(response).await
    }

    pub(crate) async fn into_outcome(response: Response) -> Result<Value, ApiError> {
        let status = response.status();

        // Some servers send no body at all with 204; never attempt to read it.
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let text = response.text().await?;
        if status.is_success() {
            if text.is_empty() {
                return Ok(Value::Null);
            }
            // Plain-text bodies under a 2xx envelope degrade to the raw text
            match serde_json::from_str(&text) {
                Ok(value) => Ok(value),
                Err(_) => Ok(Value::String(text)),
            }
        } else {
            let body = match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(_) => Value::String(text),
            };
            Err(ApiError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(
            ApiConfig::new(server.uri()),
            Arc::new(MemoryCredentialStore::new()),
        )
    }

    #[tokio::test]
    async fn test_204_yields_null_regardless_of_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/teams/4/"))
            .respond_with(ResponseTemplate::new(204).set_body_string("ignored"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.delete("/teams/4/").await.unwrap();

        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_failure_carries_parsed_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/teams/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "bad"})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.get("/teams/").await.unwrap_err();

        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, json!({"detail": "bad"}));
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_raw_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/teams/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.get("/teams/").await.unwrap_err();

        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, Value::String("boom".to_string()));
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_success_body_yields_null() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/profile/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.get("/profile/").await.unwrap();

        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_non_json_success_body_yields_raw_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/profile/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.get("/profile/").await.unwrap();

        assert_eq!(result, Value::String("not json".to_string()));
    }

    #[tokio::test]
    async fn test_get_is_idempotent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/teams/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "nombre": "Alpha"}])))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let first = client.get("/teams/").await.unwrap();
        let second = client.get("/teams/").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_bearer_token_attached_when_present() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tasks/"))
            .and(header("Authorization", "Bearer secret-token"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"titulo": "Review"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(
            ApiConfig::new(mock_server.uri()),
            Arc::new(MemoryCredentialStore::with_token("secret-token")),
        );
        let result = client.post("/tasks/", &json!({"titulo": "Review"})).await.unwrap();

        assert_eq!(result["id"], 9);
    }

    #[tokio::test]
    async fn test_auth_header_omitted_without_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/teams/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client.get("/teams/").await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_caller_headers_merged_under_auth() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/export/"))
            .and(header("Accept", "text/csv"))
            .and(header("Authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a,b\n1,2"))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(
            ApiConfig::new(mock_server.uri()),
            Arc::new(MemoryCredentialStore::with_token("secret-token")),
        );

        let mut extra = HeaderMap::new();
        extra.insert("Accept", HeaderValue::from_static("text/csv"));
        let result = client
            .request(Method::GET, "/export/", None, extra)
            .await
            .unwrap();

        assert_eq!(result, Value::String("a,b\n1,2".to_string()));
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        // Nothing is listening on this port
        let client = ApiClient::new(
            ApiConfig::new("http://127.0.0.1:59999"),
            Arc::new(MemoryCredentialStore::new()),
        );
        let err = client.get("/teams/").await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.status(), None);
    }
}
