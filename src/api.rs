//! HTTP transport for the marketplace API.
//!
//! All backend responses arrive either wrapped as `{ "data": <payload> }`
//! or as the bare payload. [`unwrap_envelope`] normalizes that exactly once,
//! here at the transport boundary; nothing above this layer re-unwraps.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Transport-level failure, split by whether an HTTP status was available.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        /// Message supplied by the server in the error body, if any.
        message: Option<String>,
    },
    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(_) => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            ApiError::Network(_) => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The seam between the stores and the network.
///
/// Production uses [`ApiClient`]; tests substitute an in-memory fake.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> ApiResult<Value>;

    /// Install or clear the bearer token used for subsequent requests.
    fn set_token(&self, token: Option<String>);

    async fn get(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        self.request(Method::GET, path, query, None).await
    }

    async fn post(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> ApiResult<Value> {
        self.request(Method::POST, path, query, body).await
    }

    async fn put(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> ApiResult<Value> {
        self.request(Method::PUT, path, query, body).await
    }

    async fn patch(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        self.request(Method::PATCH, path, query, None).await
    }

    async fn delete(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        self.request(Method::DELETE, path, query, None).await
    }
}

/// Strip the `{ "data": ... }` wrapper if present, otherwise pass through.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Coerce a payload to an array; anything non-array becomes empty.
pub fn unwrap_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Deserialize a payload into a response model. A payload that does not
/// match the expected shape counts as a malformed body.
pub fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Network(format!("malformed body: {e}")))
}

fn extract_error_message(body: &Value) -> Option<String> {
    let inner = body.get("data").unwrap_or(body);
    inner
        .get("message")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);

        if !query.is_empty() {
            request = request.query(query);
        }

        // A missing token is not an error; the request goes out
        // unauthenticated and the server decides.
        if let Some(token) = self.current_token() {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            let value: Value = serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Network(format!("malformed body: {e}")))?;
            Ok(unwrap_envelope(value))
        } else {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .as_ref()
                .and_then(extract_error_message);
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn set_token(&self, token: Option<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    /// Scripted transport for store and poller tests. Responses are served
    /// in push order; once the queue is empty every request yields an empty
    /// array, which keeps poll loops quiet.
    pub struct FakeTransport {
        responses: Mutex<VecDeque<ApiResult<Value>>>,
        calls: Mutex<Vec<RecordedCall>>,
        delay: Mutex<Duration>,
        token: Mutex<Option<String>>,
    }

    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub method: Method,
        pub path: String,
        pub query: Vec<(String, String)>,
        pub body: Option<Value>,
    }

    impl FakeTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
                delay: Mutex::new(Duration::ZERO),
                token: Mutex::new(None),
            })
        }

        pub fn push_ok(&self, value: Value) {
            self.responses.lock().unwrap().push_back(Ok(value));
        }

        pub fn push_err(&self, err: ApiError) {
            self.responses.lock().unwrap().push_back(Err(err));
        }

        pub fn push_status(&self, status: u16, message: Option<&str>) {
            self.push_err(ApiError::Status {
                status,
                message: message.map(str::to_string),
            });
        }

        /// Artificial latency per request, for schedule-timing tests.
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = delay;
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn token(&self) -> Option<String> {
            self.token.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn request(
            &self,
            method: Method,
            path: &str,
            query: &[(&str, String)],
            body: Option<Value>,
        ) -> ApiResult<Value> {
            self.calls.lock().unwrap().push(RecordedCall {
                method,
                path: path.to_string(),
                query: query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                body,
            });

            let delay = *self.delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Value::Array(Vec::new())))
        }

        fn set_token(&self, token: Option<String>) {
            *self.token.lock().unwrap() = token;
        }
    }
}
