//! HTTP Transport
//!
//! HTTP client interface and implementations for OAuth2 requests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{ConfigurationError, NetworkError, OAuth2Error};

/// Default response size limit (1 MiB).
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 1_048_576;

/// HTTP request definition.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Request headers, lowercase names.
    pub headers: HashMap<String, String>,
    /// URL-encoded form body.
    pub body: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// HTTP response definition.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, lowercase names.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with an optional content type.
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        let headers = content_type
            .map(|ct| HashMap::from([("content-type".to_string(), ct.to_string())]))
            .unwrap_or_default();
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Anything below 400 counts as success, redirects included.
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    /// Declared `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&str> {
        find_header(&self.headers, "content-type")
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// HTTP transport interface (for dependency injection).
///
/// Implementations are shared between concurrent callers and must report I/O
/// failures as [`OAuth2Error::Transport`], never as a status code.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, OAuth2Error>;
}

/// Default reqwest-based HTTP transport.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
    max_response_size: usize,
}

impl ReqwestHttpTransport {
    /// Create new transport with default settings.
    pub fn new() -> Result<Self, OAuth2Error> {
        Self::with_options(Duration::from_secs(30), DEFAULT_MAX_RESPONSE_SIZE)
    }

    /// Create transport with custom options.
    pub fn with_options(timeout: Duration, max_response_size: usize) -> Result<Self, OAuth2Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none()) // Don't follow redirects for OAuth2
            .build()
            .map_err(|e| {
                OAuth2Error::Configuration(ConfigurationError::HttpClient {
                    message: e.to_string(),
                })
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
            max_response_size,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, OAuth2Error> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        req_builder = req_builder.timeout(timeout);

        let response = req_builder.send().await.map_err(|e| {
            tracing::error!(url = %request.url, error = %e, "HTTP request failed");
            if e.is_timeout() {
                OAuth2Error::Transport(NetworkError::Timeout { timeout })
            } else {
                OAuth2Error::Transport(NetworkError::ConnectionFailed {
                    message: e.to_string(),
                })
            }
        })?;

        let status = response.status().as_u16();

        // Collect headers
        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.as_str().to_lowercase(), v.to_string());
            }
        }

        // Check content length
        if let Some(len) = response.content_length() {
            if len as usize > self.max_response_size {
                return Err(OAuth2Error::Transport(NetworkError::ResponseTooLarge {
                    size: len as usize,
                }));
            }
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                OAuth2Error::Transport(NetworkError::Timeout { timeout })
            } else {
                OAuth2Error::Transport(NetworkError::BodyRead {
                    message: e.to_string(),
                })
            }
        })?;

        if body.len() > self.max_response_size {
            return Err(OAuth2Error::Transport(NetworkError::ResponseTooLarge {
                size: body.len(),
            }));
        }

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

/// Mock HTTP transport for testing.
///
/// Replies are consumed in the order they were queued.
#[derive(Default)]
pub struct MockHttpTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, NetworkError>>>,
    request_history: Mutex<Vec<HttpRequest>>,
    default_response: Mutex<Option<HttpResponse>>,
}

impl MockHttpTransport {
    /// Create new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: HttpResponse) -> &Self {
        lock(&self.replies).push_back(Ok(response));
        self
    }

    /// Queue a JSON response.
    pub fn queue_json_response(&self, status: u16, body: &serde_json::Value) -> &Self {
        self.queue_response(HttpResponse::new(
            status,
            Some("application/json"),
            body.to_string(),
        ))
    }

    /// Queue a transport failure.
    pub fn queue_error(&self, error: NetworkError) -> &Self {
        lock(&self.replies).push_back(Err(error));
        self
    }

    /// Set default response when queue is empty.
    pub fn set_default_response(&self, response: HttpResponse) -> &Self {
        *lock(&self.default_response) = Some(response);
        self
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        lock(&self.request_history).clone()
    }

    /// Get last request.
    pub fn get_last_request(&self) -> Option<HttpRequest> {
        lock(&self.request_history).last().cloned()
    }
}

// A poisoned lock only means another test thread panicked; keep the data.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, OAuth2Error> {
        lock(&self.request_history).push(request);

        let reply = lock(&self.replies).pop_front();
        match reply {
            Some(Ok(response)) => Ok(response),
            Some(Err(error)) => Err(OAuth2Error::Transport(error)),
            None => lock(&self.default_response).clone().ok_or_else(|| {
                OAuth2Error::Transport(NetworkError::ConnectionFailed {
                    message: "No mock response available".to_string(),
                })
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_mock_transport_is_fifo() {
        let transport = MockHttpTransport::new();
        transport.queue_json_response(401, &serde_json::json!({"error": "invalid_client"}));
        transport.queue_json_response(200, &serde_json::json!({"key": "value"}));

        let first = transport.send(get("https://example.com/a")).await.unwrap();
        let second = transport.send(get("https://example.com/b")).await.unwrap();
        assert_eq!(first.status, 401);
        assert_eq!(second.status, 200);
        assert!(second.body_text().contains("value"));

        let history = transport.get_requests();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].url, "https://example.com/a");
    }

    #[tokio::test]
    async fn test_mock_transport_errors() {
        let transport = MockHttpTransport::new();
        transport.queue_error(NetworkError::Timeout {
            timeout: Duration::from_secs(1),
        });

        let result = transport.send(get("https://example.com")).await;
        assert!(matches!(
            result,
            Err(OAuth2Error::Transport(NetworkError::Timeout { .. }))
        ));

        // Empty queue without a default behaves like a refused connection.
        let result = transport.send(get("https://example.com")).await;
        assert!(matches!(
            result,
            Err(OAuth2Error::Transport(NetworkError::ConnectionFailed { .. }))
        ));
    }

    #[test]
    fn test_response_helpers() {
        let mut response = HttpResponse::new(302, None, "moved");
        assert!(response.is_success());
        assert!(response.content_type().is_none());

        response
            .headers
            .insert("Content-Type".to_string(), "application/xml".to_string());
        assert_eq!(response.content_type(), Some("application/xml"));

        assert!(!HttpResponse::new(400, None, Vec::new()).is_success());
    }

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }
}
