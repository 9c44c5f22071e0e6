use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::request::{RequestConfig, ResponseBody};
use crate::config::ApiConfig;
use crate::error::{codes, ApiError, ServiceResult};
use crate::logging::Logger;

enum TransportFailure {
    Cancelled,
    TimedOut(Duration),
    Network(reqwest::Error),
}

/// HTTP wrapper that resolves every call to a [`ServiceResult`].
///
/// No retries are performed here; callers decide whether a transient failure
/// is worth repeating.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    default_timeout: Duration,
    logger: Logger,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, logger: Logger) -> ServiceResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
            default_timeout: config.timeout(),
            logger,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub async fn get<T>(&self, path: &str, config: Option<RequestConfig>) -> ServiceResult<T>
    where
        T: DeserializeOwned,
    {
        self.request::<T, ()>(Method::GET, path, None, config).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B, config: Option<RequestConfig>) -> ServiceResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), config).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B, config: Option<RequestConfig>) -> ServiceResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body), config).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B, config: Option<RequestConfig>) -> ServiceResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body), config).await
    }

    pub async fn delete<T>(&self, path: &str, config: Option<RequestConfig>) -> ServiceResult<T>
    where
        T: DeserializeOwned,
    {
        self.request::<T, ()>(Method::DELETE, path, None, config).await
    }

    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> ServiceResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let config = config.unwrap_or_default();
        let request_id = Uuid::new_v4();
        let url = self.url_for(path);
        let started = Instant::now();

        self.logger.debug_with(
            "API request",
            &json!({ "requestId": request_id, "method": method.as_str(), "url": url }),
        );

        let result = self
            .execute(method.clone(), &url, body, &config)
            .await
            .and_then(|(status, body)| Self::interpret(status, body));

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => self.logger.debug_with(
                "API request succeeded",
                &json!({ "requestId": request_id, "method": method.as_str(), "url": url, "elapsedMs": elapsed_ms }),
            ),
            Err(error) => self.logger.warn_with(
                "API request failed",
                &json!({
                    "requestId": request_id,
                    "method": method.as_str(),
                    "url": url,
                    "elapsedMs": elapsed_ms,
                    "code": error.code,
                    "message": error.message,
                }),
            ),
        }

        result.and_then(|value| {
            serde_json::from_value(value).map_err(|e| {
                ApiError::new(
                    codes::RESPONSE_PARSE_ERROR,
                    format!("Response did not match the expected shape: {}", e),
                )
            })
        })
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    fn headers_for(&self, config: &RequestConfig) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => self.logger.warn("Ignoring API token that is not a valid header value"),
            }
        }

        for (name, value) in &config.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => self.logger.warn_with("Ignoring invalid request header", name),
            }
        }

        headers
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        config: &RequestConfig,
    ) -> ServiceResult<(StatusCode, Result<ResponseBody, String>)>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self
            .http
            .request(method, url)
            .headers(self.headers_for(config));

        if !config.query.is_empty() {
            builder = builder.query(&config.query);
        }

        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(|e| {
                ApiError::new(
                    codes::REQUEST_BUILD_ERROR,
                    format!("Request body could not be serialized: {}", e),
                )
            })?;
            builder = builder.body(payload);
        }

        let timeout = config.timeout.unwrap_or(self.default_timeout);
        let cancel = config.cancel.clone().unwrap_or_default();

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, content_type, bytes))
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportFailure::Cancelled),
            res = tokio::time::timeout(timeout, exchange) => match res {
                Err(_) => Err(TransportFailure::TimedOut(timeout)),
                Ok(Err(e)) => Err(TransportFailure::Network(e)),
                Ok(Ok(parts)) => Ok(parts),
            },
        };

        match outcome {
            Ok((status, content_type, bytes)) => {
                Ok((status, ResponseBody::parse(content_type.as_deref(), &bytes)))
            }
            Err(failure) => Err(Self::transport_error(failure)),
        }
    }

    fn transport_error(failure: TransportFailure) -> ApiError {
        match failure {
            TransportFailure::Cancelled => {
                ApiError::timeout("Request was aborted").with_detail("reason", "aborted")
            }
            TransportFailure::TimedOut(after) => {
                ApiError::timeout(format!("Request timed out after {}ms", after.as_millis()))
                    .with_detail("reason", "timeout")
            }
            TransportFailure::Network(e) if e.is_timeout() => {
                ApiError::timeout(format!("Request timed out: {}", e)).with_detail("reason", "timeout")
            }
            TransportFailure::Network(e) => ApiError::network(format!("Network request failed: {}", e)),
        }
    }

    fn interpret(
        status: StatusCode,
        body: Result<ResponseBody, String>,
    ) -> ServiceResult<serde_json::Value> {
        let body = body.map_err(|reason| ApiError::parse(status.as_u16(), reason))?;

        if status.is_success() {
            return Ok(body.into_value());
        }

        let status_text = status.canonical_reason().unwrap_or("Unknown Status");
        let message = body
            .message()
            .map(String::from)
            .unwrap_or_else(|| status_text.to_string());

        Err(ApiError::http(
            status.as_u16(),
            status_text,
            message,
            body.into_value(),
        ))
    }
}
