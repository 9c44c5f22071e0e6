use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Per-call overrides for an [`ApiClient`](super::ApiClient) request.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Response body after the content-type branch.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
    Binary(Vec<u8>),
}

impl ResponseBody {
    /// Decodes a body according to its declared content type. Without a
    /// content type JSON is attempted first, then UTF-8 text, then bytes.
    pub fn parse(content_type: Option<&str>, bytes: &[u8]) -> Result<Self, String> {
        if bytes.is_empty() {
            return Ok(ResponseBody::Empty);
        }

        let mime = content_type
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase());

        match mime.as_deref() {
            Some(m) if m == "application/json" || m.ends_with("+json") => {
                serde_json::from_slice(bytes)
                    .map(ResponseBody::Json)
                    .map_err(|e| format!("Invalid JSON body: {}", e))
            }
            Some(m) if m.starts_with("text/") || m.ends_with("+xml") || m == "application/xml" => {
                String::from_utf8(bytes.to_vec())
                    .map(ResponseBody::Text)
                    .map_err(|e| format!("Invalid UTF-8 text body: {}", e))
            }
            Some(_) => Ok(ResponseBody::Binary(bytes.to_vec())),
            None => {
                if let Ok(value) = serde_json::from_slice(bytes) {
                    return Ok(ResponseBody::Json(value));
                }
                match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => Ok(ResponseBody::Text(text)),
                    Err(e) => Ok(ResponseBody::Binary(e.into_bytes())),
                }
            }
        }
    }

    /// `message` field of a JSON object body, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(value) => value.get("message").and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Empty => Value::Null,
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
            ResponseBody::Binary(bytes) => Value::from(bytes),
        }
    }
}
