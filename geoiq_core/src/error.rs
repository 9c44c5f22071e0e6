//! Uniform service result contract and error taxonomy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Result returned by every service boundary.
pub type ServiceResult<T> = std::result::Result<T, ApiError>;

/// Stable machine-readable error codes.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";
    pub const REQUEST_BUILD_ERROR: &str = "REQUEST_BUILD_ERROR";
    pub const RESPONSE_PARSE_ERROR: &str = "RESPONSE_PARSE_ERROR";
    pub const STORAGE_READ_ERROR: &str = "STORAGE_READ_ERROR";
    pub const STORAGE_WRITE_ERROR: &str = "STORAGE_WRITE_ERROR";
    pub const STORAGE_DELETE_ERROR: &str = "STORAGE_DELETE_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref().and_then(|details| details.get(key))
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(codes::NETWORK_ERROR, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(codes::REQUEST_TIMEOUT, message)
    }

    pub fn parse(status: u16, message: impl Into<String>) -> Self {
        Self::new(codes::RESPONSE_PARSE_ERROR, message).with_detail("status", status)
    }

    pub fn http(status: u16, status_text: &str, message: impl Into<String>, response_data: Value) -> Self {
        Self::new(format!("HTTP_{}", status), message)
            .with_detail("status", status)
            .with_detail("statusText", status_text)
            .with_detail("responseData", response_data)
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::new(codes::NOT_FOUND, format!("{} '{}' not found", entity, id))
            .with_detail("entity", entity)
            .with_detail("id", id)
    }

    /// Wraps an unexpected failure as `<ENTITY>_<OP>_ERROR`.
    pub fn operation(entity: &str, op: &str, message: impl Into<String>) -> Self {
        Self::new(
            format!("{}_{}_ERROR", entity.to_uppercase(), op.to_uppercase()),
            message,
        )
    }

    /// True for failures a user can reasonably retry.
    pub fn is_transient(&self) -> bool {
        self.code == codes::NETWORK_ERROR || self.code == codes::REQUEST_TIMEOUT
    }

    pub fn is_storage_error(&self) -> bool {
        self.code.starts_with("STORAGE_")
    }
}

/// Wire envelope: `{success: true, data}` or `{success: false, error}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> From<ServiceResult<T>> for ServiceResponse<T> {
    fn from(result: ServiceResult<T>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(error) => Self {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

impl<T> ServiceResponse<T> {
    pub fn into_result(self) -> ServiceResult<T> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (false, _, Some(error)) => Err(error),
            (true, None, _) => Err(ApiError::new(
                codes::RESPONSE_PARSE_ERROR,
                "Successful envelope carried no data",
            )),
            (false, _, None) => Err(ApiError::new(
                codes::RESPONSE_PARSE_ERROR,
                "Failed envelope carried no error",
            )),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::new(codes::CONFIG_ERROR, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_error_shape() {
        let err = ApiError::http(404, "Not Found", "not found", json!({"message": "not found"}));
        assert_eq!(err.code, "HTTP_404");
        assert_eq!(err.message, "not found");
        assert_eq!(err.detail("status"), Some(&json!(404)));
        assert_eq!(err.detail("statusText"), Some(&json!("Not Found")));
    }

    #[test]
    fn test_operation_code() {
        let err = ApiError::operation("brand", "update", "boom");
        assert_eq!(err.code, "BRAND_UPDATE_ERROR");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_envelope_serialization() {
        let ok: ServiceResponse<u32> = Ok(7).into();
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value, json!({"success": true, "data": 7}));

        let failed: ServiceResponse<u32> = Err(ApiError::network("offline")).into();
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"]["code"], json!("NETWORK_ERROR"));
        assert!(value.get("data").is_none());

        let back: ServiceResponse<u32> = serde_json::from_value(value).unwrap();
        assert!(back.into_result().unwrap_err().is_transient());
    }
}
