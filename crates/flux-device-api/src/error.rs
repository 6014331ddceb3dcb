use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flux_device::DeviceError;
use flux_timeseries::StoreError;
use serde_json::json;
use std::fmt;
use tracing::error;

/// API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 设备未找到
    DeviceNotFound(String),
    /// 请求错误
    BadRequest(String),
    /// 存储错误
    StoreError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::DeviceNotFound(mac) => write!(f, "Device not found: {}", mac),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::StoreError(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

// 从 flux_timeseries::StoreError 转换
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidTimeBound(bound) => {
                ApiError::BadRequest(format!("invalid time bound \"{}\"", bound))
            }
            other => ApiError::StoreError(other.to_string()),
        }
    }
}

// 从 flux_device::DeviceError 转换
impl From<DeviceError> for ApiError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Store(e) => e.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
