use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deadpool_redis::{CreatePoolError, PoolError, redis::RedisError};
use log::warn;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use serde_json::Error as JsonError;
use sqlx::Error as SqlxError;
use std::{error::Error as StdError, fmt, io::Error as IoError};
use tokio::time::error::Elapsed;

pub static SYSTEM_ERROR_CODE: i64 = -1000;
pub static SYSTEM_ERROR_CODE_DB: i64 = -1001;
pub static SYSTEM_ERROR_CODE_IO: i64 = -1002;
pub static SYSTEM_ERROR_CODE_RATE_LIMIT: i64 = -1003;
pub static SYSTEM_ERROR_CODE_JSON: i64 = -1004;
pub static SYSTEM_ERROR_CODE_LLM: i64 = -1005;
pub static SYSTEM_ERROR_CODE_TIMEOUT: i64 = -1006;

#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub message: String,
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub code: i64,
}

fn serialize_status<S>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_u16(status.as_u16())
}

impl AppError {
    pub fn new(message: impl Into<String>, status: StatusCode, code: i64) -> Self {
        Self {
            message: message.into(),
            status,
            code,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            message,
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE,
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST, SYSTEM_ERROR_CODE)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::NOT_FOUND, SYSTEM_ERROR_CODE)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(
            message,
            StatusCode::TOO_MANY_REQUESTS,
            SYSTEM_ERROR_CODE_RATE_LIMIT,
        )
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_GATEWAY, SYSTEM_ERROR_CODE_LLM)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(
            message,
            StatusCode::GATEWAY_TIMEOUT,
            SYSTEM_ERROR_CODE_TIMEOUT,
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"{{"message":"{}","status":{},"code":{}}}"#,
            self.message,
            self.status.as_u16(),
            self.code
        )
    }
}

impl StdError for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        warn!(
            "AppError ({}): {} (HTTP {})",
            self.code,
            self.message,
            self.status.as_u16()
        );
        (self.status, Json(self)).into_response()
    }
}

// --------------------
// Error conversions
// --------------------

impl From<SqlxError> for AppError {
    fn from(value: SqlxError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::BAD_GATEWAY,
            SYSTEM_ERROR_CODE_DB,
        )
    }
}

impl From<RedisError> for AppError {
    fn from(value: RedisError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::BAD_GATEWAY,
            SYSTEM_ERROR_CODE_DB,
        )
    }
}

impl From<CreatePoolError> for AppError {
    fn from(value: CreatePoolError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_DB,
        )
    }
}

impl From<PoolError> for AppError {
    fn from(value: PoolError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::BAD_GATEWAY,
            SYSTEM_ERROR_CODE_DB,
        )
    }
}

impl From<IoError> for AppError {
    fn from(value: IoError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_IO,
        )
    }
}

impl From<JsonError> for AppError {
    fn from(value: JsonError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_JSON,
        )
    }
}

impl From<ReqwestError> for AppError {
    fn from(value: ReqwestError) -> Self {
        if value.is_timeout() {
            return Self::timeout(format!("{value}"));
        }
        Self::upstream(format!("{value}"))
    }
}

impl From<Elapsed> for AppError {
    fn from(value: Elapsed) -> Self {
        Self::timeout(format!("{value}"))
    }
}
