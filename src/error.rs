use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// 嵌套集合（系列 → 季 → 集 → 媒体）操作的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    OutOfRange(String),

    #[error("{0}")]
    CapacityExceeded(String),

    #[error("{0}")]
    MinimumCardinality(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("File upload error: {0}")]
    FileUpload(String),

    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    ValidatorError(#[from] validator::ValidationErrors),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Collection(CollectionError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Collection(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::FileUpload(_)
            | AppError::ValidatorError(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::Internal(_)
            | AppError::Serialization(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给客户端的错误信息
    pub fn message(&self) -> String {
        match self {
            AppError::Database(e) => e.to_string(),
            AppError::Storage(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Internal(msg)
            | AppError::FileUpload(msg) => msg.clone(),
            AppError::Collection(e) => e.to_string(),
            AppError::Serialization(e) => e.to_string(),
            AppError::Io(e) => e.to_string(),
            AppError::ValidatorError(e) => {
                let mut fields = e
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let reason = errors
                            .iter()
                            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                            .unwrap_or_else(|| "invalid value".to_string());
                        format!("{}: {}", field, reason)
                    })
                    .collect::<Vec<_>>();
                fields.sort();
                format!("Validation failed ({})", fields.join(", "))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// 便利函数，用于创建常见错误
impl AppError {
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{} not found", resource))
    }

    pub fn internal(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }

    pub fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
