use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    models::OrderStatus,
    response::{ApiResponse, Meta},
};

/// Closed set of failure kinds callers switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    InvalidTransition,
    PreconditionFailed,
    ResourceExhausted,
    ExternalWriteFailed,
    LocalWriteFailed,
    Unauthorized,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Bad Request {0}")]
    InvalidArgument(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("{0}")]
    ResourceExhausted(String),

    #[error("External write failed: {0}")]
    ExternalWriteFailed(String),

    #[error("{context}: {source}")]
    LocalWriteFailed {
        context: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Forbidden")]
    Unauthorized,

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            AppError::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            AppError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            AppError::ExternalWriteFailed(_) => ErrorKind::ExternalWriteFailed,
            AppError::LocalWriteFailed { .. } => ErrorKind::LocalWriteFailed,
            AppError::Unauthorized => ErrorKind::Unauthorized,
            AppError::OrmError(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Wraps the failure of the local half of a dual write.
    pub fn local_write(context: impl Into<String>, source: AppError) -> Self {
        AppError::LocalWriteFailed {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through `LocalWriteFailed` wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::LocalWriteFailed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            AppError::ResourceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ExternalWriteFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::LocalWriteFailed { source, .. } => source.status_code(),
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::OrmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    kind: ErrorKind,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                kind: self.kind(),
                error: self.root().to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
