use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 网关错误
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no file selected")]
    NoFileSelected,

    #[error("only one file can be uploaded at a time")]
    FileAlreadySelected,

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("file is {size} bytes, limit is {limit}")]
    FileTooLarge { size: usize, limit: usize },

    #[error("file is empty")]
    EmptyFile,

    #[error("verification already in progress")]
    VerificationInProgress,

    #[error("no verification result to act on")]
    NoResult,

    #[error("edit targets a {found} but the result is a {expected}")]
    VariantMismatch { expected: String, found: String },

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("line item {index} out of range ({len} items)")]
    LineItemOutOfRange { index: usize, len: usize },

    #[error("transaction {index} out of range ({len} transactions)")]
    TransactionOutOfRange { index: usize, len: usize },

    #[error("error during verification: {0}")]
    Transport(String),

    #[error("verification cancelled before the service answered")]
    Cancelled,

    #[error("verification service rejected the token")]
    Unauthorized,

    #[error("verification service rate limit reached")]
    RateLimited,

    #[error("verification service unavailable")]
    ServiceUnavailable,

    #[error("verification rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[error("malformed verification response: {0}")]
    MalformedResponse(String),

    #[error("multipart error: {0}")]
    Multipart(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("export error: {0}")]
    Export(String),
}

impl AppError {
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// 稳定的错误码, 供前端分支处理
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFileSelected => "NO_FILE_SELECTED",
            Self::FileAlreadySelected => "FILE_ALREADY_SELECTED",
            Self::UnsupportedContentType(_) => "UNSUPPORTED_CONTENT_TYPE",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::EmptyFile => "EMPTY_FILE",
            Self::VerificationInProgress => "VERIFICATION_IN_PROGRESS",
            Self::NoResult => "NO_RESULT",
            Self::VariantMismatch { .. } => "VARIANT_MISMATCH",
            Self::InvalidField { .. } => "INVALID_FIELD",
            Self::LineItemOutOfRange { .. } => "LINE_ITEM_OUT_OF_RANGE",
            Self::TransactionOutOfRange { .. } => "TRANSACTION_OUT_OF_RANGE",
            Self::Transport(_) => "VERIFICATION_FAILED",
            Self::Cancelled => "VERIFICATION_CANCELLED",
            Self::Unauthorized => "UPSTREAM_UNAUTHORIZED",
            Self::RateLimited => "UPSTREAM_RATE_LIMITED",
            Self::ServiceUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::Rejected { .. } => "UPSTREAM_REJECTED",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::Multipart(_) => "INVALID_MULTIPART",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Export(_) => "EXPORT_FAILED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoFileSelected
            | Self::EmptyFile
            | Self::InvalidField { .. }
            | Self::LineItemOutOfRange { .. }
            | Self::TransactionOutOfRange { .. }
            | Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::FileAlreadySelected
            | Self::VerificationInProgress
            | Self::NoResult
            | Self::VariantMismatch { .. } => StatusCode::CONFLICT,
            Self::Transport(_)
            | Self::Cancelled
            | Self::Unauthorized
            | Self::Rejected { .. }
            | Self::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            code: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
