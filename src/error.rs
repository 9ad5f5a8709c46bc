use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Every failure is scoped to the single action that triggered it; the
/// message is shown to the caller verbatim.
#[derive(Debug, Display)]
pub enum AppError {
    /// Missing deployment settings; the dependent feature is disabled.
    #[display(fmt = "{}", _0)]
    NotConfigured(String),

    #[display(fmt = "{}", _0)]
    Unauthenticated(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    /// Field checks that block a request before any database call.
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    InvalidArgument(String),

    /// Either the row does not exist or the caller may not see it.
    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "[store] {}: {}", context, message)]
    Store {
        context: &'static str,
        message: String,
    },

    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl std::error::Error for AppError {}

impl AppError {
    /// Wraps a database error with the data-access operation that raised it.
    pub fn store(context: &'static str, err: sqlx::Error) -> Self {
        tracing::error!(error = %err, context, "Store call failed");
        AppError::Store {
            context,
            message: err.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

pub type AppResult<T> = Result<T, AppError>;
