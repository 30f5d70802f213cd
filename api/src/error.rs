use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// API error taxonomy. The four client-visible classes — unauthenticated,
/// forbidden, not-found and bad-request — stay distinguishable end to end;
/// anything else is an internal error whose detail is logged, never sent.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Error response structure for OpenAPI documentation.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::Internal(Box::new(err))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref source) = self {
            error!("Internal error: {}", source);
        }

        let status = self.status_code();
        let body = ApiErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<user::UserError> for ApiError {
    fn from(err: user::UserError) -> Self {
        use user::UserError;
        match err {
            UserError::UserNotFound(_) => ApiError::NotFound("user".to_string()),
            UserError::InvalidCredentials => ApiError::Forbidden,
            UserError::UsernameTaken(name) => {
                ApiError::BadRequest(format!("username already used: {name}"))
            }
            UserError::InvalidToken | UserError::ExpiredToken => ApiError::Unauthorized,
            other => ApiError::internal(other),
        }
    }
}

impl From<content::ContentError> for ApiError {
    fn from(err: content::ContentError) -> Self {
        use content::ContentError;
        match err {
            ContentError::NotFound(kind) => ApiError::NotFound(kind.to_string()),
            ContentError::NameTaken(kind) => {
                ApiError::BadRequest(format!("the {kind} name has existed"))
            }
            other => ApiError::internal(other),
        }
    }
}

impl From<database::DatabaseError> for ApiError {
    fn from(err: database::DatabaseError) -> Self {
        ApiError::internal(err)
    }
}

impl From<authz::error::AuthzError> for ApiError {
    fn from(err: authz::error::AuthzError) -> Self {
        ApiError::internal(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("malformed multipart body: {err}"))
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
