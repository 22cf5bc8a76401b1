//! Handler errors rendered as RFC 7807 problem details.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use folio_core::error::{DomainError, RepoError};
use folio_shared::ErrorResponse;

/// Everything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Valid token, but the account behind it is gone.
    #[error("Unauthorized")]
    Unauthorized,

    /// Logged when rendered; never shown to the client.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The submitted post was turned down; the client goes back to the form.
    #[error("Validation failed: {reason}")]
    Validation {
        reason: String,
        redirect_url: String,
    },
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Internal(detail) => {
                tracing::error!(%detail, "Request failed");
                ErrorResponse::internal_error()
            }
            AppError::Validation {
                reason,
                redirect_url,
            } => ErrorResponse::new(422, "Validation Failed")
                .with_detail(reason)
                .with_redirect(redirect_url),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Repository(e) => e.into(),
            DomainError::Storage(e) => AppError::Internal(format!("file storage: {}", e)),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            other => AppError::Internal(format!("database: {}", other)),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use uuid::Uuid;

    use super::*;

    #[actix_rt::test]
    async fn test_validation_error_points_back_to_form() {
        let err = AppError::Validation {
            reason: "missing required fields".to_string(),
            redirect_url: "/api/posts/edit".to_string(),
        };

        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 422);
        assert_eq!(body["redirect_url"], "/api/posts/edit");
    }

    #[test]
    fn test_domain_errors_map_to_status() {
        let missing = AppError::from(DomainError::NotFound {
            entity_type: "Category",
            id: Uuid::new_v4(),
        });
        let broken = AppError::from(DomainError::Repository(RepoError::Connection(
            "refused".to_string(),
        )));

        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(broken.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
