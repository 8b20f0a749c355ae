use service_core::error::AppError;
use thiserror::Error;

use crate::services::jwt::TokenError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Email already registered.")]
    EmailAlreadyRegistered,

    #[error("Refresh token is required.")]
    MissingRefreshToken,

    #[error("Given token not valid for any token type")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Book not found")]
    BookNotFound,

    #[error("Invalid page.")]
    InvalidPage,

    #[error("No books found for the given year.")]
    NoBooksForYear,
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => ServiceError::InvalidToken,
            TokenError::Expired => ServiceError::TokenExpired,
            TokenError::Encoding(e) => {
                ServiceError::Internal(anyhow::anyhow!("Token encoding failed: {}", e))
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::App(e) => e,
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials
            | ServiceError::InvalidToken
            | ServiceError::TokenExpired => AppError::Unauthorized(anyhow::anyhow!(message)),
            ServiceError::EmailAlreadyRegistered => AppError::Conflict(anyhow::anyhow!(message)),
            ServiceError::MissingRefreshToken => AppError::BadRequest(anyhow::anyhow!(message)),
            ServiceError::BookNotFound
            | ServiceError::InvalidPage
            | ServiceError::NoBooksForYear => AppError::NotFound(anyhow::anyhow!(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_become_unauthorized() {
        let invalid: AppError = ServiceError::from(TokenError::Invalid).into();
        assert!(matches!(invalid, AppError::Unauthorized(ref e)
            if e.to_string() == "Given token not valid for any token type"));

        let expired: AppError = ServiceError::from(TokenError::Expired).into();
        assert!(matches!(expired, AppError::Unauthorized(ref e) if e.to_string() == "Token has expired"));
    }

    #[test]
    fn test_encoding_failure_is_internal() {
        let err: AppError = ServiceError::from(TokenError::Encoding("boom".into())).into();
        assert!(matches!(err, AppError::InternalError(_)));
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let err: AppError = ServiceError::EmailAlreadyRegistered.into();
        assert!(matches!(err, AppError::Conflict(ref e) if e.to_string() == "Email already registered."));
    }
}
