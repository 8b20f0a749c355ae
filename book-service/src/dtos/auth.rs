use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::jwt::TokenPair;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "user@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "This field may not be blank."))]
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "user@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "This field may not be blank."))]
    #[schema(example = "password123")]
    pub password: String,
}

/// `refresh` is optional at the JSON level so a missing token gets its own
/// 400 instead of a generic body rejection.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[serde(default)]
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub refresh: String,
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub access: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            refresh: pair.refresh,
            access: pair.access,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub access: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_rules() {
        let ok = LoginRequest {
            email: "a@x.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_refresh_request_accepts_missing_field() {
        let req: RefreshRequest = serde_json::from_str("{}").unwrap();
        assert!(req.refresh.is_none());
    }
}
