use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

use crate::{
    models::Identity,
    services::{JwtService, TokenError, UserStore},
    AppState,
};

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Given token not valid for any token type";
const EXPIRED_TOKEN: &str = "Token has expired";
const UNRECOGNIZED_SUBJECT: &str = "Token contained no recognizable user identification";
const USER_NOT_FOUND: &str = "User not found";

fn unauthorized(message: &str) -> AppError {
    AppError::Unauthorized(anyhow::anyhow!(message.to_string()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Bearer token to stored user. Every failure is a 401 except a store
/// failure, which surfaces as 500.
pub async fn resolve_identity(
    jwt: &JwtService,
    users: &dyn UserStore,
    headers: &HeaderMap,
) -> Result<Identity, AppError> {
    let token = bearer_token(headers).ok_or_else(|| unauthorized(MISSING_CREDENTIALS))?;

    let claimed = jwt.verify_access(token).map_err(|e| match e {
        TokenError::Expired => unauthorized(EXPIRED_TOKEN),
        TokenError::Invalid => unauthorized(INVALID_TOKEN),
        TokenError::Encoding(e) => AppError::InternalError(anyhow::anyhow!(e)),
    })?;

    let user_id = ObjectId::parse_str(&claimed.id).map_err(|_| {
        tracing::warn!(subject = %claimed.id, "Token subject is not an ObjectId");
        unauthorized(UNRECOGNIZED_SUBJECT)
    })?;

    let user = users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| unauthorized(USER_NOT_FOUND))?;

    user.identity()
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Stored user record has no _id")))
}

/// Rejects the request unless it carries a valid access token for an
/// existing user, then stores the `Identity` in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = resolve_identity(&state.jwt, state.users.as_ref(), req.headers()).await?;
    tracing::debug!(user_id = %identity.id, "Request authenticated");

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Identity attached by `auth_middleware`.
pub struct AuthUser(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts.extensions.get::<Identity>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Identity missing from request extensions"
            ))
        })?;

        Ok(AuthUser(identity.clone()))
    }
}
