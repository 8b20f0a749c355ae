use std::sync::Arc;

use crate::{
    dtos::auth::{LoginRequest, RefreshRequest, RegisterRequest},
    models::User,
    services::{JwtService, ServiceError, TokenPair, UserStore},
    utils::{hash_password, verify_password, Password, PasswordHashString},
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, req: LoginRequest) -> Result<TokenPair, ServiceError> {
        let user = match self.users.find_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                tracing::info!("Login attempt for unknown email");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        let password = Password::new(req.password);
        let stored = PasswordHashString::new(user.password_hash.clone());
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Password verification task failed: {}", e)))?;

        if !matches {
            tracing::info!(user_id = ?user.id, "Login attempt with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let identity = user.identity().ok_or_else(|| {
            ServiceError::Internal(anyhow::anyhow!("Stored user record has no _id"))
        })?;

        let pair = self.jwt.issue_pair(&identity)?;
        tracing::info!(user_id = %identity.id, "User logged in");
        Ok(pair)
    }

    /// Duplicate check then insert. The two steps are not atomic.
    pub async fn register(&self, req: RegisterRequest) -> Result<(), ServiceError> {
        if self.users.exists_by_email(&req.email).await? {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let password = Password::new(req.password);
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Password hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

        let user_id = self
            .users
            .insert(User::new(req.email, password_hash.into_string()))
            .await?;

        tracing::info!(user_id = %user_id, "User registered");
        Ok(())
    }

    /// New access token for the refresh token's identity. The refresh token
    /// is not rotated and stays valid until its own expiry.
    pub async fn refresh(&self, req: RefreshRequest) -> Result<String, ServiceError> {
        let token = req
            .refresh
            .filter(|t| !t.is_empty())
            .ok_or(ServiceError::MissingRefreshToken)?;

        let access = self.jwt.refresh(&token)?;
        Ok(access)
    }
}
