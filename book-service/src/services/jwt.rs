use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;
use crate::models::Identity;

/// Signs and verifies access/refresh tokens with the process-wide HS256 key.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

/// Purpose claim. An access token is never accepted where a refresh token is
/// expected, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ObjectId, hex)
    pub sub: String,
    pub email: String,
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    fn identity(&self) -> Identity {
        Identity {
            id: self.sub.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, signed with another key, or the wrong purpose.
    #[error("Token is invalid")]
    Invalid,

    /// Correctly signed but past its expiry.
    #[error("Token has expired")]
    Expired,

    #[error("Failed to encode token: {0}")]
    Encoding(String),
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if config.secret.is_empty() {
            return Err(anyhow::anyhow!("JWT signing secret must not be empty"));
        }

        let access_token_ttl = Duration::try_minutes(config.access_token_expiry_minutes)
            .ok_or_else(|| anyhow::anyhow!("Access token lifetime out of range"))?;
        let refresh_token_ttl = Duration::try_days(config.refresh_token_expiry_days)
            .ok_or_else(|| anyhow::anyhow!("Refresh token lifetime out of range"))?;

        tracing::info!(
            access_minutes = config.access_token_expiry_minutes,
            refresh_days = config.refresh_token_expiry_days,
            "JWT service initialized with HS256 key"
        );

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_token_ttl,
            refresh_token_ttl,
        })
    }

    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(identity, Utc::now())
    }

    /// Mint both tokens as if issued at `now`. Same inputs give the same tokens.
    pub fn issue_pair_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.sign(identity, TokenType::Access, now)?,
            refresh: self.sign(identity, TokenType::Refresh, now)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_access_at(token, Utc::now())
    }

    /// Signature and expiry only; the store is not consulted.
    pub fn verify_access_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, TokenError> {
        self.verify(token, TokenType::Access, now)
            .map(|claims| claims.identity())
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        self.refresh_at(refresh_token, Utc::now())
    }

    /// Mint a new access token for the refresh token's identity. The refresh
    /// token itself stays valid until its own expiry.
    pub fn refresh_at(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = self.verify(refresh_token, TokenType::Refresh, now)?;
        self.sign(&claims.identity(), TokenType::Access, now)
    }

    fn sign(
        &self,
        identity: &Identity,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.access_token_ttl,
            TokenType::Refresh => self.refresh_token_ttl,
        };

        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Encoding("Token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn verify(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        // Expiry is checked below against the caller's clock, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token failed signature or format check");
                TokenError::Invalid
            })?
            .claims;

        if claims.token_type != expected {
            return Err(TokenError::Invalid);
        }

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
