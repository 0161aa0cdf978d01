//! Password hashing and bearer token issuance.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;
use crate::models::Role;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl: Duration::hours(config.expires_in_hours),
        }
    }

    pub fn issue(&self, user_id: i32, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            role,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Checks signature, issuer and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.leeway = 0;
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }
}

/// bcrypt on the blocking pool so hashing never stalls the request workers.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let cost = self.cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, hours: i64) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            issuer: "tickitz".to_string(),
            expires_in_hours: hours,
        }
    }

    #[test]
    fn issued_token_carries_user_and_role() {
        let tokens = TokenService::new(&config("secret", 1));
        let token = tokens.issue(42, Role::Admin).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "tickitz");
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = TokenService::new(&config("one", 1)).issue(1, Role::User).unwrap();
        assert!(TokenService::new(&config("two", 1)).verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new(&config("secret", -1));
        let token = tokens.issue(1, Role::User).unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_hashed_password() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("correct horse").await.unwrap();
        assert!(hasher.verify("correct horse", &hash).await.unwrap());
        assert!(!hasher.verify("wrong horse", &hash).await.unwrap());
    }
}
