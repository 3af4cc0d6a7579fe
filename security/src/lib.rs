// security/src/lib.rs

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::User;

pub mod roles;

pub use roles::RolesConfig;

/// Claims carried by every issued JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    pub user_id: Uuid,
    pub role_id: u32,
    /// Expiration time (unix seconds).
    pub exp: usize,
    /// Issued at (unix seconds).
    pub iat: usize,
}

/// Token lifetime for operator sessions.
const TOKEN_HOURS: i64 = 8;

#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    TokenExpired,
    JwtError(String),
    PasswordHashError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::TokenExpired => write!(f, "Token expired"),
            AuthError::JwtError(msg) => write!(f, "JWT error: {}", msg),
            AuthError::PasswordHashError(msg) => write!(f, "Password hashing error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

pub fn create_jwt(user: &User, secret: &[u8]) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.username.clone(),
        user_id: user.id,
        role_id: user.role_id,
        exp: (now + Duration::hours(TOKEN_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::JwtError(e.to_string()))
}

pub fn decode_jwt(token: &str, secret: &[u8]) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::JwtError(e.to_string()),
        })
}

/// Checks a login attempt against the stored hash.
pub fn verify_login(user: &User, password: &str) -> Result<(), AuthError> {
    let ok = User::verify_password(password, &user.password_hash)
        .map_err(|e| AuthError::PasswordHashError(e.to_string()))?;
    if ok {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::NewUser;

    fn user() -> User {
        User::from_new_user(NewUser {
            first: "Ana".into(),
            last: "García".into(),
            username: "agarcia".into(),
            email: "ana@example.com".into(),
            password: "supersecret".into(),
            phone: None,
            role_id: 2,
        })
        .unwrap()
    }

    #[test]
    fn jwt_round_trips() {
        let user = user();
        let secret = b"test_secret";
        let token = create_jwt(&user, secret).unwrap();
        let claims = decode_jwt(&token, secret).unwrap();
        assert_eq!(claims.sub, "agarcia");
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.role_id, 2);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_jwt(&user(), b"one_secret").unwrap();
        assert!(decode_jwt(&token, b"another_secret").is_err());
    }

    #[test]
    fn login_verifies_against_the_stored_hash() {
        let user = user();
        assert!(verify_login(&user, "supersecret").is_ok());
        assert!(matches!(
            verify_login(&user, "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
