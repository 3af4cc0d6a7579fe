// models/src/user.rs
//
// Stored users carry a bcrypt hash, never the plaintext password. The
// `NewUser` DTO holds the plaintext only long enough to hash it.

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub first: String,
    pub last: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first: String,
    pub last: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: u32,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn hash_password(password: &str) -> Result<String, BcryptError> {
        hash(password, DEFAULT_COST)
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, BcryptError> {
        verify(password, hash)
    }

    pub fn from_new_user(new_user: NewUser) -> Result<Self, BcryptError> {
        let now = Utc::now();
        let password_hash = Self::hash_password(&new_user.password)?;
        Ok(User {
            id: Uuid::new_v4(),
            first: new_user.first,
            last: new_user.last,
            username: new_user.username,
            email: new_user.email,
            password_hash,
            role_id: new_user.role_id,
            phone: new_user.phone,
            created_at: now,
            updated_at: now,
            last_login: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

/// API-facing projection of a user. The password hash stays in storage;
/// it never goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub first: String,
    pub last: String,
    pub username: String,
    pub email: String,
    pub role_id: u32,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            first: user.first,
            last: user.last,
            username: user.username,
            email: user.email,
            role_id: user.role_id,
            phone: user.phone,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}
