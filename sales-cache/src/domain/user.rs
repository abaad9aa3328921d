//! Users of the sales system

use crate::domain::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserRole {
    #[default]
    Customer,
    Manager,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Customer => write!(f, "Customer"),
            UserRole::Manager => write!(f, "Manager"),
            UserRole::Admin => write!(f, "Admin"),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Active => write!(f, "Active"),
            UserStatus::Inactive => write!(f, "Inactive"),
            UserStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

/// A registered user.
///
/// The password hash is never serialized, so it does not reach the cache or
/// the document mirror. A `User` read back from either has an empty hash and
/// is not equal to the stored one; check passwords against the repository
/// copy, never a cached one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            phone: phone.into(),
            password_hash: password_hash.into(),
            role,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn activate(&mut self) {
        self.status = UserStatus::Active;
        self.updated_at = Some(Utc::now());
    }

    pub fn deactivate(&mut self) {
        self.status = UserStatus::Inactive;
        self.updated_at = Some(Utc::now());
    }

    pub fn suspend(&mut self) {
        self.status = UserStatus::Suspended;
        self.updated_at = Some(Utc::now());
    }
}

impl Entity for User {
    const NAME: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Turns plaintext passwords into stored hashes
pub trait PasswordHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> String;

    fn verify_password(&self, password: &str, hash: &str) -> bool;
}

/// Salted SHA-256, stored as `<salt>$<hex digest>`
#[derive(Debug, Clone, Default)]
pub struct Sha256PasswordHasher;

impl Sha256PasswordHasher {
    fn digest(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash_password(&self, password: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();
        format!("{}${}", salt, Self::digest(&salt, password))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        match hash.split_once('$') {
            Some((salt, digest)) => Self::digest(salt, password) == digest,
            None => false,
        }
    }
}
