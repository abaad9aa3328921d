//! User registration and lookup

use crate::cache::backend::DistributedCache;
use crate::cache::config::CacheConfig;
use crate::cancel::CancelSignal;
use crate::domain::user::{PasswordHasher, User, UserRole, UserStatus};
use crate::domain::validation::RuleSet;
use crate::error::{CacheError, Result};
use crate::query::descriptor::Filter;
use crate::query::engine::CacheAsideEngine;
use crate::services::{cache_written_aggregate, find_by_id};
use crate::store::EntityRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserCommand {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
}

impl CreateUserCommand {
    pub fn validate(&self) -> Result<()> {
        let username_len = self.username.chars().count();
        let phone_len = self.phone.chars().count();

        let mut rules = RuleSet::new();
        rules
            .ensure(
                (3..=50).contains(&username_len),
                "Username",
                "Username must be between 3 and 50 characters.",
            )
            .email(&self.email, "Email", "Invalid email format.")
            .ensure(
                (11..=15).contains(&phone_len),
                "Phone",
                "Phone number must have 11-15 digits.",
            )
            .ensure(
                self.password.chars().count() >= 8,
                "Password",
                "Password must be at least 8 characters long.",
            )
            .ensure(
                self.password.chars().any(|c| c.is_alphabetic())
                    && self.password.chars().any(|c| c.is_ascii_digit()),
                "Password",
                "Password must contain at least one letter and one number.",
            );
        rules.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResult {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub status: UserStatus,
}

impl From<&User> for CreateUserResult {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            status: user.status,
        }
    }
}

pub struct UserService {
    users: Arc<dyn EntityRepository<User>>,
    engine: CacheAsideEngine<User>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new<S>(
        users: Arc<S>,
        hasher: Arc<dyn PasswordHasher>,
        cache: Arc<dyn DistributedCache>,
        config: CacheConfig,
    ) -> Self
    where
        S: EntityRepository<User> + 'static,
    {
        let engine: CacheAsideEngine<User> = CacheAsideEngine::new(users.clone(), cache, config);
        Self {
            users,
            engine,
            hasher,
        }
    }

    /// Register a user; emails are unique ignoring case
    pub async fn create_user(
        &self,
        command: CreateUserCommand,
        cancel: &CancelSignal,
    ) -> Result<CreateUserResult> {
        command.validate()?;

        let email = command.email.to_lowercase();
        let same_email = Filter::new(format!("email=={}", email), move |u: &User| {
            u.email.to_lowercase() == email
        });
        if !self.users.find(&same_email, cancel).await?.is_empty() {
            return Err(CacheError::Conflict(format!(
                "User with email {} already exists",
                command.email
            )));
        }

        let mut user = User::new(
            command.username,
            command.email,
            command.phone,
            self.hasher.hash_password(&command.password),
            command.role,
        );
        user.status = command.status;

        let user = self.users.create(user, cancel).await?;
        info!("Created user {} ({})", user.username, user.id);

        cache_written_aggregate(&self.engine, &user, cancel).await?;
        Ok(CreateUserResult::from(&user))
    }

    pub async fn get_user(&self, id: Uuid, cancel: &CancelSignal) -> Result<User> {
        find_by_id(&self.engine, self.users.as_ref(), id, cancel).await
    }
}
