//! In-process store implementing every repository trait.
//!
//! All tables sit behind one lock, so the uniqueness checks done on insert
//! play the role of the database's UNIQUE constraints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::repository::{LanguageRepository, RoleRepository, UserRepository};
use crate::auth::{Credentials, DEFAULT_ROLE, NewUser, Role, RoleId, User, UserId};
use crate::language::{Language, LanguageFilter, LanguageId, LanguageInput};

struct StoredUser {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    role_id: RoleId,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    roles: Vec<Role>,
    users: Vec<StoredUser>,
    languages: Vec<Language>,
}

impl Tables {
    fn to_user(&self, stored: &StoredUser) -> StoreResult<User> {
        let role = self
            .roles
            .iter()
            .find(|r| r.id == stored.role_id)
            .cloned()
            .ok_or_else(|| StoreError::MissingReference(format!("role {}", stored.role_id)))?;

        Ok(User {
            id: stored.id,
            username: stored.username.clone(),
            email: stored.email.clone(),
            role,
            created_at: stored.created_at,
        })
    }
}

/// Memory-backed store, seeded with the default role
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a store holding only the default role
    pub fn new() -> Self {
        let mut tables = Tables::default();
        tables.roles.push(Role {
            id: Uuid::new_v4(),
            name: DEFAULT_ROLE.to_string(),
            display_name: "Member".to_string(),
        });

        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Create a store with no rows at all
    pub fn empty() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation("username"));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("email"));
        }
        if !tables.roles.iter().any(|r| r.id == user.role_id) {
            return Err(StoreError::MissingReference(format!("role {}", user.role_id)));
        }

        let stored = StoredUser {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role_id: user.role_id,
            created_at: Utc::now(),
        };
        let created = tables.to_user(&stored)?;
        tables.users.push(stored);
        Ok(created)
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| tables.to_user(u))
            .transpose()
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> StoreResult<Option<Credentials>> {
        let tables = self.tables.read().await;
        let Some(stored) = tables.users.iter().find(|u| u.username == username) else {
            return Ok(None);
        };

        Ok(Some(Credentials {
            user: tables.to_user(stored)?,
            password_hash: stored.password_hash.clone(),
        }))
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.email == email))
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables.roles.iter().find(|r| r.name == name).cloned())
    }
}

#[async_trait]
impl LanguageRepository for MemoryStore {
    async fn list_languages(&self, filter: &LanguageFilter) -> StoreResult<Vec<Language>> {
        let tables = self.tables.read().await;

        let mut matching: Vec<Language> = tables
            .languages
            .iter()
            .filter(|l| filter.q.as_deref().is_none_or(|q| l.name.contains(q)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn find_language(&self, id: LanguageId) -> StoreResult<Option<Language>> {
        let tables = self.tables.read().await;
        Ok(tables.languages.iter().find(|l| l.id == id).cloned())
    }

    async fn find_language_by_code(&self, code: &str) -> StoreResult<Option<Language>> {
        let tables = self.tables.read().await;
        Ok(tables.languages.iter().find(|l| l.code == code).cloned())
    }

    async fn create_language(&self, input: &LanguageInput) -> StoreResult<Language> {
        let mut tables = self.tables.write().await;

        if tables.languages.iter().any(|l| l.code == input.code) {
            return Err(StoreError::UniqueViolation("code"));
        }

        let language = Language {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            code: input.code.clone(),
        };
        tables.languages.push(language.clone());
        Ok(language)
    }

    async fn update_language(
        &self,
        id: LanguageId,
        input: &LanguageInput,
    ) -> StoreResult<Option<Language>> {
        let mut tables = self.tables.write().await;

        if tables
            .languages
            .iter()
            .any(|l| l.code == input.code && l.id != id)
        {
            return Err(StoreError::UniqueViolation("code"));
        }

        let Some(language) = tables.languages.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        language.name = input.name.clone();
        language.code = input.code.clone();
        Ok(Some(language.clone()))
    }

    async fn delete_language(&self, id: LanguageId) -> StoreResult<Option<Language>> {
        let mut tables = self.tables.write().await;
        let position = tables.languages.iter().position(|l| l.id == id);
        Ok(position.map(|index| tables.languages.remove(index)))
    }
}
