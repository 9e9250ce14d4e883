//! Repository trait definitions and the PostgreSQL implementation.
//!
//! Every lookup is a typed method for one searchable column, so a query can
//! never be built from an arbitrary column name.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use crate::auth::{Credentials, NewUser, Role, User, UserId};
use crate::language::{Language, LanguageFilter, LanguageId, LanguageInput};

/// Trait for user/credential repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a duplicate username or email yields `StoreError::UniqueViolation`
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Find user by ID
    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Find a user and its password hash by username
    async fn find_credentials_by_username(&self, username: &str)
    -> StoreResult<Option<Credentials>>;

    /// Whether a user with this username exists
    async fn username_exists(&self, username: &str) -> StoreResult<bool>;

    /// Whether a user with this email exists
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;
}

/// Trait for role repository operations
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Find role by its unique name
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;
}

/// Trait for language repository operations
#[async_trait]
pub trait LanguageRepository: Send + Sync {
    /// List languages ordered by name
    async fn list_languages(&self, filter: &LanguageFilter) -> StoreResult<Vec<Language>>;

    /// Find language by ID
    async fn find_language(&self, id: LanguageId) -> StoreResult<Option<Language>>;

    /// Find language by its unique code
    async fn find_language_by_code(&self, code: &str) -> StoreResult<Option<Language>>;

    /// Insert a language; a duplicate code yields `StoreError::UniqueViolation`
    async fn create_language(&self, input: &LanguageInput) -> StoreResult<Language>;

    /// Replace name and code; `None` when the language does not exist
    async fn update_language(
        &self,
        id: LanguageId,
        input: &LanguageInput,
    ) -> StoreResult<Option<Language>>;

    /// Remove a language, returning it; `None` when it does not exist
    async fn delete_language(&self, id: LanguageId) -> StoreResult<Option<Language>>;
}

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.created_at, \
     r.id AS role_id, r.name AS role_name, r.display_name AS role_display_name";

/// PostgreSQL implementation of every repository trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        role: Role {
            id: row.try_get("role_id")?,
            name: row.try_get("role_name")?,
            display_name: row.try_get("role_display_name")?,
        },
        created_at: row.try_get("created_at")?,
    })
}

fn language_from_row(row: &PgRow) -> Result<Language, sqlx::Error> {
    Ok(Language {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
    })
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let query = format!(
            "WITH u AS (
                INSERT INTO users (id, username, email, password_hash, role_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
             )
             SELECT {USER_COLUMNS} FROM u JOIN roles r ON r.id = u.role_id"
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_write)?;

        Ok(user_from_row(&row)?)
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> StoreResult<Option<Credentials>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE u.username = $1"
        );

        let Some(row) = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(Credentials {
            user: user_from_row(&row)?,
            password_hash: row.try_get("password_hash")?,
        }))
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl RoleRepository for PgStore {
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let row = sqlx::query("SELECT id, name, display_name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        let role = match row {
            Some(r) => Some(Role {
                id: r.try_get("id")?,
                name: r.try_get("name")?,
                display_name: r.try_get("display_name")?,
            }),
            None => None,
        };
        Ok(role)
    }
}

#[async_trait]
impl LanguageRepository for PgStore {
    async fn list_languages(&self, filter: &LanguageFilter) -> StoreResult<Vec<Language>> {
        // LIMIT NULL means no limit in PostgreSQL.
        let rows = sqlx::query(
            "SELECT id, name, code FROM languages
             WHERE $1::TEXT IS NULL OR strpos(name, $1) > 0
             ORDER BY name, id
             LIMIT $2 OFFSET $3",
        )
        .bind(filter.q.as_deref())
        .bind(filter.limit)
        .bind(filter.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(language_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_language(&self, id: LanguageId) -> StoreResult<Option<Language>> {
        let row = sqlx::query("SELECT id, name, code FROM languages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(language_from_row).transpose()?)
    }

    async fn find_language_by_code(&self, code: &str) -> StoreResult<Option<Language>> {
        let row = sqlx::query("SELECT id, name, code FROM languages WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(language_from_row).transpose()?)
    }

    async fn create_language(&self, input: &LanguageInput) -> StoreResult<Language> {
        let row = sqlx::query(
            "INSERT INTO languages (id, name, code) VALUES ($1, $2, $3) RETURNING id, name, code",
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.code)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        Ok(language_from_row(&row)?)
    }

    async fn update_language(
        &self,
        id: LanguageId,
        input: &LanguageInput,
    ) -> StoreResult<Option<Language>> {
        let row = sqlx::query(
            "UPDATE languages SET name = $2, code = $3 WHERE id = $1 RETURNING id, name, code",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.code)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        Ok(row.as_ref().map(language_from_row).transpose()?)
    }

    async fn delete_language(&self, id: LanguageId) -> StoreResult<Option<Language>> {
        let row = sqlx::query("DELETE FROM languages WHERE id = $1 RETURNING id, name, code")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(language_from_row).transpose()?)
    }
}
