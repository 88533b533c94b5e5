// ABOUTME: User account persistence: registration inserts and lookups
// ABOUTME: Enforces email uniqueness at the database level
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{AppError, AppResult};
use crate::models::{now_rfc3339, User};
use sqlx::{Row, SqlitePool};

/// User account store
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// Create a new user store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user account
    ///
    /// # Errors
    ///
    /// Returns a conflict error if the email is already registered.
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let now = now_rfc3339();

        let result = sqlx::query(
            r"
            INSERT INTO users (email, name, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Email already registered")
            }
            _ => AppError::database(format!("Failed to create user: {e}")),
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_owned(),
            name: name.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: now,
        })
    }

    /// Look up a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, name, password_hash, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up user: {e}")))?;

        Ok(row.map(user_from_row))
    }

    /// Look up a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, name, password_hash, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up user: {e}")))?;

        Ok(row.map(user_from_row))
    }
}

fn user_from_row(row: sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}
