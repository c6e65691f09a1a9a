//! User repository for centralized database operations
//!
//! Users are read-only from this service's point of view; the only queries
//! are lookups for author resolution.

use sqlx::PgPool;

use super::utils::{align_by_key, USER_COLUMNS};
use crate::models::{User, UserId};

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find users for a batch of IDs, one entry per requested ID
    pub async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<Option<User>>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        let users: Vec<User> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(align_by_key(ids, users, |u| u.id))
    }
}
