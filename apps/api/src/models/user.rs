//! User model for Threadline
//!
//! Users are read-only here; they are provisioned outside this service.

use serde::Serialize;
use sqlx::FromRow;

/// User identifier
pub type UserId = i64;

/// User record from the users table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}
