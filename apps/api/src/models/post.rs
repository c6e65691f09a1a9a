//! Post model for Threadline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::UserId;

/// Post identifier, assigned once by the storage backend and never reused
pub type PostId = i64;

/// Post record from the posts table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Post {
    /// Unique post identifier
    pub id: PostId,

    /// Author of the post
    pub author_id: UserId,

    /// Post title
    pub title: String,

    /// Post body
    pub content: String,

    /// Whether new comments are accepted (can only go from true to false)
    pub allow_comments: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a post
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub allow_comments: bool,
}
