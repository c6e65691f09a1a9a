//! Comment model for Threadline
//!
//! Comments form a forest per post: root comments have no parent, every
//! other comment points at an existing parent comment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::post::PostId;
use super::user::UserId;

/// Comment identifier
pub type CommentId = i64;

/// Comment record from the comments table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Comment {
    /// Unique comment identifier
    pub id: CommentId,

    /// Post this comment belongs to
    pub post_id: PostId,

    /// Author of the comment
    pub author_id: UserId,

    /// Parent comment, `None` for root comments
    pub parent_id: Option<CommentId>,

    /// Comment body
    pub content: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Whether this comment is attached directly to its post
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Payload for creating a comment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: UserId,
    pub parent_id: Option<CommentId>,
    pub content: String,
}
