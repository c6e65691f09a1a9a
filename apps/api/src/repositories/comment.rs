//! Comment repository for centralized database operations
//!
//! Every comment list is ordered oldest first, ties broken by id.

use sqlx::PgPool;

use super::utils::{align_by_key, group_by_key, COMMENT_COLUMNS};
use crate::models::{Comment, CommentId, NewComment, PostId};

/// Repository for comment database operations
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new CommentRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Root comments of a post
    pub async fn find_roots_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM comments WHERE post_id = $1 AND parent_id IS NULL ORDER BY created_at ASC, id ASC",
            COMMENT_COLUMNS
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Direct replies to a comment
    pub async fn find_by_parent(&self, parent_id: CommentId) -> Result<Vec<Comment>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM comments WHERE parent_id = $1 ORDER BY created_at ASC, id ASC",
            COMMENT_COLUMNS
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Comments for a batch of IDs, one entry per requested ID
    pub async fn find_by_ids(&self, ids: &[CommentId]) -> Result<Vec<Option<Comment>>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {} FROM comments WHERE id = ANY($1)", COMMENT_COLUMNS);
        let comments: Vec<Comment> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(align_by_key(ids, comments, |c| c.id))
    }

    /// Every comment of each post, grouped in the order of `post_ids`
    pub async fn find_by_post_ids(&self, post_ids: &[PostId]) -> Result<Vec<Vec<Comment>>, sqlx::Error> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM comments WHERE post_id = ANY($1) ORDER BY created_at ASC, id ASC",
            COMMENT_COLUMNS
        );
        let comments: Vec<Comment> = sqlx::query_as(&sql)
            .bind(post_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(group_by_key(post_ids, comments, |c| c.post_id))
    }

    /// Direct replies of each parent, grouped in the order of `parent_ids`
    pub async fn find_by_parent_ids(
        &self,
        parent_ids: &[CommentId],
    ) -> Result<Vec<Vec<Comment>>, sqlx::Error> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM comments WHERE parent_id = ANY($1) ORDER BY created_at ASC, id ASC",
            COMMENT_COLUMNS
        );
        let comments: Vec<Comment> = sqlx::query_as(&sql)
            .bind(parent_ids)
            .fetch_all(&self.pool)
            .await?;

        // parent_id is always Some here; 0 never matches a requested key
        Ok(group_by_key(parent_ids, comments, |c| c.parent_id.unwrap_or(0)))
    }

    /// Insert a comment and return its generated ID
    pub async fn create(&self, comment: &NewComment) -> Result<CommentId, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO comments (post_id, author_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.parent_id)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await
    }
}
