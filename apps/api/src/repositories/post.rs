//! Post repository for centralized database operations

use sqlx::PgPool;

use super::utils::{align_by_key, POST_COLUMNS};
use crate::models::{NewPost, Post, PostId};

/// Repository for post database operations
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new PostRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a post by its unique ID
    pub async fn find_by_id(&self, post_id: PostId) -> Result<Option<Post>, sqlx::Error> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        sqlx::query_as::<_, Post>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find posts newest first
    ///
    /// A `None` limit binds SQL `NULL`, which Postgres treats as no limit.
    pub async fn find_all(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Post>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Find posts for a batch of IDs, one entry per requested ID
    pub async fn find_by_ids(&self, ids: &[PostId]) -> Result<Vec<Option<Post>>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {} FROM posts WHERE id = ANY($1)", POST_COLUMNS);
        let posts: Vec<Post> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(align_by_key(ids, posts, |p| p.id))
    }

    /// Insert a post and return its generated ID
    pub async fn create(&self, post: &NewPost) -> Result<PostId, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO posts (author_id, title, content, allow_comments)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.allow_comments)
        .fetch_one(&self.pool)
        .await
    }

    /// Turn comments off for a post
    ///
    /// Returns `false` when no post with the given ID exists.
    pub async fn disable_comments(&self, post_id: PostId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE posts SET allow_comments = FALSE WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
