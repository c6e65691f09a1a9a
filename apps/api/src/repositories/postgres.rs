//! PostgreSQL storage backend
//!
//! Wires the post, comment and user repositories into the two service
//! contracts. Referential checks (post exists, parent exists) are left to
//! the foreign keys and translated back into domain errors here.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{CommentRepository, PostRepository, UserRepository};
use crate::error::{ApiError, ApiResult};
use crate::models::{Comment, CommentId, NewComment, NewPost, Post, PostId, User, UserId};
use crate::services::{CommentService, PostService};

/// Storage backend over a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    users: UserRepository,
    posts: PostRepository,
    comments: CommentRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Map a foreign key violation to the missing referenced entity
fn map_reference_error(err: sqlx::Error, refs: &CommentRefs) -> ApiError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            return match db.constraint() {
                Some("comments_parent_id_fkey") => {
                    ApiError::not_found("comment", refs.parent_id.unwrap_or_default())
                }
                Some("comments_post_id_fkey") => ApiError::not_found("post", refs.post_id),
                _ => ApiError::not_found("user", refs.author_id),
            };
        }
    }
    err.into()
}

/// Referenced ids of an insert, for error reporting
struct CommentRefs {
    post_id: PostId,
    author_id: UserId,
    parent_id: Option<CommentId>,
}

#[async_trait]
impl PostService for PgStore {
    async fn get_post(&self, id: PostId) -> ApiResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("post", id))
    }

    async fn get_posts(&self, limit: Option<usize>, offset: usize) -> ApiResult<Vec<Post>> {
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        Ok(self.posts.find_all(limit, offset).await?)
    }

    async fn create_post(&self, post: NewPost) -> ApiResult<PostId> {
        self.posts.create(&post).await.map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ApiError::not_found("user", post.author_id)
            }
            _ => e.into(),
        })
    }

    async fn block_comments(&self, id: PostId) -> ApiResult<()> {
        if self.posts.disable_comments(id).await? {
            Ok(())
        } else {
            Err(ApiError::not_found("post", id))
        }
    }

    async fn users_by_id(&self, ids: &[UserId]) -> ApiResult<Vec<Option<User>>> {
        Ok(self.users.find_by_ids(ids).await?)
    }

    async fn posts_by_id(&self, ids: &[PostId]) -> ApiResult<Vec<Option<Post>>> {
        Ok(self.posts.find_by_ids(ids).await?)
    }

    async fn ping(&self) -> ApiResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CommentService for PgStore {
    async fn get_comments(&self, post_id: PostId) -> ApiResult<Vec<Comment>> {
        Ok(self.comments.find_roots_by_post(post_id).await?)
    }

    async fn get_child_comments(&self, parent_id: CommentId) -> ApiResult<Vec<Comment>> {
        Ok(self.comments.find_by_parent(parent_id).await?)
    }

    async fn create_comment(&self, comment: NewComment) -> ApiResult<CommentId> {
        let refs = CommentRefs {
            post_id: comment.post_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
        };
        self.comments
            .create(&comment)
            .await
            .map_err(|e| map_reference_error(e, &refs))
    }

    async fn comments_by_post_id(&self, post_ids: &[PostId]) -> ApiResult<Vec<Vec<Comment>>> {
        Ok(self.comments.find_by_post_ids(post_ids).await?)
    }

    async fn comments_by_parent_id(
        &self,
        parent_ids: &[CommentId],
    ) -> ApiResult<Vec<Vec<Comment>>> {
        Ok(self.comments.find_by_parent_ids(parent_ids).await?)
    }

    async fn comments_by_id(&self, ids: &[CommentId]) -> ApiResult<Vec<Option<Comment>>> {
        Ok(self.comments.find_by_ids(ids).await?)
    }
}
