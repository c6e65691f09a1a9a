//! Storage collaborator contracts for Threadline
//!
//! The resolvers and loaders only ever talk to these two traits. Any backend
//! implementing both (in-memory, PostgreSQL, a test double) can be plugged
//! into [`Service`].
//!
//! Batched reads return one entry per requested key, in the order the keys
//! were given. Absent entities are `None` (or an empty list), never omitted.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{Comment, CommentId, NewComment, NewPost, Post, PostId, User, UserId};

/// Post-side operations, including user lookups
#[async_trait]
pub trait PostService: Send + Sync {
    /// Fetch one post, `NotFound` when it does not exist
    async fn get_post(&self, id: PostId) -> ApiResult<Post>;

    /// Posts ordered newest first, windowed by `offset`/`limit`
    async fn get_posts(&self, limit: Option<usize>, offset: usize) -> ApiResult<Vec<Post>>;

    /// Insert a post and return its new id
    async fn create_post(&self, post: NewPost) -> ApiResult<PostId>;

    /// Turn comments off for a post; blocking twice is a no-op
    async fn block_comments(&self, id: PostId) -> ApiResult<()>;

    /// Batched user lookup aligned to `ids`
    async fn users_by_id(&self, ids: &[UserId]) -> ApiResult<Vec<Option<User>>>;

    /// Batched post lookup aligned to `ids`
    async fn posts_by_id(&self, ids: &[PostId]) -> ApiResult<Vec<Option<Post>>>;

    /// Readiness check for the backing store
    async fn ping(&self) -> ApiResult<()> {
        Ok(())
    }
}

/// Comment-side operations
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Root comments of a post, oldest first
    async fn get_comments(&self, post_id: PostId) -> ApiResult<Vec<Comment>>;

    /// Direct replies to a comment, oldest first
    ///
    /// Matches on `parent_id` alone; replies are not filtered by post.
    async fn get_child_comments(&self, parent_id: CommentId) -> ApiResult<Vec<Comment>>;

    /// Insert a comment and return its new id
    async fn create_comment(&self, comment: NewComment) -> ApiResult<CommentId>;

    /// Batched lookup of every comment of each post, aligned to `post_ids`
    async fn comments_by_post_id(&self, post_ids: &[PostId]) -> ApiResult<Vec<Vec<Comment>>>;

    /// Batched lookup of direct replies for each parent, aligned to `parent_ids`
    async fn comments_by_parent_id(
        &self,
        parent_ids: &[CommentId],
    ) -> ApiResult<Vec<Vec<Comment>>>;

    /// Batched comment lookup aligned to `ids`
    async fn comments_by_id(&self, ids: &[CommentId]) -> ApiResult<Vec<Option<Comment>>>;
}

/// The storage collaborator as seen by resolvers: two independent contracts
#[derive(Clone)]
pub struct Service {
    pub posts: Arc<dyn PostService>,
    pub comments: Arc<dyn CommentService>,
}

impl Service {
    /// Combine a post backend and a comment backend
    pub fn new(posts: Arc<dyn PostService>, comments: Arc<dyn CommentService>) -> Self {
        Self { posts, comments }
    }

    /// Use one backend for both contracts
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: PostService + CommentService + 'static,
    {
        Self {
            posts: backend.clone(),
            comments: backend,
        }
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service").finish_non_exhaustive()
    }
}
