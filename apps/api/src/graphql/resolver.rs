//! Per-request resolution context
//!
//! A [`RequestContext`] is built when a GraphQL request arrives and injected
//! into that request's data. Every relational field goes through it:
//!
//! - To-one lookups keyed by an id that many siblings share (authors, a
//!   comment's post, a comment's parent) go through the request's loaders so
//!   sibling fan-out coalesces into one batched fetch.
//! - To-many lookups with `limit`/`offset` (a post's comments, a comment's
//!   replies) fetch the full ordered list directly and window it. These are
//!   not batched across siblings.
//!
//! Mutations run their domain checks here as well.

use async_graphql::ID;

use super::loaders::{LoaderSettings, Loaders};
use super::pagination::Window;
use crate::error::{ApiError, ApiResult};
use crate::models::{Comment, NewComment, NewPost, Post, User, UserId};
use crate::services::Service;

/// Resolver behaviour knobs, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolverSettings {
    /// Loader windows and batch sizes
    pub loaders: LoaderSettings,
    /// Resolve a reply's parent before inserting it instead of leaving the
    /// check to the storage backend
    pub strict_parent_validation: bool,
}

/// Parse a GraphQL `ID` argument into a numeric identifier
pub fn parse_id(id: &ID, field: &str) -> ApiResult<i64> {
    id.parse::<i64>()
        .map_err(|_| ApiError::validation(format!("invalid {}: '{}'", field, id.as_str())))
}

/// Service handle plus the loaders owned by one request
#[derive(Clone, Debug)]
pub struct RequestContext {
    service: Service,
    loaders: Loaders,
    strict_parent_validation: bool,
}

impl RequestContext {
    /// Build a context with a fresh set of loaders
    pub fn new(service: Service, settings: &ResolverSettings) -> Self {
        let loaders = Loaders::new(&service, &settings.loaders);
        Self {
            service,
            loaders,
            strict_parent_validation: settings.strict_parent_validation,
        }
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn loaders(&self) -> &Loaders {
        &self.loaders
    }

    // ==================== Root Queries ====================

    /// Posts, newest first
    pub async fn posts(&self, window: Window) -> ApiResult<Vec<Post>> {
        self.service.posts.get_posts(window.limit, window.offset).await
    }

    /// One post by id
    pub async fn post(&self, id: i64) -> ApiResult<Post> {
        self.service.posts.get_post(id).await
    }

    /// Replies to a comment, oldest first
    pub async fn comments(&self, parent_id: i64, window: Window) -> ApiResult<Vec<Comment>> {
        let replies = self.service.comments.get_child_comments(parent_id).await?;
        Ok(window.apply(replies))
    }

    // ==================== Batched To-One Fields ====================

    /// Author of a post or comment
    pub async fn author(&self, author_id: UserId) -> ApiResult<User> {
        self.loaders
            .users
            .load(author_id)
            .await?
            .ok_or_else(|| ApiError::not_found("user", author_id))
    }

    /// Post a comment belongs to
    pub async fn comment_post(&self, comment: &Comment) -> ApiResult<Post> {
        self.loaders
            .posts
            .load(comment.post_id)
            .await?
            .ok_or_else(|| ApiError::not_found("post", comment.post_id))
    }

    /// Parent of a comment; root comments have none
    pub async fn comment_parent(&self, comment: &Comment) -> ApiResult<Option<Comment>> {
        let Some(parent_id) = comment.parent_id else {
            return Ok(None);
        };

        self.loaders
            .comments
            .load(parent_id)
            .await?
            .map(Some)
            .ok_or_else(|| ApiError::not_found("comment", parent_id))
    }

    /// Number of comments on a post, at any depth
    pub async fn post_comment_count(&self, post: &Post) -> ApiResult<usize> {
        Ok(self.loaders.comments_by_post.load(post.id).await?.len())
    }

    /// Number of direct replies to a comment
    pub async fn comment_reply_count(&self, comment: &Comment) -> ApiResult<usize> {
        Ok(self.loaders.comments_by_parent.load(comment.id).await?.len())
    }

    // ==================== Direct To-Many Fields ====================

    /// Root comments of a post, oldest first
    pub async fn post_comments(&self, post: &Post, window: Window) -> ApiResult<Vec<Comment>> {
        let roots = self.service.comments.get_comments(post.id).await?;
        Ok(window.apply(roots))
    }

    /// Direct replies to a comment, oldest first
    pub async fn comment_children(
        &self,
        comment: &Comment,
        window: Window,
    ) -> ApiResult<Vec<Comment>> {
        self.comments(comment.id, window).await
    }

    // ==================== Mutations ====================

    /// Create a post and return it as stored
    pub async fn create_post(&self, post: NewPost) -> ApiResult<Post> {
        let author_id = post.author_id;
        let id = self.service.posts.create_post(post).await?;
        tracing::info!(post_id = id, author_id, "Post created");

        self.service.posts.get_post(id).await
    }

    /// Create a comment on a post that still accepts comments
    pub async fn create_comment(&self, comment: NewComment) -> ApiResult<Comment> {
        let post = self.service.posts.get_post(comment.post_id).await?;
        if !post.allow_comments {
            tracing::debug!(post_id = post.id, "Rejected comment on blocked post");
            return Err(ApiError::validation("comments are disabled for this post"));
        }

        if let Some(parent_id) = comment.parent_id {
            if self.strict_parent_validation {
                self.check_parent(parent_id, &post).await?;
            }
        }

        let post_id = comment.post_id;
        let parent_id = comment.parent_id;
        let id = self.service.comments.create_comment(comment).await?;
        tracing::info!(comment_id = id, post_id, ?parent_id, "Comment created");

        self.service
            .comments
            .comments_by_id(&[id])
            .await?
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| ApiError::Internal(format!("comment {} missing after creation", id)))
    }

    /// Stop a post from accepting comments; repeating is harmless
    pub async fn block_comments(&self, post_id: i64) -> ApiResult<Post> {
        self.service.posts.block_comments(post_id).await?;
        tracing::info!(post_id, "Comments blocked");

        self.service.posts.get_post(post_id).await
    }

    async fn check_parent(&self, parent_id: i64, post: &Post) -> ApiResult<()> {
        let parent = self
            .loaders
            .comments
            .load(parent_id)
            .await?
            .ok_or_else(|| ApiError::not_found("comment", parent_id))?;

        if parent.post_id != post.id {
            return Err(ApiError::validation(format!(
                "parent comment {} belongs to post {}, not {}",
                parent_id, parent.post_id, post.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(&ID("42".to_string()), "postId").unwrap(), 42);
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        let err = parse_id(&ID("forty-two".to_string()), "postId").unwrap_err();
        assert_matches!(err, ApiError::ValidationError(ref msg) if msg.contains("postId"));
    }

    #[test]
    fn test_default_settings_delegate_parent_check() {
        assert!(!ResolverSettings::default().strict_parent_validation);
    }
}
