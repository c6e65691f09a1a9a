//! Post GraphQL type
//!
//! This module defines the GraphQL type for posts with relationship resolvers.

use async_graphql::{Context, Object, Result, ResultExt, ID};
use chrono::{DateTime, Utc};

use crate::graphql::pagination::Window;
use crate::graphql::resolver::RequestContext;
use crate::models::Post as DbPost;

use super::comment::Comment;
use super::count_to_int;
use super::user::User;

/// Blog post exposed via GraphQL
pub struct Post {
    inner: DbPost,
}

impl Post {
    /// Create a new GraphQL Post from a domain Post
    pub fn new(post: DbPost) -> Self {
        Self { inner: post }
    }
}

impl From<DbPost> for Post {
    fn from(post: DbPost) -> Self {
        Self::new(post)
    }
}

#[Object]
impl Post {
    /// Unique post identifier
    async fn id(&self) -> ID {
        ID(self.inner.id.to_string())
    }

    /// Post title
    async fn title(&self) -> &str {
        &self.inner.title
    }

    /// Post body
    async fn content(&self) -> &str {
        &self.inner.content
    }

    /// Whether new comments are accepted
    async fn allow_comments(&self) -> bool {
        self.inner.allow_comments
    }

    /// Creation timestamp
    async fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    // Relationship resolvers

    /// Author of this post (batched across sibling posts)
    async fn author(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let request = ctx.data::<RequestContext>()?;
        let user = request.author(self.inner.author_id).await.extend()?;
        Ok(Some(User::from(user)))
    }

    /// Root comments, oldest first
    async fn comments(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<Comment>> {
        let request = ctx.data::<RequestContext>()?;
        let window = Window::from_args(limit, offset).extend()?;
        let comments = request.post_comments(&self.inner, window).await.extend()?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    /// Total number of comments at any depth (batched across sibling posts)
    async fn comment_count(&self, ctx: &Context<'_>) -> Result<i32> {
        let request = ctx.data::<RequestContext>()?;
        let count = request.post_comment_count(&self.inner).await.extend()?;
        Ok(count_to_int(count))
    }
}
