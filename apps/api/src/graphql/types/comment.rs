//! Comment GraphQL type

use async_graphql::{Context, Object, Result, ResultExt, ID};
use chrono::{DateTime, Utc};

use crate::graphql::pagination::Window;
use crate::graphql::resolver::RequestContext;
use crate::models::Comment as DbComment;

use super::count_to_int;
use super::post::Post;
use super::user::User;

/// Comment exposed via GraphQL
pub struct Comment {
    inner: DbComment,
}

impl From<DbComment> for Comment {
    fn from(comment: DbComment) -> Self {
        Self { inner: comment }
    }
}

#[Object]
impl Comment {
    /// Unique comment identifier
    async fn id(&self) -> ID {
        ID(self.inner.id.to_string())
    }

    /// Comment body
    async fn content(&self) -> &str {
        &self.inner.content
    }

    /// Creation timestamp
    async fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// Identifier of the parent comment, null for root comments
    async fn parent_id(&self) -> Option<ID> {
        self.inner.parent_id.map(|id| ID(id.to_string()))
    }

    // Relationship resolvers

    /// Author of this comment (batched across sibling comments)
    async fn author(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let request = ctx.data::<RequestContext>()?;
        let user = request.author(self.inner.author_id).await.extend()?;
        Ok(Some(User::from(user)))
    }

    /// Post this comment belongs to
    async fn post(&self, ctx: &Context<'_>) -> Result<Option<Post>> {
        let request = ctx.data::<RequestContext>()?;
        let post = request.comment_post(&self.inner).await.extend()?;
        Ok(Some(Post::from(post)))
    }

    /// Parent comment, null for root comments
    async fn parent(&self, ctx: &Context<'_>) -> Result<Option<Comment>> {
        let request = ctx.data::<RequestContext>()?;
        let parent = request.comment_parent(&self.inner).await.extend()?;
        Ok(parent.map(Comment::from))
    }

    /// Direct replies, oldest first
    async fn children(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<Comment>> {
        let request = ctx.data::<RequestContext>()?;
        let window = Window::from_args(limit, offset).extend()?;
        let children = request.comment_children(&self.inner, window).await.extend()?;
        Ok(children.into_iter().map(Comment::from).collect())
    }

    /// Number of direct replies (batched across sibling comments)
    async fn reply_count(&self, ctx: &Context<'_>) -> Result<i32> {
        let request = ctx.data::<RequestContext>()?;
        let count = request.comment_reply_count(&self.inner).await.extend()?;
        Ok(count_to_int(count))
    }
}
