//! Comment queries for Threadline GraphQL API

use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::graphql::pagination::Window;
use crate::graphql::resolver::{parse_id, RequestContext};
use crate::graphql::types::Comment;

/// Comment-related queries
#[derive(Default)]
pub struct CommentQuery;

#[Object]
impl CommentQuery {
    /// Direct replies to a comment, oldest first
    async fn comments(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "parentID")] parent_id: ID,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<Comment>> {
        let request = ctx.data::<RequestContext>()?;
        let parent_id = parse_id(&parent_id, "parentID").extend()?;
        let window = Window::from_args(limit, offset).extend()?;
        let comments = request.comments(parent_id, window).await.extend()?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }
}
