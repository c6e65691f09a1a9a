//! Comment mutations for Threadline GraphQL API

use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::error::ApiResult;
use crate::graphql::resolver::{parse_id, RequestContext};
use crate::graphql::types::Comment;
use crate::models::NewComment;

/// Parse the raw mutation arguments into a comment payload
fn new_comment(
    post_id: &ID,
    author_id: &ID,
    parent_id: Option<&ID>,
    content: String,
) -> ApiResult<NewComment> {
    Ok(NewComment {
        post_id: parse_id(post_id, "postID")?,
        author_id: parse_id(author_id, "authorID")?,
        parent_id: parent_id.map(|id| parse_id(id, "parentID")).transpose()?,
        content,
    })
}

/// Comment mutations
#[derive(Default)]
pub struct CommentMutation;

#[Object]
impl CommentMutation {
    /// Create a comment on a post that accepts comments
    ///
    /// `parentID` is omitted for root comments.
    async fn create_comment(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "postID")] post_id: ID,
        #[graphql(name = "authorID")] author_id: ID,
        #[graphql(name = "parentID")] parent_id: Option<ID>,
        content: String,
    ) -> Result<Comment> {
        let request = ctx.data::<RequestContext>()?;
        let comment = new_comment(&post_id, &author_id, parent_id.as_ref(), content).extend()?;
        let created = request.create_comment(comment).await.extend()?;
        Ok(Comment::from(created))
    }
}
