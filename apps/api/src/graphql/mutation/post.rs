//! Post mutations for Threadline GraphQL API
//!
//! - createPost: Publish a new post
//! - blockComments: Stop a post from accepting comments

use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::graphql::resolver::{parse_id, RequestContext};
use crate::graphql::types::Post;
use crate::models::NewPost;

/// Post mutations
#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    /// Create a new post; every argument is required
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "authorID")] author_id: ID,
        title: String,
        content: String,
        allow_comments: bool,
    ) -> Result<Post> {
        let request = ctx.data::<RequestContext>()?;
        let post = NewPost {
            author_id: parse_id(&author_id, "authorID").extend()?,
            title,
            content,
            allow_comments,
        };
        let created = request.create_post(post).await.extend()?;
        Ok(Post::from(created))
    }

    /// Turn comments off for a post
    async fn block_comments(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "postID")] post_id: ID,
    ) -> Result<Post> {
        let request = ctx.data::<RequestContext>()?;
        let post_id = parse_id(&post_id, "postID").extend()?;
        let post = request.block_comments(post_id).await.extend()?;
        Ok(Post::from(post))
    }
}
