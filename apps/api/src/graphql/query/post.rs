//! Post queries for Threadline GraphQL API

use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::graphql::pagination::Window;
use crate::graphql::resolver::{parse_id, RequestContext};
use crate::graphql::types::Post;

/// Post-related queries
#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// List posts, newest first
    async fn posts(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<Post>> {
        let request = ctx.data::<RequestContext>()?;
        let window = Window::from_args(limit, offset).extend()?;
        let posts = request.posts(window).await.extend()?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    /// Get a post by ID
    async fn post(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Post>> {
        let request = ctx.data::<RequestContext>()?;
        let id = parse_id(&id, "id").extend()?;
        let post = request.post(id).await.extend()?;
        Ok(Some(Post::from(post)))
    }
}
