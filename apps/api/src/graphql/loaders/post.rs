//! Post loader for batched `Comment.post` lookups

use std::sync::Arc;

use super::batch::{BatchFn, BatchLoader, KeyResult};
use crate::error::ApiResult;
use crate::models::{Post, PostId};
use crate::services::PostService;

/// Fetches posts by id
#[derive(Clone)]
pub struct PostFetch {
    posts: Arc<dyn PostService>,
}

impl PostFetch {
    pub fn new(posts: Arc<dyn PostService>) -> Self {
        Self { posts }
    }
}

impl BatchFn for PostFetch {
    type Key = PostId;
    type Value = Option<Post>;

    async fn fetch(&self, keys: &[PostId]) -> ApiResult<Vec<KeyResult<Option<Post>>>> {
        let posts = self.posts.posts_by_id(keys).await?;
        Ok(posts.into_iter().map(Ok).collect())
    }
}

/// Batched post loader
pub type PostLoader = BatchLoader<PostFetch>;
