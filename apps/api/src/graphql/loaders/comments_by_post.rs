//! Comments-by-Post loader for batched fetching
//!
//! Returns every comment of each requested post, oldest first. An unknown
//! post yields an empty list.

use std::sync::Arc;

use super::batch::{BatchFn, BatchLoader, KeyResult};
use crate::error::ApiResult;
use crate::models::{Comment, PostId};
use crate::services::CommentService;

/// Fetches the comment list of each post
#[derive(Clone)]
pub struct CommentsByPostFetch {
    comments: Arc<dyn CommentService>,
}

impl CommentsByPostFetch {
    pub fn new(comments: Arc<dyn CommentService>) -> Self {
        Self { comments }
    }
}

impl BatchFn for CommentsByPostFetch {
    type Key = PostId;
    type Value = Vec<Comment>;

    async fn fetch(&self, keys: &[PostId]) -> ApiResult<Vec<KeyResult<Vec<Comment>>>> {
        let lists = self.comments.comments_by_post_id(keys).await?;
        Ok(lists.into_iter().map(Ok).collect())
    }
}

/// Batched comments-by-post loader
pub type CommentsByPostLoader = BatchLoader<CommentsByPostFetch>;
