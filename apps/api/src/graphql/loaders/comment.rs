//! Comment loader for batched `Comment.parent` lookups

use std::sync::Arc;

use super::batch::{BatchFn, BatchLoader, KeyResult};
use crate::error::ApiResult;
use crate::models::{Comment, CommentId};
use crate::services::CommentService;

/// Fetches comments by id
#[derive(Clone)]
pub struct CommentFetch {
    comments: Arc<dyn CommentService>,
}

impl CommentFetch {
    pub fn new(comments: Arc<dyn CommentService>) -> Self {
        Self { comments }
    }
}

impl BatchFn for CommentFetch {
    type Key = CommentId;
    type Value = Option<Comment>;

    async fn fetch(&self, keys: &[CommentId]) -> ApiResult<Vec<KeyResult<Option<Comment>>>> {
        let comments = self.comments.comments_by_id(keys).await?;
        Ok(comments.into_iter().map(Ok).collect())
    }
}

/// Batched comment loader
pub type CommentLoader = BatchLoader<CommentFetch>;
