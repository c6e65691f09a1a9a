//! Comments-by-Parent loader for batched fetching
//!
//! Returns the direct replies of each requested comment, oldest first.

use std::sync::Arc;

use super::batch::{BatchFn, BatchLoader, KeyResult};
use crate::error::ApiResult;
use crate::models::{Comment, CommentId};
use crate::services::CommentService;

/// Fetches the reply list of each parent comment
#[derive(Clone)]
pub struct CommentsByParentFetch {
    comments: Arc<dyn CommentService>,
}

impl CommentsByParentFetch {
    pub fn new(comments: Arc<dyn CommentService>) -> Self {
        Self { comments }
    }
}

impl BatchFn for CommentsByParentFetch {
    type Key = CommentId;
    type Value = Vec<Comment>;

    async fn fetch(&self, keys: &[CommentId]) -> ApiResult<Vec<KeyResult<Vec<Comment>>>> {
        let lists = self.comments.comments_by_parent_id(keys).await?;
        Ok(lists.into_iter().map(Ok).collect())
    }
}

/// Batched comments-by-parent loader
pub type CommentsByParentLoader = BatchLoader<CommentsByParentFetch>;
