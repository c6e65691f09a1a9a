//! User loader for batched author lookups
//!
//! Post and comment authors fan out across every object in a response, so
//! this loader uses a short window and a large batch.

use std::sync::Arc;

use super::batch::{BatchFn, BatchLoader, KeyResult};
use crate::error::ApiResult;
use crate::models::{User, UserId};
use crate::services::PostService;

/// Fetches users by id through the post service
#[derive(Clone)]
pub struct UserFetch {
    posts: Arc<dyn PostService>,
}

impl UserFetch {
    pub fn new(posts: Arc<dyn PostService>) -> Self {
        Self { posts }
    }
}

impl BatchFn for UserFetch {
    type Key = UserId;
    type Value = Option<User>;

    async fn fetch(&self, keys: &[UserId]) -> ApiResult<Vec<KeyResult<Option<User>>>> {
        let users = self.posts.users_by_id(keys).await?;
        Ok(users.into_iter().map(Ok).collect())
    }
}

/// Batched user loader
pub type UserLoader = BatchLoader<UserFetch>;
