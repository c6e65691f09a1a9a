//! Service doubles for resolver tests
//!
//! [`RecordingService`] delegates to an [`InMemoryStore`] and records every
//! batched call so tests can assert how lookups were coalesced.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use threadline_api::models::{
    Comment, CommentId, NewComment, NewPost, Post, PostId, User, UserId,
};
use threadline_api::repositories::InMemoryStore;
use threadline_api::{ApiError, ApiResult, CommentService, PostService, Service};

/// Batched calls observed by a [`RecordingService`]
#[derive(Debug, Default)]
pub struct CallLog {
    pub users_by_id: Vec<Vec<UserId>>,
    pub posts_by_id: Vec<Vec<PostId>>,
    pub comments_by_id: Vec<Vec<CommentId>>,
    pub comments_by_post_id: Vec<Vec<PostId>>,
    pub comments_by_parent_id: Vec<Vec<CommentId>>,
    pub create_comment: usize,
}

/// In-memory backend that records batched calls
pub struct RecordingService {
    store: Arc<InMemoryStore>,
    calls: Mutex<CallLog>,
    fail_users: bool,
}

impl RecordingService {
    pub fn new(store: Arc<InMemoryStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            calls: Mutex::new(CallLog::default()),
            fail_users: false,
        })
    }

    /// A service whose user lookups always fail with an upstream error
    pub fn failing_users(store: Arc<InMemoryStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            calls: Mutex::new(CallLog::default()),
            fail_users: true,
        })
    }

    pub fn service(self: &Arc<Self>) -> Service {
        Service::from_backend(self.clone())
    }

    pub fn calls<R>(&self, f: impl FnOnce(&CallLog) -> R) -> R {
        f(&self.calls.lock().unwrap())
    }

    fn record(&self, f: impl FnOnce(&mut CallLog)) {
        f(&mut self.calls.lock().unwrap());
    }
}

#[async_trait]
impl PostService for RecordingService {
    async fn get_post(&self, id: PostId) -> ApiResult<Post> {
        self.store.get_post(id).await
    }

    async fn get_posts(&self, limit: Option<usize>, offset: usize) -> ApiResult<Vec<Post>> {
        self.store.get_posts(limit, offset).await
    }

    async fn create_post(&self, post: NewPost) -> ApiResult<PostId> {
        self.store.create_post(post).await
    }

    async fn block_comments(&self, id: PostId) -> ApiResult<()> {
        self.store.block_comments(id).await
    }

    async fn users_by_id(&self, ids: &[UserId]) -> ApiResult<Vec<Option<User>>> {
        self.record(|c| c.users_by_id.push(ids.to_vec()));
        if self.fail_users {
            return Err(ApiError::Upstream("user directory unavailable".to_string()));
        }
        self.store.users_by_id(ids).await
    }

    async fn posts_by_id(&self, ids: &[PostId]) -> ApiResult<Vec<Option<Post>>> {
        self.record(|c| c.posts_by_id.push(ids.to_vec()));
        self.store.posts_by_id(ids).await
    }
}

#[async_trait]
impl CommentService for RecordingService {
    async fn get_comments(&self, post_id: PostId) -> ApiResult<Vec<Comment>> {
        self.store.get_comments(post_id).await
    }

    async fn get_child_comments(&self, parent_id: CommentId) -> ApiResult<Vec<Comment>> {
        self.store.get_child_comments(parent_id).await
    }

    async fn create_comment(&self, comment: NewComment) -> ApiResult<CommentId> {
        self.record(|c| c.create_comment += 1);
        self.store.create_comment(comment).await
    }

    async fn comments_by_post_id(&self, post_ids: &[PostId]) -> ApiResult<Vec<Vec<Comment>>> {
        self.record(|c| c.comments_by_post_id.push(post_ids.to_vec()));
        self.store.comments_by_post_id(post_ids).await
    }

    async fn comments_by_parent_id(
        &self,
        parent_ids: &[CommentId],
    ) -> ApiResult<Vec<Vec<Comment>>> {
        self.record(|c| c.comments_by_parent_id.push(parent_ids.to_vec()));
        self.store.comments_by_parent_id(parent_ids).await
    }

    async fn comments_by_id(&self, ids: &[CommentId]) -> ApiResult<Vec<Option<Comment>>> {
        self.record(|c| c.comments_by_id.push(ids.to_vec()));
        self.store.comments_by_id(ids).await
    }
}
