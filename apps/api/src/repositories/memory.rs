//! In-memory storage backend
//!
//! Holds everything behind one `RwLock`. Reads clone out of the lock, so no
//! guard is ever held across an await point. IDs are assigned from monotonic
//! counters starting at 1 and are never reused.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{ApiError, ApiResult};
use crate::graphql::pagination::paginate;
use crate::models::{Comment, CommentId, NewComment, NewPost, Post, PostId, User, UserId};
use crate::services::{CommentService, PostService};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    last_post_id: PostId,
    last_comment_id: CommentId,
}

impl Tables {
    /// Comments matching `filter`, oldest first
    fn comments_where(&self, filter: impl Fn(&Comment) -> bool) -> Vec<Comment> {
        let mut matched: Vec<Comment> = self
            .comments
            .values()
            .filter(|c| filter(c))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        matched
    }
}

/// Storage backend kept entirely in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with users
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let store = Self::new();
        for user in users {
            store.insert_user(user);
        }
        store
    }

    /// Add or replace a user
    pub fn insert_user(&self, user: User) {
        self.write().users.insert(user.id, user);
    }

    /// Number of stored comments
    pub fn comment_count(&self) -> usize {
        self.read().comments.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PostService for InMemoryStore {
    async fn get_post(&self, id: PostId) -> ApiResult<Post> {
        self.read()
            .posts
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("post", id))
    }

    async fn get_posts(&self, limit: Option<usize>, offset: usize) -> ApiResult<Vec<Post>> {
        let mut posts: Vec<Post> = self.read().posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(posts, limit, offset))
    }

    async fn create_post(&self, post: NewPost) -> ApiResult<PostId> {
        let mut tables = self.write();
        tables.last_post_id += 1;
        let id = tables.last_post_id;

        tables.posts.insert(
            id,
            Post {
                id,
                author_id: post.author_id,
                title: post.title,
                content: post.content,
                allow_comments: post.allow_comments,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn block_comments(&self, id: PostId) -> ApiResult<()> {
        let mut tables = self.write();
        let post = tables
            .posts
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("post", id))?;
        post.allow_comments = false;
        Ok(())
    }

    async fn users_by_id(&self, ids: &[UserId]) -> ApiResult<Vec<Option<User>>> {
        let tables = self.read();
        Ok(ids.iter().map(|id| tables.users.get(id).cloned()).collect())
    }

    async fn posts_by_id(&self, ids: &[PostId]) -> ApiResult<Vec<Option<Post>>> {
        let tables = self.read();
        Ok(ids.iter().map(|id| tables.posts.get(id).cloned()).collect())
    }
}

#[async_trait]
impl CommentService for InMemoryStore {
    async fn get_comments(&self, post_id: PostId) -> ApiResult<Vec<Comment>> {
        Ok(self
            .read()
            .comments_where(|c| c.post_id == post_id && c.is_root()))
    }

    async fn get_child_comments(&self, parent_id: CommentId) -> ApiResult<Vec<Comment>> {
        Ok(self
            .read()
            .comments_where(|c| c.parent_id == Some(parent_id)))
    }

    async fn create_comment(&self, comment: NewComment) -> ApiResult<CommentId> {
        let mut tables = self.write();
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(ApiError::not_found("post", comment.post_id));
        }
        if let Some(parent_id) = comment.parent_id {
            if !tables.comments.contains_key(&parent_id) {
                return Err(ApiError::not_found("comment", parent_id));
            }
        }

        tables.last_comment_id += 1;
        let id = tables.last_comment_id;
        tables.comments.insert(
            id,
            Comment {
                id,
                post_id: comment.post_id,
                author_id: comment.author_id,
                parent_id: comment.parent_id,
                content: comment.content,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn comments_by_post_id(&self, post_ids: &[PostId]) -> ApiResult<Vec<Vec<Comment>>> {
        let tables = self.read();
        Ok(post_ids
            .iter()
            .map(|&post_id| tables.comments_where(|c| c.post_id == post_id))
            .collect())
    }

    async fn comments_by_parent_id(
        &self,
        parent_ids: &[CommentId],
    ) -> ApiResult<Vec<Vec<Comment>>> {
        let tables = self.read();
        Ok(parent_ids
            .iter()
            .map(|&parent_id| tables.comments_where(|c| c.parent_id == Some(parent_id)))
            .collect())
    }

    async fn comments_by_id(&self, ids: &[CommentId]) -> ApiResult<Vec<Option<Comment>>> {
        let tables = self.read();
        Ok(ids.iter().map(|id| tables.comments.get(id).cloned()).collect())
    }
}
