//! Batch loaders for GraphQL relationship resolvers
//!
//! This module provides the loaders that solve the N+1 problem for nested
//! lookups. A fresh [`Loaders`] set is built for every inbound request and
//! dropped with it, so no cached value outlives the response it served.
//!
//! There are two kinds of loaders:
//! - Single-entity loaders: return `Option<T>` for one entity by id
//! - Collection loaders: return `Vec<T>` of related entities by parent id

mod batch;
mod comment;
mod comments_by_parent;
mod comments_by_post;
mod post;
mod user;

pub use batch::{BatchConfig, BatchFn, BatchLoader, KeyResult};
pub use comment::{CommentFetch, CommentLoader};
pub use comments_by_parent::{CommentsByParentFetch, CommentsByParentLoader};
pub use comments_by_post::{CommentsByPostFetch, CommentsByPostLoader};
pub use post::{PostFetch, PostLoader};
pub use user::{UserFetch, UserLoader};

use std::time::Duration;

use crate::services::Service;

/// Window and size settings for every loader of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderSettings {
    /// Users and posts: short window, large batches
    pub entity: BatchConfig,
    /// Comments by id, by post and by parent
    pub comment: BatchConfig,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            entity: BatchConfig::new(Duration::from_millis(2), 100),
            comment: BatchConfig::new(Duration::from_millis(5), 50),
        }
    }
}

/// Container for all loader instances of one request
#[derive(Clone, Debug)]
pub struct Loaders {
    pub users: UserLoader,
    pub posts: PostLoader,
    pub comments: CommentLoader,
    pub comments_by_post: CommentsByPostLoader,
    pub comments_by_parent: CommentsByParentLoader,
}

impl Loaders {
    /// Create all loaders over `service`
    pub fn new(service: &Service, settings: &LoaderSettings) -> Self {
        Self {
            users: BatchLoader::new(
                "users",
                UserFetch::new(service.posts.clone()),
                settings.entity,
            ),
            posts: BatchLoader::new(
                "posts",
                PostFetch::new(service.posts.clone()),
                settings.entity,
            ),
            comments: BatchLoader::new(
                "comments",
                CommentFetch::new(service.comments.clone()),
                settings.comment,
            ),
            comments_by_post: BatchLoader::new(
                "comments_by_post",
                CommentsByPostFetch::new(service.comments.clone()),
                settings.comment,
            ),
            comments_by_parent: BatchLoader::new(
                "comments_by_parent",
                CommentsByParentFetch::new(service.comments.clone()),
                settings.comment,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = LoaderSettings::default();
        assert_eq!(settings.entity.wait, Duration::from_millis(2));
        assert_eq!(settings.entity.max_batch, 100);
        assert_eq!(settings.comment.wait, Duration::from_millis(5));
        assert_eq!(settings.comment.max_batch, 50);
    }
}
