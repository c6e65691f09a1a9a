//! Test fixtures for API integration tests
//!
//! Provides a seeded store and helpers for running GraphQL documents.

#![allow(dead_code)]

use std::sync::Arc;

use async_graphql::Response;
use serde_json::Value;
use threadline_api::graphql::{
    build_schema, RequestContext, ResolverSettings, DEFAULT_MAX_DEPTH,
};
use threadline_api::models::{CommentId, NewComment, NewPost, PostId, User, UserId};
use threadline_api::repositories::InMemoryStore;
use threadline_api::{CommentService, PostService, Service};

pub const ALICE: UserId = 1;
pub const BOB: UserId = 2;

/// Store with two users and nothing else
pub fn store_with_users() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_users([
        User {
            id: ALICE,
            username: "alice".to_string(),
        },
        User {
            id: BOB,
            username: "bob".to_string(),
        },
    ]))
}

pub async fn add_post(store: &InMemoryStore, author_id: UserId, allow_comments: bool) -> PostId {
    store
        .create_post(NewPost {
            author_id,
            title: format!("post by {}", author_id),
            content: "body".to_string(),
            allow_comments,
        })
        .await
        .unwrap()
}

pub async fn add_comment(
    store: &InMemoryStore,
    post_id: PostId,
    parent_id: Option<CommentId>,
    author_id: UserId,
) -> CommentId {
    store
        .create_comment(NewComment {
            post_id,
            author_id,
            parent_id,
            content: "comment".to_string(),
        })
        .await
        .unwrap()
}

/// Run a GraphQL document with a fresh request context
pub async fn execute(service: &Service, settings: ResolverSettings, query: &str) -> Response {
    let schema = build_schema(DEFAULT_MAX_DEPTH);
    let context = RequestContext::new(service.clone(), &settings);
    schema
        .execute(async_graphql::Request::new(query).data(context))
        .await
}

/// Response data as JSON
pub fn data(response: &Response) -> Value {
    response.data.clone().into_json().unwrap()
}

/// `extensions.code` of every error, in order
pub fn error_codes(response: &Response) -> Vec<String> {
    response
        .errors
        .iter()
        .filter_map(|e| e.extensions.as_ref()?.get("code").cloned())
        .filter_map(|v| match v {
            async_graphql::Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}
