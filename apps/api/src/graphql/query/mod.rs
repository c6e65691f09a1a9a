//! GraphQL queries for Threadline
//!
//! This module contains all query resolvers, organized by domain.

mod comment;
mod post;

pub use comment::CommentQuery;
pub use post::PostQuery;

use async_graphql::MergedObject;

/// Root query type combining all query domains
#[derive(MergedObject, Default)]
pub struct Query(PostQuery, CommentQuery);
