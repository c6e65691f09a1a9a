//! GraphQL mutations for Threadline
//!
//! This module contains all mutation resolvers, organized by domain.

mod comment;
mod post;

pub use comment::CommentMutation;
pub use post::PostMutation;

use async_graphql::MergedObject;

/// Root mutation type combining all mutation domains
#[derive(MergedObject, Default)]
pub struct Mutation(PostMutation, CommentMutation);
