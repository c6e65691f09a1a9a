//! GraphQL type definitions for Threadline
//!
//! Each type wraps its domain model and resolves relational fields through
//! the request's [`RequestContext`](crate::graphql::resolver::RequestContext).

mod comment;
mod post;
mod user;

pub use comment::Comment;
pub use post::Post;
pub use user::User;

/// Convert a count to a GraphQL `Int`, saturating at `i32::MAX`
pub(crate) fn count_to_int(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
