//! GraphQL schema and resolvers for Threadline
//!
//! This module contains the async-graphql schema including:
//! - Query and mutation roots
//! - Object types for posts, comments and users
//! - The per-request resolution context and its batch loaders
//! - Limit/offset windowing shared by list fields

pub mod loaders;
pub mod mutation;
pub mod pagination;
pub mod query;
pub mod resolver;
pub mod schema;
pub mod types;

pub use resolver::{RequestContext, ResolverSettings};
pub use schema::{build_schema, SchemaBuilder, ThreadlineSchema, DEFAULT_MAX_DEPTH};
