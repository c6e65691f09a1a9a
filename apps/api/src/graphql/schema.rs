//! GraphQL schema builder for Threadline
//!
//! The schema itself carries no data. Everything a resolver needs arrives
//! with the request as a [`RequestContext`](super::resolver::RequestContext).

use async_graphql::{EmptySubscription, Schema};

use super::mutation::Mutation;
use super::query::Query;

/// Default maximum query depth
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// The Threadline GraphQL schema type
pub type ThreadlineSchema = Schema<Query, Mutation, EmptySubscription>;

/// Builder for constructing the GraphQL schema
pub struct SchemaBuilder {
    max_depth: usize,
    introspection: bool,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            introspection: true,
        }
    }

    /// Reject queries nested deeper than `max_depth`
    ///
    /// Deep comment threads are the natural way to build expensive queries.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable or disable introspection queries
    pub fn introspection(mut self, enabled: bool) -> Self {
        self.introspection = enabled;
        self
    }

    /// Build the schema
    pub fn build(self) -> ThreadlineSchema {
        let mut builder = Schema::build(Query::default(), Mutation::default(), EmptySubscription)
            .limit_depth(self.max_depth);

        if !self.introspection {
            builder = builder.disable_introspection();
        }

        builder.finish()
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new GraphQL schema with the given depth limit
pub fn build_schema(max_depth: usize) -> ThreadlineSchema {
    SchemaBuilder::new().max_depth(max_depth).build()
}
