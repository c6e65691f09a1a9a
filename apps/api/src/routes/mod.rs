//! HTTP route handlers for the Threadline API
//!
//! This module contains all HTTP endpoint handlers including:
//! - The GraphQL endpoint and playground
//! - Health check and status endpoints

pub mod graphql;
pub mod health;

pub use graphql::{graphql_router, GraphQLState};
pub use health::{health_router, HealthState};

use axum::{http::Uri, Router};

use crate::error::ApiError;

/// Assemble every route of the API
pub fn app_router(graphql: GraphQLState, health: HealthState) -> Router {
    Router::new()
        .route("/", axum::routing::get(root))
        // GraphQL endpoints: /graphql, /graphql/playground
        .nest("/graphql", graphql_router(graphql))
        // Nested health routes: /health, /health/live, /health/ready
        .nest("/health", health_router(health))
        .fallback(not_found)
}

async fn root() -> &'static str {
    "Threadline - threaded comments API"
}

/// JSON 404 for unknown routes
async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found("route", uri.path())
}
