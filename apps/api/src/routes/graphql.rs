//! GraphQL HTTP route handlers
//!
//! - `POST /graphql` - Execute a query or mutation
//! - `GET /graphql/playground` - Interactive playground
//!
//! Each request gets its own [`RequestContext`], and with it a fresh set of
//! loaders that is dropped once the response is built.

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::graphql::{RequestContext, ResolverSettings, ThreadlineSchema};
use crate::services::Service;

/// Shared state for the GraphQL handlers
#[derive(Clone)]
pub struct GraphQLState {
    pub schema: ThreadlineSchema,
    pub service: Service,
    pub settings: ResolverSettings,
}

impl GraphQLState {
    pub fn new(schema: ThreadlineSchema, service: Service, settings: ResolverSettings) -> Self {
        Self {
            schema,
            service,
            settings,
        }
    }
}

/// Create GraphQL router
pub fn graphql_router(state: GraphQLState) -> Router {
    Router::new()
        .route("/", post(graphql_handler))
        .route("/playground", get(graphql_playground))
        .with_state(state)
}

/// Execute one GraphQL request with its own resolution context
async fn graphql_handler(State(state): State<GraphQLState>, req: GraphQLRequest) -> GraphQLResponse {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("graphql_request", %request_id);

    let context = RequestContext::new(state.service.clone(), &state.settings);
    let request = req.into_inner().data(context);

    async move {
        let response = state.schema.execute(request).await;
        if response.is_err() {
            tracing::debug!(errors = response.errors.len(), "GraphQL request completed with errors");
        }
        response.into()
    }
    .instrument(span)
    .await
}

/// GraphQL Playground handler
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}
