//! GraphQL Module - Schema, resolver e handler axum
//!
//! Lo schema riceve `Arc<AppState>` come dato globale; i claims del bearer token
//! (se presenti) vengono aggiunti come dato della singola richiesta.

pub mod mutation;
pub mod query;
pub mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use crate::core::{AppState, bearer_claims};
use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, ErrorExtensions, Pos, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Extension,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
};
use std::sync::Arc;
use tracing::{debug, instrument};

pub type AutoSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(state: Arc<AppState>) -> AutoSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

#[instrument(skip_all)]
pub async fn graphql_handler(
    State(state): State<Arc<AppState>>,
    Extension(schema): Extension<AutoSchema>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    match bearer_claims(&headers, &state.jwt_secret) {
        Ok(Some(claims)) => {
            debug!("GraphQL request from {}", claims.username);
            request = request.data(claims);
        }
        Ok(None) => debug!("Anonymous GraphQL request"),
        Err(e) => {
            let error = e.extend().into_server_error(Pos::default());
            return async_graphql::Response::from_errors(vec![error]).into();
        }
    }
    schema.execute(request).await.into()
}

/// Editor GraphiQL per provare le query dal browser
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
