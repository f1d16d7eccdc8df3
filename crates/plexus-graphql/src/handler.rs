//! Axum HTTP handlers for GraphQL endpoints.
//!
//! - `POST /graphql` - executes a query or mutation
//! - `GET /health` - liveness probe
//!
//! Every request is parsed and run through the depth check before the schema
//! executes it. A request that fails either step is answered with an
//! errors-only body and status 400.

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use async_graphql::{Request, Response, Variables};
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use plexus_storage::DynStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::GraphQLConfig;
use crate::context::GraphQLContextBuilder;
use crate::depth;
use crate::error::GraphQLError;

/// Header carrying the caller's request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// State shared across GraphQL handlers.
#[derive(Clone)]
pub struct GraphQLState {
    /// The schema, built once at startup.
    pub schema: Schema,

    /// Store handle cloned into each request's context.
    pub store: DynStore,

    /// Depth limit and loader settings.
    pub config: Arc<GraphQLConfig>,
}

/// GraphQL request body.
#[derive(Debug, Deserialize)]
pub struct GraphQLRequest {
    /// The GraphQL query string.
    pub query: String,

    /// Optional operation name for multi-operation documents.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables for the query.
    pub variables: Option<serde_json::Value>,
}

/// GraphQL response body.
#[derive(Debug, Serialize)]
pub struct GraphQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,
}

impl GraphQLResponse {
    /// An errors-only response.
    #[must_use]
    pub fn from_errors(errors: impl IntoIterator<Item = GraphQLError>) -> Self {
        Self {
            data: None,
            errors: errors.into_iter().map(|e| e.to_response_error()).collect(),
        }
    }
}

impl From<Response> for GraphQLResponse {
    fn from(resp: Response) -> Self {
        let data_json = serde_json::to_value(&resp.data).unwrap_or(serde_json::Value::Null);
        let data = if data_json.is_null() {
            None
        } else {
            Some(data_json)
        };

        let errors = resp
            .errors
            .iter()
            .map(|e| serde_json::to_value(e).unwrap_or(serde_json::Value::Null))
            .collect();

        Self { data, errors }
    }
}

/// Handles `POST /graphql`.
pub async fn graphql_handler(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    Json(request): Json<GraphQLRequest>,
) -> impl IntoResponse {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

    let (status, body) = execute(&state, request, request_id).await;

    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
}

/// Handles `GET /health`.
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Validates and executes one GraphQL request.
///
/// Returns 400 with errors only if the query does not parse or nests deeper
/// than `max_depth`. Otherwise returns 200 with whatever the schema produced,
/// which may include field errors next to partial data.
pub async fn execute(
    state: &GraphQLState,
    request: GraphQLRequest,
    request_id: String,
) -> (StatusCode, GraphQLResponse) {
    let document = match async_graphql_parser::parse_query(&request.query) {
        Ok(document) => document,
        Err(e) => {
            debug!(request_id = %request_id, error = %e, "Rejected unparseable query");
            return error_response([GraphQLError::InvalidQuery(e.to_string())]);
        }
    };

    let violations = depth::validate(&document, state.config.max_depth);
    if !violations.is_empty() {
        warn!(
            request_id = %request_id,
            violations = violations.len(),
            max_depth = state.config.max_depth,
            "Rejected query exceeding depth limit"
        );
        return error_response(violations.into_iter().map(GraphQLError::from));
    }

    let context = match GraphQLContextBuilder::new()
        .with_store(state.store.clone())
        .with_config(state.config.as_ref().clone())
        .with_request_id(request_id.clone())
        .build()
    {
        Ok(ctx) => ctx,
        Err(e) => return error_response([GraphQLError::Internal(e.to_string())]),
    };

    let mut gql_request = Request::new(request.query);
    if let Some(op_name) = request.operation_name {
        gql_request = gql_request.operation_name(op_name);
    }
    if let Some(vars) = request.variables {
        gql_request = gql_request.variables(Variables::from_json(vars));
    }
    gql_request = gql_request.data(context);

    debug!(request_id = %request_id, "Executing GraphQL request");
    let response = state.schema.execute(gql_request).await;

    (StatusCode::OK, GraphQLResponse::from(response))
}

fn error_response(
    errors: impl IntoIterator<Item = GraphQLError>,
) -> (StatusCode, GraphQLResponse) {
    let errors: Vec<GraphQLError> = errors.into_iter().collect();
    let status = errors
        .first()
        .and_then(|e| StatusCode::from_u16(e.status_code()).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, GraphQLResponse::from_errors(errors))
}
