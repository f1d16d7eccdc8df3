use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use plexus_graphql::{
    GraphQLError, GraphQLState, SchemaBuilderConfig, SchemaRegistry, SocialSchemaBuilder,
    graphql_handler, health_handler,
};
use plexus_storage::DynStore;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;

/// Errors raised while assembling or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("GraphQL schema build failed: {0}")]
    Schema(#[from] GraphQLError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct PlexusServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the router: `POST /graphql` and `GET /health`.
pub fn build_app(cfg: &AppConfig, store: DynStore) -> Result<Router, ServerError> {
    let registry = Arc::new(SchemaRegistry::social());
    let schema =
        SocialSchemaBuilder::new(registry, SchemaBuilderConfig::from(&cfg.graphql)).build()?;

    tracing::info!(
        backend = store.backend_name(),
        max_depth = cfg.graphql.max_depth,
        introspection = cfg.graphql.introspection,
        "GraphQL schema ready"
    );

    let state = GraphQLState {
        schema,
        store,
        config: Arc::new(cfg.graphql.clone()),
    };

    let body_limit = cfg.server.body_limit_bytes;
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/graphql", post(graphql_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(
                        |req: &axum::http::Request<axum::body::Body>| {
                            use tracing::field::Empty;
                            let req_id = req
                                .headers()
                                .get(plexus_graphql::handler::REQUEST_ID_HEADER)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("")
                                .to_string();
                            tracing::info_span!(
                                "http.request",
                                http.method = %req.method(),
                                http.target = %req.uri(),
                                http.status_code = Empty,
                                request_id = %req_id
                            )
                        },
                    ),
                )
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit));

    Ok(app)
}

pub struct ServerBuilder {
    config: AppConfig,
    store: Option<DynStore>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Uses the given store instead of a fresh in-memory one.
    pub fn with_store(mut self, store: DynStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<PlexusServer, ServerError> {
        let store = self.store.unwrap_or_else(plexus_db_memory::create_store);
        let app = build_app(&self.config, store)?;

        Ok(PlexusServer {
            addr: self.config.addr(),
            app,
        })
    }
}

impl PlexusServer {
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
