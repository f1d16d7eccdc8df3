//! GraphQL execution context.
//!
//! The context is constructed per request. It carries the shared store handle
//! and a fresh set of [`DataLoaders`], so batching windows and caches never
//! span two requests.
//!
//! # Example
//!
//! ```ignore
//! use plexus_graphql::GraphQLContextBuilder;
//!
//! let context = GraphQLContextBuilder::new()
//!     .with_store(store.clone())
//!     .with_config(config.clone())
//!     .with_request_id("req-123")
//!     .build()?;
//! ```

use plexus_storage::DynStore;

use crate::config::GraphQLConfig;
use crate::loaders::DataLoaders;

/// GraphQL execution context.
#[derive(Clone)]
pub struct GraphQLContext {
    /// Social graph storage.
    pub store: DynStore,

    /// Request ID for tracing and correlation.
    pub request_id: String,

    /// DataLoaders scoped to this request.
    pub loaders: DataLoaders,
}

impl GraphQLContext {
    /// Creates a new builder for GraphQLContext.
    #[must_use]
    pub fn builder() -> GraphQLContextBuilder {
        GraphQLContextBuilder::default()
    }
}

/// Builder for constructing GraphQLContext.
#[derive(Default)]
pub struct GraphQLContextBuilder {
    store: Option<DynStore>,
    config: Option<GraphQLConfig>,
    request_id: Option<String>,
}

impl GraphQLContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage backend.
    #[must_use]
    pub fn with_store(mut self, store: DynStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the loader configuration. Defaults apply when unset.
    #[must_use]
    pub fn with_config(mut self, config: GraphQLConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Builds the GraphQLContext.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<GraphQLContext, ContextBuilderError> {
        let store = self.store.ok_or(ContextBuilderError::MissingField("store"))?;

        let request_id = self
            .request_id
            .ok_or(ContextBuilderError::MissingField("request_id"))?;

        let config = self.config.unwrap_or_default();
        let loaders = DataLoaders::new(store.clone(), &config);

        Ok(GraphQLContext {
            store,
            request_id,
            loaders,
        })
    }
}

/// Errors that can occur when building a GraphQLContext.
#[derive(Debug, thiserror::Error)]
pub enum ContextBuilderError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
