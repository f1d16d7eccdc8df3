//! # plexus-graphql
//!
//! GraphQL API layer for the Plexus social graph server.
//!
//! This crate exposes users, posts, profiles, membership tiers and
//! subscription edges over a dynamic async-graphql schema. It supports:
//!
//! - Query operations with batched, per-request cached relation loading
//! - Selective eager loading for `users` and `user`
//! - Create, change and delete mutations, plus subscribe / unsubscribe
//! - A depth limit enforced before execution
//!
//! ## Overview
//!
//! The schema is generated at startup from the [`SchemaRegistry`], a fixed
//! table describing every entity field. Relational fields resolve through
//! [`DataLoaders`], which coalesce the keys requested by sibling fields into
//! one bulk store call.
//!
//! ## Endpoints
//!
//! - `POST /graphql` - execute a query or mutation
//! - `GET /health` - liveness probe
//!
//! ## Configuration
//!
//! Add to `plexus.toml`:
//!
//! ```toml
//! [graphql]
//! max_depth = 5
//! introspection = true
//! batch_delay_ms = 1
//! max_batch_size = 1000
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`depth`] - Depth validation of parsed queries
//! - [`loaders`] - Batched relation loaders
//! - [`registry`] - Entity and field table
//! - [`schema`] - Schema building
//! - [`context`] - GraphQL execution context
//! - [`handler`] - Axum HTTP handlers
//! - [`error`] - Error types for GraphQL operations

pub mod config;
pub mod context;
pub mod depth;
pub mod error;
pub mod handler;
pub mod loaders;
pub mod registry;
pub mod resolvers;
pub mod schema;

// Re-export main types
pub use config::GraphQLConfig;
pub use context::{GraphQLContext, GraphQLContextBuilder};
pub use error::GraphQLError;
pub use handler::{GraphQLState, execute, graphql_handler, health_handler};
pub use loaders::DataLoaders;
pub use registry::SchemaRegistry;
pub use schema::{SchemaBuilderConfig, SocialSchemaBuilder};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
