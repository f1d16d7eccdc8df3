//! GraphQL configuration.
//!
//! Configuration is read from `plexus.toml` under the `[graphql]` section.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! max_depth = 5
//! introspection = true
//! batch_delay_ms = 1
//! max_batch_size = 1000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// GraphQL API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Maximum query depth allowed.
    /// Queries nested deeper than this are rejected before execution.
    /// Default: 5
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// How long a loader waits for more keys before dispatching a batch.
    /// Default: 1 ms
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Pending key count that dispatches a batch immediately.
    /// Default: 1000
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_max_depth() -> usize {
    5
}

fn default_introspection() -> bool {
    true
}

fn default_batch_delay_ms() -> u64 {
    1
}

fn default_max_batch_size() -> usize {
    1000
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            introspection: default_introspection(),
            batch_delay_ms: default_batch_delay_ms(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl GraphQLConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("graphql.max_depth must be > 0".into());
        }
        if self.max_batch_size == 0 {
            return Err("graphql.max_batch_size must be > 0".into());
        }
        Ok(())
    }

    /// The loader coalescing window.
    #[must_use]
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}
