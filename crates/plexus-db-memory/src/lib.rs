//! In-memory storage backend for the Plexus social graph server.
//!
//! This crate provides an in-memory implementation of the `SocialStore` trait
//! from `plexus-storage`. Tables live behind a single `tokio::sync::RwLock`;
//! the cascading user delete is applied through an undo journal so that it is
//! all-or-nothing.
//!
//! # Example
//!
//! ```ignore
//! use plexus_db_memory::MemoryStore;
//! use plexus_storage::{NewUser, SocialStore};
//!
//! let store = MemoryStore::new();
//! let alice = store.create_user(NewUser { name: "Alice".into(), balance: 100.0 }).await?;
//! ```

mod social_impl;
mod storage;
mod transaction;

pub use plexus_storage::{SocialStore, StorageError};
pub use storage::{MemoryStore, default_member_types};

/// Creates a new shareable in-memory store.
pub fn create_store() -> plexus_storage::DynStore {
    std::sync::Arc::new(MemoryStore::new())
}
