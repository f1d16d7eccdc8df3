//! # plexus-storage
//!
//! Storage abstraction layer for the Plexus social graph server.
//!
//! This crate defines the entity records and the [`SocialStore`] trait that
//! every storage backend implements. It contains no backend itself; see
//! `plexus-db-memory` for the in-memory implementation.
//!
//! ## Overview
//!
//! The data model has four record kinds and one edge kind:
//!
//! - [`User`], owning many [`Post`]s and at most one [`Profile`]
//! - [`Profile`], pointing at a [`MemberType`]
//! - [`MemberType`], drawn from the closed set [`MemberTypeId`]
//! - [`SubscriptionEdge`], a follow relation between two users
//!
//! Uniqueness and foreign key failures are reported as
//! [`StorageError::UniqueViolation`] and [`StorageError::ForeignKeyViolation`].
//!
//! ## Example
//!
//! ```ignore
//! use plexus_storage::{NewUser, SocialStore};
//!
//! async fn register(store: &dyn SocialStore) -> Result<(), StorageError> {
//!     let user = store.create_user(NewUser { name: "Alice".into(), balance: 100.0 }).await?;
//!     let posts = store.find_posts_by_author_ids(&[user.id]).await?;
//!     assert!(posts.is_empty());
//!     Ok(())
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::SocialStore;
pub use types::{
    EdgeDirection, EntityKind, MemberType, MemberTypeId, NewPost, NewProfile, NewUser, Post,
    PostPatch, Profile, ProfilePatch, SubscriptionEdge, User, UserPatch,
};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared storage trait object.
pub type DynStore = std::sync::Arc<dyn SocialStore>;
