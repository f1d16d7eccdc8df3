//! Storage trait for the social graph storage layer.
//!
//! Every lookup has a bulk form: it takes a slice of keys and returns all
//! matching records in a single round trip. Loaders in the GraphQL layer rely
//! on this to stay free of N+1 behaviour.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::{
    EdgeDirection, MemberType, MemberTypeId, NewPost, NewProfile, NewUser, Post, PostPatch,
    Profile, ProfilePatch, SubscriptionEdge, User, UserPatch,
};

/// The storage contract consumed by loaders, resolvers and mutations.
///
/// Implementations must be thread-safe (`Send + Sync`). Bulk lookups return
/// matching records in any order; callers do their own key correspondence.
/// Keys with no match are simply absent from the result.
///
/// # Example
///
/// ```ignore
/// use plexus_storage::{SocialStore, StorageError, User};
///
/// async fn get_user(store: &dyn SocialStore, id: Uuid) -> Result<Option<User>, StorageError> {
///     Ok(store.find_users_by_ids(&[id]).await?.into_iter().next())
/// }
/// ```
#[async_trait]
pub trait SocialStore: Send + Sync {
    // ==================== Lookups by primary key ====================

    /// Returns the users whose id is in `ids`.
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, StorageError>;

    /// Returns the posts whose id is in `ids`.
    async fn find_posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, StorageError>;

    /// Returns the profiles whose id is in `ids`.
    async fn find_profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, StorageError>;

    /// Returns the member types whose id is in `ids`.
    async fn find_member_types_by_ids(
        &self,
        ids: &[MemberTypeId],
    ) -> Result<Vec<MemberType>, StorageError>;

    // ==================== Lookups by foreign key ====================

    /// Returns every post written by any of `author_ids`.
    async fn find_posts_by_author_ids(&self, author_ids: &[Uuid])
    -> Result<Vec<Post>, StorageError>;

    /// Returns the profiles owned by any of `user_ids`.
    async fn find_profiles_by_user_ids(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<Profile>, StorageError>;

    /// Returns the profiles on any of the given member types.
    async fn find_profiles_by_member_type_ids(
        &self,
        member_type_ids: &[MemberTypeId],
    ) -> Result<Vec<Profile>, StorageError>;

    /// Returns the edges anchored on any of `user_ids` for `direction`.
    async fn find_edges(
        &self,
        direction: EdgeDirection,
        user_ids: &[Uuid],
    ) -> Result<Vec<SubscriptionEdge>, StorageError>;

    // ==================== Full listings ====================

    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    async fn list_posts(&self) -> Result<Vec<Post>, StorageError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError>;

    async fn list_member_types(&self) -> Result<Vec<MemberType>, StorageError>;

    // ==================== Writes ====================

    /// Inserts a user and returns the stored record.
    async fn create_user(&self, input: NewUser) -> Result<User, StorageError>;

    /// Inserts a post.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ForeignKeyViolation` if the author does not exist.
    async fn create_post(&self, input: NewPost) -> Result<Post, StorageError>;

    /// Inserts a profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UniqueViolation` if the user already has a profile.
    /// Returns `StorageError::ForeignKeyViolation` if the user or member type
    /// does not exist.
    async fn create_profile(&self, input: NewProfile) -> Result<Profile, StorageError>;

    /// Applies a partial update to a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist.
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, StorageError>;

    /// Applies a partial update to a post.
    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Post, StorageError>;

    /// Applies a partial update to a profile.
    async fn update_profile(&self, id: Uuid, patch: ProfilePatch)
    -> Result<Profile, StorageError>;

    /// Deletes a user together with its posts, its profile and every
    /// subscription edge it takes part in.
    ///
    /// The cascade is atomic: either all dependent records are removed or
    /// none are. Returns `false` if the user did not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if the cascade was rolled back.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Deletes a post. Returns `false` if it did not exist.
    async fn delete_post(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Deletes a profile. Returns `false` if it did not exist.
    async fn delete_profile(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Inserts a subscription edge.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UniqueViolation` if the edge already exists.
    /// Returns `StorageError::ForeignKeyViolation` if either user does not exist.
    async fn insert_edge(
        &self,
        subscriber_id: Uuid,
        author_id: Uuid,
    ) -> Result<SubscriptionEdge, StorageError>;

    /// Deletes a subscription edge by its composite key. Returns `false` if
    /// the edge did not exist.
    async fn delete_edge(&self, subscriber_id: Uuid, author_id: Uuid)
    -> Result<bool, StorageError>;

    // ==================== Metadata ====================

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
