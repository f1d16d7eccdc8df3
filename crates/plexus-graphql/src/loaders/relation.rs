//! Bulk functions for lookups by foreign key and across subscription edges.
//!
//! Each function groups the rows of one store call by the key they belong to.
//! Owners without rows get an empty list (or `None` for the one-to-one
//! profile relation).

use std::collections::HashMap;

use plexus_storage::{DynStore, EdgeDirection, MemberTypeId, Post, Profile, StorageResult};
use tracing::trace;
use uuid::Uuid;

use super::BatchFn;

/// Loads the posts written by each author.
pub struct PostsByAuthor {
    store: DynStore,
}

impl PostsByAuthor {
    /// Creates a new posts-by-author loader.
    #[must_use]
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }
}

impl BatchFn<Uuid> for PostsByAuthor {
    type Value = Vec<Post>;

    const NAME: &'static str = "posts_by_author";

    async fn fetch(&self, keys: &[Uuid]) -> StorageResult<Vec<Vec<Post>>> {
        let posts = self.store.find_posts_by_author_ids(keys).await?;
        trace!(authors = keys.len(), posts = posts.len(), "Posts fetched");

        let mut grouped: HashMap<Uuid, Vec<Post>> = HashMap::with_capacity(keys.len());
        for post in posts {
            grouped.entry(post.author_id).or_default().push(post);
        }
        Ok(keys
            .iter()
            .map(|id| grouped.remove(id).unwrap_or_default())
            .collect())
    }
}

/// Loads the profile of each user.
pub struct ProfileByUser {
    store: DynStore,
}

impl ProfileByUser {
    /// Creates a new profile-by-user loader.
    #[must_use]
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }
}

impl BatchFn<Uuid> for ProfileByUser {
    type Value = Option<Profile>;

    const NAME: &'static str = "profile_by_user";

    async fn fetch(&self, keys: &[Uuid]) -> StorageResult<Vec<Option<Profile>>> {
        let mut found: HashMap<Uuid, Profile> = self
            .store
            .find_profiles_by_user_ids(keys)
            .await?
            .into_iter()
            .map(|profile| (profile.user_id, profile))
            .collect();

        Ok(keys.iter().map(|id| found.remove(id)).collect())
    }
}

/// Loads the profiles on each member type.
pub struct ProfilesByMemberType {
    store: DynStore,
}

impl ProfilesByMemberType {
    /// Creates a new profiles-by-member-type loader.
    #[must_use]
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }
}

impl BatchFn<MemberTypeId> for ProfilesByMemberType {
    type Value = Vec<Profile>;

    const NAME: &'static str = "profiles_by_member_type";

    async fn fetch(&self, keys: &[MemberTypeId]) -> StorageResult<Vec<Vec<Profile>>> {
        let profiles = self.store.find_profiles_by_member_type_ids(keys).await?;

        let mut grouped: HashMap<MemberTypeId, Vec<Profile>> = HashMap::new();
        for profile in profiles {
            grouped.entry(profile.member_type_id).or_default().push(profile);
        }
        Ok(keys
            .iter()
            .map(|id| grouped.remove(id).unwrap_or_default())
            .collect())
    }
}

/// Loads the user ids at the far end of each user's subscription edges.
///
/// With [`EdgeDirection::AsSubscriber`] a key yields the authors that user
/// follows; with [`EdgeDirection::AsAuthor`] it yields the user's followers.
pub struct EdgeTargets {
    store: DynStore,
    direction: EdgeDirection,
}

impl EdgeTargets {
    /// Creates a new edge loader for one direction.
    #[must_use]
    pub fn new(store: DynStore, direction: EdgeDirection) -> Self {
        Self { store, direction }
    }
}

impl BatchFn<Uuid> for EdgeTargets {
    type Value = Vec<Uuid>;

    const NAME: &'static str = "edge_targets";

    async fn fetch(&self, keys: &[Uuid]) -> StorageResult<Vec<Vec<Uuid>>> {
        let edges = self.store.find_edges(self.direction, keys).await?;
        trace!(
            direction = ?self.direction,
            users = keys.len(),
            edges = edges.len(),
            "Edges fetched"
        );

        let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for edge in edges {
            grouped
                .entry(edge.near_end(self.direction))
                .or_default()
                .push(edge.far_end(self.direction));
        }
        Ok(keys
            .iter()
            .map(|id| grouped.remove(id).unwrap_or_default())
            .collect())
    }
}
