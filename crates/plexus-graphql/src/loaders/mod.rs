//! DataLoaders for efficient batched data loading.
//!
//! Every relation the schema can traverse has a bulk function that fetches
//! all requested keys with one store call. The bulk functions implement the
//! positional [`BatchFn`] contract and are wrapped by [`Batched`] into an
//! async-graphql [`Loader`], which provides the pending key set, the
//! coalescing delay, and a per-request [`HashMapCache`].
//!
//! ## Overview
//!
//! - [`UserById`] - users by id
//! - [`MemberTypeById`] - member types by id
//! - [`PostsByAuthor`] - posts keyed by author id
//! - [`ProfileByUser`] - the profile of each user id
//! - [`ProfilesByMemberType`] - profiles keyed by member type id
//! - [`EdgeTargets`] - user ids across subscription edges, in one direction
//!
//! Missing keys resolve to `None` or an empty list and are cached like any
//! other outcome, so a second load of the same missing key does not fetch.
//!
//! ## Usage
//!
//! ```ignore
//! let loaders = DataLoaders::new(store.clone(), &GraphQLConfig::default());
//! let user = loaders.users.load_one(id).await?.flatten();
//! ```

mod entity;
mod relation;

pub use entity::{MemberTypeById, UserById};
pub use relation::{EdgeTargets, PostsByAuthor, ProfileByUser, ProfilesByMemberType};

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use async_graphql::dataloader::{DataLoader, HashMapCache, Loader};
use plexus_storage::{DynStore, EdgeDirection, MemberTypeId, StorageResult};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::GraphQLConfig;
use crate::error::GraphQLError;

/// A bulk fetch whose output lines up with its input.
///
/// `fetch` receives a slice of distinct keys and must return exactly one value
/// per key, at the same position. Keys the store does not know map to the
/// "empty" value of the relation (`None` or an empty list).
pub trait BatchFn<K>: Send + Sync + 'static {
    /// Value produced for each key.
    type Value: Send + Sync + Clone + 'static;

    /// Name used in logs.
    const NAME: &'static str;

    /// Fetches values for `keys` with a single store call.
    fn fetch(&self, keys: &[K]) -> impl Future<Output = StorageResult<Vec<Self::Value>>> + Send;
}

/// Adapts a [`BatchFn`] to the async-graphql [`Loader`] trait.
pub struct Batched<F> {
    inner: F,
}

impl<F> Batched<F> {
    /// Wraps a bulk function.
    #[must_use]
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<K, F> Loader<K> for Batched<F>
where
    K: Send + Sync + Hash + Eq + Clone + 'static,
    F: BatchFn<K>,
{
    type Value = F::Value;
    type Error = Arc<GraphQLError>;

    #[instrument(skip(self, keys), fields(loader = F::NAME, key_count = keys.len()))]
    async fn load(&self, keys: &[K]) -> Result<HashMap<K, Self::Value>, Self::Error> {
        debug!(loader = F::NAME, key_count = keys.len(), "Loading batch");

        let values = self.inner.fetch(keys).await.map_err(|e| {
            warn!(loader = F::NAME, error = %e, "Batch fetch failed");
            Arc::new(GraphQLError::from(e))
        })?;

        zip_positional(F::NAME, keys, values)
    }
}

/// Pairs each key with the value at the same position.
fn zip_positional<K, V>(
    name: &str,
    keys: &[K],
    values: Vec<V>,
) -> Result<HashMap<K, V>, Arc<GraphQLError>>
where
    K: Hash + Eq + Clone,
{
    if values.len() != keys.len() {
        warn!(
            loader = name,
            keys = keys.len(),
            values = values.len(),
            "Batch function returned a mismatched result"
        );
        return Err(Arc::new(GraphQLError::Internal(format!(
            "{name} returned {} values for {} keys",
            values.len(),
            keys.len()
        ))));
    }

    Ok(keys.iter().cloned().zip(values).collect())
}

/// A request-scoped loader over a bulk function.
pub type BatchLoader<F> = Arc<DataLoader<Batched<F>, HashMapCache>>;

/// Collection of all DataLoaders for a GraphQL request.
///
/// Created once per request so that batching and caching never leak between
/// requests.
#[derive(Clone)]
pub struct DataLoaders {
    /// Users by id.
    pub users: BatchLoader<UserById>,

    /// Member types by id.
    pub member_types: BatchLoader<MemberTypeById>,

    /// Posts by author id.
    pub posts_by_author: BatchLoader<PostsByAuthor>,

    /// Profile by owning user id.
    pub profile_by_user: BatchLoader<ProfileByUser>,

    /// Profiles by member type id.
    pub profiles_by_member_type: BatchLoader<ProfilesByMemberType>,

    /// Authors each user subscribes to.
    pub subscribed_to: BatchLoader<EdgeTargets>,

    /// Subscribers of each user.
    pub subscribers: BatchLoader<EdgeTargets>,
}

impl DataLoaders {
    /// Creates a new set of DataLoaders sharing one store handle.
    #[must_use]
    pub fn new(store: DynStore, config: &GraphQLConfig) -> Self {
        Self {
            users: build(UserById::new(store.clone()), config),
            member_types: build(MemberTypeById::new(store.clone()), config),
            posts_by_author: build(PostsByAuthor::new(store.clone()), config),
            profile_by_user: build(ProfileByUser::new(store.clone()), config),
            profiles_by_member_type: build(ProfilesByMemberType::new(store.clone()), config),
            subscribed_to: build(
                EdgeTargets::new(store.clone(), EdgeDirection::AsSubscriber),
                config,
            ),
            subscribers: build(EdgeTargets::new(store, EdgeDirection::AsAuthor), config),
        }
    }

    /// Returns the edge loader anchored on the given side.
    #[must_use]
    pub fn edges(&self, direction: EdgeDirection) -> &BatchLoader<EdgeTargets> {
        match direction {
            EdgeDirection::AsSubscriber => &self.subscribed_to,
            EdgeDirection::AsAuthor => &self.subscribers,
        }
    }

    /// Drops every cached value.
    ///
    /// Called after a write so later fields of the same request do not read
    /// values cached before it.
    pub fn clear_all(&self) {
        self.users.clear::<Uuid>();
        self.member_types.clear::<MemberTypeId>();
        self.posts_by_author.clear::<Uuid>();
        self.profile_by_user.clear::<Uuid>();
        self.profiles_by_member_type.clear::<MemberTypeId>();
        self.subscribed_to.clear::<Uuid>();
        self.subscribers.clear::<Uuid>();
    }
}

/// Runs a bulk function directly and stores its results in `loader`'s cache.
///
/// Every key is fed, including those that resolved to `None` or an empty
/// list, so later loads of any of them are cache hits.
pub async fn prime_with<F>(
    loader: &BatchLoader<F>,
    bulk: F,
    keys: &[Uuid],
) -> StorageResult<Vec<F::Value>>
where
    F: BatchFn<Uuid>,
{
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let values = bulk.fetch(keys).await?;
    loader
        .feed_many(keys.iter().copied().zip(values.iter().cloned()))
        .await;
    Ok(values)
}

fn build<F: Send + Sync + 'static>(inner: F, config: &GraphQLConfig) -> BatchLoader<F> {
    Arc::new(
        DataLoader::with_cache(Batched::new(inner), tokio::spawn, HashMapCache::default())
            .delay(config.batch_delay())
            .max_batch_size(config.max_batch_size),
    )
}

impl std::fmt::Debug for DataLoaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoaders")
            .field("users", &"DataLoader<UserById>")
            .field("member_types", &"DataLoader<MemberTypeById>")
            .field("posts_by_author", &"DataLoader<PostsByAuthor>")
            .field("profile_by_user", &"DataLoader<ProfileByUser>")
            .field("profiles_by_member_type", &"DataLoader<ProfilesByMemberType>")
            .field("subscribed_to", &"DataLoader<EdgeTargets>")
            .field("subscribers", &"DataLoader<EdgeTargets>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_positional_pairs_keys() {
        let map = zip_positional("test", &[1, 2, 3], vec!["a", "b", "c"]).unwrap();
        assert_eq!(map[&1], "a");
        assert_eq!(map[&3], "c");
    }

    #[test]
    fn test_zip_positional_rejects_mismatch() {
        let err = zip_positional("test", &[1, 2], vec!["a"]).unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}
