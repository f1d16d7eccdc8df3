//! Bulk functions for lookups by primary key.

use std::collections::HashMap;

use plexus_storage::{DynStore, MemberType, MemberTypeId, StorageResult, User};
use tracing::trace;
use uuid::Uuid;

use super::BatchFn;

/// Loads users by id.
pub struct UserById {
    store: DynStore,
}

impl UserById {
    /// Creates a new user loader.
    #[must_use]
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }
}

impl BatchFn<Uuid> for UserById {
    type Value = Option<User>;

    const NAME: &'static str = "users_by_id";

    async fn fetch(&self, keys: &[Uuid]) -> StorageResult<Vec<Option<User>>> {
        let mut found: HashMap<Uuid, User> = self
            .store
            .find_users_by_ids(keys)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        trace!(requested = keys.len(), found = found.len(), "Users fetched");
        Ok(keys.iter().map(|id| found.remove(id)).collect())
    }
}

/// Loads member types by id.
pub struct MemberTypeById {
    store: DynStore,
}

impl MemberTypeById {
    /// Creates a new member type loader.
    #[must_use]
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }
}

impl BatchFn<MemberTypeId> for MemberTypeById {
    type Value = Option<MemberType>;

    const NAME: &'static str = "member_types_by_id";

    async fn fetch(&self, keys: &[MemberTypeId]) -> StorageResult<Vec<Option<MemberType>>> {
        let mut found: HashMap<MemberTypeId, MemberType> = self
            .store
            .find_member_types_by_ids(keys)
            .await?
            .into_iter()
            .map(|member_type| (member_type.id, member_type))
            .collect();

        Ok(keys.iter().map(|id| found.remove(id)).collect())
    }
}
