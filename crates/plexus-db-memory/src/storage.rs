use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use plexus_storage::{MemberType, MemberTypeId, Post, Profile, SubscriptionEdge, User};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Row storage for every entity kind.
///
/// Maps keep insertion order so listings are stable across calls.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) users: IndexMap<Uuid, User>,
    pub(crate) posts: IndexMap<Uuid, Post>,
    pub(crate) profiles: IndexMap<Uuid, Profile>,
    pub(crate) member_types: IndexMap<MemberTypeId, MemberType>,
    pub(crate) edges: IndexSet<SubscriptionEdge>,
}

impl Tables {
    /// Tables holding only the fixed member types.
    pub(crate) fn seeded() -> Self {
        let mut tables = Self::default();
        for member_type in default_member_types() {
            tables.member_types.insert(member_type.id, member_type);
        }
        tables
    }

    pub(crate) fn profile_of_user(&self, user_id: Uuid) -> Option<&Profile> {
        self.profiles.values().find(|p| p.user_id == user_id)
    }
}

/// The membership tiers every store starts with.
#[must_use]
pub fn default_member_types() -> [MemberType; 2] {
    [
        MemberType {
            id: MemberTypeId::Basic,
            discount: 2.3,
            posts_limit_per_month: 20,
        },
        MemberType {
            id: MemberTypeId::Business,
            discount: 7.7,
            posts_limit_per_month: 100,
        },
    ]
}

/// In-memory social graph storage backend.
///
/// All tables sit behind a single `RwLock`, so every write (including the
/// cascading user delete) is applied while holding exclusive access and is
/// never observed half-done by readers.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub(crate) tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Creates a store seeded with the default member types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::seeded())),
        }
    }

    /// Returns the number of users currently stored.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Returns the number of subscription edges currently stored.
    pub async fn edge_count(&self) -> usize {
        self.tables.read().await.edges.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
