//! Implementation of the SocialStore trait for MemoryStore.

use std::collections::HashSet;
use std::hash::Hash;

use async_trait::async_trait;
use tracing::{debug, trace};
use uuid::Uuid;

use plexus_storage::{
    EdgeDirection, EntityKind, MemberType, MemberTypeId, NewPost, NewProfile, NewUser, Post,
    PostPatch, Profile, ProfilePatch, SocialStore, StorageError, SubscriptionEdge, User,
    UserPatch,
};

use crate::storage::{MemoryStore, Tables};
use crate::transaction::{apply_atomically, plan_user_cascade};

/// Turns a key slice into a set for membership tests.
fn key_set<K: Eq + Hash + Copy>(keys: &[K]) -> HashSet<K> {
    keys.iter().copied().collect()
}

fn require_user(tables: &Tables, entity: EntityKind, field: &'static str, id: Uuid) -> Result<(), StorageError> {
    if tables.users.contains_key(&id) {
        Ok(())
    } else {
        Err(StorageError::foreign_key_violation(entity, field, EntityKind::User, id))
    }
}

fn require_member_type(tables: &Tables, id: MemberTypeId) -> Result<(), StorageError> {
    if tables.member_types.contains_key(&id) {
        Ok(())
    } else {
        Err(StorageError::foreign_key_violation(
            EntityKind::Profile,
            "memberTypeId",
            EntityKind::MemberType,
            id,
        ))
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, StorageError> {
        trace!(count = ids.len(), "find_users_by_ids");
        let tables = self.tables.read().await;
        let wanted = key_set(ids);
        Ok(tables
            .users
            .values()
            .filter(|u| wanted.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, StorageError> {
        trace!(count = ids.len(), "find_posts_by_ids");
        let tables = self.tables.read().await;
        let wanted = key_set(ids);
        Ok(tables
            .posts
            .values()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn find_profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, StorageError> {
        trace!(count = ids.len(), "find_profiles_by_ids");
        let tables = self.tables.read().await;
        let wanted = key_set(ids);
        Ok(tables
            .profiles
            .values()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn find_member_types_by_ids(
        &self,
        ids: &[MemberTypeId],
    ) -> Result<Vec<MemberType>, StorageError> {
        trace!(count = ids.len(), "find_member_types_by_ids");
        let tables = self.tables.read().await;
        let wanted = key_set(ids);
        Ok(tables
            .member_types
            .values()
            .filter(|m| wanted.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn find_posts_by_author_ids(
        &self,
        author_ids: &[Uuid],
    ) -> Result<Vec<Post>, StorageError> {
        trace!(count = author_ids.len(), "find_posts_by_author_ids");
        let tables = self.tables.read().await;
        let wanted = key_set(author_ids);
        Ok(tables
            .posts
            .values()
            .filter(|p| wanted.contains(&p.author_id))
            .cloned()
            .collect())
    }

    async fn find_profiles_by_user_ids(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<Profile>, StorageError> {
        trace!(count = user_ids.len(), "find_profiles_by_user_ids");
        let tables = self.tables.read().await;
        let wanted = key_set(user_ids);
        Ok(tables
            .profiles
            .values()
            .filter(|p| wanted.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn find_profiles_by_member_type_ids(
        &self,
        member_type_ids: &[MemberTypeId],
    ) -> Result<Vec<Profile>, StorageError> {
        trace!(count = member_type_ids.len(), "find_profiles_by_member_type_ids");
        let tables = self.tables.read().await;
        let wanted = key_set(member_type_ids);
        Ok(tables
            .profiles
            .values()
            .filter(|p| wanted.contains(&p.member_type_id))
            .cloned()
            .collect())
    }

    async fn find_edges(
        &self,
        direction: EdgeDirection,
        user_ids: &[Uuid],
    ) -> Result<Vec<SubscriptionEdge>, StorageError> {
        trace!(count = user_ids.len(), ?direction, "find_edges");
        let tables = self.tables.read().await;
        let wanted = key_set(user_ids);
        Ok(tables
            .edges
            .iter()
            .filter(|e| wanted.contains(&e.near_end(direction)))
            .copied()
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StorageError> {
        Ok(self.tables.read().await.posts.values().cloned().collect())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        Ok(self.tables.read().await.profiles.values().cloned().collect())
    }

    async fn list_member_types(&self) -> Result<Vec<MemberType>, StorageError> {
        Ok(self.tables.read().await.member_types.values().cloned().collect())
    }

    async fn create_user(&self, input: NewUser) -> Result<User, StorageError> {
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            balance: input.balance,
        };
        self.tables.write().await.users.insert(user.id, user.clone());
        debug!(id = %user.id, "User created");
        Ok(user)
    }

    async fn create_post(&self, input: NewPost) -> Result<Post, StorageError> {
        let mut tables = self.tables.write().await;
        require_user(&tables, EntityKind::Post, "authorId", input.author_id)?;

        let post = Post {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            author_id: input.author_id,
        };
        tables.posts.insert(post.id, post.clone());
        debug!(id = %post.id, author_id = %post.author_id, "Post created");
        Ok(post)
    }

    async fn create_profile(&self, input: NewProfile) -> Result<Profile, StorageError> {
        let mut tables = self.tables.write().await;
        require_user(&tables, EntityKind::Profile, "userId", input.user_id)?;
        require_member_type(&tables, input.member_type_id)?;
        if tables.profile_of_user(input.user_id).is_some() {
            return Err(StorageError::unique_violation(
                EntityKind::Profile,
                "userId",
                input.user_id,
            ));
        }

        let profile = Profile {
            id: Uuid::new_v4(),
            is_male: input.is_male,
            year_of_birth: input.year_of_birth,
            member_type_id: input.member_type_id,
            user_id: input.user_id,
        };
        tables.profiles.insert(profile.id, profile.clone());
        debug!(id = %profile.id, user_id = %profile.user_id, "Profile created");
        Ok(profile)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, StorageError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::User, id))?;
        patch.apply(user);
        Ok(user.clone())
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Post, StorageError> {
        let mut tables = self.tables.write().await;
        let post = tables
            .posts
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::Post, id))?;
        patch.apply(post);
        Ok(post.clone())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: ProfilePatch,
    ) -> Result<Profile, StorageError> {
        let mut tables = self.tables.write().await;
        if let Some(member_type_id) = patch.member_type_id {
            require_member_type(&tables, member_type_id)?;
        }
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::Profile, id))?;
        patch.apply(profile);
        Ok(profile.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(false);
        }

        let steps = plan_user_cascade(&tables, id);
        debug!(id = %id, steps = steps.len(), "Deleting user with cascade");
        apply_atomically(&mut tables, &steps)?;
        Ok(true)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.tables.write().await.posts.shift_remove(&id).is_some())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.tables.write().await.profiles.shift_remove(&id).is_some())
    }

    async fn insert_edge(
        &self,
        subscriber_id: Uuid,
        author_id: Uuid,
    ) -> Result<SubscriptionEdge, StorageError> {
        let mut tables = self.tables.write().await;
        require_user(&tables, EntityKind::Subscription, "subscriberId", subscriber_id)?;
        require_user(&tables, EntityKind::Subscription, "authorId", author_id)?;

        let edge = SubscriptionEdge::new(subscriber_id, author_id);
        if !tables.edges.insert(edge) {
            return Err(StorageError::unique_violation(
                EntityKind::Subscription,
                "subscriberId_authorId",
                format!("{subscriber_id}:{author_id}"),
            ));
        }
        debug!(subscriber_id = %subscriber_id, author_id = %author_id, "Edge inserted");
        Ok(edge)
    }

    async fn delete_edge(
        &self,
        subscriber_id: Uuid,
        author_id: Uuid,
    ) -> Result<bool, StorageError> {
        let edge = SubscriptionEdge::new(subscriber_id, author_id);
        Ok(self.tables.write().await.edges.shift_remove(&edge))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(NewUser {
                name: name.into(),
                balance: 100.0,
            })
            .await
            .unwrap()
    }

    fn profile_for(user_id: Uuid) -> NewProfile {
        NewProfile {
            is_male: true,
            year_of_birth: 1985,
            member_type_id: MemberTypeId::Basic,
            user_id,
        }
    }

    #[tokio::test]
    async fn test_bulk_lookup_skips_missing_keys() {
        let store = MemoryStore::new();
        let alice = user(&store, "Alice").await;
        let found = store
            .find_users_by_ids(&[alice.id, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(found, vec![alice]);
    }

    #[tokio::test]
    async fn test_create_post_requires_author() {
        let store = MemoryStore::new();
        let err = store
            .create_post(NewPost {
                title: "Hi".into(),
                content: "...".into(),
                author_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation { .. }));
        assert!(store.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_profile_is_rejected() {
        let store = MemoryStore::new();
        let alice = user(&store, "Alice").await;
        let first = store.create_profile(profile_for(alice.id)).await.unwrap();

        let mut second = profile_for(alice.id);
        second.year_of_birth = 2000;
        let err = store.create_profile(second).await.unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation { field: "userId", .. }));

        let profiles = store.list_profiles().await.unwrap();
        assert_eq!(profiles, vec![first]);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let store = MemoryStore::new();
        let alice = user(&store, "Alice").await;
        let post = store
            .create_post(NewPost {
                title: "Hi".into(),
                content: "body".into(),
                author_id: alice.id,
            })
            .await
            .unwrap();

        let updated = store
            .update_post(
                post.id,
                PostPatch {
                    title: Some("Hello".into()),
                    content: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Hello");
        assert_eq!(updated.content, "body");

        let err = store
            .update_post(Uuid::new_v4(), PostPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_edges_are_unique_and_directional() {
        let store = MemoryStore::new();
        let alice = user(&store, "Alice").await;
        let bob = user(&store, "Bob").await;

        store.insert_edge(bob.id, alice.id).await.unwrap();
        let err = store.insert_edge(bob.id, alice.id).await.unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation { .. }));

        let following = store
            .find_edges(EdgeDirection::AsSubscriber, &[bob.id])
            .await
            .unwrap();
        assert_eq!(following, vec![SubscriptionEdge::new(bob.id, alice.id)]);

        let followers = store
            .find_edges(EdgeDirection::AsSubscriber, &[alice.id])
            .await
            .unwrap();
        assert!(followers.is_empty());

        assert!(store.delete_edge(bob.id, alice.id).await.unwrap());
        assert!(!store.delete_edge(bob.id, alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_edge_requires_existing_users() {
        let store = MemoryStore::new();
        let alice = user(&store, "Alice").await;
        let err = store.insert_edge(alice.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::ForeignKeyViolation {
                field: "authorId",
                ..
            }
        ));
        assert_eq!(store.edge_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryStore::new();
        let alice = user(&store, "Alice").await;
        let bob = user(&store, "Bob").await;
        store
            .create_post(NewPost {
                title: "Hi".into(),
                content: "...".into(),
                author_id: alice.id,
            })
            .await
            .unwrap();
        store.create_profile(profile_for(alice.id)).await.unwrap();
        store.insert_edge(alice.id, bob.id).await.unwrap();
        store.insert_edge(bob.id, alice.id).await.unwrap();

        assert!(store.delete_user(alice.id).await.unwrap());

        assert!(store.find_users_by_ids(&[alice.id]).await.unwrap().is_empty());
        assert!(store.find_posts_by_author_ids(&[alice.id]).await.unwrap().is_empty());
        assert!(store.find_profiles_by_user_ids(&[alice.id]).await.unwrap().is_empty());
        assert_eq!(store.edge_count().await, 0);
        assert_eq!(store.user_count().await, 1);

        assert!(!store.delete_user(alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_returns_false_when_absent() {
        let store = MemoryStore::new();
        assert!(!store.delete_post(Uuid::new_v4()).await.unwrap());
        assert!(!store.delete_profile(Uuid::new_v4()).await.unwrap());
    }
}
