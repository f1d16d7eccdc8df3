//! Selective eager loading for user listings.
//!
//! Before `users` or `user` return, the selection set is inspected for the
//! User relations it asks for. Each requested relation is fetched once for
//! every returned user and fed into the request's loader caches, so the
//! child resolvers never reach the store.

use std::collections::HashSet;

use async_graphql::Lookahead;
use plexus_storage::{EdgeDirection, StorageResult, User};
use tracing::debug;
use uuid::Uuid;

use crate::context::GraphQLContext;
use crate::loaders::{EdgeTargets, PostsByAuthor, ProfileByUser, UserById, prime_with};
use crate::registry::{EntitySpec, FieldKind, Relation};

/// A User relation that can be loaded ahead of its resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EagerRelation {
    Posts,
    Profile,
    Edges(EdgeDirection),
}

impl EagerRelation {
    fn from_kind(kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::RelationalMany {
                relation: Relation::UserPosts,
                ..
            } => Some(Self::Posts),
            FieldKind::RelationalSingle {
                relation: Relation::UserProfile,
                ..
            } => Some(Self::Profile),
            FieldKind::EdgeDerived(direction) => Some(Self::Edges(direction)),
            _ => None,
        }
    }
}

/// The relations a user-returning field's selection set asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EagerPlan {
    relations: Vec<EagerRelation>,
}

impl EagerPlan {
    /// Builds a plan from the User type's registry entry and the selection
    /// below the current field.
    #[must_use]
    pub fn from_selection(user: &EntitySpec, selection: &Lookahead<'_>) -> Self {
        let kinds = user
            .relational_fields()
            .filter(|field| selection.field(field.name).exists())
            .map(|field| field.kind);
        Self::from_kinds(kinds)
    }

    /// Builds a plan from field kinds; kinds that are not User relations are
    /// ignored.
    #[must_use]
    pub fn from_kinds(kinds: impl IntoIterator<Item = FieldKind>) -> Self {
        let mut relations: Vec<EagerRelation> = Vec::new();
        for relation in kinds.into_iter().filter_map(EagerRelation::from_kind) {
            if !relations.contains(&relation) {
                relations.push(relation);
            }
        }
        Self { relations }
    }

    /// Returns the planned relations.
    #[must_use]
    pub fn relations(&self) -> &[EagerRelation] {
        &self.relations
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Fetches every planned relation for `users` and primes the loaders.
    ///
    /// `users` themselves are fed to the user loader first. Users reached
    /// across edges that are not among `users` are fetched with one extra
    /// bulk call and fed as well.
    pub async fn execute(&self, ctx: &GraphQLContext, users: &[User]) -> StorageResult<()> {
        let loaders = &ctx.loaders;
        loaders
            .users
            .feed_many(users.iter().map(|u| (u.id, Some(u.clone()))))
            .await;

        if self.is_empty() || users.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        let known: HashSet<Uuid> = ids.iter().copied().collect();
        let mut distant: HashSet<Uuid> = HashSet::new();

        debug!(
            users = ids.len(),
            relations = ?self.relations,
            "Executing eager load plan"
        );

        for relation in &self.relations {
            match *relation {
                EagerRelation::Posts => {
                    prime_with(
                        &loaders.posts_by_author,
                        PostsByAuthor::new(ctx.store.clone()),
                        &ids,
                    )
                    .await?;
                }
                EagerRelation::Profile => {
                    prime_with(
                        &loaders.profile_by_user,
                        ProfileByUser::new(ctx.store.clone()),
                        &ids,
                    )
                    .await?;
                }
                EagerRelation::Edges(direction) => {
                    let targets = prime_with(
                        loaders.edges(direction),
                        EdgeTargets::new(ctx.store.clone(), direction),
                        &ids,
                    )
                    .await?;
                    distant.extend(
                        targets
                            .into_iter()
                            .flatten()
                            .filter(|id| !known.contains(id)),
                    );
                }
            }
        }

        if !distant.is_empty() {
            let distant: Vec<Uuid> = distant.into_iter().collect();
            prime_with(&loaders.users, UserById::new(ctx.store.clone()), &distant).await?;
        }
        Ok(())
    }
}
