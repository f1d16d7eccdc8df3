//! Entity field resolvers.
//!
//! One resolver per `FieldKind`. Scalars project from the parent record;
//! relations go through the request's loaders so sibling records share one
//! bulk fetch.

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use plexus_storage::{EdgeDirection, EntityKind, MemberType, Post, Profile, User};
use tracing::trace;

use super::{Record, get_graphql_context, loader_error, parent};
use crate::registry::Relation;

/// Resolver for scalar entity fields.
pub struct ScalarResolver;

impl ScalarResolver {
    /// Creates a resolver projecting `field` from a parent of type `entity`.
    pub fn resolve(
        entity: EntityKind,
        field: &'static str,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            FieldFuture::new(async move {
                let value = match entity {
                    EntityKind::User => project::<User>(&ctx, field)?,
                    EntityKind::Post => project::<Post>(&ctx, field)?,
                    EntityKind::Profile => project::<Profile>(&ctx, field)?,
                    EntityKind::MemberType => project::<MemberType>(&ctx, field)?,
                    EntityKind::Subscription => {
                        return Err(async_graphql::Error::new(
                            "Subscription edges are not exposed as objects",
                        ));
                    }
                };
                Ok(Some(value))
            })
        }
    }
}

fn project<R: Record>(
    ctx: &ResolverContext<'_>,
    field: &str,
) -> Result<async_graphql::Value, async_graphql::Error> {
    parent::<R>(ctx)?
        .project(field)
        .ok_or_else(|| async_graphql::Error::new(format!("Unknown field '{field}'")))
}

/// Resolver for loader-backed relations.
pub struct RelationResolver;

impl RelationResolver {
    /// Creates a resolver for one relation.
    pub fn resolve(
        relation: Relation,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            FieldFuture::new(async move {
                let loaders = &get_graphql_context(&ctx)?.loaders;
                trace!(?relation, "Resolving relation");

                let value = match relation {
                    Relation::PostAuthor => {
                        let post = parent::<Post>(&ctx)?;
                        loaders
                            .users
                            .load_one(post.author_id)
                            .await
                            .map_err(loader_error)?
                            .flatten()
                            .map(FieldValue::owned_any)
                    }
                    Relation::ProfileUser => {
                        let profile = parent::<Profile>(&ctx)?;
                        loaders
                            .users
                            .load_one(profile.user_id)
                            .await
                            .map_err(loader_error)?
                            .flatten()
                            .map(FieldValue::owned_any)
                    }
                    Relation::ProfileMemberType => {
                        let profile = parent::<Profile>(&ctx)?;
                        loaders
                            .member_types
                            .load_one(profile.member_type_id)
                            .await
                            .map_err(loader_error)?
                            .flatten()
                            .map(FieldValue::owned_any)
                    }
                    Relation::UserProfile => {
                        let user = parent::<User>(&ctx)?;
                        loaders
                            .profile_by_user
                            .load_one(user.id)
                            .await
                            .map_err(loader_error)?
                            .flatten()
                            .map(FieldValue::owned_any)
                    }
                    Relation::UserPosts => {
                        let user = parent::<User>(&ctx)?;
                        let posts = loaders
                            .posts_by_author
                            .load_one(user.id)
                            .await
                            .map_err(loader_error)?
                            .unwrap_or_default();
                        Some(FieldValue::list(posts.into_iter().map(FieldValue::owned_any)))
                    }
                    Relation::MemberTypeProfiles => {
                        let member_type = parent::<MemberType>(&ctx)?;
                        let profiles = loaders
                            .profiles_by_member_type
                            .load_one(member_type.id)
                            .await
                            .map_err(loader_error)?
                            .unwrap_or_default();
                        Some(FieldValue::list(profiles.into_iter().map(FieldValue::owned_any)))
                    }
                };
                Ok(value)
            })
        }
    }
}

/// Resolver for users reached across subscription edges.
///
/// The edge loader yields the far-end user ids; those are then loaded through
/// the user loader, so every parent's far ends land in one user batch.
pub struct EdgeResolver;

impl EdgeResolver {
    /// Creates a resolver for one edge direction.
    pub fn resolve(
        direction: EdgeDirection,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            FieldFuture::new(async move {
                let loaders = &get_graphql_context(&ctx)?.loaders;
                let user = parent::<User>(&ctx)?;

                let ids = loaders
                    .edges(direction)
                    .load_one(user.id)
                    .await
                    .map_err(loader_error)?
                    .unwrap_or_default();

                let mut found = loaders
                    .users
                    .load_many(ids.iter().copied())
                    .await
                    .map_err(loader_error)?;

                let users: Vec<User> = ids
                    .iter()
                    .filter_map(|id| found.remove(id).flatten())
                    .collect();
                Ok(Some(FieldValue::list(users.into_iter().map(FieldValue::owned_any))))
            })
        }
    }
}
