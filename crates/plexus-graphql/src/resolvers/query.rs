//! Root query resolvers.
//!
//! `users` and `user` run an [`EagerPlan`] over their own selection set before
//! returning, so the User relations asked for below them are already cached
//! when the child resolvers run.

use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use plexus_storage::User;
use tracing::debug;

use super::{EagerPlan, get_graphql_context, loader_error, member_type_arg, uuid_arg};
use crate::context::GraphQLContext;
use crate::error::storage_error_to_graphql;
use crate::registry::EntitySpec;

/// Resolvers for the fields of the `Query` root.
pub struct QueryResolver;

impl QueryResolver {
    /// `users: [User!]!`
    pub fn users(
        user: Arc<EntitySpec>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let user = user.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let users = gql_ctx
                    .store
                    .list_users()
                    .await
                    .map_err(storage_error_to_graphql)?;

                let plan = EagerPlan::from_selection(&user, &ctx.look_ahead());
                debug!(count = users.len(), relations = ?plan.relations(), "Resolved users");
                prime(gql_ctx, &plan, &users).await?;

                Ok(Some(FieldValue::list(
                    users.into_iter().map(FieldValue::owned_any),
                )))
            })
        }
    }

    /// `user(id: UUID!): User`
    pub fn user(
        user: Arc<EntitySpec>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let user = user.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = uuid_arg(&ctx, "id")?;

                let Some(found) = gql_ctx
                    .loaders
                    .users
                    .load_one(id)
                    .await
                    .map_err(loader_error)?
                    .flatten()
                else {
                    debug!(%id, "User not found");
                    return Ok(None);
                };

                let plan = EagerPlan::from_selection(&user, &ctx.look_ahead());
                prime(gql_ctx, &plan, std::slice::from_ref(&found)).await?;

                Ok(Some(FieldValue::owned_any(found)))
            })
        }
    }

    /// `posts: [Post!]!`
    pub fn posts() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let posts = gql_ctx
                    .store
                    .list_posts()
                    .await
                    .map_err(storage_error_to_graphql)?;
                debug!(count = posts.len(), "Resolved posts");
                Ok(Some(FieldValue::list(
                    posts.into_iter().map(FieldValue::owned_any),
                )))
            })
        }
    }

    /// `post(id: UUID!): Post`
    pub fn post() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = uuid_arg(&ctx, "id")?;
                let post = gql_ctx
                    .store
                    .find_posts_by_ids(&[id])
                    .await
                    .map_err(storage_error_to_graphql)?
                    .into_iter()
                    .find(|p| p.id == id);
                Ok(post.map(FieldValue::owned_any))
            })
        }
    }

    /// `profiles: [Profile!]!`
    pub fn profiles() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let profiles = gql_ctx
                    .store
                    .list_profiles()
                    .await
                    .map_err(storage_error_to_graphql)?;
                debug!(count = profiles.len(), "Resolved profiles");
                Ok(Some(FieldValue::list(
                    profiles.into_iter().map(FieldValue::owned_any),
                )))
            })
        }
    }

    /// `profile(id: UUID!): Profile`
    pub fn profile() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = uuid_arg(&ctx, "id")?;
                let profile = gql_ctx
                    .store
                    .find_profiles_by_ids(&[id])
                    .await
                    .map_err(storage_error_to_graphql)?
                    .into_iter()
                    .find(|p| p.id == id);
                Ok(profile.map(FieldValue::owned_any))
            })
        }
    }

    /// `memberTypes: [MemberType!]!`
    ///
    /// The listed tiers are fed to the member type loader, so a later
    /// `Profile.memberType` in the same request does not fetch.
    pub fn member_types() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone
    {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let member_types = gql_ctx
                    .store
                    .list_member_types()
                    .await
                    .map_err(storage_error_to_graphql)?;

                gql_ctx
                    .loaders
                    .member_types
                    .feed_many(member_types.iter().map(|m| (m.id, Some(m.clone()))))
                    .await;

                Ok(Some(FieldValue::list(
                    member_types.into_iter().map(FieldValue::owned_any),
                )))
            })
        }
    }

    /// `memberType(id: MemberTypeId!): MemberType`
    pub fn member_type() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone
    {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = member_type_arg(&ctx, "id")?;
                let member_type = gql_ctx
                    .loaders
                    .member_types
                    .load_one(id)
                    .await
                    .map_err(loader_error)?
                    .flatten();
                Ok(member_type.map(FieldValue::owned_any))
            })
        }
    }
}

async fn prime(
    ctx: &GraphQLContext,
    plan: &EagerPlan,
    users: &[User],
) -> Result<(), async_graphql::Error> {
    plan.execute(ctx, users)
        .await
        .map_err(storage_error_to_graphql)
}
