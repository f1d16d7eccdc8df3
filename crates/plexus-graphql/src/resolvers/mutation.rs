//! Root mutation resolvers.
//!
//! Every mutation performs exactly one store write. After a successful write
//! the request's loader caches are cleared.

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use tracing::{debug, info};

use super::{get_graphql_context, input, loader_error, uuid_arg};
use crate::error::{GraphQLError, storage_error_to_graphql};

/// Resolvers for the fields of the `Mutation` root.
pub struct MutationResolver;

/// Reads the `dto` argument as an input object and converts it.
macro_rules! dto {
    ($ctx:expr, $convert:path) => {{
        let dto = $ctx.args.try_get("dto")?;
        let dto = dto.object()?;
        $convert(&dto)?
    }};
}

impl MutationResolver {
    /// `createUser(dto: CreateUserInput!): User!`
    pub fn create_user() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone
    {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let input = dto!(ctx, input::new_user);
                let user = gql_ctx
                    .store
                    .create_user(input)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                info!(id = %user.id, "Created user");
                Ok(Some(FieldValue::owned_any(user)))
            })
        }
    }

    /// `createPost(dto: CreatePostInput!): Post!`
    pub fn create_post() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone
    {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let input = dto!(ctx, input::new_post);
                let post = gql_ctx
                    .store
                    .create_post(input)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                info!(id = %post.id, author_id = %post.author_id, "Created post");
                Ok(Some(FieldValue::owned_any(post)))
            })
        }
    }

    /// `createProfile(dto: CreateProfileInput!): Profile!`
    pub fn create_profile()
    -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let input = dto!(ctx, input::new_profile);
                let profile = gql_ctx
                    .store
                    .create_profile(input)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                info!(id = %profile.id, user_id = %profile.user_id, "Created profile");
                Ok(Some(FieldValue::owned_any(profile)))
            })
        }
    }

    /// `changeUser(id: UUID!, dto: ChangeUserInput!): User!`
    pub fn change_user() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone
    {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = uuid_arg(&ctx, "id")?;
                let patch = dto!(ctx, input::user_patch);
                let user = gql_ctx
                    .store
                    .update_user(id, patch)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                debug!(%id, "Changed user");
                Ok(Some(FieldValue::owned_any(user)))
            })
        }
    }

    /// `changePost(id: UUID!, dto: ChangePostInput!): Post!`
    pub fn change_post() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone
    {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = uuid_arg(&ctx, "id")?;
                let patch = dto!(ctx, input::post_patch);
                let post = gql_ctx
                    .store
                    .update_post(id, patch)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                debug!(%id, "Changed post");
                Ok(Some(FieldValue::owned_any(post)))
            })
        }
    }

    /// `changeProfile(id: UUID!, dto: ChangeProfileInput!): Profile!`
    pub fn change_profile()
    -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = uuid_arg(&ctx, "id")?;
                let patch = dto!(ctx, input::profile_patch);
                let profile = gql_ctx
                    .store
                    .update_profile(id, patch)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                debug!(%id, "Changed profile");
                Ok(Some(FieldValue::owned_any(profile)))
            })
        }
    }

    /// `deleteUser(id: UUID!): Boolean!`
    ///
    /// Removes the user's posts, profile and subscription edges in the same
    /// atomic store operation.
    pub fn delete_user() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone
    {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = uuid_arg(&ctx, "id")?;
                let removed = gql_ctx
                    .store
                    .delete_user(id)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                info!(%id, removed, "Deleted user");
                Ok(Some(FieldValue::value(removed)))
            })
        }
    }

    /// `deletePost(id: UUID!): Boolean!`
    pub fn delete_post() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone
    {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = uuid_arg(&ctx, "id")?;
                let removed = gql_ctx
                    .store
                    .delete_post(id)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                debug!(%id, removed, "Deleted post");
                Ok(Some(FieldValue::value(removed)))
            })
        }
    }

    /// `deleteProfile(id: UUID!): Boolean!`
    pub fn delete_profile()
    -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = uuid_arg(&ctx, "id")?;
                let removed = gql_ctx
                    .store
                    .delete_profile(id)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                debug!(%id, removed, "Deleted profile");
                Ok(Some(FieldValue::value(removed)))
            })
        }
    }

    /// `subscribeTo(userId: UUID!, authorId: UUID!): User!`
    ///
    /// Returns the subscriber.
    pub fn subscribe_to() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone
    {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let user_id = uuid_arg(&ctx, "userId")?;
                let author_id = uuid_arg(&ctx, "authorId")?;

                gql_ctx
                    .store
                    .insert_edge(user_id, author_id)
                    .await
                    .map_err(storage_error_to_graphql)?;
                gql_ctx.loaders.clear_all();
                info!(%user_id, %author_id, "Subscribed");

                let subscriber = gql_ctx
                    .loaders
                    .users
                    .load_one(user_id)
                    .await
                    .map_err(loader_error)?
                    .flatten()
                    .ok_or_else(|| {
                        GraphQLError::NotFound(format!("User {user_id} not found")).extend()
                    })?;
                Ok(Some(FieldValue::owned_any(subscriber)))
            })
        }
    }

    /// `unsubscribeFrom(userId: UUID!, authorId: UUID!): Boolean!`
    ///
    /// Fails when the subscription does not exist.
    pub fn unsubscribe_from()
    -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let user_id = uuid_arg(&ctx, "userId")?;
                let author_id = uuid_arg(&ctx, "authorId")?;

                let removed = gql_ctx
                    .store
                    .delete_edge(user_id, author_id)
                    .await
                    .map_err(storage_error_to_graphql)?;
                if !removed {
                    return Err(GraphQLError::ConstraintViolation(format!(
                        "User {user_id} is not subscribed to {author_id}"
                    ))
                    .extend());
                }
                gql_ctx.loaders.clear_all();
                info!(%user_id, %author_id, "Unsubscribed");
                Ok(Some(FieldValue::value(true)))
            })
        }
    }
}
