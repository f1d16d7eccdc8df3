//! GraphQL resolvers for the social graph.
//!
//! - `fields`: entity fields, dispatched on the registry's `FieldKind`
//! - `query`: root query fields, with eager loading for `users` / `user`
//! - `mutation`: create, change, delete and subscription mutations

mod eager;
mod fields;
mod input;
mod mutation;
mod query;
mod record;

pub use eager::{EagerPlan, EagerRelation};
pub use fields::{EdgeResolver, RelationResolver, ScalarResolver};
pub use mutation::MutationResolver;
pub use query::QueryResolver;
pub(crate) use record::Record;

use std::sync::Arc;

use async_graphql::ErrorExtensions;
use async_graphql::Error as GraphQLError;
use async_graphql::Value;
use async_graphql::dynamic::{ResolverContext, ValueAccessor};
use plexus_storage::MemberTypeId;
use uuid::Uuid;

use crate::context::GraphQLContext;

/// Helper to extract GraphQL context from resolver context.
pub(crate) fn get_graphql_context<'a>(
    ctx: &'a ResolverContext<'_>,
) -> Result<&'a GraphQLContext, GraphQLError> {
    ctx.data::<GraphQLContext>()
        .map_err(|_| GraphQLError::new("GraphQL context not available"))
}

/// Borrows the typed parent record of the field being resolved.
pub(crate) fn parent<'a, R: Record>(ctx: &'a ResolverContext<'_>) -> Result<&'a R, GraphQLError> {
    ctx.parent_value.try_downcast_ref::<R>()
}

/// Converts a failed batch into a field error.
pub(crate) fn loader_error(error: Arc<crate::error::GraphQLError>) -> GraphQLError {
    error.as_ref().extend()
}

/// Reads a required `UUID` argument.
pub(crate) fn uuid_arg(ctx: &ResolverContext<'_>, name: &str) -> Result<Uuid, GraphQLError> {
    let value = ctx.args.try_get(name)?;
    parse_uuid(value.string()?, name)
}

/// Reads a required `MemberTypeId` argument.
pub(crate) fn member_type_arg(
    ctx: &ResolverContext<'_>,
    name: &str,
) -> Result<MemberTypeId, GraphQLError> {
    let value = ctx.args.try_get(name)?;
    parse_member_type(&value)
}

/// Reads a `MemberTypeId` from an enum literal or, when it arrived through a
/// JSON variable, from a string.
pub(crate) fn parse_member_type(value: &ValueAccessor<'_>) -> Result<MemberTypeId, GraphQLError> {
    match value.as_value() {
        Value::Enum(name) => name.as_str().parse().map_err(GraphQLError::new),
        Value::String(raw) => raw.parse().map_err(GraphQLError::new),
        other => Err(GraphQLError::new(format!(
            "Expected a MemberTypeId, found {other}"
        ))),
    }
}

pub(crate) fn parse_uuid(raw: &str, name: &str) -> Result<Uuid, GraphQLError> {
    Uuid::parse_str(raw).map_err(|e| GraphQLError::new(format!("Invalid UUID for '{name}': {e}")))
}
