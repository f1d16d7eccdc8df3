//! GraphQL schema building.
//!
//! The schema is generated once at startup from the [`SchemaRegistry`] and is
//! immutable afterwards.
//!
//! - [`SocialSchemaBuilder`] - builds the dynamic schema
//! - `input_types` - the `UUID` scalar, the `MemberTypeId` enum and the
//!   mutation input objects
//!
//! [`SchemaRegistry`]: crate::registry::SchemaRegistry

mod builder;
mod input_types;

pub use builder::{SchemaBuilderConfig, SocialSchemaBuilder};
pub use input_types::{MEMBER_TYPE_ENUM, UUID_SCALAR};
