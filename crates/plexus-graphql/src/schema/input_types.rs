//! Scalar, enum and input object types used by the schema.

use async_graphql::Value;
use async_graphql::dynamic::{Enum, EnumItem, InputObject, InputValue, Scalar, TypeRef};
use plexus_storage::MemberTypeId;
use uuid::Uuid;

/// Name of the UUID scalar.
pub const UUID_SCALAR: &str = "UUID";

/// Name of the member type enum.
pub const MEMBER_TYPE_ENUM: &str = "MemberTypeId";

/// The `UUID` scalar. Input must be a string the `uuid` crate can parse.
pub fn uuid_scalar() -> Scalar {
    Scalar::new(UUID_SCALAR)
        .description("A UUID in its hyphenated string form")
        .validator(|value| matches!(value, Value::String(s) if Uuid::parse_str(s).is_ok()))
}

/// The `MemberTypeId` enum.
pub fn member_type_enum() -> Enum {
    MemberTypeId::ALL.iter().fold(
        Enum::new(MEMBER_TYPE_ENUM).description("Membership tier identifier"),
        |e, id| e.item(EnumItem::new(id.as_str())),
    )
}

/// Input objects for the create and change mutations.
///
/// Create inputs mark every field required; change inputs make every field
/// optional, and omitted fields are left unchanged.
pub fn mutation_inputs() -> Vec<InputObject> {
    vec![
        InputObject::new("CreateUserInput")
            .field(InputValue::new("name", TypeRef::named_nn(TypeRef::STRING)))
            .field(InputValue::new("balance", TypeRef::named_nn(TypeRef::FLOAT))),
        InputObject::new("ChangeUserInput")
            .field(InputValue::new("name", TypeRef::named(TypeRef::STRING)))
            .field(InputValue::new("balance", TypeRef::named(TypeRef::FLOAT))),
        InputObject::new("CreatePostInput")
            .field(InputValue::new("title", TypeRef::named_nn(TypeRef::STRING)))
            .field(InputValue::new("content", TypeRef::named_nn(TypeRef::STRING)))
            .field(InputValue::new("authorId", TypeRef::named_nn(UUID_SCALAR))),
        InputObject::new("ChangePostInput")
            .field(InputValue::new("title", TypeRef::named(TypeRef::STRING)))
            .field(InputValue::new("content", TypeRef::named(TypeRef::STRING))),
        InputObject::new("CreateProfileInput")
            .field(InputValue::new("isMale", TypeRef::named_nn(TypeRef::BOOLEAN)))
            .field(InputValue::new("yearOfBirth", TypeRef::named_nn(TypeRef::INT)))
            .field(InputValue::new("userId", TypeRef::named_nn(UUID_SCALAR)))
            .field(InputValue::new(
                "memberTypeId",
                TypeRef::named_nn(MEMBER_TYPE_ENUM),
            )),
        InputObject::new("ChangeProfileInput")
            .field(InputValue::new("isMale", TypeRef::named(TypeRef::BOOLEAN)))
            .field(InputValue::new("yearOfBirth", TypeRef::named(TypeRef::INT)))
            .field(InputValue::new(
                "memberTypeId",
                TypeRef::named(MEMBER_TYPE_ENUM),
            )),
    ]
}
