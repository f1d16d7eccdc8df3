//! Social graph schema builder.
//!
//! Generates the dynamic schema from the [`SchemaRegistry`]: one object type
//! per entity, the `Query` root and the `Mutation` root.

use std::sync::Arc;

use async_graphql::dynamic::{Field, InputValue, Object, Schema, SchemaBuilder, TypeRef};
use plexus_storage::EntityKind;
use tracing::{debug, trace};

use super::input_types::{
    MEMBER_TYPE_ENUM, UUID_SCALAR, member_type_enum, mutation_inputs, uuid_scalar,
};
use crate::config::GraphQLConfig;
use crate::error::GraphQLError;
use crate::registry::{EntitySpec, FieldKind, FieldSpec, ScalarType, SchemaRegistry};
use crate::resolvers::{
    EdgeResolver, MutationResolver, QueryResolver, RelationResolver, ScalarResolver,
};

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            introspection_enabled: true,
        }
    }
}

impl From<&GraphQLConfig> for SchemaBuilderConfig {
    fn from(config: &GraphQLConfig) -> Self {
        Self {
            introspection_enabled: config.introspection,
        }
    }
}

/// Builds the GraphQL schema from the entity registry.
///
/// # Example
///
/// ```ignore
/// let builder = SocialSchemaBuilder::new(
///     Arc::new(SchemaRegistry::social()),
///     SchemaBuilderConfig::default(),
/// );
///
/// let schema = builder.build()?;
/// ```
pub struct SocialSchemaBuilder {
    registry: Arc<SchemaRegistry>,
    config: SchemaBuilderConfig,
}

impl SocialSchemaBuilder {
    /// Creates a new schema builder.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>, config: SchemaBuilderConfig) -> Self {
        Self { registry, config }
    }

    /// Builds the GraphQL schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry lacks the User type or if
    /// async-graphql rejects the generated types.
    pub fn build(&self) -> Result<Schema, GraphQLError> {
        debug!("Starting GraphQL schema build");

        let user = self
            .registry
            .entity(EntityKind::User)
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| GraphQLError::SchemaBuildFailed("User type is not registered".into()))?;

        let mut schema_builder = Schema::build("Query", Some("Mutation"), None)
            .register(uuid_scalar())
            .register(member_type_enum());

        for input in mutation_inputs() {
            schema_builder = schema_builder.register(input);
        }

        schema_builder = self.register_entity_types(schema_builder);
        schema_builder = schema_builder.register(build_query_type(user));
        schema_builder = schema_builder.register(build_mutation_type());

        if !self.config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))?;

        debug!("GraphQL schema build complete");
        Ok(schema)
    }

    fn register_entity_types(&self, mut builder: SchemaBuilder) -> SchemaBuilder {
        for entity in self.registry.entities() {
            builder = builder.register(entity_object(entity));
            trace!(type_name = entity.type_name(), "Registered entity type");
        }
        builder
    }
}

fn entity_object(entity: &EntitySpec) -> Object {
    entity
        .fields
        .iter()
        .fold(
            Object::new(entity.type_name()).description(entity.description),
            |object, field| object.field(entity_field(entity.kind, field)),
        )
}

fn entity_field(entity: EntityKind, field: &FieldSpec) -> Field {
    let built = match field.kind {
        FieldKind::Scalar(ty) => Field::new(
            field.name,
            TypeRef::named_nn(scalar_type_name(ty)),
            ScalarResolver::resolve(entity, field.name),
        ),
        FieldKind::RelationalSingle { target, relation } => Field::new(
            field.name,
            TypeRef::named(target.as_str()),
            RelationResolver::resolve(relation),
        ),
        FieldKind::RelationalMany { target, relation } => Field::new(
            field.name,
            TypeRef::named_nn_list_nn(target.as_str()),
            RelationResolver::resolve(relation),
        ),
        FieldKind::EdgeDerived(direction) => Field::new(
            field.name,
            TypeRef::named_nn_list_nn(EntityKind::User.as_str()),
            EdgeResolver::resolve(direction),
        ),
    };
    built.description(field.description)
}

fn scalar_type_name(ty: ScalarType) -> &'static str {
    match ty {
        ScalarType::Uuid => UUID_SCALAR,
        ScalarType::String => TypeRef::STRING,
        ScalarType::Float => TypeRef::FLOAT,
        ScalarType::Int => TypeRef::INT,
        ScalarType::Boolean => TypeRef::BOOLEAN,
        ScalarType::MemberTypeId => MEMBER_TYPE_ENUM,
    }
}

fn id_arg() -> InputValue {
    InputValue::new("id", TypeRef::named_nn(UUID_SCALAR))
}

fn dto_arg(input_type: &str) -> InputValue {
    InputValue::new("dto", TypeRef::named_nn(input_type))
}

fn edge_args(field: Field) -> Field {
    field
        .argument(InputValue::new("userId", TypeRef::named_nn(UUID_SCALAR)))
        .argument(InputValue::new("authorId", TypeRef::named_nn(UUID_SCALAR)))
}

fn build_query_type(user: Arc<EntitySpec>) -> Object {
    Object::new("Query")
        .description("Social graph Query root")
        .field(
            Field::new(
                "users",
                TypeRef::named_nn_list_nn("User"),
                QueryResolver::users(user.clone()),
            )
            .description("All users"),
        )
        .field(
            Field::new("user", TypeRef::named("User"), QueryResolver::user(user))
                .argument(id_arg())
                .description("A user by id"),
        )
        .field(
            Field::new("posts", TypeRef::named_nn_list_nn("Post"), QueryResolver::posts())
                .description("All posts"),
        )
        .field(
            Field::new("post", TypeRef::named("Post"), QueryResolver::post())
                .argument(id_arg())
                .description("A post by id"),
        )
        .field(
            Field::new(
                "profiles",
                TypeRef::named_nn_list_nn("Profile"),
                QueryResolver::profiles(),
            )
            .description("All profiles"),
        )
        .field(
            Field::new("profile", TypeRef::named("Profile"), QueryResolver::profile())
                .argument(id_arg())
                .description("A profile by id"),
        )
        .field(
            Field::new(
                "memberTypes",
                TypeRef::named_nn_list_nn("MemberType"),
                QueryResolver::member_types(),
            )
            .description("All membership tiers"),
        )
        .field(
            Field::new(
                "memberType",
                TypeRef::named("MemberType"),
                QueryResolver::member_type(),
            )
            .argument(InputValue::new("id", TypeRef::named_nn(MEMBER_TYPE_ENUM)))
            .description("A membership tier by id"),
        )
}

fn build_mutation_type() -> Object {
    Object::new("Mutation")
        .description("Social graph Mutation root")
        .field(
            Field::new("createUser", TypeRef::named_nn("User"), MutationResolver::create_user())
                .argument(dto_arg("CreateUserInput")),
        )
        .field(
            Field::new("createPost", TypeRef::named_nn("Post"), MutationResolver::create_post())
                .argument(dto_arg("CreatePostInput")),
        )
        .field(
            Field::new(
                "createProfile",
                TypeRef::named_nn("Profile"),
                MutationResolver::create_profile(),
            )
            .argument(dto_arg("CreateProfileInput")),
        )
        .field(
            Field::new("changeUser", TypeRef::named_nn("User"), MutationResolver::change_user())
                .argument(id_arg())
                .argument(dto_arg("ChangeUserInput")),
        )
        .field(
            Field::new("changePost", TypeRef::named_nn("Post"), MutationResolver::change_post())
                .argument(id_arg())
                .argument(dto_arg("ChangePostInput")),
        )
        .field(
            Field::new(
                "changeProfile",
                TypeRef::named_nn("Profile"),
                MutationResolver::change_profile(),
            )
            .argument(id_arg())
            .argument(dto_arg("ChangeProfileInput")),
        )
        .field(
            Field::new(
                "deleteUser",
                TypeRef::named_nn(TypeRef::BOOLEAN),
                MutationResolver::delete_user(),
            )
            .argument(id_arg())
            .description("Deletes a user with its posts, profile and subscriptions"),
        )
        .field(
            Field::new(
                "deletePost",
                TypeRef::named_nn(TypeRef::BOOLEAN),
                MutationResolver::delete_post(),
            )
            .argument(id_arg()),
        )
        .field(
            Field::new(
                "deleteProfile",
                TypeRef::named_nn(TypeRef::BOOLEAN),
                MutationResolver::delete_profile(),
            )
            .argument(id_arg()),
        )
        .field(
            edge_args(Field::new(
                "subscribeTo",
                TypeRef::named_nn("User"),
                MutationResolver::subscribe_to(),
            ))
            .description("Subscribes userId to authorId and returns the subscriber"),
        )
        .field(edge_args(Field::new(
            "unsubscribeFrom",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            MutationResolver::unsubscribe_from(),
        )))
}
