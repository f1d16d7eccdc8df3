//! Field registry for the social graph schema.
//!
//! The registry is a fixed table built once at startup. It lists, for every
//! entity type, the fields it exposes and how each one is resolved. The
//! dynamic schema is generated from it and never changes afterwards.

use plexus_storage::{EdgeDirection, EntityKind};

/// Scalar GraphQL types used by entity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Uuid,
    String,
    Float,
    Int,
    Boolean,
    MemberTypeId,
}

/// A relation that is resolved through a loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `Post.author`
    PostAuthor,
    /// `Profile.user`
    ProfileUser,
    /// `Profile.memberType`
    ProfileMemberType,
    /// `User.profile`
    UserProfile,
    /// `User.posts`
    UserPosts,
    /// `MemberType.profiles`
    MemberTypeProfiles,
}

/// How a field obtains its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Projection from the parent record.
    Scalar(ScalarType),
    /// At most one related record, via a loader.
    RelationalSingle {
        target: EntityKind,
        relation: Relation,
    },
    /// Related records keyed by the parent's id, via a loader.
    RelationalMany {
        target: EntityKind,
        relation: Relation,
    },
    /// Users on the other side of subscription edges.
    EdgeDerived(EdgeDirection),
}

impl FieldKind {
    /// Returns true if resolving this field needs a loader.
    #[must_use]
    pub fn is_relational(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }
}

/// One field of an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

impl FieldSpec {
    const fn scalar(name: &'static str, ty: ScalarType, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar(ty),
            description,
        }
    }

    const fn single(
        name: &'static str,
        target: EntityKind,
        relation: Relation,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::RelationalSingle { target, relation },
            description,
        }
    }

    const fn many(
        name: &'static str,
        target: EntityKind,
        relation: Relation,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::RelationalMany { target, relation },
            description,
        }
    }

    const fn edges(name: &'static str, direction: EdgeDirection, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::EdgeDerived(direction),
            description,
        }
    }
}

/// An entity type and its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpec {
    pub kind: EntityKind,
    pub description: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl EntitySpec {
    /// The GraphQL type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields resolved through loaders.
    pub fn relational_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.kind.is_relational())
    }
}

/// The read-only table of entity types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    entities: Vec<EntitySpec>,
}

impl SchemaRegistry {
    /// Builds the registry for the social graph.
    #[must_use]
    pub fn social() -> Self {
        use ScalarType as S;

        let user = EntitySpec {
            kind: EntityKind::User,
            description: "A member of the network",
            fields: vec![
                FieldSpec::scalar("id", S::Uuid, "Unique identifier"),
                FieldSpec::scalar("name", S::String, "Display name"),
                FieldSpec::scalar("balance", S::Float, "Account balance"),
                FieldSpec::single(
                    "profile",
                    EntityKind::Profile,
                    Relation::UserProfile,
                    "The user's profile, if any",
                ),
                FieldSpec::many(
                    "posts",
                    EntityKind::Post,
                    Relation::UserPosts,
                    "Posts written by the user",
                ),
                FieldSpec::edges(
                    "userSubscribedTo",
                    EdgeDirection::AsSubscriber,
                    "Authors this user subscribes to",
                ),
                FieldSpec::edges(
                    "subscribedToUser",
                    EdgeDirection::AsAuthor,
                    "Users subscribed to this user",
                ),
            ],
        };

        let post = EntitySpec {
            kind: EntityKind::Post,
            description: "A post written by a user",
            fields: vec![
                FieldSpec::scalar("id", S::Uuid, "Unique identifier"),
                FieldSpec::scalar("title", S::String, "Post title"),
                FieldSpec::scalar("content", S::String, "Post body"),
                FieldSpec::scalar("authorId", S::Uuid, "Id of the author"),
                FieldSpec::single("author", EntityKind::User, Relation::PostAuthor, "The author"),
            ],
        };

        let profile = EntitySpec {
            kind: EntityKind::Profile,
            description: "Personal details of a user",
            fields: vec![
                FieldSpec::scalar("id", S::Uuid, "Unique identifier"),
                FieldSpec::scalar("isMale", S::Boolean, "Gender flag"),
                FieldSpec::scalar("yearOfBirth", S::Int, "Year of birth"),
                FieldSpec::scalar("memberTypeId", S::MemberTypeId, "Membership tier"),
                FieldSpec::scalar("userId", S::Uuid, "Id of the owning user"),
                FieldSpec::single(
                    "user",
                    EntityKind::User,
                    Relation::ProfileUser,
                    "The owning user",
                ),
                FieldSpec::single(
                    "memberType",
                    EntityKind::MemberType,
                    Relation::ProfileMemberType,
                    "The membership tier",
                ),
            ],
        };

        let member_type = EntitySpec {
            kind: EntityKind::MemberType,
            description: "A membership tier",
            fields: vec![
                FieldSpec::scalar("id", S::MemberTypeId, "Tier identifier"),
                FieldSpec::scalar("discount", S::Float, "Discount in percent"),
                FieldSpec::scalar("postsLimitPerMonth", S::Int, "Monthly post allowance"),
                FieldSpec::many(
                    "profiles",
                    EntityKind::Profile,
                    Relation::MemberTypeProfiles,
                    "Profiles on this tier",
                ),
            ],
        };

        Self {
            entities: vec![user, post, profile, member_type],
        }
    }

    /// All entity types, in registration order.
    #[must_use]
    pub fn entities(&self) -> &[EntitySpec] {
        &self.entities
    }

    /// Looks up an entity type.
    #[must_use]
    pub fn entity(&self, kind: EntityKind) -> Option<&EntitySpec> {
        self.entities.iter().find(|e| e.kind == kind)
    }
}
