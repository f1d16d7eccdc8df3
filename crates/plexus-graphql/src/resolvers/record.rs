//! Scalar projections of entity records.

use std::any::Any;

use async_graphql::{Name, Number, Value};
use plexus_storage::{MemberType, MemberTypeId, Post, Profile, User};
use uuid::Uuid;

/// A record that can be the parent value of an entity object.
pub(crate) trait Record: Any + Send + Sync {
    /// Returns the value of a scalar field, or `None` if there is no such field.
    fn project(&self, field: &str) -> Option<Value>;
}

pub(crate) fn uuid_value(id: Uuid) -> Value {
    Value::String(id.to_string())
}

pub(crate) fn float_value(x: f64) -> Value {
    Number::from_f64(x).map_or(Value::Null, Value::Number)
}

pub(crate) fn member_type_value(id: MemberTypeId) -> Value {
    Value::Enum(Name::new(id.as_str()))
}

impl Record for User {
    fn project(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(uuid_value(self.id)),
            "name" => Some(Value::String(self.name.clone())),
            "balance" => Some(float_value(self.balance)),
            _ => None,
        }
    }
}

impl Record for Post {
    fn project(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(uuid_value(self.id)),
            "title" => Some(Value::String(self.title.clone())),
            "content" => Some(Value::String(self.content.clone())),
            "authorId" => Some(uuid_value(self.author_id)),
            _ => None,
        }
    }
}

impl Record for Profile {
    fn project(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(uuid_value(self.id)),
            "isMale" => Some(Value::Boolean(self.is_male)),
            "yearOfBirth" => Some(Value::Number(self.year_of_birth.into())),
            "memberTypeId" => Some(member_type_value(self.member_type_id)),
            "userId" => Some(uuid_value(self.user_id)),
            _ => None,
        }
    }
}

impl Record for MemberType {
    fn project(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(member_type_value(self.id)),
            "discount" => Some(float_value(self.discount)),
            "postsLimitPerMonth" => Some(Value::Number(self.posts_limit_per_month.into())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FieldKind, SchemaRegistry};
    use plexus_storage::EntityKind;

    fn sample(kind: EntityKind) -> Box<dyn Fn(&str) -> Option<Value>> {
        let id = Uuid::new_v4();
        match kind {
            EntityKind::User => {
                let user = User {
                    id,
                    name: "Alice".into(),
                    balance: 1.5,
                };
                Box::new(move |f| user.project(f))
            }
            EntityKind::Post => {
                let post = Post {
                    id,
                    title: "Hi".into(),
                    content: "...".into(),
                    author_id: id,
                };
                Box::new(move |f| post.project(f))
            }
            EntityKind::Profile => {
                let profile = Profile {
                    id,
                    is_male: true,
                    year_of_birth: 1990,
                    member_type_id: MemberTypeId::Basic,
                    user_id: id,
                };
                Box::new(move |f| profile.project(f))
            }
            EntityKind::MemberType => {
                let member_type = MemberType {
                    id: MemberTypeId::Business,
                    discount: 7.7,
                    posts_limit_per_month: 100,
                };
                Box::new(move |f| member_type.project(f))
            }
            EntityKind::Subscription => Box::new(|_| None),
        }
    }

    #[test]
    fn test_every_registered_scalar_projects() {
        let registry = SchemaRegistry::social();
        for entity in registry.entities() {
            let project = sample(entity.kind);
            for field in &entity.fields {
                if let FieldKind::Scalar(_) = field.kind {
                    assert!(
                        project(field.name).is_some(),
                        "{}.{} has no projection",
                        entity.type_name(),
                        field.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_enum_and_float_values() {
        assert_eq!(
            member_type_value(MemberTypeId::Basic),
            Value::Enum(Name::new("basic"))
        );
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert!(matches!(float_value(2.3), Value::Number(_)));
    }
}
