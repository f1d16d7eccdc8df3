//! Conversion of mutation input objects into storage inputs.

use async_graphql::Error;
use async_graphql::dynamic::{ObjectAccessor, ValueAccessor};
use plexus_storage::{NewPost, NewProfile, NewUser, PostPatch, ProfilePatch, UserPatch};
use uuid::Uuid;

use super::{parse_member_type, parse_uuid};

/// Returns a field's accessor, treating an explicit `null` as absent.
fn optional<'a>(dto: &'a ObjectAccessor<'a>, name: &str) -> Option<ValueAccessor<'a>> {
    dto.get(name).filter(|v| !v.is_null())
}

fn uuid_field(dto: &ObjectAccessor<'_>, name: &str) -> Result<Uuid, Error> {
    let value = dto.try_get(name)?;
    parse_uuid(value.string()?, name)
}

fn year(value: &ValueAccessor<'_>) -> Result<i32, Error> {
    let raw = value.i64()?;
    i32::try_from(raw).map_err(|_| Error::new(format!("yearOfBirth out of range: {raw}")))
}

pub(crate) fn new_user(dto: &ObjectAccessor<'_>) -> Result<NewUser, Error> {
    Ok(NewUser {
        name: dto.try_get("name")?.string()?.to_string(),
        balance: dto.try_get("balance")?.f64()?,
    })
}

pub(crate) fn user_patch(dto: &ObjectAccessor<'_>) -> Result<UserPatch, Error> {
    Ok(UserPatch {
        name: optional(dto, "name")
            .map(|v| v.string().map(str::to_string))
            .transpose()?,
        balance: optional(dto, "balance").map(|v| v.f64()).transpose()?,
    })
}

pub(crate) fn new_post(dto: &ObjectAccessor<'_>) -> Result<NewPost, Error> {
    Ok(NewPost {
        title: dto.try_get("title")?.string()?.to_string(),
        content: dto.try_get("content")?.string()?.to_string(),
        author_id: uuid_field(dto, "authorId")?,
    })
}

pub(crate) fn post_patch(dto: &ObjectAccessor<'_>) -> Result<PostPatch, Error> {
    Ok(PostPatch {
        title: optional(dto, "title")
            .map(|v| v.string().map(str::to_string))
            .transpose()?,
        content: optional(dto, "content")
            .map(|v| v.string().map(str::to_string))
            .transpose()?,
    })
}

pub(crate) fn new_profile(dto: &ObjectAccessor<'_>) -> Result<NewProfile, Error> {
    Ok(NewProfile {
        is_male: dto.try_get("isMale")?.boolean()?,
        year_of_birth: year(&dto.try_get("yearOfBirth")?)?,
        member_type_id: parse_member_type(&dto.try_get("memberTypeId")?)?,
        user_id: uuid_field(dto, "userId")?,
    })
}

pub(crate) fn profile_patch(dto: &ObjectAccessor<'_>) -> Result<ProfilePatch, Error> {
    Ok(ProfilePatch {
        is_male: optional(dto, "isMale").map(|v| v.boolean()).transpose()?,
        year_of_birth: optional(dto, "yearOfBirth").map(|v| year(&v)).transpose()?,
        member_type_id: optional(dto, "memberTypeId")
            .map(|v| parse_member_type(&v))
            .transpose()?,
    })
}
