//! `friends.*` methods

use super::join_ids;
use super::users::NameCase;
use crate::request::{HttpMethod, RequestDescriptor};
use crate::types::{UserProfile, ALL_PROFILE_FIELDS};

/// Options for `friends.get`
#[derive(Debug, Clone, Default)]
pub struct FriendsQuery {
    /// Whose friends; the current user when `None`
    pub user_id: Option<String>,
    /// Page size
    pub count: Option<u32>,
    /// Skip this many friends
    pub offset: Option<u32>,
    /// Case to decline names in
    pub name_case: Option<NameCase>,
    /// Only friends from this friend list
    pub list_id: Option<String>,
    /// Alphabetical order instead of by rating
    pub sort_by_name: bool,
    /// Profile fields; the full set when `None`
    pub fields: Option<String>,
}

/// `friends.get`
pub fn get(query: &FriendsQuery) -> RequestDescriptor<Vec<UserProfile>> {
    RequestDescriptor::method("friends.get", HttpMethod::Get)
        .opt_param("uid", query.user_id.as_deref())
        .opt_param("count", query.count)
        .opt_param("offset", query.offset)
        .opt_param("name_case", query.name_case.map(|c| c.as_str()))
        .opt_param("lid", query.list_id.as_deref())
        .param("order", if query.sort_by_name { "name" } else { "hints" })
        .param("fields", query.fields.as_deref().unwrap_or(ALL_PROFILE_FIELDS))
}

/// `friends.getByPhones`: friends found among phone numbers
pub fn get_by_phones<I, S>(phones: I, fields: Option<&str>) -> RequestDescriptor<Vec<UserProfile>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RequestDescriptor::method("friends.getByPhones", HttpMethod::Get)
        .param("phones", join_ids(phones))
        .param("fields", fields.unwrap_or(ALL_PROFILE_FIELDS))
}
