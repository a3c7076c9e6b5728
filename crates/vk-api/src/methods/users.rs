//! `users.*` methods

use super::join_ids;
use crate::request::{HttpMethod, RequestDescriptor};
use crate::types::{UserProfile, ALL_PROFILE_FIELDS};

/// Grammatical case for declining user names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCase {
    /// Nominative
    Nominative,
    /// Genitive
    Genitive,
    /// Dative
    Dative,
    /// Accusative
    Accusative,
    /// Instrumental
    Instrumental,
    /// Ablative (prepositional)
    Ablative,
}

impl NameCase {
    /// Value of the `name_case` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            NameCase::Nominative => "nom",
            NameCase::Genitive => "gen",
            NameCase::Dative => "dat",
            NameCase::Accusative => "acc",
            NameCase::Instrumental => "ins",
            NameCase::Ablative => "abl",
        }
    }
}

/// `users.get`
///
/// Without explicit `fields` the full profile field set is requested.
pub fn get<I, S>(
    user_ids: I,
    fields: Option<&str>,
    name_case: Option<NameCase>,
) -> RequestDescriptor<Vec<UserProfile>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RequestDescriptor::method("users.get", HttpMethod::Get)
        .param("uids", join_ids(user_ids))
        .param("fields", fields.unwrap_or(ALL_PROFILE_FIELDS))
        .opt_param("name_case", name_case.map(|c| c.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, TransportResult};

    #[test]
    fn test_get_params() {
        let request = get(["1", "6492"], None, Some(NameCase::Genitive));

        assert_eq!(request.resource(), "method/users.get");
        assert_eq!(request.param_value("uids"), Some("1,6492"));
        assert_eq!(request.param_value("fields"), Some(ALL_PROFILE_FIELDS));
        assert_eq!(request.param_value("name_case"), Some("gen"));
    }

    #[test]
    fn test_custom_fields() {
        let request = get(["1"], Some("uid,photo"), None);
        assert_eq!(request.param_value("fields"), Some("uid,photo"));
        assert!(request.param_value("name_case").is_none());
    }

    #[test]
    fn test_get_classified() {
        let body = r#"{"response":[{"uid":1,"first_name":"Pavel","last_name":"Durov","online":"1"}]}"#;
        let profiles = classify(&TransportResult::completed(body), &get(["1"], None, None))
            .into_result()
            .unwrap();

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].first_name.as_deref(), Some("Pavel"));
        assert_eq!(profiles[0].online, Some(true));
    }

    #[test]
    fn test_name_case_values() {
        let all = [
            NameCase::Nominative,
            NameCase::Genitive,
            NameCase::Dative,
            NameCase::Accusative,
            NameCase::Instrumental,
            NameCase::Ablative,
        ];
        let values: Vec<_> = all.iter().map(NameCase::as_str).collect();
        assert_eq!(values, vec!["nom", "gen", "dat", "acc", "ins", "abl"]);
    }
}
