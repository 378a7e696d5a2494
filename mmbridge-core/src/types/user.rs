//! User records.

use serde::{Deserialize, Serialize};

use super::id_prefix;

/// A platform user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: String,
    /// Login handle
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// Creates a user with only an id and username.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            nickname: String::new(),
            email: None,
        }
    }

    /// Placeholder for a user whose profile could not be fetched.
    ///
    /// The username is `user_` followed by the first 8 characters of the id.
    pub fn fallback(id: &str) -> Self {
        Self::new(id, format!("user_{}", id_prefix(id)))
    }

    /// Full name if either part is set, else the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display_name_prefers_full_name() {
        let mut user = User::new("u1", "alice");
        user.first_name = "Alice".into();
        user.last_name = "Smith".into();
        assert_eq!(user.display_name(), "Alice Smith");

        user.last_name.clear();
        assert_eq!(user.display_name(), "Alice");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(User::new("u1", "alice").display_name(), "alice");
    }

    #[test]
    fn test_fallback_uses_id_prefix() {
        let user = User::fallback("abcdefghijklmnop");
        assert_eq!(user.id, "abcdefghijklmnop");
        assert_eq!(user.username, "user_abcdefgh");
        assert!(user.first_name.is_empty());

        // Short ids are used whole
        assert_eq!(User::fallback("u1").username, "user_u1");
    }

    proptest! {
        #[test]
        fn prop_fallback_keeps_id_and_bounded_label(id in "[a-z0-9]{0,40}") {
            let user = User::fallback(&id);
            prop_assert_eq!(&user.id, &id);
            prop_assert!(user.username.starts_with("user_"));
            prop_assert!(user.username.len() <= "user_".len() + 8);
            prop_assert_eq!(user.display_name(), user.username.clone());
        }
    }

    #[test]
    fn test_deserialize_with_missing_optional_fields() {
        let user: User = serde_json::from_str(r#"{"id": "u1", "username": "alice"}"#).unwrap();
        assert_eq!(user.first_name, "");
        assert_eq!(user.email, None);
    }
}
