//! Team records.

use serde::{Deserialize, Serialize};

use super::non_empty;

/// A team the session can see.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team id
    pub id: String,
    /// URL-safe team name, the key for name lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
}

impl Team {
    /// Creates a named team.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            display_name: String::new(),
        }
    }

    /// The name to index this team under, if it has a usable one.
    pub fn index_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }
}
