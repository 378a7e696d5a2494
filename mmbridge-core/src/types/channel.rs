//! Channel records.

use serde::{Deserialize, Serialize};

use super::{id_prefix, non_empty};
use crate::constants::UNKNOWN_CHANNEL_DISPLAY_NAME;

/// A channel.
///
/// Direct-message channels have no team, so `team_id` is optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// URL-safe channel name (no `#` prefix)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
    /// `O` (open), `P` (private), `D` (direct) or `G` (group)
    #[serde(rename = "type", default)]
    pub channel_type: String,
}

impl Channel {
    /// Creates a named channel in a team.
    pub fn new(
        id: impl Into<String>,
        team_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            team_id: Some(team_id.into()),
            name: Some(name.into()),
            display_name: String::new(),
            channel_type: String::new(),
        }
    }

    /// Placeholder for a channel that could not be fetched.
    pub fn fallback(id: &str) -> Self {
        Self {
            id: id.to_string(),
            team_id: None,
            name: Some(format!("channel_{}", id_prefix(id))),
            display_name: UNKNOWN_CHANNEL_DISPLAY_NAME.to_string(),
            channel_type: String::new(),
        }
    }

    /// `(team_id, name)` key for name lookups, when both are set.
    pub fn index_key(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.team_id)?, non_empty(&self.name)?))
    }
}

/// Membership of a user in a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMember {
    pub channel_id: String,
    pub user_id: String,
    /// Space-separated role names
    #[serde(default)]
    pub roles: String,
}
