//! Post records and their enriched form.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Channel, User};
use crate::constants::TIMESTAMP_FORMAT;

/// A message in a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post id
    pub id: String,
    #[serde(default)]
    pub channel_id: String,
    /// Author id (empty for some system posts)
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub message: String,
    /// Creation time in Unix milliseconds
    #[serde(default)]
    pub create_at: i64,
    /// Thread root, for replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
}

impl Post {
    /// Author id, if the post has one.
    pub fn author_id(&self) -> Option<&str> {
        Some(self.user_id.as_str()).filter(|id| !id.is_empty())
    }
}

/// A page of posts: the map of posts plus their display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostList {
    /// Post ids, newest first
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub posts: HashMap<String, Post>,
}

impl PostList {
    /// Posts in display order.
    ///
    /// Follows `order`, skipping ids with no post. When `order` is empty the
    /// posts are returned newest first.
    pub fn ordered(&self) -> Vec<&Post> {
        if self.order.is_empty() {
            let mut posts: Vec<&Post> = self.posts.values().collect();
            posts.sort_by(|a, b| b.create_at.cmp(&a.create_at).then_with(|| a.id.cmp(&b.id)));
            return posts;
        }
        self.order
            .iter()
            .filter_map(|id| self.posts.get(id))
            .collect()
    }
}

/// Request body for creating a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub channel_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
}

/// A post with author and channel display data attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPost {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub user_display_name: String,
    pub message: String,
    pub create_at: i64,
    pub create_at_formatted: String,
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    /// Set by search enrichment only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    /// Set by search enrichment only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_display_name: Option<String>,
}

impl EnrichedPost {
    /// Attaches author data to a post.
    ///
    /// A missing author renders as `unknown` / `Unknown User`.
    pub fn new(post: &Post, author: Option<&User>) -> Self {
        let (username, user_display_name) = match author {
            Some(user) => (user.username.clone(), user.display_name()),
            None => ("unknown".to_string(), "Unknown User".to_string()),
        };
        Self {
            id: post.id.clone(),
            user_id: post.user_id.clone(),
            username,
            user_display_name,
            message: post.message.clone(),
            create_at: post.create_at,
            create_at_formatted: format_timestamp(post.create_at),
            channel_id: post.channel_id.clone(),
            root_id: post.root_id.clone().filter(|id| !id.is_empty()),
            channel_name: None,
            channel_display_name: None,
        }
    }

    /// Attaches channel data.
    pub fn with_channel(mut self, channel: Option<&Channel>) -> Self {
        match channel {
            Some(channel) => {
                self.channel_name = Some(channel.name.clone().unwrap_or_else(|| "unknown".into()));
                self.channel_display_name = Some(channel.display_name.clone());
            }
            None => {
                self.channel_name = Some("unknown".into());
                self.channel_display_name = Some("Unknown Channel".into());
            }
        }
        self
    }
}

/// Formats a Unix-millisecond timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .unwrap_or_default()
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
