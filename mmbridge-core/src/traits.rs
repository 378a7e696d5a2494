//! Common traits for mmbridge.
//!
//! [`ChatApi`] is the seam between the caching layer and whatever driver talks
//! to the Mattermost REST API. The driver owns transport and credentials
//! encoding; everything here treats it as a set of fallible remote calls.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Channel, ChannelMember, NewPost, Post, PostList, Team, User};

// ═══════════════════════════════════════════════════════════════════════════════
// REMOTE API TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Remote chat-platform operations used by the session.
///
/// Errors should be [`BridgeError::Api`](crate::BridgeError::Api), with a
/// status when the driver knows one. The message text is also inspected for
/// auth-failure phrases, so drivers should pass server messages through.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Logs in with a login id (email or username) and password.
    async fn login(&self, login_id: &str, password: &str) -> Result<()>;

    /// Ends the current session.
    async fn logout(&self) -> Result<()>;

    /// Fetches a user by id; `"me"` is the authenticated user.
    async fn get_user(&self, user_id: &str) -> Result<User>;

    /// Lists the teams the authenticated user belongs to.
    async fn get_user_teams(&self) -> Result<Vec<Team>>;

    /// Lists the authenticated user's channels in a team.
    async fn get_channels_for_user(&self, team_id: &str) -> Result<Vec<Channel>>;

    /// Fetches a channel by id.
    async fn get_channel(&self, channel_id: &str) -> Result<Channel>;

    /// Fetches a channel by name within a team.
    async fn get_channel_by_name(&self, team_id: &str, channel_name: &str) -> Result<Channel>;

    /// Fetches one page of a channel's posts.
    async fn get_posts_for_channel(
        &self,
        channel_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PostList>;

    /// Creates a post.
    async fn create_post(&self, post: NewPost) -> Result<Post>;

    /// Searches a team's posts. Supports `from:` and `in:` modifiers.
    async fn search_team_posts(&self, team_id: &str, terms: &str) -> Result<PostList>;

    /// Lists the members of a channel.
    async fn get_channel_members(&self, channel_id: &str) -> Result<Vec<ChannelMember>>;
}
