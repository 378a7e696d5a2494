//! The session object: cached, reauthenticating access to the chat API.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use mmbridge_cache::{CacheStats, EntityCache};
use mmbridge_core::constants::{CURRENT_USER_ID, MAX_PER_PAGE};
use mmbridge_core::error::Result;
use mmbridge_core::traits::ChatApi;
use mmbridge_core::types::{
    Channel, ChannelMember, EnrichedPost, NewPost, Post, PostList, Team, User,
};

use crate::config::SessionConfig;
use crate::enrich::BatchResolver;
use crate::resolve::NameResolver;
use crate::retry::ReauthPolicy;

/// A Mattermost session.
///
/// Owns the entity cache and the reauthentication policy. Every remote call
/// goes through the policy; reads consult the cache first and successful
/// fetches are written through. Safe to share across tasks behind an `Arc`.
pub struct ChatSession {
    config: SessionConfig,
    cache: EntityCache,
    policy: ReauthPolicy,
}

impl ChatSession {
    /// Creates an unauthenticated session over `api`.
    pub fn new(config: SessionConfig, api: Arc<dyn ChatApi>) -> Self {
        let cache = EntityCache::with_config(config.cache_config());
        let policy = ReauthPolicy::new(api, config.auth.clone(), config.request_timeout);
        Self {
            config,
            cache,
            policy,
        }
    }

    /// The session's configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The session's entity cache.
    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SESSION LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Authenticates with the server.
    #[instrument(skip(self), fields(url = %self.config.url))]
    pub async fn connect(&self) -> Result<()> {
        self.policy.authenticate().await
    }

    /// Ends the session. Never fails.
    pub async fn disconnect(&self) {
        self.policy.logout().await;
        info!("Disconnected from Mattermost");
    }

    /// Whether the last authentication succeeded and the session is open.
    pub fn is_authenticated(&self) -> bool {
        self.policy.is_authenticated()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CACHE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Live entry counts per entity kind.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops every cached record.
    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("cache cleared");
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TEAMS AND CHANNELS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Lists the teams visible to the session.
    #[instrument(skip(self))]
    pub async fn get_teams(&self) -> Result<Vec<Team>> {
        self.names().fetch_teams().await
    }

    /// Lists the session user's channels in a team.
    #[instrument(skip(self))]
    pub async fn get_channels(&self, team_id: &str) -> Result<Vec<Channel>> {
        let api = self.policy.api();
        let channels = self
            .policy
            .call("get_channels_for_user", || api.get_channels_for_user(team_id))
            .await?;
        for channel in &channels {
            self.cache.set_channel(&channel.id, channel.clone());
        }
        Ok(channels)
    }

    /// Looks up a team by name. Fails with `TeamNotFound` if no team matches.
    pub async fn get_team_by_name(&self, team_name: &str) -> Result<Team> {
        self.names().resolve_team(team_name).await
    }

    /// Looks up a channel by name within a team.
    pub async fn get_channel_by_name(&self, team_id: &str, channel_name: &str) -> Result<Channel> {
        self.names().resolve_channel(team_id, channel_name).await
    }

    /// Lists a channel's members. Not cached.
    #[instrument(skip(self))]
    pub async fn get_channel_members(&self, channel_id: &str) -> Result<Vec<ChannelMember>> {
        let api = self.policy.api();
        self.policy
            .call("get_channel_members", || api.get_channel_members(channel_id))
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // USERS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fetches a user. `"me"` always goes to the server and is never cached.
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        let api = self.policy.api();
        if user_id == CURRENT_USER_ID {
            return self.policy.call("get_user", || api.get_user(user_id)).await;
        }

        if let Some(user) = self.cache.get_user(user_id) {
            debug!("user cache hit");
            return Ok(user);
        }

        let user = self.policy.call("get_user", || api.get_user(user_id)).await?;
        self.cache.set_user(&user.id, user.clone());
        Ok(user)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POSTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fetches one page of a channel's posts and caches them.
    ///
    /// `per_page` is clamped to `1..=MAX_PER_PAGE`.
    #[instrument(skip(self))]
    pub async fn get_posts(&self, channel_id: &str, page: u32, per_page: u32) -> Result<PostList> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let api = self.policy.api();
        let list = self
            .policy
            .call("get_posts_for_channel", || {
                api.get_posts_for_channel(channel_id, page, per_page)
            })
            .await?;
        self.cache_posts(&list);
        Ok(list)
    }

    /// Fetches a page of posts with author names attached.
    ///
    /// Posts come back in server order, cut to `per_page` before any author
    /// is looked up. Authors that cannot be fetched get placeholder names.
    pub async fn get_posts_enriched(
        &self,
        channel_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<EnrichedPost>> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let list = self.get_posts(channel_id, page, per_page).await?;
        let posts: Vec<&Post> = list.ordered().into_iter().take(per_page as usize).collect();

        let users = self
            .batch()
            .resolve::<User, _, _>(posts.iter().filter_map(|post| post.author_id()))
            .await;

        Ok(posts
            .into_iter()
            .map(|post| EnrichedPost::new(post, author(&users, post)))
            .collect())
    }

    /// Creates a post, optionally as a reply to `root_id`. An empty `root_id`
    /// is treated as absent.
    #[instrument(skip(self, message))]
    pub async fn create_post(
        &self,
        channel_id: &str,
        message: &str,
        root_id: Option<&str>,
    ) -> Result<Post> {
        let request = NewPost {
            channel_id: channel_id.to_string(),
            message: message.to_string(),
            root_id: root_id.filter(|id| !id.is_empty()).map(str::to_string),
        };
        let api = self.policy.api();
        let post = self
            .policy
            .call("create_post", || api.create_post(request.clone()))
            .await?;
        self.cache.set_post(&post.id, post.clone());
        Ok(post)
    }

    /// Searches a team's posts and caches the results.
    #[instrument(skip(self))]
    pub async fn search_posts(&self, team_id: &str, terms: &str) -> Result<PostList> {
        let api = self.policy.api();
        let list = self
            .policy
            .call("search_team_posts", || api.search_team_posts(team_id, terms))
            .await?;
        self.cache_posts(&list);
        Ok(list)
    }

    /// Searches a team's posts and attaches author and channel names to the
    /// first `limit` results.
    pub async fn search_posts_enriched(
        &self,
        team_id: &str,
        terms: &str,
        limit: usize,
    ) -> Result<Vec<EnrichedPost>> {
        let list = self.search_posts(team_id, terms).await?;
        let posts: Vec<&Post> = list.ordered().into_iter().take(limit).collect();

        let batch = self.batch();
        let (users, channels) = tokio::join!(
            batch.resolve::<User, _, _>(posts.iter().filter_map(|post| post.author_id())),
            batch.resolve::<Channel, _, _>(
                posts
                    .iter()
                    .map(|post| post.channel_id.as_str())
                    .filter(|id| !id.is_empty())
            ),
        );

        Ok(posts
            .into_iter()
            .map(|post| {
                EnrichedPost::new(post, author(&users, post))
                    .with_channel(channels.get(&post.channel_id))
            })
            .collect())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BY-NAME OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reads enriched posts from `team_name`/`channel_name`.
    pub async fn get_posts_by_channel_name(
        &self,
        team_name: &str,
        channel_name: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<EnrichedPost>> {
        let channel = self.channel_by_names(team_name, channel_name).await?;
        self.get_posts_enriched(&channel.id, page, per_page).await
    }

    /// Posts `message` to `team_name`/`channel_name`.
    pub async fn send_message_by_channel_name(
        &self,
        team_name: &str,
        channel_name: &str,
        message: &str,
        reply_to: Option<&str>,
    ) -> Result<Post> {
        let channel = self.channel_by_names(team_name, channel_name).await?;
        self.create_post(&channel.id, message, reply_to).await
    }

    /// Searches `team_name` and enriches the first `limit` results.
    pub async fn search_messages_by_team_name(
        &self,
        team_name: &str,
        terms: &str,
        limit: usize,
    ) -> Result<Vec<EnrichedPost>> {
        let team = self.get_team_by_name(team_name).await?;
        self.search_posts_enriched(&team.id, terms, limit).await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // HELPERS
    // ═══════════════════════════════════════════════════════════════════════════

    async fn channel_by_names(&self, team_name: &str, channel_name: &str) -> Result<Channel> {
        let names = self.names();
        let team = names.resolve_team(team_name).await?;
        names.resolve_channel(&team.id, channel_name).await
    }

    fn cache_posts(&self, list: &PostList) {
        for (post_id, post) in &list.posts {
            self.cache.set_post(post_id, post.clone());
        }
    }

    fn names(&self) -> NameResolver<'_> {
        NameResolver::new(&self.cache, &self.policy)
    }

    fn batch(&self) -> BatchResolver<'_> {
        BatchResolver::new(&self.cache, &self.policy, self.config.enrich_concurrency)
    }
}

fn author<'a>(users: &'a HashMap<String, User>, post: &Post) -> Option<&'a User> {
    post.author_id().and_then(|id| users.get(id))
}
