//! Team and channel name resolution.

use tracing::{debug, instrument};

use mmbridge_cache::EntityCache;
use mmbridge_core::error::{BridgeError, Result};
use mmbridge_core::types::{Channel, Team};

use crate::retry::ReauthPolicy;

/// Resolves human-readable names to records, cache first.
pub struct NameResolver<'a> {
    cache: &'a EntityCache,
    policy: &'a ReauthPolicy,
}

impl<'a> NameResolver<'a> {
    /// Creates a resolver over a cache and policy.
    pub fn new(cache: &'a EntityCache, policy: &'a ReauthPolicy) -> Self {
        Self { cache, policy }
    }

    /// Lists the session's teams and caches every one of them.
    pub async fn fetch_teams(&self) -> Result<Vec<Team>> {
        let api = self.policy.api();
        let teams = self.policy.call("get_user_teams", || api.get_user_teams()).await?;
        for team in &teams {
            self.cache.set_team(&team.id, team.clone());
        }
        Ok(teams)
    }

    /// Resolves a team by name.
    ///
    /// There is no by-name endpoint for teams, so a miss lists every team and
    /// scans for an exact name match.
    #[instrument(skip(self))]
    pub async fn resolve_team(&self, name: &str) -> Result<Team> {
        if let Some(team) = self.cache.get_team_by_name(name) {
            debug!("team cache hit");
            return Ok(team);
        }

        debug!("team cache miss, listing teams");
        self.fetch_teams()
            .await?
            .into_iter()
            .find(|team| team.index_name() == Some(name))
            .ok_or_else(|| BridgeError::TeamNotFound(name.to_string()))
    }

    /// Resolves a channel by name within a team. Remote errors propagate as-is.
    #[instrument(skip(self))]
    pub async fn resolve_channel(&self, team_id: &str, name: &str) -> Result<Channel> {
        if let Some(channel) = self.cache.get_channel_by_name(team_id, name) {
            debug!("channel cache hit");
            return Ok(channel);
        }

        let api = self.policy.api();
        let mut channel = self
            .policy
            .call("get_channel_by_name", || api.get_channel_by_name(team_id, name))
            .await?;
        if channel.team_id.as_deref().map_or(true, str::is_empty) {
            channel.team_id = Some(team_id.to_string());
        }
        self.cache.set_channel(&channel.id, channel.clone());
        Ok(channel)
    }
}
