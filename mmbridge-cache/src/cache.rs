//! In-memory TTL cache for users, teams, channels and posts.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use mmbridge_core::constants::DEFAULT_CACHE_TTL_SECS;
use mmbridge_core::types::{Channel, Post, Team, User};

use crate::entry::TtlMap;

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of every entry from the moment it is written
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl CacheConfig {
    /// Creates a config with the given TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }
}

#[derive(Default)]
struct Maps {
    users: TtlMap<String, User>,
    teams: TtlMap<String, Team>,
    team_names: TtlMap<String, Team>,
    channels: TtlMap<String, Channel>,
    channel_names: TtlMap<(String, String), Channel>,
    posts: TtlMap<String, Post>,
}

/// In-memory cache for chat records.
///
/// Six maps: users, teams, channels and posts by id, plus teams by name and
/// channels by `(team_id, name)`. There is no background eviction; every read
/// or write sweeps expired entries from the map it touches.
///
/// # Name indices
///
/// [`set_team`](Self::set_team) and [`set_channel`](Self::set_channel) also
/// write the name index when the record has a usable name, using the same
/// insertion instant so both copies expire together. The two copies are
/// otherwise independent: overwriting one never updates the other.
///
/// # Thread Safety
///
/// All maps sit behind one mutex, so a primary write and its index write are
/// applied together. Values are returned as clones.
pub struct EntityCache {
    maps: Mutex<Maps>,
    config: CacheConfig,
}

impl EntityCache {
    /// Creates a cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with the given TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_config(CacheConfig::with_ttl(ttl))
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            maps: Mutex::new(Maps::default()),
            config,
        }
    }

    /// The TTL applied to new entries.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // USERS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Gets a cached user by id.
    pub fn get_user(&self, user_id: &str) -> Option<User> {
        self.maps.lock().users.get(user_id)
    }

    /// Caches a user under `user_id`.
    pub fn set_user(&self, user_id: &str, user: User) {
        trace!(user_id, "caching user");
        self.maps
            .lock()
            .users
            .insert(user_id.to_string(), user, Instant::now(), self.config.ttl);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TEAMS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Gets a cached team by id.
    pub fn get_team(&self, team_id: &str) -> Option<Team> {
        self.maps.lock().teams.get(team_id)
    }

    /// Gets a cached team by name.
    pub fn get_team_by_name(&self, team_name: &str) -> Option<Team> {
        self.maps.lock().team_names.get(team_name)
    }

    /// Caches a team by id, and by name when it has one.
    pub fn set_team(&self, team_id: &str, team: Team) {
        let inserted_at = Instant::now();
        let ttl = self.config.ttl;
        let mut maps = self.maps.lock();

        if let Some(name) = team.index_name() {
            maps.team_names
                .insert(name.to_string(), team.clone(), inserted_at, ttl);
        }
        maps.teams.insert(team_id.to_string(), team, inserted_at, ttl);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CHANNELS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Gets a cached channel by id.
    pub fn get_channel(&self, channel_id: &str) -> Option<Channel> {
        self.maps.lock().channels.get(channel_id)
    }

    /// Gets a cached channel by team id and channel name.
    pub fn get_channel_by_name(&self, team_id: &str, channel_name: &str) -> Option<Channel> {
        let key = (team_id.to_string(), channel_name.to_string());
        self.maps.lock().channel_names.get(&key)
    }

    /// Caches a channel by id, and by `(team_id, name)` when both are set.
    pub fn set_channel(&self, channel_id: &str, channel: Channel) {
        let inserted_at = Instant::now();
        let ttl = self.config.ttl;
        let mut maps = self.maps.lock();

        if let Some((team_id, name)) = channel.index_key() {
            let key = (team_id.to_string(), name.to_string());
            maps.channel_names
                .insert(key, channel.clone(), inserted_at, ttl);
        }
        maps.channels
            .insert(channel_id.to_string(), channel, inserted_at, ttl);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POSTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Gets a cached post by id.
    pub fn get_post(&self, post_id: &str) -> Option<Post> {
        self.maps.lock().posts.get(post_id)
    }

    /// Caches a post under `post_id`.
    pub fn set_post(&self, post_id: &str, post: Post) {
        self.maps
            .lock()
            .posts
            .insert(post_id.to_string(), post, Instant::now(), self.config.ttl);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MAINTENANCE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Clears every map, name indices included.
    pub fn clear(&self) {
        let mut maps = self.maps.lock();
        maps.users.clear();
        maps.teams.clear();
        maps.team_names.clear();
        maps.channels.clear();
        maps.channel_names.clear();
        maps.posts.clear();
    }

    /// Returns live entry counts per entity.
    ///
    /// Expired entries are swept first, so the counts never include them.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let mut maps = self.maps.lock();
        maps.team_names.sweep(now);
        maps.channel_names.sweep(now);

        CacheStats {
            users: maps.users.live_len(now),
            teams: maps.teams.live_len(now),
            channels: maps.channels.live_len(now),
            posts: maps.posts.live_len(now),
        }
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub users: usize,
    pub teams: usize,
    pub channels: usize,
    pub posts: usize,
}

impl CacheStats {
    /// Sum over all entity maps.
    pub fn total(&self) -> usize {
        self.users + self.teams + self.channels + self.posts
    }
}
