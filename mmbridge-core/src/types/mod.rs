//! Record types for mmbridge.
//!
//! - [`User`]: A platform account, with display-name helpers
//! - [`Team`]: A team, indexable by name
//! - [`Channel`]: A channel within a team, indexable by `(team_id, name)`
//! - [`Post`] / [`PostList`]: Messages as returned by channel reads and searches
//! - [`EnrichedPost`]: A post with author (and optionally channel) display data

mod channel;
mod post;
mod team;
mod user;

pub use channel::*;
pub use post::*;
pub use team::*;
pub use user::*;

use crate::constants::FALLBACK_ID_PREFIX_LEN;

/// Leading characters of an id, used to label fallback records.
pub(crate) fn id_prefix(id: &str) -> String {
    id.chars().take(FALLBACK_ID_PREFIX_LEN).collect()
}

/// Treats empty strings as absent, since the API sends `""` for unset fields.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
