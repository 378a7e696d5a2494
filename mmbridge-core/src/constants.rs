//! Defaults and fixed tables for mmbridge.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Default time-to-live for cached records, in seconds (5 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

// ═══════════════════════════════════════════════════════════════════════════════
// REMOTE CALLS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default deadline for a single remote call attempt, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of concurrent per-id fetches during batch enrichment.
pub const DEFAULT_ENRICH_CONCURRENCY: usize = 8;

/// User id the remote API resolves to the authenticated user.
/// Never cached, since it aliases a real id.
pub const CURRENT_USER_ID: &str = "me";

// ═══════════════════════════════════════════════════════════════════════════════
// PAGINATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Page size for id-based post reads.
pub const DEFAULT_PER_PAGE: u32 = 60;

/// Page size for by-name post reads.
pub const DEFAULT_PER_PAGE_BY_NAME: u32 = 20;

/// Largest page size the remote API accepts.
pub const MAX_PER_PAGE: u32 = 200;

/// Default cap on enriched search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

// ═══════════════════════════════════════════════════════════════════════════════
// FALLBACK RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of id characters used in fallback display labels.
pub const FALLBACK_ID_PREFIX_LEN: usize = 8;

/// Display name given to channels that could not be fetched.
pub const UNKNOWN_CHANNEL_DISPLAY_NAME: &str = "Unknown Channel";

/// Timestamp format for enriched posts (UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ═══════════════════════════════════════════════════════════════════════════════
// AUTH FAILURE DETECTION
// ═══════════════════════════════════════════════════════════════════════════════
// The remote driver reports session expiry only through error text, so these
// phrases are matched case-insensitively against the message. The list is a
// compatibility contract with current server wording.

/// Lowercase phrases that mark an error message as an auth/session failure.
pub const AUTH_ERROR_PHRASES: &[&str] = &[
    "session is invalid",
    "invalid or expired session",
    "session expired",
    "expired session",
    "invalid session",
    "unauthorized",
    "401",
    "authentication required",
    "token expired",
    "please login again",
];
