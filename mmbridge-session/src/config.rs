//! Session configuration: server URL, credentials, TTL and deadlines.

use std::fmt;
use std::time::Duration;

use url::Url;

use mmbridge_cache::CacheConfig;
use mmbridge_core::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_ENRICH_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use mmbridge_core::error::{BridgeError, Result};

/// How the session authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Long-lived personal access token. Cannot be refreshed by logging in again.
    Token(String),
    /// Login id and password; expired sessions are recovered by logging in again.
    Password {
        /// Login id (username or email)
        login: String,
        /// Password
        password: String,
    },
}

impl AuthMode {
    /// Returns true if an expired session can be recovered by logging in again.
    pub fn supports_reauth(&self) -> bool {
        matches!(self, AuthMode::Password { .. })
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Token(_) => f.write_str("Token(<redacted>)"),
            AuthMode::Password { login, .. } => f
                .debug_struct("Password")
                .field("login", login)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Session configuration.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Server base URL
    pub url: Url,
    /// Credentials
    pub auth: AuthMode,
    /// Lifetime of cached records
    pub cache_ttl: Duration,
    /// Deadline for each remote call attempt
    pub request_timeout: Duration,
    /// Concurrent per-id fetches during batch enrichment
    pub enrich_concurrency: usize,
}

impl SessionConfig {
    /// Creates a config with default TTL, timeout and concurrency.
    pub fn new(url: &str, auth: AuthMode) -> Result<Self> {
        Ok(Self {
            url: parse_server_url(url)?,
            auth,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            enrich_concurrency: DEFAULT_ENRICH_CONCURRENCY,
        })
    }

    /// Loads config from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Loads config from a variable lookup.
    ///
    /// Reads `MATTERMOST_URL`, `MATTERMOST_TOKEN`, `MATTERMOST_LOGIN`,
    /// `MATTERMOST_PASSWORD`, `MATTERMOST_CACHE_TTL` and `MATTERMOST_TIMEOUT`.
    /// A token takes precedence over login/password.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = var("MATTERMOST_URL")
            .ok_or_else(|| BridgeError::ConfigError("MATTERMOST_URL must be provided".into()))?;

        let auth = match (var("MATTERMOST_TOKEN"), var("MATTERMOST_LOGIN"), var("MATTERMOST_PASSWORD")) {
            (Some(token), _, _) => AuthMode::Token(token),
            (None, Some(login), Some(password)) => AuthMode::Password { login, password },
            _ => {
                return Err(BridgeError::ConfigError(
                    "Either MATTERMOST_TOKEN or both MATTERMOST_LOGIN and MATTERMOST_PASSWORD must be provided"
                        .into(),
                ))
            }
        };

        let mut config = Self::new(&url, auth)?;
        if let Some(ttl) = var("MATTERMOST_CACHE_TTL") {
            config.cache_ttl = Duration::from_secs(parse_secs("MATTERMOST_CACHE_TTL", &ttl)?);
        }
        if let Some(timeout) = var("MATTERMOST_TIMEOUT") {
            config.request_timeout = Duration::from_secs(parse_secs("MATTERMOST_TIMEOUT", &timeout)?);
        }
        Ok(config)
    }

    /// Sets the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sets the per-attempt remote deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the enrichment fetch concurrency (at least 1).
    pub fn with_enrich_concurrency(mut self, concurrency: usize) -> Self {
        self.enrich_concurrency = concurrency.max(1);
        self
    }

    /// Cache settings derived from this config.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::with_ttl(self.cache_ttl)
    }
}

fn parse_server_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BridgeError::ConfigError(format!(
            "unsupported URL scheme '{other}', expected http or https"
        ))),
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| BridgeError::ConfigError(format!("{key} must be a whole number of seconds, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_token_auth_from_vars() {
        let config = SessionConfig::from_vars(vars(&[
            ("MATTERMOST_URL", "https://chat.example.com"),
            ("MATTERMOST_TOKEN", "abc"),
            ("MATTERMOST_LOGIN", "bot@example.com"),
            ("MATTERMOST_PASSWORD", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.auth, AuthMode::Token("abc".into()));
        assert!(!config.auth.supports_reauth());
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_password_auth_from_vars() {
        let config = SessionConfig::from_vars(vars(&[
            ("MATTERMOST_URL", "http://localhost:8065"),
            ("MATTERMOST_LOGIN", "bot@example.com"),
            ("MATTERMOST_PASSWORD", "secret"),
            ("MATTERMOST_CACHE_TTL", "60"),
            ("MATTERMOST_TIMEOUT", "5"),
        ]))
        .unwrap();

        assert!(config.auth.supports_reauth());
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_config().ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_auth_is_rejected() {
        let err = SessionConfig::from_vars(vars(&[
            ("MATTERMOST_URL", "https://chat.example.com"),
            ("MATTERMOST_LOGIN", "bot@example.com"),
            ("MATTERMOST_TOKEN", "  "),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("MATTERMOST_TOKEN"));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err = SessionConfig::new("ftp://chat.example.com", AuthMode::Token("t".into())).unwrap_err();
        assert!(matches!(err, BridgeError::ConfigError(_)));

        let err = SessionConfig::new("not a url", AuthMode::Token("t".into())).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidUrl(_)));
    }

    #[test]
    fn test_invalid_ttl_is_rejected() {
        let err = SessionConfig::from_vars(vars(&[
            ("MATTERMOST_URL", "https://chat.example.com"),
            ("MATTERMOST_TOKEN", "abc"),
            ("MATTERMOST_CACHE_TTL", "five minutes"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("MATTERMOST_CACHE_TTL"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = format!("{:?}", AuthMode::Token("abc123".into()));
        assert!(!token.contains("abc123"));

        let password = format!(
            "{:?}",
            AuthMode::Password {
                login: "bot".into(),
                password: "hunter2".into()
            }
        );
        assert!(password.contains("bot"));
        assert!(!password.contains("hunter2"));
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::new("https://chat.example.com", AuthMode::Token("t".into()))
            .unwrap()
            .with_cache_ttl(Duration::from_millis(100))
            .with_request_timeout(Duration::from_secs(1))
            .with_enrich_concurrency(0);

        assert_eq!(config.cache_ttl, Duration::from_millis(100));
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        assert_eq!(config.enrich_concurrency, 1);
    }
}
