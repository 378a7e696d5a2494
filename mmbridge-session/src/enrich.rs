//! Batch enrichment: resolve many ids to records with one fetch per missing id.

use std::collections::{HashMap, HashSet};

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use mmbridge_cache::EntityCache;
use mmbridge_core::error::Result;
use mmbridge_core::traits::ChatApi;
use mmbridge_core::types::{Channel, User};

use crate::retry::ReauthPolicy;

/// A record kind the batch resolver can look up by id.
pub trait Enrichable: Clone + Send + Sync + 'static {
    /// Operation name used in logs and timeouts.
    const OPERATION: &'static str;

    /// Reads a live cached record.
    fn cached(cache: &EntityCache, id: &str) -> Option<Self>;

    /// Writes a fetched record through to the cache.
    fn store(cache: &EntityCache, id: &str, value: Self);

    /// Placeholder used when the fetch for `id` fails.
    fn fallback(id: &str) -> Self;

    /// Fetches one record from the remote.
    fn fetch<'a>(api: &'a dyn ChatApi, id: &'a str) -> BoxFuture<'a, Result<Self>>;
}

impl Enrichable for User {
    const OPERATION: &'static str = "get_user";

    fn cached(cache: &EntityCache, id: &str) -> Option<Self> {
        cache.get_user(id)
    }

    fn store(cache: &EntityCache, id: &str, value: Self) {
        cache.set_user(id, value);
    }

    fn fallback(id: &str) -> Self {
        User::fallback(id)
    }

    fn fetch<'a>(api: &'a dyn ChatApi, id: &'a str) -> BoxFuture<'a, Result<Self>> {
        api.get_user(id)
    }
}

impl Enrichable for Channel {
    const OPERATION: &'static str = "get_channel";

    fn cached(cache: &EntityCache, id: &str) -> Option<Self> {
        cache.get_channel(id)
    }

    fn store(cache: &EntityCache, id: &str, value: Self) {
        cache.set_channel(id, value);
    }

    fn fallback(id: &str) -> Self {
        Channel::fallback(id)
    }

    fn fetch<'a>(api: &'a dyn ChatApi, id: &'a str) -> BoxFuture<'a, Result<Self>> {
        api.get_channel(id)
    }
}

/// Resolves id lists to records: cache first, then one remote fetch per
/// distinct missing id.
///
/// Never fails. An id whose fetch fails maps to [`Enrichable::fallback`],
/// which is not cached, so the next batch tries the remote again.
pub struct BatchResolver<'a> {
    cache: &'a EntityCache,
    policy: &'a ReauthPolicy,
    concurrency: usize,
}

impl<'a> BatchResolver<'a> {
    /// Creates a resolver running at most `concurrency` fetches at once.
    pub fn new(cache: &'a EntityCache, policy: &'a ReauthPolicy, concurrency: usize) -> Self {
        Self {
            cache,
            policy,
            concurrency: concurrency.max(1),
        }
    }

    /// Maps every distinct non-empty id in `ids` to a record.
    pub async fn resolve<T, I, S>(&self, ids: I) -> HashMap<String, T>
    where
        T: Enrichable,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = HashMap::new();
        let mut misses = Vec::new();
        let mut seen = HashSet::new();

        for id in ids {
            let id = id.as_ref();
            if id.is_empty() || !seen.insert(id.to_string()) {
                continue;
            }
            match T::cached(self.cache, id) {
                Some(record) => {
                    resolved.insert(id.to_string(), record);
                }
                None => misses.push(id.to_string()),
            }
        }

        debug!(
            operation = T::OPERATION,
            hits = resolved.len(),
            misses = misses.len(),
            "batch lookup"
        );

        let policy = self.policy;
        let fetched: Vec<(String, Result<T>)> = stream::iter(misses)
            .map(|id| async move {
                let result = policy
                    .call(T::OPERATION, || T::fetch(policy.api(), &id))
                    .await;
                (id, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (id, result) in fetched {
            let record = match result {
                Ok(record) => {
                    T::store(self.cache, &id, record.clone());
                    record
                }
                Err(err) => {
                    warn!(operation = T::OPERATION, id = %id, error = %err, "fetch failed, using fallback");
                    T::fallback(&id)
                }
            };
            resolved.insert(id, record);
        }

        resolved
    }
}
