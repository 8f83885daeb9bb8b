//! Fetch with timeout, cache-first-then-refresh, and a typed fallback.
//!
//! Every networked widget resolves to a [`Resolved`] value: whatever was cached
//! is shown first, a successful refresh replaces it (and the cache), and when
//! neither exists the widget's fixed fallback is used.

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{FolioError, Result};
use crate::local_store::LocalStore;

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Source {
    #[strum(serialize = "cached")]
    Cache,
    #[strum(serialize = "live")]
    Fresh,
    #[strum(serialize = "offline")]
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }
}

/// Run `fut` until it finishes, `timeout` elapses, or `cancel` fires
pub async fn bounded<T, F>(timeout: Duration, cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(FolioError::Cancelled),
        res = tokio::time::timeout(timeout, fut) => match res {
            Ok(inner) => inner,
            Err(_) => Err(FolioError::Timeout(timeout)),
        },
    }
}

/// One cached resource in a [`LocalStore`]
pub struct Revalidate<'a, S: LocalStore + ?Sized> {
    store: &'a S,
    key: &'a str,
}

impl<'a, S: LocalStore + ?Sized> Revalidate<'a, S> {
    pub fn new(store: &'a S, key: &'a str) -> Self {
        Self { store, key }
    }

    pub fn cached<T: DeserializeOwned>(&self) -> Option<T> {
        let raw = self.store.get(self.key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key = self.key, "ignoring unreadable cache entry: {e}");
                None
            }
        }
    }

    pub fn remember<T: Serialize>(&self, value: &T) {
        let written = serde_json::to_string(value)
            .map_err(FolioError::from)
            .and_then(|raw| self.store.set(self.key, &raw).map_err(FolioError::from));

        if let Err(e) = written {
            debug!(key = self.key, "cache write skipped: {e}");
        }
    }

    /// What to show before any network call returns
    pub fn initial<T, D>(&self, fallback: D) -> Resolved<T>
    where
        T: DeserializeOwned,
        D: FnOnce() -> T,
    {
        match self.cached() {
            Some(value) => Resolved::new(value, Source::Cache),
            None => Resolved::new(fallback(), Source::Fallback),
        }
    }

    /// Await `fetch`; on success overwrite the cache, otherwise fall back to
    /// the cached value and then to `fallback`
    pub async fn refresh<T, F, D>(&self, fetch: F, fallback: D) -> Resolved<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T>>,
        D: FnOnce() -> T,
    {
        match fetch.await {
            Ok(fresh) => {
                self.remember(&fresh);
                Resolved::new(fresh, Source::Fresh)
            }
            Err(e) => {
                warn!(key = self.key, "refresh failed, keeping last known value: {e}");
                self.initial(fallback)
            }
        }
    }
}
