use std::time::Duration;

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{FolioError, Result};
use crate::fetch::bounded;
use crate::local_store::{LocalStore, HAS_VISITED_KEY};
use crate::visitors::VisitorsResponse;

/// Shown when the counter service cannot be reached
pub const FALLBACK_COUNT: u64 = 1;

/// Client half of the visitor counter: first visit counts, later visits read
#[derive(Debug, Clone)]
pub struct VisitorClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl VisitorClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            url: url.to_string(),
            timeout,
        })
    }

    async fn exchange(&self, method: Method, cancel: &CancellationToken) -> Result<VisitorsResponse> {
        bounded(self.timeout, cancel, async {
            let resp = self.http.request(method, &self.url).send().await?;
            if !resp.status().is_success() {
                return Err(FolioError::Status {
                    status: resp.status(),
                    url: self.url.clone(),
                });
            }
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        })
        .await
    }

    /// Count this visitor once, then only read. Never fails: any error shows
    /// [`FALLBACK_COUNT`].
    pub async fn track<S: LocalStore + ?Sized>(&self, store: &S, cancel: &CancellationToken) -> u64 {
        let has_visited = store.get(HAS_VISITED_KEY).is_some();
        let method = if has_visited { Method::GET } else { Method::POST };

        match self.exchange(method, cancel).await {
            Ok(response) => {
                if !has_visited {
                    if let Err(e) = store.set(HAS_VISITED_KEY, "true") {
                        debug!("could not remember visit: {e}");
                    }
                }
                response.count
            }
            Err(e) => {
                warn!("visitor counter unavailable: {e}");
                FALLBACK_COUNT
            }
        }
    }
}
