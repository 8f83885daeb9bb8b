use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{FolioError, Result};
use crate::fetch::{bounded, Resolved, Revalidate};
use crate::local_store::{profile_stats_key, LocalStore};

const USER_AGENT: &str = "Portfolio-Website";
const ACCEPT_GITHUB_V3: &str = "application/vnd.github.v3+json";
const REPOS_PER_PAGE: u32 = 100;

/// Aggregated public stats for one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub repo_count: u64,
    pub follower_count: u64,
    pub star_count: u64,
    pub avatar_url: String,
    pub display_name: String,
    pub handle: String,
    pub profile_url: String,
}

impl ProfileStats {
    /// Shown when nothing was ever fetched
    pub fn fallback(handle: &str) -> Self {
        Self {
            repo_count: 2,
            follower_count: 0,
            star_count: 0,
            avatar_url: String::new(),
            display_name: handle.to_string(),
            handle: handle.to_string(),
            profile_url: format!("https://github.com/{handle}"),
        }
    }

    pub fn xp(&self) -> XpScore {
        XpScore::from(self)
    }

    /// Combine a profile with its repo list. `repos` is `None` when the list
    /// call failed or was malformed, in which case the profile's own count is used.
    pub fn aggregate(profile: UserProfile, repos: Option<&[RepoRecord]>) -> Self {
        let (repo_count, star_count) = match repos {
            Some(list) => (
                list.len() as u64,
                list.iter().map(|r| r.stargazers_count).sum(),
            ),
            None => (profile.public_repos, 0),
        };

        Self {
            repo_count,
            follower_count: profile.followers,
            star_count,
            avatar_url: profile.avatar_url,
            display_name: profile.name.unwrap_or_else(|| profile.login.clone()),
            handle: profile.login,
            profile_url: profile.html_url,
        }
    }
}

/// Developer level derived from [`ProfileStats`]; never stored on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpScore {
    pub level: u32,
    pub progress: u32,
}

impl From<&ProfileStats> for XpScore {
    fn from(stats: &ProfileStats) -> Self {
        let raw = stats.repo_count as f64 * 8.0
            + stats.follower_count as f64 * 1.5
            + stats.star_count as f64 * 0.5;
        let level = raw.round().clamp(1.0, 100.0) as u32;

        Self {
            level,
            progress: level % 100,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct UserProfile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RepoRecord {
    #[serde(default)]
    pub stargazers_count: u64,
}

/// Read-only client for the public profile API
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    timeout: Duration,
}

impl GithubClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_V3));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    async fn get_text(&self, url: String, cancel: &CancellationToken) -> Result<String> {
        bounded(self.timeout, cancel, async {
            let resp = self.http.get(&url).send().await?;
            if !resp.status().is_success() {
                return Err(FolioError::Status {
                    status: resp.status(),
                    url,
                });
            }
            Ok(resp.text().await?)
        })
        .await
    }

    pub async fn profile(&self, handle: &str, cancel: &CancellationToken) -> Result<UserProfile> {
        let url = format!("{}/users/{}", self.api_base, urlencoding::encode(handle));
        let body = self.get_text(url, cancel).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn repos(&self, handle: &str, cancel: &CancellationToken) -> Result<Vec<RepoRecord>> {
        let url = format!(
            "{}/users/{}/repos?per_page={}&type=owner",
            self.api_base,
            urlencoding::encode(handle),
            REPOS_PER_PAGE
        );
        let body = self.get_text(url, cancel).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Profile first, then repos. A failed profile call fails the whole fetch;
    /// a failed repo call only loses the star total.
    pub async fn fetch_stats(&self, handle: &str, cancel: &CancellationToken) -> Result<ProfileStats> {
        let profile = self.profile(handle, cancel).await?;

        let repos = match self.repos(handle, cancel).await {
            Ok(list) => Some(list),
            Err(FolioError::Cancelled) => return Err(FolioError::Cancelled),
            Err(e) => {
                debug!("repo list unavailable, using profile repo count: {e}");
                None
            }
        };

        Ok(ProfileStats::aggregate(profile, repos.as_deref()))
    }
}

/// The live stats card: cached stats first, then a refresh from the API
pub struct ProfileStatsWidget<S: LocalStore + ?Sized> {
    client: GithubClient,
    handle: String,
    cache_key: String,
    store: Arc<S>,
}

impl<S: LocalStore + ?Sized> ProfileStatsWidget<S> {
    pub fn new(client: GithubClient, handle: &str, store: Arc<S>) -> Self {
        Self {
            client,
            handle: handle.to_string(),
            cache_key: profile_stats_key(handle),
            store,
        }
    }

    pub fn initial(&self) -> Resolved<ProfileStats> {
        Revalidate::new(&*self.store, &self.cache_key)
            .initial(|| ProfileStats::fallback(&self.handle))
    }

    pub async fn refresh(&self, cancel: &CancellationToken) -> Resolved<ProfileStats> {
        let resolved = Revalidate::new(&*self.store, &self.cache_key)
            .refresh(self.client.fetch_stats(&self.handle, cancel), || {
                ProfileStats::fallback(&self.handle)
            })
            .await;

        info!(
            source = %resolved.source,
            repos = resolved.value.repo_count,
            stars = resolved.value.star_count,
            "profile stats resolved"
        );
        resolved
    }
}
