use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

impl SocialLink {
    fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Public profile whose stats fill the profile card
    pub handle: String,
    pub api_base: String,
    pub visitors_url: String,
    pub port: u16,
    pub request_timeout_ms: u64,
    pub typing_duration_secs: u64,
    pub easter_egg_dwell_ms: u64,
    pub social_links: Vec<SocialLink>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handle: "zidanXcode".to_string(),
            api_base: "https://api.github.com".to_string(),
            visitors_url: "http://127.0.0.1:3000/api/visitors".to_string(),
            port: 3000,
            request_timeout_ms: 4000,
            typing_duration_secs: 60,
            easter_egg_dwell_ms: 5000,
            social_links: vec![
                SocialLink::new("GitHub", "https://github.com/zidanXcode"),
                SocialLink::new("Instagram", "https://instagram.com/zydanxq"),
                SocialLink::new("Email", "mailto:zidanagum888@gmail.com"),
            ],
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn typing_duration(&self) -> Duration {
        Duration::from_secs(self.typing_duration_secs)
    }

    pub fn easter_egg_dwell(&self) -> Duration {
        Duration::from_millis(self.easter_egg_dwell_ms)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), "ignoring unreadable config: {e}")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
