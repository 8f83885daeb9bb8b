use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".local").join("state").join("folio")
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "folio") {
            proj_dirs.data_local_dir().to_path_buf()
        } else {
            PathBuf::from(".folio")
        }
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", "folio") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("folio_config.json")
        }
    }

    /// Visited flag and cached profile stats
    pub fn local_store_path() -> PathBuf {
        Self::state_dir().join("local.json")
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join("zone.log")
    }
}
