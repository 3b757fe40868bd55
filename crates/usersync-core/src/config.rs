use crate::error::{Result, UsersyncError};
use crate::paths;
use crate::resolver::InstallScope;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SettingsWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ApiSettings
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.wpengineapi.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Page size for paginated listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Where the action and error logs are written.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_LOG_DIR)
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// ResolutionSettings / ExecutionSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionSettings {
    #[serde(default)]
    pub install_scope: InstallScope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSettings {
    #[serde(default = "default_cache_snapshots")]
    pub cache_snapshots: bool,
}

fn default_cache_snapshots() -> bool {
    true
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            cache_snapshots: default_cache_snapshots(),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub resolution: ResolutionSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(UsersyncError::SettingsNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&data)?;
        Ok(settings)
    }

    /// `explicit` must exist; otherwise `usersync.yaml` under `root` is used
    /// when present, and defaults when not.
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::load(p);
        }
        let implicit = paths::settings_path(root);
        if implicit.exists() {
            Self::load(&implicit)
        } else {
            Ok(Self::default())
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<SettingsWarning> {
        let mut warnings = Vec::new();

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            warnings.push(SettingsWarning {
                level: WarnLevel::Error,
                message: format!("api.base_url '{}' is not an http(s) URL", self.api.base_url),
            });
        }

        if self.api.page_size == 0 {
            warnings.push(SettingsWarning {
                level: WarnLevel::Error,
                message: "api.page_size must be greater than 0".to_string(),
            });
        }

        if self.api.timeout_secs == 0 {
            warnings.push(SettingsWarning {
                level: WarnLevel::Warning,
                message: "api.timeout_secs is 0: requests will not time out".to_string(),
            });
        }

        if self.resolution.install_scope == InstallScope::Batch {
            warnings.push(SettingsWarning {
                level: WarnLevel::Warning,
                message: "resolution.install_scope is 'batch': one unknown install name \
                          drops every later add"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
