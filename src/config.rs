/// Application configuration: persisted as TOML in the platform config directory.
///
/// Typically:
///   %APPDATA%\com.trainingdashboard.tutor\config.toml           (Windows)
///   $XDG_CONFIG_HOME/com.trainingdashboard.tutor/config.toml    (Linux)
///
/// Every field has a serde default, so a partial or empty file is valid and a
/// missing file behaves like the defaults below.
use crate::context::ExperienceLevel;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the platform config root.
pub const APP_DIR_NAME: &str = "com.trainingdashboard.tutor";

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Minutes without activity before inactivity hints are evaluated.
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: u32,

    /// Quiet period after the last interaction before rules are evaluated.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Experience levels for which inactivity hints are meaningful.
    #[serde(default = "default_idle_hint_levels")]
    pub idle_hint_levels: Vec<ExperienceLevel>,

    /// Tour ids the front end can launch. Empty = accept any id.
    #[serde(default = "default_known_tours")]
    pub known_tours: Vec<String>,

    /// Optional rule file replacing the built-in catalog.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

fn default_idle_timeout_minutes() -> u32 { 5 }
fn default_debounce_ms() -> u64 { 1_000 }
fn default_idle_hint_levels() -> Vec<ExperienceLevel> { vec![ExperienceLevel::Beginner] }

fn default_known_tours() -> Vec<String> {
    [
        "dashboard-tour",
        "troubleshooting",
        "form-validation-tips",
        "analytics-tour",
        "race-goals-tour",
        "schedule-tour",
        "getting-started",
        "weekly-review-tour",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout_minutes(),
            debounce_ms:          default_debounce_ms(),
            idle_hint_levels:     default_idle_hint_levels(),
            known_tours:          default_known_tours(),
            rules_path:           None,
        }
    }
}

impl AppConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.idle_timeout_minutes) * 60)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn idle_hints_enabled_for(&self, level: ExperienceLevel) -> bool {
        self.idle_hint_levels.contains(&level)
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<config root>/com.trainingdashboard.tutor`, falling back to the temp dir
/// when neither APPDATA nor XDG_CONFIG_HOME is set.
pub fn app_dir() -> PathBuf {
    let base = std::env::var("APPDATA")
        .or_else(|_| std::env::var("XDG_CONFIG_HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    base.join(APP_DIR_NAME)
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

pub fn load_or_default(config_dir: &Path) -> Result<AppConfig> {
    let path = config_dir.join("config.toml");
    if path.exists() {
        let raw = std::fs::read_to_string(&path)?;
        let cfg: AppConfig = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Config parse error: {}", e))?;
        Ok(cfg)
    } else {
        Ok(AppConfig::default())
    }
}

/// Like `load_or_default`, but writes the defaults out on first run so the
/// file exists for the user to edit. A failed write is only logged.
pub fn load_or_init(config_dir: &Path) -> Result<AppConfig> {
    let cfg = load_or_default(config_dir)?;
    if !config_dir.join("config.toml").exists() {
        match save(&cfg, config_dir) {
            Ok(())  => tracing::info!("Wrote default config to {:?}", config_dir),
            Err(e)  => tracing::warn!("Could not write default config: {}", e),
        }
    }
    Ok(cfg)
}

pub fn save(config: &AppConfig, config_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(config_dir)?;
    let raw = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("Config serialize error: {}", e))?;
    std::fs::write(config_dir.join("config.toml"), raw)?;
    Ok(())
}
