use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dropfleet_core::assets::{AssetLayout, DEFAULT_BRANCH, DEFAULT_REPOSITORY, UrlStyle};
use dropfleet_core::core_api::{CoreError, WalkOptions};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "dropfleet.toml";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Optional `dropfleet.toml`. Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub url_style: Option<UrlStyle>,
    pub timeout_secs: Option<u64>,
    pub excluded_containers: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = fs::read_to_string(path)
            .map_err(|e| CoreError::io(format!("failed to read {}: {e}", path.display())))?;
        Self::parse(&text)
            .map_err(|e| CoreError::config(format!("{}: {}", path.display(), e.message)))
    }

    pub fn parse(text: &str) -> Result<Self, CoreError> {
        toml::from_str(text).map_err(|e| CoreError::config(e.to_string()))
    }

    /// `dropfleet.toml` beside the save file, if there is one.
    pub fn discover(save_path: &Path) -> Option<PathBuf> {
        let candidate = save_path.parent()?.join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub url_style: Option<UrlStyle>,
    pub timeout_secs: Option<u64>,
    pub extra_excluded: Vec<String>,
    pub process_ships: bool,
    pub process_upgrades: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub layout: AssetLayout,
    pub timeout: Duration,
    pub walk: WalkOptions,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, CoreError> {
        let repository = overrides
            .repository
            .or(file.repository)
            .unwrap_or_else(|| DEFAULT_REPOSITORY.to_string());
        let branch = overrides
            .branch
            .or(file.branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let style = overrides.url_style.or(file.url_style).unwrap_or_default();
        let layout = AssetLayout::new(&repository, &branch, style)?;

        let timeout_secs = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(CoreError::config("timeout_secs must be at least 1"));
        }

        let mut walk = WalkOptions {
            process_ships: overrides.process_ships,
            process_upgrades: overrides.process_upgrades,
            ..WalkOptions::default()
        };
        if let Some(excluded) = file.excluded_containers {
            walk.excluded_containers = excluded;
        }
        for name in overrides.extra_excluded {
            if !walk.excluded_containers.contains(&name) {
                walk.excluded_containers.push(name);
            }
        }

        Ok(Self {
            layout,
            timeout: Duration::from_secs(timeout_secs),
            walk,
        })
    }
}
