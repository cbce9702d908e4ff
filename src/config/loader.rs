use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "batchpit.json";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchpitProfileConfig {
    pub input: Option<String>,
    pub output: Option<String>,
    pub timeout_secs: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchpitConfig {
    pub input: Option<String>,
    pub output: Option<String>,
    pub timeout_secs: Option<f64>,
    pub keep_alive: bool,
    pub default_profile: Option<String>,
    pub profiles: HashMap<String, BatchpitProfileConfig>,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BatchpitConfig,
    pub path: PathBuf,
    pub dir: PathBuf,
}

/// Looks for `batchpit.json` in `target` (or reads `target` itself when it
/// is a file). A missing file is not an error.
pub fn load_config(target: &Path) -> Result<Option<LoadedConfig>> {
    let resolved = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()?.join(target)
    };

    let (file_path, dir) = if resolved.is_dir() {
        (resolved.join(CONFIG_FILE), resolved)
    } else {
        let dir = match resolved.parent() {
            Some(parent) => parent.to_path_buf(),
            None => std::env::current_dir()?,
        };
        (resolved, dir)
    };

    if !file_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&file_path)
        .with_context(|| format!("reading config {}", file_path.display()))?;

    let config: BatchpitConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config {}", file_path.display()))?;

    Ok(Some(LoadedConfig {
        config,
        path: file_path,
        dir,
    }))
}
