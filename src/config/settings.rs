use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Result};

use super::loader::{BatchpitConfig, BatchpitProfileConfig, LoadedConfig};

pub const DEFAULT_INPUT: &str = "main-request.json";
pub const DEFAULT_OUTPUT: &str = "main-response.json";

fn resolve_relative(base: &Path, value: &str) -> PathBuf {
    let candidate = Path::new(value);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

/// Everything a single run needs, after flags, profile and config file have
/// been merged.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub timeout: Option<Duration>,
    pub keep_alive: bool,
    pub profile_name: Option<String>,
}

/// Merges CLI flags over a profile over the top-level config.
#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    base_dir: PathBuf,
    config: Option<LoadedConfig>,
    requested_profile: Option<String>,
    explicit_input: Option<PathBuf>,
    explicit_output: Option<PathBuf>,
    explicit_timeout: Option<Duration>,
    keep_alive: bool,
}

impl SettingsBuilder {
    pub fn new(base_dir: PathBuf, config: Option<LoadedConfig>) -> Self {
        Self {
            base_dir,
            config,
            requested_profile: None,
            explicit_input: None,
            explicit_output: None,
            explicit_timeout: None,
            keep_alive: false,
        }
    }

    pub fn profile(mut self, profile: Option<String>) -> Self {
        self.requested_profile = profile;
        self
    }

    pub fn input(mut self, input: Option<PathBuf>) -> Self {
        self.explicit_input = input;
        self
    }

    pub fn output(mut self, output: Option<PathBuf>) -> Self {
        self.explicit_output = output;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.explicit_timeout = timeout;
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn build(&self) -> Result<RunSettings> {
        let Some(loaded) = &self.config else {
            if let Some(name) = &self.requested_profile {
                bail!("Profile '{}' requested but no batchpit.json was found", name);
            }
            return Ok(RunSettings {
                input: self.pick_path(self.explicit_input.as_ref(), &self.base_dir, DEFAULT_INPUT),
                output: self.pick_path(
                    self.explicit_output.as_ref(),
                    &self.base_dir,
                    DEFAULT_OUTPUT,
                ),
                timeout: self.explicit_timeout,
                keep_alive: self.keep_alive,
                profile_name: None,
            });
        };

        let config = &loaded.config;
        let profile = resolve_profile(config, self.requested_profile.as_deref())?;
        let profile_config = profile.map(|(_, cfg)| cfg);

        let input = profile_config
            .and_then(|p| p.input.as_deref())
            .or(config.input.as_deref())
            .unwrap_or(DEFAULT_INPUT);
        let output = profile_config
            .and_then(|p| p.output.as_deref())
            .or(config.output.as_deref())
            .unwrap_or(DEFAULT_OUTPUT);

        let timeout = match self.explicit_timeout {
            Some(timeout) => Some(timeout),
            None => profile_config
                .and_then(|p| p.timeout_secs)
                .or(config.timeout_secs)
                .map(timeout_from_secs)
                .transpose()?,
        };

        Ok(RunSettings {
            input: self.pick_path(self.explicit_input.as_ref(), &loaded.dir, input),
            output: self.pick_path(self.explicit_output.as_ref(), &loaded.dir, output),
            timeout,
            keep_alive: self.keep_alive || config.keep_alive,
            profile_name: profile.map(|(name, _)| name.to_string()),
        })
    }

    fn pick_path(&self, explicit: Option<&PathBuf>, config_dir: &Path, fallback: &str) -> PathBuf {
        match explicit {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.base_dir.join(path),
            None => resolve_relative(config_dir, fallback),
        }
    }
}

fn timeout_from_secs(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        bail!("timeoutSecs must be a positive number, got {}", secs);
    }
    Ok(Duration::from_secs_f64(secs))
}

fn resolve_profile<'a>(
    config: &'a BatchpitConfig,
    requested: Option<&str>,
) -> Result<Option<(&'a str, &'a BatchpitProfileConfig)>> {
    let Some(name) = requested.or(config.default_profile.as_deref()) else {
        return Ok(None);
    };

    match config.profiles.get_key_value(name) {
        Some((key, profile)) => Ok(Some((key.as_str(), profile))),
        None => {
            let mut known: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
            known.sort_unstable();
            bail!(
                "Unknown profile '{}' (available: {})",
                name,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            )
        }
    }
}
