// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::core::{ProviderConfig, RunnerOptions};

/// Prefix of per-source key overrides, e.g. `LONKERO_VIRUSTOTAL_API_KEY`
const ENV_PREFIX: &str = "LONKERO_";

pub struct ConfigLoader {
    config_path: PathBuf,
    format: ConfigFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

/// Environment variable holding comma-separated keys for `source`
pub fn api_key_env_var(source: &str) -> String {
    format!("{}{}_API_KEY", ENV_PREFIX, source.to_uppercase())
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref().to_path_buf();
        let format = Self::detect_format(&path)?;

        Ok(Self {
            config_path: path,
            format,
        })
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow::anyhow!("Could not determine config file format"))?;

        match extension {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(anyhow::anyhow!("Unsupported config file format: {}", extension)),
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(&self, content: &str) -> Result<T> {
        Ok(match self.format {
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML config")?
            }
            ConfigFormat::Toml => toml::from_str(content).context("Failed to parse TOML config")?,
            ConfigFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON config")?
            }
        })
    }

    /// Load API keys. A missing file yields an empty config.
    pub fn load_provider_config(&self) -> Result<ProviderConfig> {
        if !self.config_path.exists() {
            debug!("Provider config {:?} not found, using environment only", self.config_path);
            return Ok(ProviderConfig::default());
        }

        let content = std::fs::read_to_string(&self.config_path)
            .with_context(|| {
                format!("Failed to read provider config file: {:?}", self.config_path)
            })?;

        if content.trim().is_empty() {
            return Ok(ProviderConfig::default());
        }
        self.parse(&content)
    }

    /// Load runner options saved in a file
    pub fn load_options(&self) -> Result<RunnerOptions> {
        let content = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {:?}", self.config_path))?;
        self.parse(&content)
    }

    pub fn save_provider_config(&self, config: &ProviderConfig) -> Result<()> {
        let content = match self.format {
            ConfigFormat::Yaml => serde_yaml::to_string(config)?,
            ConfigFormat::Toml => toml::to_string_pretty(config)?,
            ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        };

        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", self.config_path))?;

        Ok(())
    }
}

/// Replace file keys with `LONKERO_<SOURCE>_API_KEY` values from the process environment
pub fn apply_env_overrides(config: &mut ProviderConfig, sources: &[&str]) {
    apply_overrides_from(config, sources, |name| std::env::var(name).ok());
}

fn apply_overrides_from<F>(config: &mut ProviderConfig, sources: &[&str], lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for source in sources {
        let Some(value) = lookup(&api_key_env_var(source)) else {
            continue;
        };

        let keys: Vec<String> = value
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if !keys.is_empty() {
            debug!("Using {} API key(s) for {} from environment", keys.len(), source);
            config.set_keys(source, keys);
        }
    }
}

/// Provider config from `path` (when given) with environment overrides applied
pub fn load_provider_config_with_overrides(
    path: Option<&Path>,
    sources: &[&str],
) -> Result<ProviderConfig> {
    let mut config = match path {
        Some(path) => ConfigLoader::new(path)?.load_provider_config()?,
        None => ProviderConfig::default(),
    };
    apply_env_overrides(&mut config, sources);
    Ok(config)
}
