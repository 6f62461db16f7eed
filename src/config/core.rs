// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::discovery::collector::{CallbackMode, HostCallback};
use crate::discovery::filter::HostFilter;
use crate::errors::ReconResult;
use crate::http_client::SessionConfig;
use crate::rate_limiter::RateLimiterConfig;
use crate::registry::SourceSelection;

/// Everything a runner needs for one invocation
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct RunnerOptions {
    #[serde(default)]
    pub domains: Vec<String>,

    #[serde(default)]
    pub domains_file: Option<PathBuf>,

    /// Read domains from standard input
    #[serde(default)]
    pub stdin: bool,

    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub exclude_sources: Vec<String>,

    #[serde(default)]
    pub all_sources: bool,

    #[serde(default)]
    pub recursive_only: bool,

    /// Single output file, appended to for every domain
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// One `<domain>.txt` / `<domain>.json` per domain
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    #[serde(default)]
    pub json: bool,

    /// Write every source a host was seen in
    #[serde(default)]
    pub capture_sources: bool,

    #[serde(default)]
    pub remove_wildcard: bool,

    /// Resolution workers
    #[validate(range(min = 1))]
    #[serde(default = "default_threads")]
    pub threads: usize,

    #[validate(range(min = 1))]
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[validate(range(min = 1))]
    #[serde(default = "default_max_enumeration_minutes")]
    pub max_enumeration_minutes: u64,

    /// Requests per second across all sources, 0 = unlimited
    #[serde(default)]
    pub rate_limit: u32,

    #[serde(default)]
    pub source_rate_limits: HashMap<String, u32>,

    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default)]
    pub resolvers: Vec<String>,

    #[serde(default)]
    pub filter: Vec<String>,

    #[serde(default, rename = "match")]
    pub match_patterns: Vec<String>,

    #[serde(default)]
    pub statistics: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub silent: bool,

    #[serde(default)]
    pub no_color: bool,

    /// API keys file (YAML, TOML or JSON)
    #[serde(default)]
    pub provider_config: Option<PathBuf>,

    #[serde(default)]
    pub callback_mode: CallbackMode,

    #[serde(skip)]
    pub callback: Option<HostCallback>,
}

fn default_threads() -> usize {
    10
}

fn default_timeout() -> u64 {
    30
}

fn default_max_enumeration_minutes() -> u64 {
    10
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            domains_file: None,
            stdin: false,
            sources: Vec::new(),
            exclude_sources: Vec::new(),
            all_sources: false,
            recursive_only: false,
            output_file: None,
            output_directory: None,
            json: false,
            capture_sources: false,
            remove_wildcard: false,
            threads: default_threads(),
            timeout_secs: default_timeout(),
            max_enumeration_minutes: default_max_enumeration_minutes(),
            rate_limit: 0,
            source_rate_limits: HashMap::new(),
            proxy: None,
            resolvers: Vec::new(),
            filter: Vec::new(),
            match_patterns: Vec::new(),
            statistics: false,
            verbose: false,
            silent: false,
            no_color: false,
            provider_config: None,
            callback_mode: CallbackMode::default(),
            callback: None,
        }
    }
}

impl RunnerOptions {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            proxy: self.proxy.clone().filter(|p| !p.trim().is_empty()),
            rate_limit: RateLimiterConfig {
                global_rps: self.rate_limit,
                per_source_rps: self.source_rate_limits.clone(),
            },
            timeout: self.timeout(),
            ..Default::default()
        }
    }

    pub fn source_selection(&self) -> SourceSelection {
        SourceSelection {
            sources: self.sources.clone(),
            exclude_sources: self.exclude_sources.clone(),
            use_all: self.all_sources,
            recursive_only: self.recursive_only,
        }
    }

    pub fn host_filter(&self) -> ReconResult<HostFilter> {
        HostFilter::new(&self.filter, &self.match_patterns)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_enumeration_minutes * 60)
    }
}

/// API keys per source name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProviderConfig {
    keys: BTreeMap<String, Vec<String>>,
}

impl ProviderConfig {
    pub fn keys_for(&self, source: &str) -> &[String] {
        self.keys.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_keys(&mut self, source: &str, keys: Vec<String>) {
        self.keys.insert(source.to_lowercase(), keys);
    }

    pub fn is_empty(&self) -> bool {
        self.keys.values().all(Vec::is_empty)
    }
}
