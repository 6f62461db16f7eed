// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod loader;
pub mod validation;

pub use core::{ProviderConfig, RunnerOptions};

pub use loader::{
    api_key_env_var, apply_env_overrides, load_provider_config_with_overrides, ConfigFormat,
    ConfigLoader,
};

pub use validation::ConfigValidator;
