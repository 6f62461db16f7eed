// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use url::Url;
use validator::Validate;

use super::core::RunnerOptions;
use crate::errors::{ReconError, ReconResult};

pub struct ConfigValidator;

impl ConfigValidator {
    /// Reject options the runner cannot honour. Runs before any enumeration.
    pub fn validate_options(options: &RunnerOptions) -> ReconResult<()> {
        if options.domains.is_empty() && options.domains_file.is_none() && !options.stdin {
            return Err(ReconError::Configuration("no input list provided".to_string()));
        }

        if options.verbose && options.silent {
            return Err(ReconError::Configuration(
                "both verbose and silent mode specified".to_string(),
            ));
        }

        if options.threads == 0 {
            return Err(ReconError::Configuration("threads cannot be zero".to_string()));
        }

        if options.timeout_secs == 0 {
            return Err(ReconError::Configuration("timeout cannot be zero".to_string()));
        }

        if options.max_enumeration_minutes == 0 {
            return Err(ReconError::Configuration(
                "max enumeration time cannot be zero".to_string(),
            ));
        }

        options.validate().map_err(|e| {
            ReconError::Configuration(format!("Configuration validation failed: {}", e))
        })?;

        options.host_filter()?;
        Self::validate_proxy(options.proxy.as_deref())?;

        Ok(())
    }

    fn validate_proxy(proxy: Option<&str>) -> ReconResult<()> {
        let Some(proxy) = proxy.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        let url = Url::parse(proxy)
            .map_err(|e| ReconError::Configuration(format!("Invalid proxy {}: {}", proxy, e)))?;

        match url.scheme() {
            "http" | "https" | "socks5" | "socks5h" => {}
            scheme => {
                return Err(ReconError::Configuration(format!(
                    "Unsupported proxy scheme: {}",
                    scheme
                )))
            }
        }

        if url.host_str().is_none() {
            return Err(ReconError::Configuration(format!("Proxy {} has no host", proxy)));
        }

        Ok(())
    }
}
