// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;
use serde::Deserialize;

use super::{Source, SourceContext, StatsSlot};
use crate::errors::SourceError;

const ALIENVAULT_API: &str = "https://otx.alienvault.com";

#[derive(Debug, Deserialize)]
struct AlienVaultResponse {
    #[serde(default)]
    detail: String,
    #[serde(default)]
    error: String,
    #[serde(default)]
    url_list: Vec<AlienVaultUrl>,
}

#[derive(Debug, Deserialize)]
struct AlienVaultUrl {
    url: String,
}

fn extract_urls(response: AlienVaultResponse) -> Result<Vec<String>, SourceError> {
    if !response.error.is_empty() {
        return Err(SourceError::Api(format!("{}, {}", response.detail, response.error)));
    }
    Ok(response.url_list.into_iter().map(|u| u.url).collect())
}

/// AlienVault OTX indicator URL list
pub struct AlienVault {
    base_url: String,
    stats: StatsSlot,
}

impl AlienVault {
    pub fn new() -> Self {
        Self::with_base_url(ALIENVAULT_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            stats: StatsSlot::default(),
        }
    }
}

impl Default for AlienVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for AlienVault {
    fn name(&self) -> &'static str {
        "alienvault"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn has_recursive_support(&self) -> bool {
        false
    }

    fn stats_slot(&self) -> &StatsSlot {
        &self.stats
    }

    async fn enumerate(&self, cx: &mut SourceContext) -> Result<(), SourceError> {
        let url = format!(
            "{}/otxapi/indicators/domain/url_list/{}?limit=1000&page=1",
            self.base_url,
            cx.domain()
        );

        let response = cx.get(&url, &[]).await?;
        let urls = extract_urls(response.json(&url)?)?;

        for url in urls {
            if !cx.emit(url).await {
                break;
            }
        }
        Ok(())
    }
}
