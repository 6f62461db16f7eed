// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;
use serde::Deserialize;

use super::{KeyRing, Source, SourceContext, StatsSlot};
use crate::errors::SourceError;

const BEVIGIL_API: &str = "https://osint.bevigil.com";

#[derive(Debug, Deserialize)]
struct BevigilResponse {
    #[serde(default)]
    urls: Vec<String>,
}

/// BeVigil OSINT URL index (requires an access token)
pub struct Bevigil {
    base_url: String,
    keys: KeyRing,
    stats: StatsSlot,
}

impl Bevigil {
    pub fn new() -> Self {
        Self::with_base_url(BEVIGIL_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            keys: KeyRing::new(),
            stats: StatsSlot::default(),
        }
    }
}

impl Default for Bevigil {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Bevigil {
    fn name(&self) -> &'static str {
        "bevigil"
    }

    fn is_default(&self) -> bool {
        false
    }

    fn has_recursive_support(&self) -> bool {
        false
    }

    fn key_ring(&self) -> Option<&KeyRing> {
        Some(&self.keys)
    }

    fn stats_slot(&self) -> &StatsSlot {
        &self.stats
    }

    async fn enumerate(&self, cx: &mut SourceContext) -> Result<(), SourceError> {
        let api_key = cx.api_key().unwrap_or_default().to_string();
        let url = format!("{}/api/{}/urls/", self.base_url, cx.domain());

        let response = cx
            .get(&url, &[("X-Access-Token", api_key.as_str()), ("User-Agent", "lonkero-recon")])
            .await?;
        let response: BevigilResponse = response.json(&url)?;

        for url in response.urls {
            if !cx.emit(url).await {
                break;
            }
        }
        Ok(())
    }
}
