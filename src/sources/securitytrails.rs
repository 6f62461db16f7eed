// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;
use serde::Deserialize;

use super::{KeyRing, Source, SourceContext, StatsSlot};
use crate::errors::SourceError;

const SECURITYTRAILS_API: &str = "https://api.securitytrails.com";

#[derive(Debug, Deserialize)]
struct SecurityTrailsResponse {
    #[serde(default)]
    subdomains: Vec<String>,
}

/// SecurityTrails returns labels relative to the queried domain
fn expand_labels(labels: Vec<String>, domain: &str) -> Vec<String> {
    labels
        .into_iter()
        .filter(|label| !label.is_empty())
        .map(|label| {
            if label.ends_with(domain) {
                label
            } else {
                format!("{}.{}", label, domain)
            }
        })
        .collect()
}

/// SecurityTrails subdomain listing (requires an API key)
pub struct SecurityTrails {
    base_url: String,
    keys: KeyRing,
    stats: StatsSlot,
}

impl SecurityTrails {
    pub fn new() -> Self {
        Self::with_base_url(SECURITYTRAILS_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            keys: KeyRing::new(),
            stats: StatsSlot::default(),
        }
    }
}

impl Default for SecurityTrails {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for SecurityTrails {
    fn name(&self) -> &'static str {
        "securitytrails"
    }

    fn is_default(&self) -> bool {
        false
    }

    fn has_recursive_support(&self) -> bool {
        true
    }

    fn key_ring(&self) -> Option<&KeyRing> {
        Some(&self.keys)
    }

    fn stats_slot(&self) -> &StatsSlot {
        &self.stats
    }

    async fn enumerate(&self, cx: &mut SourceContext) -> Result<(), SourceError> {
        let api_key = cx.api_key().unwrap_or_default().to_string();
        let url = format!("{}/v1/domain/{}/subdomains", self.base_url, cx.domain());

        let response = cx.get(&url, &[("APIKEY", api_key.as_str())]).await?;
        let response: SecurityTrailsResponse = response.json(&url)?;

        for host in expand_labels(response.subdomains, cx.domain()) {
            if !cx.emit(host).await {
                break;
            }
        }
        Ok(())
    }
}
