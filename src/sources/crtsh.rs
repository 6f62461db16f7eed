// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;

use super::{Source, SourceContext, StatsSlot};
use crate::errors::SourceError;

const CRTSH_API: &str = "https://crt.sh";

/// Certificate Transparency log entry
#[derive(Debug, Deserialize)]
struct CertTransparencyEntry {
    name_value: String,
}

/// Names under `domain` found in the entries, first occurrence order, no duplicates
fn extract_names(entries: Vec<CertTransparencyEntry>, domain: &str) -> Vec<String> {
    let mut unique_domains = HashSet::new();
    let mut names = Vec::new();

    for entry in entries {
        for name in entry.name_value.lines() {
            let cleaned = name
                .trim()
                .to_lowercase()
                .trim_start_matches("*.")
                .trim_start_matches('.')
                .to_string();

            if cleaned.ends_with(domain)
                && !cleaned.contains('*')
                && unique_domains.insert(cleaned.clone())
            {
                names.push(cleaned);
            }
        }
    }

    names
}

/// crt.sh certificate transparency search
pub struct CrtSh {
    base_url: String,
    stats: StatsSlot,
}

impl CrtSh {
    pub fn new() -> Self {
        Self::with_base_url(CRTSH_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            stats: StatsSlot::default(),
        }
    }
}

impl Default for CrtSh {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for CrtSh {
    fn name(&self) -> &'static str {
        "crtsh"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn has_recursive_support(&self) -> bool {
        true
    }

    fn stats_slot(&self) -> &StatsSlot {
        &self.stats
    }

    async fn enumerate(&self, cx: &mut SourceContext) -> Result<(), SourceError> {
        let url = format!("{}/?q=%25.{}&output=json", self.base_url, cx.domain());

        let response = cx.get(&url, &[]).await?;
        let entries: Vec<CertTransparencyEntry> = response.json(&url)?;

        for name in extract_names(entries, cx.domain()) {
            if !cx.emit(name).await {
                break;
            }
        }
        Ok(())
    }
}
