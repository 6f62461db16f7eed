// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Source, SourceContext, StatsSlot};
use crate::errors::SourceError;

const WEBARCHIVE_API: &str = "https://web.archive.org";

const TIMEMAP_QUERY: &str = concat!(
    "matchType=prefix&collapse=urlkey&output=json",
    "&fl=original%2Cmimetype%2Ctimestamp%2Cendtimestamp%2Cgroupcount%2Cuniqcount",
    "&limit=1000"
);

/// Original URLs from a Wayback timemap. The first row is the column header.
fn extract_originals(rows: Vec<Vec<Value>>) -> Vec<String> {
    rows.into_iter()
        .skip(1)
        .filter_map(|row| row.into_iter().next())
        .filter_map(|cell| cell.as_str().map(str::to_string))
        .filter(|url| !url.is_empty())
        .collect()
}

/// Wayback Machine captures under the domain
pub struct WebArchive {
    base_url: String,
    stats: StatsSlot,
}

impl WebArchive {
    pub fn new() -> Self {
        Self::with_base_url(WEBARCHIVE_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            stats: StatsSlot::default(),
        }
    }
}

impl Default for WebArchive {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for WebArchive {
    fn name(&self) -> &'static str {
        "webarchive"
    }

    fn is_default(&self) -> bool {
        false
    }

    fn has_recursive_support(&self) -> bool {
        false
    }

    fn stats_slot(&self) -> &StatsSlot {
        &self.stats
    }

    async fn enumerate(&self, cx: &mut SourceContext) -> Result<(), SourceError> {
        let url = format!(
            "{}/web/timemap/json?url={}&{}",
            self.base_url,
            cx.domain(),
            TIMEMAP_QUERY
        );

        let headers = [("Accept", "application/json"), ("Content-Type", "application/json")];
        let response = match cx.get(&url, &headers).await {
            Ok(response) => response,
            // The archive answers 403 for excluded sites; nothing to report
            Err(e) if e.is_forbidden() => {
                debug!("webarchive refused {}", cx.domain());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if response.body.trim().is_empty() {
            return Ok(());
        }

        let rows: Vec<Vec<Value>> = response.json(&url)?;
        for original in extract_originals(rows) {
            if !cx.emit(original).await {
                break;
            }
        }
        Ok(())
    }
}
