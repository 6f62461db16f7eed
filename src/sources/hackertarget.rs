// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;

use super::{Source, SourceContext, StatsSlot};
use crate::errors::SourceError;

const HACKERTARGET_API: &str = "https://api.hackertarget.com";

/// Hosts from the `host,ip` CSV answer.
///
/// The API signals quota and input problems with a plain-text line instead of
/// a status code.
fn extract_hosts(body: &str, domain: &str) -> Result<Vec<String>, SourceError> {
    let trimmed = body.trim();
    if trimmed.starts_with("error") || trimmed.starts_with("API count exceeded") {
        return Err(SourceError::Api(trimmed.to_string()));
    }

    Ok(trimmed
        .lines()
        .filter_map(|line| line.split_once(',').map(|(host, _)| host))
        .map(|host| host.trim().trim_end_matches('.'))
        .filter(|host| host.ends_with(domain))
        .map(str::to_string)
        .collect())
}

/// HackerTarget host search
pub struct HackerTarget {
    base_url: String,
    stats: StatsSlot,
}

impl HackerTarget {
    pub fn new() -> Self {
        Self::with_base_url(HACKERTARGET_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            stats: StatsSlot::default(),
        }
    }
}

impl Default for HackerTarget {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for HackerTarget {
    fn name(&self) -> &'static str {
        "hackertarget"
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
        let url = format!("{}/hostsearch/?q={}", self.base_url, cx.domain());

        let response = cx.get(&url, &[]).await?;
        for host in extract_hosts(&response.body, cx.domain())? {
            if !cx.emit(host).await {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_hosts() {
        let body = "www.example.com,93.184.216.34\n\
                    mail.example.com.,93.184.216.35\n\
                    unrelated.org,1.1.1.1\n";
        let hosts = extract_hosts(body, "example.com").unwrap();
        assert_eq!(hosts, vec!["www.example.com", "mail.example.com"]);
    }

    #[test]
    fn test_extract_hosts_quota_message() {
        let body = "API count exceeded - Increase Quota with Membership";
        let err = extract_hosts(body, "example.com").unwrap_err();
        assert!(matches!(err, SourceError::Api(_)));
    }
}
