// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{KeyRing, Source, SourceContext, StatsSlot};
use crate::errors::SourceError;

const VIRUSTOTAL_API: &str = "https://www.virustotal.com";

/// Pages fetched per run at most
const MAX_PAGES: usize = 10;

#[derive(Debug, Deserialize)]
struct VirusTotalResponse {
    #[serde(default)]
    data: Vec<VirusTotalDomain>,
    #[serde(default)]
    meta: Option<VirusTotalMeta>,
}

#[derive(Debug, Deserialize)]
struct VirusTotalDomain {
    id: String,
}

#[derive(Debug, Deserialize)]
struct VirusTotalMeta {
    #[serde(default)]
    cursor: Option<String>,
}

impl VirusTotalResponse {
    fn next_cursor(&self) -> Option<String> {
        self.meta
            .as_ref()
            .and_then(|m| m.cursor.clone())
            .filter(|c| !c.is_empty())
    }
}

/// Subdomain listing URL for one page; the cursor is opaque and gets query-encoded
fn page_url(base_url: &str, domain: &str, cursor: Option<&str>) -> Result<String, SourceError> {
    let endpoint = format!("{}/api/v3/domains/{}/subdomains", base_url, domain);
    let mut url = Url::parse(&endpoint).map_err(|e| SourceError::Request {
        url: endpoint.clone(),
        reason: e.to_string(),
    })?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("limit", "40");
        if let Some(cursor) = cursor {
            query.append_pair("cursor", cursor);
        }
    }

    Ok(url.into())
}

/// VirusTotal v3 subdomain relationship (requires an API key)
pub struct VirusTotal {
    base_url: String,
    keys: KeyRing,
    stats: StatsSlot,
}

impl VirusTotal {
    pub fn new() -> Self {
        Self::with_base_url(VIRUSTOTAL_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            keys: KeyRing::new(),
            stats: StatsSlot::default(),
        }
    }
}

impl Default for VirusTotal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for VirusTotal {
    fn name(&self) -> &'static str {
        "virustotal"
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
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            if cx.is_cancelled() {
                return Ok(());
            }

            let url = page_url(&self.base_url, cx.domain(), cursor.as_deref())?;

            let response = cx.get(&url, &[("x-apikey", api_key.as_str())]).await?;
            let page: VirusTotalResponse = response.json(&url)?;
            cursor = page.next_cursor();

            for domain in page.data {
                if !cx.emit(domain.id).await {
                    return Ok(());
                }
            }

            if cursor.is_none() {
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
    fn test_page_cursor() {
        let body = r#"{"data":[{"id":"a.example.com","type":"domain"}],"meta":{"cursor":"abc","count":2}}"#;
        let page: VirusTotalResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.next_cursor().as_deref(), Some("abc"));
        assert_eq!(page.data[0].id, "a.example.com");

        let last: VirusTotalResponse =
            serde_json::from_str(r#"{"data":[],"meta":{"cursor":""}}"#).unwrap();
        assert!(last.next_cursor().is_none());
    }

    #[test]
    fn test_page_url_encodes_cursor() {
        let base = "https://www.virustotal.com";
        let first = page_url(base, "example.com", None).unwrap();
        assert_eq!(first, format!("{}/api/v3/domains/example.com/subdomains?limit=40", base));

        let next = page_url(base, "example.com", Some("eyJh&b=c+/")).unwrap();
        assert!(next.ends_with("?limit=40&cursor=eyJh%26b%3Dc%2B%2F"));
    }
}
