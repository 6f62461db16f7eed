// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use regex::Regex;

use crate::errors::{ReconError, ReconResult};

/// Filter/match policy applied to every normalized host.
///
/// A filter hit always rejects. When match patterns exist they form an
/// allow-list.
#[derive(Debug, Clone, Default)]
pub struct HostFilter {
    filter: Vec<Regex>,
    matchers: Vec<Regex>,
}

fn compile(patterns: &[String], kind: &str) -> ReconResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| {
            Regex::new(p).map_err(|e| {
                ReconError::Configuration(format!("Invalid {} regex '{}': {}", kind, p, e))
            })
        })
        .collect()
}

impl HostFilter {
    pub fn new(filter: &[String], matchers: &[String]) -> ReconResult<Self> {
        Ok(Self {
            filter: compile(filter, "filter")?,
            matchers: compile(matchers, "match")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.filter.is_empty() && self.matchers.is_empty()
    }

    pub fn accepts(&self, host: &str) -> bool {
        if self.filter.iter().any(|re| re.is_match(host)) {
            return false;
        }
        if self.matchers.is_empty() {
            return true;
        }
        self.matchers.iter().any(|re| re.is_match(host))
    }
}
