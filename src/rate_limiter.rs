// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Shared Source Rate Limiter
 * Token bucket limits shared by every source task of an enumeration run
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use nonzero_ext::*;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, info};

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter configuration. A rate of 0 means unlimited.
#[derive(Debug, Clone, Default)]
pub struct RateLimiterConfig {
    /// Requests per second across all sources
    pub global_rps: u32,

    /// Requests per second for individual sources, keyed by source name
    pub per_source_rps: HashMap<String, u32>,
}

impl RateLimiterConfig {
    pub fn global(rps: u32) -> Self {
        Self {
            global_rps: rps,
            per_source_rps: HashMap::new(),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.global_rps == 0 && self.per_source_rps.values().all(|rps| *rps == 0)
    }
}

fn direct_limiter(rps: u32) -> Arc<DirectLimiter> {
    let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(nonzero!(1u32)));
    Arc::new(GovernorRateLimiter::direct(quota))
}

/// Limiter shared across every source task of one run
pub struct SourceRateLimiter {
    global_limiter: Option<Arc<DirectLimiter>>,
    source_limiters: HashMap<String, Arc<DirectLimiter>>,
}

impl SourceRateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        let global_limiter = (config.global_rps > 0).then(|| direct_limiter(config.global_rps));

        let source_limiters = config
            .per_source_rps
            .iter()
            .filter(|(_, rps)| **rps > 0)
            .map(|(source, rps)| (source.to_lowercase(), direct_limiter(*rps)))
            .collect::<HashMap<_, _>>();

        info!(
            "Initialized rate limiter: global={}rps, {} per-source limits",
            config.global_rps,
            source_limiters.len()
        );

        Self {
            global_limiter,
            source_limiters,
        }
    }

    /// Wait until `source` may issue its next request
    pub async fn wait_for_slot(&self, source: &str) {
        if let Some(limiter) = self.source_limiters.get(source) {
            limiter.until_ready().await;
        }

        if let Some(limiter) = &self.global_limiter {
            limiter.until_ready().await;
        }

        debug!("[RateLimit] slot granted to {}", source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_unlimited_limiter_never_waits() {
        let limiter = SourceRateLimiter::new(RateLimiterConfig::default());
        let start = Instant::now();
        for _ in 0..1000 {
            limiter.wait_for_slot("crtsh").await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_global_limit_is_shared_between_sources() {
        let limiter = Arc::new(SourceRateLimiter::new(RateLimiterConfig::global(20)));

        let start = Instant::now();
        let mut handles = Vec::new();
        for source in ["crtsh", "alienvault", "webarchive"] {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    limiter.wait_for_slot(source).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // 30 permits against a 20/s bucket with a burst of 20 needs ~0.5s
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_per_source_limit_only_slows_that_source() {
        let mut config = RateLimiterConfig::default();
        config.per_source_rps.insert("hackertarget".to_string(), 5);
        let limiter = SourceRateLimiter::new(config);

        let start = Instant::now();
        for _ in 0..20 {
            limiter.wait_for_slot("crtsh").await;
        }
        assert!(start.elapsed() < Duration::from_millis(200));

        // burst of 5, then one permit every 200ms
        let start = Instant::now();
        for _ in 0..8 {
            limiter.wait_for_slot("hackertarget").await;
        }
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
