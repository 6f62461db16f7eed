// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Passive Sources
 * Capability contract shared by every third-party data provider
 *
 * © 2026 Bountyy Oy
 */

pub mod alienvault;
pub mod bevigil;
pub mod crtsh;
pub mod hackertarget;
pub mod securitytrails;
pub mod virustotal;
pub mod webarchive;

pub use alienvault::AlienVault;
pub use bevigil::Bevigil;
pub use crtsh::CrtSh;
pub use hackertarget::HackerTarget;
pub use securitytrails::SecurityTrails;
pub use virustotal::VirusTotal;
pub use webarchive::WebArchive;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::SourceError;
use crate::http_client::{HttpResponse, Session};
use crate::types::{SourceResult, Statistics};

/// Buffer of each per-source stream
const SOURCE_CHANNEL_CAPACITY: usize = 64;

/// Receiving side of a source run. Closed when the run is over.
pub type ResultStream = mpsc::Receiver<SourceResult>;

/// API keys configured for a source
#[derive(Debug, Default)]
pub struct KeyRing {
    keys: RwLock<Vec<String>>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, keys: Vec<String>) {
        let keys = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        *self.keys.write() = keys;
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }

    /// Uniformly random key; spreads load across keys without shared cursor state
    pub fn pick_random(&self) -> Option<String> {
        let keys = self.keys.read();
        if keys.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..keys.len());
        Some(keys[index].clone())
    }
}

/// Last published statistics of a source
#[derive(Debug, Default)]
pub struct StatsSlot {
    inner: Mutex<Statistics>,
}

impl StatsSlot {
    pub fn publish(&self, stats: Statistics) {
        *self.inner.lock() = stats;
    }

    pub fn snapshot(&self) -> Statistics {
        self.inner.lock().clone()
    }
}

/// Everything a source body can touch during one run.
///
/// Owned exclusively by the task running the source, which makes it the single
/// writer of that run's statistics.
pub struct SourceContext {
    source: &'static str,
    domain: String,
    api_key: Option<String>,
    cancel: CancellationToken,
    session: Arc<Session>,
    tx: mpsc::Sender<SourceResult>,
    stats: Statistics,
}

impl SourceContext {
    pub fn new(
        source: &'static str,
        domain: impl Into<String>,
        cancel: CancellationToken,
        session: Arc<Session>,
        tx: mpsc::Sender<SourceResult>,
    ) -> Self {
        Self {
            source,
            domain: domain.into(),
            api_key: None,
            cancel,
            session,
            tx,
            stats: Statistics::new(source),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the run's cancellation scope fires
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, SourceError> {
        self.session.get(&self.cancel, self.source, url, headers).await
    }

    /// Send a discovered value downstream.
    ///
    /// Returns false once the run is cancelled or nobody is listening; the
    /// body should stop producing at that point.
    pub async fn emit(&mut self, value: impl Into<String>) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        let result = SourceResult::value(self.source, value);
        let sent = tokio::select! {
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(result) => sent.is_ok(),
        };

        if sent {
            self.stats.results += 1;
        }
        sent
    }

    /// Report a failure. Suppressed after cancellation.
    pub async fn emit_error(&mut self, error: &SourceError) {
        self.stats.errors += 1;

        if self.cancel.is_cancelled() {
            return;
        }

        let result = SourceResult::error(self.source, error);
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = self.tx.send(result) => {}
        }
    }

    fn into_parts(self) -> (Statistics, mpsc::Sender<SourceResult>) {
        (self.stats, self.tx)
    }
}

/// A third-party data provider queried for hosts of a domain
#[async_trait]
pub trait Source: Send + Sync + 'static {
    /// Stable, lower-case, unique identifier
    fn name(&self) -> &'static str;

    /// Used when the caller does not pick sources explicitly
    fn is_default(&self) -> bool;

    /// Results are safe to feed into a deeper discovery pass
    fn has_recursive_support(&self) -> bool;

    /// Key ring for sources that need credentials
    fn key_ring(&self) -> Option<&KeyRing> {
        None
    }

    fn stats_slot(&self) -> &StatsSlot;

    /// Produce values for `cx.domain()`. An `Err` becomes one terminal
    /// error result on the stream.
    async fn enumerate(&self, cx: &mut SourceContext) -> Result<(), SourceError>;

    fn needs_key(&self) -> bool {
        self.key_ring().is_some()
    }

    fn add_api_keys(&self, keys: Vec<String>) {
        if let Some(ring) = self.key_ring() {
            ring.set(keys);
        }
    }

    /// Valid once the stream returned by `run` has been drained
    fn statistics(&self) -> Statistics {
        self.stats_slot().snapshot()
    }

    /// Start a run in its own task and hand back its stream.
    ///
    /// The stream closes after the run's statistics have been published.
    fn run(
        self: Arc<Self>,
        cancel: CancellationToken,
        domain: &str,
        session: Arc<Session>,
    ) -> ResultStream {
        let (tx, rx) = mpsc::channel(SOURCE_CHANNEL_CAPACITY);
        let domain = domain.to_string();

        tokio::spawn(async move {
            let started = Instant::now();
            let name = self.name();
            let mut cx = SourceContext::new(name, domain, cancel, session, tx);

            let skip = match self.key_ring() {
                Some(ring) => match ring.pick_random() {
                    Some(key) => {
                        cx.api_key = Some(key);
                        false
                    }
                    None => true,
                },
                None => false,
            };

            if skip {
                debug!("Skipping source {}: no API key configured", name);
                cx.stats.skipped = true;
            } else if let Err(e) = self.enumerate(&mut cx).await {
                if !matches!(e, SourceError::Cancelled) {
                    cx.emit_error(&e).await;
                }
            }

            let (mut stats, tx) = cx.into_parts();
            stats.time_taken = started.elapsed();
            self.stats_slot().publish(stats);
            drop(tx);
        });

        rx
    }
}

/// Every provider shipped with the crate
pub fn builtin_sources() -> Vec<Arc<dyn Source>> {
    vec![
        Arc::new(AlienVault::new()),
        Arc::new(Bevigil::new()),
        Arc::new(CrtSh::new()),
        Arc::new(HackerTarget::new()),
        Arc::new(SecurityTrails::new()),
        Arc::new(VirusTotal::new()),
        Arc::new(WebArchive::new()),
    ]
}
