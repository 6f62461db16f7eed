// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use parking_lot::RwLock;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;
use url::Url;

use super::lookup::DnsLookup;
use crate::errors::ResolutionError;
use crate::types::{HostEntry, ResolutionResult, ResolvedHost};

/// Synthetic names resolved to build the wildcard baseline
const WILDCARD_PROBES: usize = 3;

const POOL_CHANNEL_CAPACITY: usize = 256;

type WildcardSet = Arc<RwLock<HashSet<IpAddr>>>;

/// Hostname part of a discovered value, which may be a bare host or a URL
pub fn hostname_of(value: &str) -> String {
    if value.contains("://") {
        if let Some(host) = Url::parse(value).ok().and_then(|u| u.host_str().map(str::to_string)) {
            return host.trim_start_matches('[').trim_end_matches(']').to_string();
        }
    }

    value
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(value)
        .rsplit('@')
        .next()
        .unwrap_or(value)
        .split(':')
        .next()
        .unwrap_or(value)
        .to_string()
}

/// Creates resolution pools backed by one lookup implementation
#[derive(Clone)]
pub struct Resolver {
    lookup: Arc<dyn DnsLookup>,
}

impl Resolver {
    pub fn new(lookup: Arc<dyn DnsLookup>) -> Self {
        Self { lookup }
    }

    /// Start `threads` workers.
    ///
    /// With `remove_wildcard` off the workers forward every entry unresolved.
    pub fn new_resolution_pool(&self, threads: usize, remove_wildcard: bool) -> ResolutionPool {
        let (task_tx, task_rx) = mpsc::channel::<HostEntry>(POOL_CHANNEL_CAPACITY);
        let (result_tx, result_rx) = mpsc::channel::<ResolutionResult>(POOL_CHANNEL_CAPACITY);
        let task_rx = Arc::new(Mutex::new(task_rx));
        let wildcards: WildcardSet = Arc::new(RwLock::new(HashSet::new()));

        for _ in 0..threads.max(1) {
            let worker = Worker {
                tasks: Arc::clone(&task_rx),
                results: result_tx.clone(),
                lookup: Arc::clone(&self.lookup),
                wildcards: Arc::clone(&wildcards),
                remove_wildcard,
            };
            tokio::spawn(worker.run());
        }

        ResolutionPool {
            tasks: task_tx,
            results: result_rx,
            wildcards,
            lookup: Arc::clone(&self.lookup),
        }
    }
}

/// Running pool: submit entries on `tasks`, read verdicts from `results`.
///
/// `results` closes once `tasks` is closed and every worker has drained.
pub struct ResolutionPool {
    pub tasks: mpsc::Sender<HostEntry>,
    pub results: mpsc::Receiver<ResolutionResult>,
    wildcards: WildcardSet,
    lookup: Arc<dyn DnsLookup>,
}

impl ResolutionPool {
    /// Resolve random names under `domain` and remember every address returned.
    ///
    /// A lookup failure leaves the set empty, which disables elimination for
    /// this domain.
    pub async fn init_wildcards(&self, domain: &str) -> Result<(), ResolutionError> {
        let mut found = HashSet::new();

        for _ in 0..WILDCARD_PROBES {
            let label: String = rand::rng()
                .sample_iter(&Alphanumeric)
                .take(12)
                .map(char::from)
                .collect::<String>()
                .to_lowercase();
            let probe = format!("{}.{}", label, domain);

            found.extend(self.lookup.lookup(&probe).await?);
        }

        if !found.is_empty() {
            debug!("Wildcard DNS detected for {}: {} address(es)", domain, found.len());
        }
        *self.wildcards.write() = found;
        Ok(())
    }

    pub fn wildcard_ips(&self) -> Vec<IpAddr> {
        self.wildcards.read().iter().copied().collect()
    }

    pub fn into_channels(self) -> (mpsc::Sender<HostEntry>, mpsc::Receiver<ResolutionResult>) {
        (self.tasks, self.results)
    }
}

struct Worker {
    tasks: Arc<Mutex<mpsc::Receiver<HostEntry>>>,
    results: mpsc::Sender<ResolutionResult>,
    lookup: Arc<dyn DnsLookup>,
    wildcards: WildcardSet,
    remove_wildcard: bool,
}

impl Worker {
    async fn run(self) {
        loop {
            let entry = { self.tasks.lock().await.recv().await };
            let Some(entry) = entry else { break };

            let Some(result) = self.resolve(entry).await else {
                continue;
            };
            if self.results.send(result).await.is_err() {
                break;
            }
        }
    }

    async fn resolve(&self, entry: HostEntry) -> Option<ResolutionResult> {
        if !self.remove_wildcard {
            return Some(ResolutionResult::Resolved(ResolvedHost {
                host: entry.host,
                ip: None,
                source: entry.source,
            }));
        }

        let hostname = hostname_of(&entry.host);
        let ips = match self.lookup.lookup(&hostname).await {
            Ok(ips) => ips,
            Err(e) => {
                return Some(ResolutionResult::Error {
                    host: entry.host,
                    error: e.to_string(),
                })
            }
        };

        if ips.is_empty() {
            return None;
        }

        {
            let wildcards = self.wildcards.read();
            if ips.iter().any(|ip| wildcards.contains(ip)) {
                debug!("Dropping wildcard artifact {}", entry.host);
                return None;
            }
        }

        Some(ResolutionResult::Resolved(ResolvedHost {
            host: entry.host,
            ip: Some(ips[0].to_string()),
            source: entry.source,
        }))
    }
}
