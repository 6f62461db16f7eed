// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Enumeration Collector
 * Deduplication, provenance tracking and resolution bridging for one domain
 *
 * © 2026 Bountyy Oy
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::filter::HostFilter;
use crate::resolve::ResolutionPool;
use crate::sources::ResultStream;
use crate::types::{normalize_host, HostEntry, ResolutionResult, ResolvedHost};

/// Invoked once per reported host
pub type HostCallback = Arc<dyn Fn(&HostEntry) + Send + Sync>;

/// Which set the host callback observes when DNS verification runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackMode {
    /// Every deduplicated host, before verification
    #[default]
    Unverified,
    /// Only hosts that survived verification
    Verified,
}

/// Everything collected for one domain
#[derive(Debug, Default)]
pub struct EnumerationOutcome {
    /// Normalized host to its first sighting
    pub unique: HashMap<String, HostEntry>,
    /// Normalized host to every source that reported it
    pub sources: HashMap<String, BTreeSet<String>>,
    /// Verified hosts; `None` when no resolution pool was used
    pub resolved: Option<HashMap<String, ResolvedHost>>,
    pub source_errors: usize,
    pub resolution_errors: usize,
}

impl EnumerationOutcome {
    /// Authoritative host set, sorted
    pub fn final_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = match &self.resolved {
            Some(resolved) => resolved.keys().cloned().collect(),
            None => self.unique.keys().cloned().collect(),
        };
        hosts.sort();
        hosts
    }

    pub fn len(&self) -> usize {
        match &self.resolved {
            Some(resolved) => resolved.len(),
            None => self.unique.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct Aggregate {
    unique: HashMap<String, HostEntry>,
    sources: HashMap<String, BTreeSet<String>>,
    errors: usize,
}

#[derive(Default)]
pub struct EnumerationCollector {
    filter: HostFilter,
    callback: Option<HostCallback>,
    mode: CallbackMode,
}

impl fmt::Debug for EnumerationCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumerationCollector")
            .field("filter", &self.filter)
            .field("callback", &self.callback.is_some())
            .field("mode", &self.mode)
            .finish()
    }
}

impl EnumerationCollector {
    pub fn new(filter: HostFilter) -> Self {
        Self {
            filter,
            callback: None,
            mode: CallbackMode::default(),
        }
    }

    pub fn with_callback(mut self, callback: HostCallback, mode: CallbackMode) -> Self {
        self.callback = Some(callback);
        self.mode = mode;
        self
    }

    /// Drain `stream` and, when a pool is given, the pool's verdicts.
    ///
    /// The two stages run concurrently. The pool's task sender is dropped
    /// only after `stream` is exhausted, which is what lets the result
    /// stage finish.
    pub async fn collect(
        &self,
        stream: ResultStream,
        pool: Option<ResolutionPool>,
    ) -> EnumerationOutcome {
        let (tasks, results) = match pool {
            Some(pool) => {
                let (tasks, results) = pool.into_channels();
                (Some(tasks), Some(results))
            }
            None => (None, None),
        };

        let (aggregate, resolved) = tokio::join!(
            self.aggregate(stream, tasks),
            drain_resolutions(results)
        );

        let (resolved, resolution_errors) = match resolved {
            Some((hosts, errors)) => (Some(hosts), errors),
            None => (None, 0),
        };

        let outcome = EnumerationOutcome {
            unique: aggregate.unique,
            sources: aggregate.sources,
            resolved,
            source_errors: aggregate.errors,
            resolution_errors,
        };

        self.fire_callbacks(&outcome);
        outcome
    }

    async fn aggregate(
        &self,
        mut stream: ResultStream,
        tasks: Option<mpsc::Sender<HostEntry>>,
    ) -> Aggregate {
        let mut state = Aggregate::default();

        while let Some(result) = stream.recv().await {
            if result.is_error() {
                state.errors += 1;
                warn!(
                    "Could not run source {}: {}",
                    result.source,
                    result.error.as_deref().unwrap_or("unknown error")
                );
                continue;
            }

            let host = normalize_host(&result.value);
            if host.is_empty() || !self.filter.accepts(&host) {
                continue;
            }

            let new_sighting = state
                .sources
                .entry(host.clone())
                .or_default()
                .insert(result.source.clone());
            if new_sighting {
                debug!("[{}] {}", result.source, host);
            }

            if state.unique.contains_key(&host) {
                continue;
            }

            let entry = HostEntry::new(host.clone(), result.source);
            state.unique.insert(host, entry.clone());

            if let Some(tasks) = &tasks {
                if tasks.send(entry).await.is_err() {
                    warn!("Resolution pool stopped accepting hosts");
                }
            }
        }

        // Upstream exhausted: closing the pool's task channel is the hand-off signal.
        drop(tasks);
        state
    }

    fn fire_callbacks(&self, outcome: &EnumerationOutcome) {
        let Some(callback) = &self.callback else {
            return;
        };

        match (&outcome.resolved, self.mode) {
            (Some(resolved), CallbackMode::Verified) => {
                for host in resolved.values() {
                    callback(&HostEntry::new(host.host.clone(), host.source.clone()));
                }
            }
            _ => {
                for entry in outcome.unique.values() {
                    callback(entry);
                }
            }
        }
    }
}

async fn drain_resolutions(
    results: Option<mpsc::Receiver<ResolutionResult>>,
) -> Option<(HashMap<String, ResolvedHost>, usize)> {
    let mut results = results?;
    let mut resolved = HashMap::new();
    let mut errors = 0;

    while let Some(result) = results.recv().await {
        match result {
            ResolutionResult::Error { host, error } => {
                errors += 1;
                warn!("Could not resolve host {}: {}", host, error);
            }
            ResolutionResult::Resolved(host) => {
                debug!("Found host {} ({})", host.host, host.ip.as_deref().unwrap_or("-"));
                resolved.entry(host.host.clone()).or_insert(host);
            }
        }
    }

    Some((resolved, errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceResult;

    fn stream_of(results: Vec<SourceResult>) -> ResultStream {
        let (tx, rx) = mpsc::channel(results.len().max(1));
        for result in results {
            tx.try_send(result).unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn test_dedup_and_provenance() {
        let stream = stream_of(vec![
            SourceResult::value("alpha", "a.example.com"),
            SourceResult::value("beta", "A.EXAMPLE.COM"),
            SourceResult::value("gamma", "*.b.example.com"),
        ]);

        let outcome = EnumerationCollector::default().collect(stream, None).await;

        assert_eq!(outcome.final_hosts(), vec!["a.example.com", "b.example.com"]);
        assert_eq!(outcome.unique["a.example.com"].source, "alpha");
        let provenance: Vec<_> = outcome.sources["a.example.com"].iter().cloned().collect();
        assert_eq!(provenance, vec!["alpha", "beta"]);
        assert!(outcome.resolved.is_none());
    }

    #[tokio::test]
    async fn test_wildcard_url_spellings_collapse() {
        let stream = stream_of(vec![
            SourceResult::value("alienvault", "https://a.example.com/"),
            SourceResult::value("webarchive", "https://*.A.example.com/"),
        ]);

        let outcome = EnumerationCollector::default().collect(stream, None).await;

        assert_eq!(outcome.final_hosts(), vec!["https://a.example.com/"]);
        let provenance: Vec<_> = outcome.sources["https://a.example.com/"]
            .iter()
            .cloned()
            .collect();
        assert_eq!(provenance, vec!["alienvault", "webarchive"]);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_every_new_source_sighting_is_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let stream = stream_of(vec![
            SourceResult::value("alpha", "a.example.com"),
            SourceResult::value("beta", "a.example.com"),
            SourceResult::value("beta", "a.example.com"),
        ]);
        EnumerationCollector::default().collect(stream, None).await;

        let output = String::from_utf8_lossy(&logs.0.lock()).to_string();
        assert_eq!(output.matches("[alpha] a.example.com").count(), 1);
        assert_eq!(output.matches("[beta] a.example.com").count(), 1);
    }

    #[tokio::test]
    async fn test_filtered_hosts_leave_no_trace() {
        let filter = HostFilter::new(&[r"^cdn\..*".to_string()], &[]).unwrap();
        let stream = stream_of(vec![
            SourceResult::value("alpha", "cdn.example.com"),
            SourceResult::value("alpha", "www.example.com"),
        ]);

        let outcome = EnumerationCollector::new(filter).collect(stream, None).await;

        assert_eq!(outcome.final_hosts(), vec!["www.example.com"]);
        assert!(!outcome.sources.contains_key("cdn.example.com"));
    }

    #[tokio::test]
    async fn test_errors_are_counted_not_fatal() {
        let stream = stream_of(vec![
            SourceResult::value("alpha", "one.example.com"),
            SourceResult::value("alpha", "two.example.com"),
            SourceResult::error("alpha", "rate limited"),
        ]);

        let outcome = EnumerationCollector::default().collect(stream, None).await;

        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.source_errors, 1);
    }

    #[tokio::test]
    async fn test_callback_fires_once_per_unique_host() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let collector = EnumerationCollector::default().with_callback(
            Arc::new(move |entry: &HostEntry| sink.lock().push(entry.host.clone())),
            CallbackMode::Unverified,
        );

        let stream = stream_of(vec![
            SourceResult::value("alpha", "a.example.com"),
            SourceResult::value("beta", "a.example.com"),
        ]);
        collector.collect(stream, None).await;

        assert_eq!(*seen.lock(), vec!["a.example.com"]);
    }
}
