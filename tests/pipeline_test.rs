// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Discovery Pipeline Tests
 * Agent, collector, resolution pool and runner working together on fake sources
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use async_trait::async_trait;
use lonkero_recon::config::RunnerOptions;
use lonkero_recon::discovery::{Agent, CallbackMode, EnumerationCollector, HostFilter, Runner};
use lonkero_recon::errors::{ResolutionError, SourceError};
use lonkero_recon::http_client::SessionConfig;
use lonkero_recon::output::OutputSink;
use lonkero_recon::registry::SourceRegistry;
use lonkero_recon::resolve::{DnsLookup, Resolver};
use lonkero_recon::sources::{Source, SourceContext, StatsSlot};
use lonkero_recon::types::HostEntry;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Emits a fixed list, optionally waiting before each value and failing at the end
struct FakeSource {
    name: &'static str,
    values: Vec<&'static str>,
    delay: Duration,
    fail_with: Option<&'static str>,
    stats: StatsSlot,
}

impl FakeSource {
    fn new(name: &'static str, values: Vec<&'static str>) -> Self {
        Self {
            name,
            values,
            delay: Duration::ZERO,
            fail_with: None,
            stats: StatsSlot::default(),
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn failing(mut self, message: &'static str) -> Self {
        self.fail_with = Some(message);
        self
    }

    fn shared(self) -> Arc<dyn Source> {
        Arc::new(self)
    }
}

#[async_trait]
impl Source for FakeSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_default(&self) -> bool {
        true
    }

    fn has_recursive_support(&self) -> bool {
        false
    }

    fn stats_slot(&self) -> &StatsSlot {
        &self.stats
    }

    async fn enumerate(&self, cx: &mut SourceContext) -> Result<(), SourceError> {
        for value in &self.values {
            if !self.delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = cx.cancelled() => return Err(SourceError::Cancelled),
                }
            }
            if !cx.emit(*value).await {
                return Ok(());
            }
        }
        match self.fail_with {
            Some(message) => Err(SourceError::Api(message.to_string())),
            None => Ok(()),
        }
    }
}

/// Fixed DNS table; everything under `wildcard_zone` answers with one address
struct FakeDns {
    records: HashMap<&'static str, IpAddr>,
    wildcard_zone: Option<(&'static str, IpAddr)>,
    lookups: Mutex<Vec<String>>,
}

impl FakeDns {
    fn new(records: &[(&'static str, &str)]) -> Self {
        Self {
            records: records.iter().map(|(h, ip)| (*h, ip.parse().unwrap())).collect(),
            wildcard_zone: None,
            lookups: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DnsLookup for FakeDns {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolutionError> {
        self.lookups.lock().push(host.to_string());
        if let Some(ip) = self.records.get(host) {
            return Ok(vec![*ip]);
        }
        match self.wildcard_zone {
            Some((zone, ip)) if host.ends_with(zone) => Ok(vec![ip]),
            _ => Ok(Vec::new()),
        }
    }
}

/// Cloneable in-memory writer
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn enumerate(agent: &Agent, max_duration: Duration) -> lonkero_recon::sources::ResultStream {
    agent
        .enumerate(
            &CancellationToken::new(),
            "example.com",
            &SessionConfig::default(),
            max_duration,
        )
        .unwrap()
}

#[tokio::test]
async fn test_three_sources_collapse_spellings() {
    let agent = Agent::new(vec![
        FakeSource::new("alpha", vec!["a.example.com"]).shared(),
        FakeSource::new("beta", vec!["A.EXAMPLE.COM"]).shared(),
        FakeSource::new("gamma", vec!["*.b.example.com"]).shared(),
    ]);

    let outcome = EnumerationCollector::default()
        .collect(enumerate(&agent, Duration::from_secs(60)), None)
        .await;

    assert_eq!(outcome.final_hosts(), vec!["a.example.com", "b.example.com"]);
    let provenance = &outcome.sources["a.example.com"];
    assert!(provenance.contains("alpha"));
    assert!(provenance.contains("beta"));
    assert_eq!(provenance.len(), 2);
}

#[tokio::test]
async fn test_filter_excludes_cdn_hosts() {
    let agent = Agent::new(vec![
        FakeSource::new("alpha", vec!["cdn.example.com", "www.example.com"]).shared(),
    ]);
    let filter = HostFilter::new(&[r"^cdn\..*".to_string()], &[]).unwrap();

    let outcome = EnumerationCollector::new(filter)
        .collect(enumerate(&agent, Duration::from_secs(60)), None)
        .await;

    assert_eq!(outcome.final_hosts(), vec!["www.example.com"]);
}

#[tokio::test]
async fn test_source_error_keeps_earlier_values() {
    let agent = Agent::new(vec![FakeSource::new("alpha", vec!["one.example.com", "two.example.com"])
        .failing("upstream exploded")
        .shared()]);

    let outcome = EnumerationCollector::default()
        .collect(enumerate(&agent, Duration::from_secs(60)), None)
        .await;

    assert_eq!(outcome.final_hosts(), vec!["one.example.com", "two.example.com"]);
    assert_eq!(outcome.source_errors, 1);

    let stats = agent.statistics();
    assert_eq!(stats["alpha"].results, 2);
    assert_eq!(stats["alpha"].errors, 1);
}

#[tokio::test]
async fn test_max_duration_expiry_only_stops_slow_source() {
    let agent = Agent::new(vec![
        FakeSource::new("quick", vec!["quick.example.com"]).shared(),
        FakeSource::new("slow", vec!["first.example.com", "late.example.com"])
            .delayed(Duration::from_millis(200))
            .shared(),
    ]);

    let outcome = EnumerationCollector::default()
        .collect(enumerate(&agent, Duration::from_millis(300)), None)
        .await;

    assert_eq!(outcome.final_hosts(), vec!["first.example.com", "quick.example.com"]);
    assert_eq!(outcome.source_errors, 0);
    assert_eq!(agent.statistics()["slow"].results, 1);
}

#[tokio::test]
async fn test_all_sources_failing_is_an_empty_success() {
    let agent = Agent::new(vec![
        FakeSource::new("alpha", vec![]).failing("down").shared(),
        FakeSource::new("beta", vec![]).failing("also down").shared(),
    ]);

    let outcome = EnumerationCollector::default()
        .collect(enumerate(&agent, Duration::from_secs(60)), None)
        .await;

    assert!(outcome.is_empty());
    assert_eq!(outcome.source_errors, 2);
}

#[tokio::test]
async fn test_wildcard_removal_submits_each_host_once() {
    let agent = Agent::new(vec![
        FakeSource::new(
            "alpha",
            vec!["www.example.com", "ghost.example.com", "api.example.com"],
        )
        .shared(),
        FakeSource::new("beta", vec!["WWW.example.com", "api.example.com"]).shared(),
    ]);

    let mut dns = FakeDns::new(&[("www.example.com", "10.0.0.1"), ("api.example.com", "10.0.0.2")]);
    dns.wildcard_zone = Some(("example.com", "10.9.9.9".parse().unwrap()));
    let dns = Arc::new(dns);

    let pool = Resolver::new(dns.clone()).new_resolution_pool(4, true);
    pool.init_wildcards("example.com").await.unwrap();
    let probes = dns.lookups.lock().len();

    let outcome = EnumerationCollector::default()
        .collect(enumerate(&agent, Duration::from_secs(60)), Some(pool))
        .await;

    assert_eq!(outcome.final_hosts(), vec!["api.example.com", "www.example.com"]);
    assert_eq!(outcome.unique.len(), 3);

    let lookups: Vec<String> = dns.lookups.lock()[probes..].to_vec();
    let distinct: HashSet<&String> = lookups.iter().collect();
    assert_eq!(lookups.len(), 3);
    assert_eq!(distinct.len(), 3);
}

#[tokio::test]
async fn test_callback_modes() {
    let run = |mode: CallbackMode| async move {
        let agent = Agent::new(vec![
            FakeSource::new("alpha", vec!["www.example.com", "dead.example.com"]).shared(),
        ]);
        let dns = Arc::new(FakeDns::new(&[("www.example.com", "10.0.0.1")]));
        let pool = Resolver::new(dns).new_resolution_pool(2, true);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let collector = EnumerationCollector::default().with_callback(
            Arc::new(move |entry: &HostEntry| sink.lock().push(entry.host.clone())),
            mode,
        );
        let stream = enumerate(&agent, Duration::from_secs(60));
        let outcome = collector.collect(stream, Some(pool)).await;
        assert_eq!(outcome.final_hosts(), vec!["www.example.com"]);

        let mut seen = seen.lock().clone();
        seen.sort();
        seen
    };

    assert_eq!(run(CallbackMode::Unverified).await, vec!["dead.example.com", "www.example.com"]);
    assert_eq!(run(CallbackMode::Verified).await, vec!["www.example.com"]);
}

#[tokio::test]
async fn test_runner_routes_hosts_with_sources() {
    let mut registry = SourceRegistry::new();
    registry.register(FakeSource::new("alpha", vec!["a.example.com", "b.example.com"]).shared());
    registry.register(FakeSource::new("beta", vec!["a.example.com", "10.0.0.1"]).shared());

    let options = RunnerOptions {
        domains: vec!["example.com".to_string()],
        capture_sources: true,
        match_patterns: vec![r"example\.com$".to_string()],
        ..Default::default()
    };
    let runner = Runner::new(options, &registry).unwrap();

    let buffer = SharedBuffer::default();
    let mut writers: Vec<OutputSink> = vec![Box::new(buffer.clone())];
    let outcome = runner
        .enumerate_single(&CancellationToken::new(), "example.com", &mut writers)
        .await
        .unwrap();

    assert_eq!(outcome.len(), 2);
    assert_eq!(buffer.contents(), "a.example.com,[alpha,beta]\nb.example.com,[alpha]\n");
}

#[tokio::test]
async fn test_runner_reads_many_domains_and_writes_per_domain_files() {
    let mut registry = SourceRegistry::new();
    registry.register(
        FakeSource::new("alpha", vec!["www.example.com", "www.example.org"]).shared(),
    );

    let dir = tempfile::tempdir().unwrap();
    let options = RunnerOptions {
        domains: vec!["placeholder".to_string()],
        output_directory: Some(dir.path().to_path_buf()),
        json: true,
        ..Default::default()
    };
    let runner = Runner::new(options, &registry).unwrap();

    let input = "  \"Example.com\"\n\n192.168.1.1\nexample.org\n";
    let mut writers: Vec<OutputSink> = Vec::new();
    runner
        .enumerate_multiple(
            &CancellationToken::new(),
            tokio::io::BufReader::new(input.as_bytes()),
            &mut writers,
        )
        .await
        .unwrap();

    assert!(writers.is_empty());
    assert!(dir.path().join("example.com.json").exists());
    assert!(dir.path().join("example.org.json").exists());
    assert!(!dir.path().join("192.168.1.1.json").exists());

    let first = std::fs::read_to_string(dir.path().join("example.com.json")).unwrap();
    let line: serde_json::Value = serde_json::from_str(first.lines().next().unwrap()).unwrap();
    assert_eq!(line["input"], "example.com");
    assert_eq!(line["source"], "alpha");
}

#[tokio::test]
async fn test_runner_continues_past_invalid_utf8_line() {
    let mut registry = SourceRegistry::new();
    registry.register(FakeSource::new("alpha", vec!["www.example.org"]).shared());

    let dir = tempfile::tempdir().unwrap();
    let options = RunnerOptions {
        domains: vec!["placeholder".to_string()],
        output_directory: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let runner = Runner::new(options, &registry).unwrap();

    let input: &[u8] = b"bad\xff.example.com\nexample.org\n";
    let mut writers: Vec<OutputSink> = Vec::new();
    runner
        .enumerate_multiple(
            &CancellationToken::new(),
            tokio::io::BufReader::new(input),
            &mut writers,
        )
        .await
        .unwrap();

    let written = std::fs::read_to_string(dir.path().join("example.org.txt")).unwrap();
    assert_eq!(written.trim(), "www.example.org");
}

#[tokio::test]
async fn test_runner_wildcard_removal_with_fake_resolver() {
    let mut registry = SourceRegistry::new();
    registry.register(
        FakeSource::new("alpha", vec!["www.example.com", "nowhere.example.com"]).shared(),
    );

    let options = RunnerOptions {
        domains: vec!["example.com".to_string()],
        remove_wildcard: true,
        threads: 2,
        ..Default::default()
    };
    let dns = Arc::new(FakeDns::new(&[("www.example.com", "10.0.0.1")]));
    let runner = Runner::new(options, &registry)
        .unwrap()
        .with_resolver(Resolver::new(dns));

    let buffer = SharedBuffer::default();
    let mut writers: Vec<OutputSink> = vec![Box::new(buffer.clone())];
    let outcome = runner
        .enumerate_single(&CancellationToken::new(), "example.com", &mut writers)
        .await
        .unwrap();

    assert_eq!(outcome.unique.len(), 2);
    assert_eq!(outcome.final_hosts(), vec!["www.example.com"]);
    assert_eq!(buffer.contents(), "www.example.com\n");
}
