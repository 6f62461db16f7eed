// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Multi-domain Runner
 * Sequences enumeration over every input domain and routes results to writers
 *
 * © 2026 Bountyy Oy
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::agent::Agent;
use super::collector::{EnumerationCollector, EnumerationOutcome};
use crate::config::{load_provider_config_with_overrides, ConfigValidator, RunnerOptions};
use crate::errors::{ReconError, ReconResult};
use crate::http_client::SessionConfig;
use crate::output::{OutputSink, OutputWriter};
use crate::registry::SourceRegistry;
use crate::resolve::{HickoryLookup, Resolver};
use crate::types::Statistics;

static IPV4_INPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9.]+$").unwrap());

/// Trimmed, unquoted, lower-cased input line; `None` when nothing is left
pub fn sanitize(input: &str) -> Option<String> {
    let domain = input
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_lowercase();
    (!domain.is_empty()).then_some(domain)
}

pub struct Runner {
    options: RunnerOptions,
    agent: Agent,
    collector: EnumerationCollector,
    session: SessionConfig,
    resolver: Option<Resolver>,
}

impl Runner {
    /// Validate `options`, provision API keys and pick the active sources.
    pub fn new(options: RunnerOptions, registry: &SourceRegistry) -> ReconResult<Self> {
        ConfigValidator::validate_options(&options)?;

        let config_path = options.provider_config.as_deref();
        let providers = load_provider_config_with_overrides(config_path, &registry.names())
            .map_err(|e| ReconError::Configuration(format!("{:#}", e)))?;
        registry.provision_keys(&providers);

        let agent = Agent::from_registry(registry, &options.source_selection());

        let mut collector = EnumerationCollector::new(options.host_filter()?);
        if let Some(callback) = &options.callback {
            collector = collector.with_callback(Arc::clone(callback), options.callback_mode);
        }

        let resolver = if options.remove_wildcard {
            let lookup = HickoryLookup::new(&options.resolvers, options.timeout())?;
            Some(Resolver::new(Arc::new(lookup)))
        } else {
            None
        };

        Ok(Self {
            session: options.session_config(),
            options,
            agent,
            collector,
            resolver,
        })
    }

    /// Swap the DNS backend used for wildcard removal
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Enumerate inline domains, else the domains file, else standard input
    pub async fn run_enumeration(&self, cancel: &CancellationToken) -> ReconResult<()> {
        let mut writers: Vec<OutputSink> = vec![Box::new(std::io::stdout())];

        if !self.options.domains.is_empty() {
            let input = self.options.domains.join("\n");
            return self
                .enumerate_multiple(cancel, BufReader::new(input.as_bytes()), &mut writers)
                .await;
        }

        if let Some(path) = &self.options.domains_file {
            let file = tokio::fs::File::open(path).await?;
            return self.enumerate_multiple(cancel, BufReader::new(file), &mut writers).await;
        }

        if self.options.stdin {
            return self
                .enumerate_multiple(cancel, BufReader::new(tokio::io::stdin()), &mut writers)
                .await;
        }

        Ok(())
    }

    /// Enumerate one domain per line until the input ends or an error occurs
    pub async fn enumerate_multiple<R>(
        &self,
        cancel: &CancellationToken,
        mut reader: R,
        writers: &mut Vec<OutputSink>,
    ) -> ReconResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            if cancel.is_cancelled() {
                break;
            }

            // Lines that are not valid UTF-8 are still enumerated, never fatal.
            let line = String::from_utf8_lossy(&buf);
            let Some(domain) = sanitize(&line) else {
                continue;
            };
            if IPV4_INPUT.is_match(&domain) {
                continue;
            }

            let file = if let Some(path) = &self.options.output_file {
                Some(OutputWriter::create_file(path, true).map_err(|e| {
                    error!("Could not create file {:?} for {}: {}", path, domain, e);
                    e
                })?)
            } else if let Some(dir) = &self.options.output_directory {
                let extension = if self.options.json { "json" } else { "txt" };
                let path = dir.join(format!("{}.{}", domain, extension));
                Some(OutputWriter::create_file(&path, false).map_err(|e| {
                    error!("Could not create file {:?} for {}: {}", path, domain, e);
                    e
                })?)
            } else {
                None
            };

            let pushed = file.is_some();
            if let Some(file) = file {
                writers.push(Box::new(file));
            }

            let result = self.enumerate_single(cancel, &domain, writers).await;

            if pushed {
                writers.pop();
            }
            result?;
        }

        Ok(())
    }

    /// Enumerate one domain and write its results to every writer
    pub async fn enumerate_single(
        &self,
        cancel: &CancellationToken,
        domain: &str,
        writers: &mut [OutputSink],
    ) -> ReconResult<EnumerationOutcome> {
        info!("Enumerating hosts for {}", domain);

        let pool = match &self.resolver {
            Some(resolver) if self.options.remove_wildcard => {
                let pool = resolver.new_resolution_pool(self.options.threads, true);
                if let Err(e) = pool.init_wildcards(domain).await {
                    warn!("Could not get wildcards for domain {}: {}", domain, e);
                }
                Some(pool)
            }
            _ => None,
        };

        let started = Instant::now();
        let stream = self
            .agent
            .enumerate(cancel, domain, &self.session, self.options.max_duration())?;
        let outcome = self.collector.collect(stream, pool).await;

        let output = OutputWriter::new(self.options.json);
        for writer in writers.iter_mut() {
            let written = if let Some(resolved) = &outcome.resolved {
                output.write_resolved(domain, resolved, writer.as_mut())
            } else if self.options.capture_sources {
                output.write_hosts_with_sources(domain, &outcome.sources, writer.as_mut())
            } else {
                output.write_hosts(domain, &outcome.unique, writer.as_mut())
            };

            if let Err(e) = written {
                error!("Could not write results for {}: {}", domain, e);
                return Err(e);
            }
        }

        info!(
            "Found {} hosts for {} in {}",
            outcome.len(),
            domain,
            format_duration(started.elapsed())
        );

        if self.options.statistics {
            info!("Printing source statistics for {}", domain);
            eprint!("{}", statistics_table(&self.agent.statistics()));
        }

        Ok(outcome)
    }
}

/// Human readable duration with at most two units, e.g. `1 minute 5 seconds`
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let units = [
        (total_ms / 3_600_000, "hour"),
        (total_ms / 60_000 % 60, "minute"),
        (total_ms / 1_000 % 60, "second"),
        (total_ms % 1_000, "millisecond"),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(value, _)| *value > 0)
        .take(2)
        .map(|(value, unit)| {
            if *value == 1 {
                format!("{} {}", value, unit)
            } else {
                format!("{} {}s", value, unit)
            }
        })
        .collect();

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(" ")
    }
}

/// Per-source table; skipped sources are listed separately
pub fn statistics_table(stats: &HashMap<String, Statistics>) -> String {
    let mut rows: Vec<&Statistics> = stats.values().filter(|s| !s.skipped).collect();
    rows.sort_by(|a, b| a.source.cmp(&b.source));

    let mut skipped: Vec<&str> = stats
        .values()
        .filter(|s| s.skipped)
        .map(|s| s.source.as_str())
        .collect();
    skipped.sort_unstable();

    let mut table = String::new();
    let _ = writeln!(table, "{:<20} {:<28} {:>8} {:>8}", "Source", "Duration", "Results", "Errors");
    let _ = writeln!(table, "{}", "-".repeat(67));
    for row in rows {
        let _ = writeln!(
            table,
            "{:<20} {:<28} {:>8} {:>8}",
            row.source,
            format_duration(row.time_taken),
            row.results,
            row.errors
        );
    }

    if !skipped.is_empty() {
        let _ = writeln!(table, "\nThe following sources were skipped (missing API keys):");
        for source in skipped {
            let _ = writeln!(table, "  {}", source);
        }
    }
    table
}
