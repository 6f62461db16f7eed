// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Aggregation Agent
 * Runs the active sources concurrently against one domain and merges their streams
 *
 * © 2026 Bountyy Oy
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::errors::ReconResult;
use crate::http_client::{Session, SessionConfig};
use crate::registry::{SourceRegistry, SourceSelection};
use crate::sources::{ResultStream, Source};
use crate::types::Statistics;

/// Buffer of the merged stream
const UNIFIED_CHANNEL_CAPACITY: usize = 256;

pub struct Agent {
    sources: Vec<Arc<dyn Source>>,
}

impl Agent {
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self { sources }
    }

    pub fn from_registry(registry: &SourceRegistry, selection: &SourceSelection) -> Self {
        Self::new(registry.select(selection))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Run every source against `domain` and return the merged stream.
    ///
    /// Sources observe a child of `cancel` that also fires after
    /// `max_duration`. The stream closes only after every source task has
    /// finished, so `statistics()` is consistent once it is drained.
    pub fn enumerate(
        &self,
        cancel: &CancellationToken,
        domain: &str,
        session_config: &SessionConfig,
        max_duration: Duration,
    ) -> ReconResult<ResultStream> {
        let session = Arc::new(Session::new(session_config)?);
        let scope = cancel.child_token();
        let (tx, rx) = mpsc::channel(UNIFIED_CHANNEL_CAPACITY);

        debug!(
            "Enumerating {} with {} source(s): {}",
            domain,
            self.sources.len(),
            self.source_names().join(", ")
        );

        let timer = tokio::spawn({
            let scope = scope.clone();
            let domain = domain.to_string();
            async move {
                tokio::select! {
                    _ = tokio::time::sleep(max_duration) => {
                        info!("Maximum enumeration time reached for {}, stopping sources", domain);
                        scope.cancel();
                    }
                    _ = scope.cancelled() => {}
                }
            }
        });

        let tracker = TaskTracker::new();
        for source in &self.sources {
            let mut stream = Arc::clone(source).run(scope.clone(), domain, Arc::clone(&session));
            let tx = tx.clone();
            tracker.spawn(async move {
                while let Some(result) = stream.recv().await {
                    if tx.send(result).await.is_err() {
                        break;
                    }
                }
            });
        }
        tracker.close();

        // Completion barrier: holds the last sender until every forwarder is done.
        tokio::spawn(async move {
            tracker.wait().await;
            timer.abort();
            drop(tx);
        });

        Ok(rx)
    }

    /// Per-source statistics of the last run, keyed by source name
    pub fn statistics(&self) -> HashMap<String, Statistics> {
        self.sources
            .iter()
            .map(|s| (s.name().to_string(), s.statistics()))
            .collect()
    }
}
