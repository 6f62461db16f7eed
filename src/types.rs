// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Kind of item a source puts on its result stream
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Value,
    Error,
}

/// One item produced by a source run. Immutable once sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResult {
    pub source: String,
    pub kind: ResultKind,
    pub value: String,
    pub error: Option<String>,
}

impl SourceResult {
    pub fn value(source: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: ResultKind::Value,
            value: value.into(),
            error: None,
        }
    }

    pub fn error(source: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            source: source.into(),
            kind: ResultKind::Error,
            value: String::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == ResultKind::Error
    }
}

/// A deduplicated host paired with the first source that reported it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HostEntry {
    pub host: String,
    pub source: String,
}

impl HostEntry {
    pub fn new(host: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            source: source.into(),
        }
    }
}

/// Per-source run statistics.
///
/// Written only by the task running the source and published when that task
/// finishes; readers see a snapshot after the source's stream has closed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    pub source: String,
    pub errors: usize,
    pub results: usize,
    #[serde(rename = "time_taken_ms", with = "duration_millis")]
    pub time_taken: Duration,
    pub skipped: bool,
}

impl Statistics {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }
}

/// A host that survived DNS verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedHost {
    pub host: String,
    pub ip: Option<String>,
    pub source: String,
}

/// Item on the resolution pool's result stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    Resolved(ResolvedHost),
    Error { host: String, error: String },
}

/// Normalize a reported value into the key used by every map in the pipeline:
/// trimmed, lower-cased, every wildcard label removed (also inside URLs).
pub fn normalize_host(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace("*.", "")
        .trim_start_matches('.')
        .to_string()
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
