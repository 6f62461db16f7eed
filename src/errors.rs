// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recon Error Types
 * Error taxonomy for passive discovery: per-source, per-lookup and fatal configuration errors
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use std::time::Duration;
use thiserror::Error;

/// Top-level error returned by the runner and the agent
#[derive(Error, Debug)]
pub enum ReconError {
    /// Invalid options; raised before any enumeration starts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A source failed in a way that escaped its own stream
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Resolver construction or wildcard detection failed
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Writing output or reading input failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised inside a single source run. Never fatal to the aggregate run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Unexpected status code {status_code} received from {url}")]
    UnexpectedStatus { url: String, status_code: u16 },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Could not parse response from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Provider returned an error: {0}")]
    Api(String),

    #[error("Enumeration cancelled")]
    Cancelled,
}

impl SourceError {
    /// Status code carried by the error, if the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SourceError::UnexpectedStatus { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.status_code() == Some(403)
    }

    /// Transport-level failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Request { .. } | SourceError::Timeout { .. } => true,
            SourceError::UnexpectedStatus { status_code, .. } => {
                matches!(status_code, 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

/// DNS lookup errors
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    #[error("DNS resolution failed for {host}: {reason}")]
    Lookup { host: String, reason: String },

    #[error("Invalid resolver address {address}: {reason}")]
    InvalidResolver { address: String, reason: String },

    #[error("Resolution error: {0}")]
    Other(String),
}

pub type ReconResult<T> = Result<T, ReconError>;
