// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recon Library
 * Passive host discovery: sources, aggregation, deduplication and DNS verification
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod errors;
pub mod http_client;
pub mod output;
pub mod rate_limiter;
pub mod types;

// Passive data providers
pub mod sources;

// Registry modules
pub mod registry;

// Discovery pipeline
pub mod discovery;

// DNS verification
pub mod resolve;

pub use discovery::{Agent, CallbackMode, EnumerationCollector, EnumerationOutcome, Runner};
pub use errors::{ReconError, ReconResult};
