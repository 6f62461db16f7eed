// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Discovery Module
 * Passive host discovery pipeline: agent, collector, filter policy and runner
 *
 * © 2026 Bountyy Oy
 */
pub mod agent;
pub mod collector;
pub mod filter;
pub mod runner;

pub use agent::Agent;
pub use collector::{CallbackMode, EnumerationCollector, EnumerationOutcome, HostCallback};
pub use filter::HostFilter;
pub use runner::Runner;
