// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Resolution Module
 * DNS verification of discovered hosts with wildcard artifact elimination
 *
 * © 2026 Bountyy Oy
 */

pub mod lookup;
pub mod pool;

pub use lookup::{DnsLookup, HickoryLookup, DEFAULT_RESOLVERS};
pub use pool::{hostname_of, ResolutionPool, Resolver};
