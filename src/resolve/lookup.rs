// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::TokioResolver;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::errors::ResolutionError;

/// Public resolvers used when none are configured
pub const DEFAULT_RESOLVERS: &[&str] = &[
    "1.1.1.1:53",        // Cloudflare primary
    "1.0.0.1:53",        // Cloudflare secondary
    "8.8.8.8:53",        // Google primary
    "8.8.4.4:53",        // Google secondary
    "9.9.9.9:53",        // Quad9 primary
    "9.9.9.10:53",       // Quad9 secondary
    "77.88.8.8:53",      // Yandex primary
    "77.88.8.1:53",      // Yandex secondary
    "208.67.222.222:53", // OpenDNS primary
    "208.67.220.220:53", // OpenDNS secondary
];

/// Attempts per query before the lookup is reported as failed
const MAX_RETRIES: usize = 5;

/// Address lookup seam used by the resolution pool
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Addresses of `host`. An empty vector means the name does not resolve.
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolutionError>;
}

/// `host[:port]` with port 53 filled in
fn parse_resolver(address: &str) -> Result<SocketAddr, ResolutionError> {
    let address = address.trim();
    if let Ok(socket) = address.parse::<SocketAddr>() {
        return Ok(socket);
    }
    address
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, 53))
        .map_err(|e| ResolutionError::InvalidResolver {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// UDP lookups against a fixed set of upstream resolvers
pub struct HickoryLookup {
    resolver: TokioResolver,
}

impl HickoryLookup {
    pub fn new(resolvers: &[String], timeout: Duration) -> Result<Self, ResolutionError> {
        let addresses: Vec<String> = if resolvers.is_empty() {
            DEFAULT_RESOLVERS.iter().map(|r| r.to_string()).collect()
        } else {
            resolvers.to_vec()
        };

        let mut config = ResolverConfig::new();
        for address in &addresses {
            let socket = parse_resolver(address)?;
            config.add_name_server(NameServerConfig::new(socket, Protocol::Udp));
        }

        let mut opts = ResolverOpts::default();
        opts.attempts = MAX_RETRIES;
        opts.timeout = timeout;
        opts.cache_size = 0;

        let resolver =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();

        Ok(Self { resolver })
    }
}

#[async_trait]
impl DnsLookup for HickoryLookup {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolutionError> {
        match self.resolver.lookup_ip(host).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(e) if e.is_no_records_found() || e.is_nx_domain() => Ok(Vec::new()),
            Err(e) => Err(ResolutionError::Lookup {
                host: host.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
