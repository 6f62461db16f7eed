// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Lonkero Recon - Passive Host Discovery
 * Standalone CLI for passive host and URL enumeration
 *
 * Features:
 * - Concurrent queries against passive data sources
 * - Deduplication with per-host source provenance
 * - Filter / match regex policy
 * - Wildcard-aware DNS verification
 * - Plain, JSON and host-with-sources output
 *
 * (c) 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use lonkero_recon::config::{api_key_env_var, ConfigLoader, RunnerOptions};
use lonkero_recon::discovery::{CallbackMode, Runner};
use lonkero_recon::registry::SourceRegistry;

/// Lonkero Recon - Passive Host Discovery
#[derive(Parser)]
#[command(name = "lonkero-recon")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version)]
#[command(about = "Passive host and URL discovery from third-party sources.", long_about = None)]
struct Cli {
    /// Domains to enumerate (comma separated or repeated)
    #[arg(short, long = "domain", value_delimiter = ',')]
    domains: Vec<String>,

    /// File with one domain per line
    #[arg(short = 'l', long = "list")]
    domains_file: Option<PathBuf>,

    /// Read domains from standard input
    #[arg(long)]
    stdin: bool,

    /// Sources to use (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    sources: Vec<String>,

    /// Sources to skip (comma separated)
    #[arg(short = 'e', long, value_delimiter = ',')]
    exclude_sources: Vec<String>,

    /// Use every available source
    #[arg(long)]
    all: bool,

    /// Only sources whose results are safe for recursive discovery
    #[arg(long)]
    recursive: bool,

    /// Output file (appended to)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for one output file per domain
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON lines output
    #[arg(short, long)]
    json: bool,

    /// Include every source a host was seen in
    #[arg(long)]
    collect_sources: bool,

    /// Drop wildcard DNS artifacts and unresolvable hosts
    #[arg(long)]
    remove_wildcard: bool,

    /// Host callback observes verified hosts instead of every discovered host
    #[arg(long)]
    verified_callback: bool,

    /// DNS resolution workers
    #[arg(short, long)]
    threads: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum enumeration time per domain in minutes
    #[arg(long)]
    max_time: Option<u64>,

    /// Requests per second across all sources (0 = unlimited)
    #[arg(long)]
    rate_limit: Option<u32>,

    /// HTTP or SOCKS5 proxy
    #[arg(long, env = "LONKERO_PROXY")]
    proxy: Option<String>,

    /// Upstream DNS resolvers (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    resolvers: Vec<String>,

    /// Drop hosts matching these regexes
    #[arg(short, long, value_delimiter = ',')]
    filter: Vec<String>,

    /// Keep only hosts matching these regexes
    #[arg(short, long = "match", value_delimiter = ',')]
    match_patterns: Vec<String>,

    /// Print per-source statistics
    #[arg(long)]
    stats: bool,

    /// API keys file (YAML, TOML or JSON)
    #[arg(long, env = "LONKERO_PROVIDER_CONFIG")]
    provider_config: Option<PathBuf>,

    /// Options file (YAML, TOML or JSON); flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List available sources and exit
    #[arg(long)]
    list_sources: bool,

    /// Show every host as sources report it
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Only print results
    #[arg(long)]
    silent: bool,

    /// Disable colored log output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    /// Options file (if any) with command line values layered on top
    fn into_options(self) -> Result<RunnerOptions> {
        let mut options = match &self.config {
            Some(path) => ConfigLoader::new(path)?
                .load_options()
                .with_context(|| format!("Failed to load options from {:?}", path))?,
            None => RunnerOptions::default(),
        };

        if !self.domains.is_empty() {
            options.domains = self.domains;
        }
        if self.domains_file.is_some() {
            options.domains_file = self.domains_file;
        }
        options.stdin |= self.stdin;
        if !self.sources.is_empty() {
            options.sources = self.sources;
        }
        if !self.exclude_sources.is_empty() {
            options.exclude_sources = self.exclude_sources;
        }
        options.all_sources |= self.all;
        options.recursive_only |= self.recursive;
        if self.output.is_some() {
            options.output_file = self.output;
        }
        if self.output_dir.is_some() {
            options.output_directory = self.output_dir;
        }
        options.json |= self.json;
        options.capture_sources |= self.collect_sources;
        options.remove_wildcard |= self.remove_wildcard;
        if self.verified_callback {
            options.callback_mode = CallbackMode::Verified;
        }
        if let Some(threads) = self.threads {
            options.threads = threads;
        }
        if let Some(timeout) = self.timeout {
            options.timeout_secs = timeout;
        }
        if let Some(max_time) = self.max_time {
            options.max_enumeration_minutes = max_time;
        }
        if let Some(rate_limit) = self.rate_limit {
            options.rate_limit = rate_limit;
        }
        if self.proxy.is_some() {
            options.proxy = self.proxy;
        }
        if !self.resolvers.is_empty() {
            options.resolvers = self.resolvers;
        }
        if !self.filter.is_empty() {
            options.filter = self.filter;
        }
        if !self.match_patterns.is_empty() {
            options.match_patterns = self.match_patterns;
        }
        options.statistics |= self.stats;
        if self.provider_config.is_some() {
            options.provider_config = self.provider_config;
        }
        options.verbose |= self.verbose || self.debug;
        options.silent |= self.silent;
        options.no_color |= self.no_color;

        Ok(options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug || cli.verbose {
        Level::DEBUG
    } else if cli.silent {
        Level::ERROR
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    if !cli.silent {
        print_banner(cli.no_color);
    }

    // Create async runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("lonkero-recon")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let registry = SourceRegistry::with_builtin_sources();

    if cli.list_sources {
        list_sources(&registry);
        return Ok(());
    }

    let options = cli.into_options()?;
    let runner = Runner::new(options, &registry)?;
    info!(
        "Loaded {} source(s): {}",
        runner.agent().source_names().len(),
        runner.agent().source_names().join(", ")
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping enumeration");
                cancel.cancel();
            }
        }
    });

    runner.run_enumeration(&cancel).await?;
    Ok(())
}

fn list_sources(registry: &SourceRegistry) {
    println!("Current list of available sources. [{}]", registry.len());
    println!(
        "Sources marked with an * need an API key (set {} or use --provider-config).",
        api_key_env_var("<source>")
    );
    println!();

    for name in registry.names() {
        let Some(source) = registry.get(name) else {
            continue;
        };
        let mut flags = Vec::new();
        if source.is_default() {
            flags.push("default");
        }
        if source.has_recursive_support() {
            flags.push("recursive");
        }

        let marker = if source.needs_key() { " *" } else { "" };
        if flags.is_empty() {
            println!("{}{}", name, marker);
        } else {
            println!("{}{} ({})", name, marker, flags.join(", "));
        }
    }
}

fn print_banner(no_color: bool) {
    let (green, bold, reset) = if no_color {
        ("", "", "")
    } else {
        ("\x1b[92m", "\x1b[1m\x1b[97m", "\x1b[0m")
    };

    eprint!("{}", green);
    eprintln!("   __                __                                      ");
    eprintln!("  / /   ____  ____  / /_____  _________     ________  _________  ____ ");
    eprintln!(" / /   / __ \\/ __ \\/ //_/ _ \\/ ___/ __ \\   / ___/ _ \\/ ___/ __ \\/ __ \\");
    eprintln!("/ /___/ /_/ / / / / ,< /  __/ /  / /_/ /  / /  /  __/ /__/ /_/ / / / /");
    eprintln!("/_____/\\____/_/ /_/_/|_|\\___/_/   \\____/  /_/   \\___/\\___/\\____/_/ /_/ ");
    eprint!("{}", reset);
    eprintln!();
    eprint!("{}", bold);
    eprintln!("    Passive host discovery v{}", env!("CARGO_PKG_VERSION"));
    eprint!("{}", reset);
    eprintln!();
}
