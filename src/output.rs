// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Output Writers
 * Plain host lists, JSON lines and host-with-sources records
 *
 * © 2026 Bountyy Oy
 */

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::errors::ReconResult;
use crate::types::{HostEntry, ResolvedHost};

/// Destination for one domain's results
pub type OutputSink = Box<dyn Write + Send>;

#[derive(Serialize)]
struct HostRecord<'a> {
    host: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip: Option<&'a str>,
}

#[derive(Serialize)]
struct SourcesRecord<'a> {
    host: &'a str,
    input: &'a str,
    sources: Vec<&'a str>,
}

/// Renders result sets as text or JSON lines
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Open `path` for writing, creating missing parent directories
    pub fn create_file(path: &Path, append: bool) -> io::Result<File> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        options.open(path)
    }

    /// Unverified hosts with their first source
    pub fn write_hosts(
        &self,
        input: &str,
        hosts: &HashMap<String, HostEntry>,
        writer: &mut dyn Write,
    ) -> ReconResult<()> {
        let mut entries: Vec<_> = hosts.values().collect();
        entries.sort_by(|a, b| a.host.cmp(&b.host));

        for entry in entries {
            self.write_record(
                writer,
                HostRecord {
                    host: &entry.host,
                    input,
                    source: Some(&entry.source),
                    ip: None,
                },
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// DNS-verified hosts
    pub fn write_resolved(
        &self,
        input: &str,
        hosts: &HashMap<String, ResolvedHost>,
        writer: &mut dyn Write,
    ) -> ReconResult<()> {
        let mut entries: Vec<_> = hosts.values().collect();
        entries.sort_by(|a, b| a.host.cmp(&b.host));

        for entry in entries {
            self.write_record(
                writer,
                HostRecord {
                    host: &entry.host,
                    input,
                    source: Some(entry.source.as_str()).filter(|s| !s.is_empty()),
                    ip: entry.ip.as_deref(),
                },
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Every host with the full set of sources that reported it
    pub fn write_hosts_with_sources(
        &self,
        input: &str,
        sources: &HashMap<String, BTreeSet<String>>,
        writer: &mut dyn Write,
    ) -> ReconResult<()> {
        let mut hosts: Vec<_> = sources.keys().collect();
        hosts.sort();

        for host in hosts {
            let names: Vec<&str> = sources[host].iter().map(String::as_str).collect();
            if self.json {
                let record = SourcesRecord { host, input, sources: names };
                serde_json::to_writer(&mut *writer, &record)?;
                writer.write_all(b"\n")?;
            } else {
                writeln!(writer, "{},[{}]", host, names.join(","))?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    fn write_record(&self, writer: &mut dyn Write, record: HostRecord<'_>) -> ReconResult<()> {
        if self.json {
            serde_json::to_writer(&mut *writer, &record)?;
            writer.write_all(b"\n")?;
        } else {
            writeln!(writer, "{}", record.host)?;
        }
        Ok(())
    }
}
