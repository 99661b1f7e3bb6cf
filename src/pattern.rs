//! Pattern set: the compacted domain-to-IP mapping.
//!
//! Patterns are written one per line as `<ip>\t<pattern>`, where a bare
//! domain is an exact pattern and a dot-prefixed domain is a wildcard that
//! matches the domain itself and every subdomain of it.

use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::net::Ipv4Addr;
use std::path::Path;

use tracing::debug;

use crate::error::{HostsError, PatternErrorKind, Result};
use crate::matcher::suffixes;
use crate::types::{normalize_domain, PatternEntry, PatternKind};

/// Compacted domain-to-IP mapping with most-specific-match lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    /// Entries in commit order
    entries: Vec<PatternEntry>,
    /// Exact domain -> index into `entries`
    exact: HashMap<String, usize>,
    /// Wildcard domain (without the leading dot) -> index into `entries`
    wildcard: HashMap<String, usize>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order they were committed or read
    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.iter()
    }

    /// Register a pattern.
    ///
    /// Returns the IP previously bound to the same pattern, if any. The first
    /// binding always wins.
    pub(crate) fn insert(&mut self, entry: PatternEntry) -> Option<Ipv4Addr> {
        let index = match entry.kind {
            PatternKind::Exact => &mut self.exact,
            PatternKind::Wildcard => &mut self.wildcard,
        };
        if let Some(&existing) = index.get(&entry.domain) {
            return Some(self.entries[existing].ip);
        }
        index.insert(entry.domain.clone(), self.entries.len());
        self.entries.push(entry);
        None
    }

    /// Patterns of either kind registered for exactly this domain
    pub fn bindings_at<'a>(&'a self, domain: &str) -> impl Iterator<Item = &'a PatternEntry> {
        let exact = self.exact.get(domain).copied();
        let wildcard = self.wildcard.get(domain).copied();
        exact
            .into_iter()
            .chain(wildcard)
            .map(move |i| &self.entries[i])
    }

    /// Find the most specific pattern matching `domain`.
    /// Assumes `domain` is already normalized.
    pub fn lookup_entry(&self, domain: &str) -> Option<&PatternEntry> {
        // Check exact match first (O(1))
        if let Some(&i) = self.exact.get(domain) {
            return Some(&self.entries[i]);
        }

        // Walk up the domain hierarchy, whole domain first
        suffixes(domain)
            .find_map(|suffix| self.wildcard.get(suffix))
            .map(|&i| &self.entries[i])
    }

    /// IP the most specific matching pattern resolves `domain` to
    pub fn lookup(&self, domain: &str) -> Option<Ipv4Addr> {
        self.lookup_entry(domain).map(|e| e.ip)
    }

    /// Write the set in pattern file format
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for entry in &self.entries {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the set to a pattern file, replacing it
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = fs::File::create(path).map_err(|source| HostsError::FileError {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(BufWriter::with_capacity(8 * 1024, file))?;
        debug!(path = %path.display(), patterns = self.len(), "pattern file written");
        Ok(())
    }

    /// Parse pattern file text
    pub fn parse(text: &str) -> Result<Self> {
        let mut set = Self::new();

        for (line_num, line) in text.lines().enumerate() {
            let line_num = line_num + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let entry = parse_pattern_line(line, line_num)?;
            let ip = entry.ip;
            let pattern = entry.pattern();
            if let Some(existing) = set.insert(entry) {
                if existing != ip {
                    return Err(HostsError::InvalidPattern {
                        kind: PatternErrorKind::Conflict,
                        message: format!(
                            "line {}: {} bound to both {} and {}",
                            line_num, pattern, existing, ip
                        ),
                    });
                }
            }
        }

        Ok(set)
    }

    /// Read a pattern file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| HostsError::FileError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }
}

fn parse_pattern_line(line: &str, line_num: usize) -> Result<PatternEntry> {
    let (ip, pattern) = line
        .split_once('\t')
        .ok_or_else(|| HostsError::ParseErrorAtLine {
            line: line_num,
            message: format!("expected <ip>\\t<pattern>, got: {}", line),
        })?;

    let ip: Ipv4Addr = ip.trim().parse().map_err(|_| HostsError::ParseErrorAtLine {
        line: line_num,
        message: format!("invalid IPv4 address: {}", ip.trim()),
    })?;

    let pattern = pattern.trim();
    let (domain, kind) = match pattern.strip_prefix('.') {
        Some(rest) => (rest, PatternKind::Wildcard),
        None => (pattern, PatternKind::Exact),
    };
    let domain = normalize_domain(domain);
    if domain.is_empty() {
        return Err(HostsError::InvalidPattern {
            kind: PatternErrorKind::EmptyDomain,
            message: format!("line {}: empty pattern domain", line_num),
        });
    }

    Ok(PatternEntry { domain, kind, ip })
}
