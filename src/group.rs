//! Grouping of deduplicated host records by IP.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use tracing::debug;

use crate::types::{HostRecord, PatternEntry};

/// Domains resolving to one IP, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpGroup {
    pub ip: Ipv4Addr,
    /// Member domains. A leading dot marks a wildcard seed.
    pub domains: Vec<String>,
}

impl IpGroup {
    pub fn new(ip: Ipv4Addr, domains: Vec<String>) -> Self {
        Self { ip, domains }
    }

    /// Singleton group holding an already compacted pattern as a seed
    pub fn from_pattern(entry: &PatternEntry) -> Self {
        Self::new(entry.ip, vec![entry.pattern()])
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// All IP groups of an input, plus the deduplicated records they came from.
///
/// A domain keeps the IP of its first occurrence; later records for the same
/// domain are discarded. Groups are kept in discovery order.
#[derive(Debug, Clone, Default)]
pub struct IpGroups {
    groups: Vec<IpGroup>,
    records: Vec<HostRecord>,
    duplicates: usize,
}

impl IpGroups {
    /// Build groups from records in input order
    pub fn from_records(records: impl IntoIterator<Item = HostRecord>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut index: HashMap<Ipv4Addr, usize> = HashMap::new();
        let mut out = Self::default();

        for record in records {
            if !seen.insert(record.domain.clone()) {
                debug!(domain = %record.domain, ip = %record.ip, "duplicate domain discarded");
                out.duplicates += 1;
                continue;
            }

            let slot = *index.entry(record.ip).or_insert_with(|| {
                out.groups.push(IpGroup::new(record.ip, Vec::new()));
                out.groups.len() - 1
            });
            out.groups[slot].domains.push(record.domain.clone());
            out.records.push(record);
        }

        out
    }

    /// Groups in discovery order
    pub fn groups(&self) -> &[IpGroup] {
        &self.groups
    }

    /// Records that survived deduplication, in input order
    pub fn records(&self) -> &[HostRecord] {
        &self.records
    }

    /// Number of records discarded as duplicate domains
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
