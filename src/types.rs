use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;

/// One `ip domain` association read from a hosts file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HostRecord {
    /// Resolved IPv4 address
    pub ip: Ipv4Addr,
    /// Hostname, lowercased with any trailing root dot removed
    pub domain: String,
}

impl HostRecord {
    /// Create a new record, normalizing the domain
    pub fn new(ip: Ipv4Addr, domain: impl Into<String>) -> Self {
        Self {
            ip,
            domain: normalize_domain(&domain.into()),
        }
    }
}

/// Pattern matching mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// "example.com" matches only "example.com"
    Exact,
    /// ".example.com" matches "example.com" and every subdomain of it
    Wildcard,
}

/// A domain pattern bound to one IP
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PatternEntry {
    /// Pattern domain without the leading wildcard dot
    pub domain: String,
    pub kind: PatternKind,
    pub ip: Ipv4Addr,
}

impl PatternEntry {
    pub fn exact(domain: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            domain: domain.into(),
            kind: PatternKind::Exact,
            ip,
        }
    }

    pub fn wildcard(domain: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            domain: domain.into(),
            kind: PatternKind::Wildcard,
            ip,
        }
    }

    /// Text form used in pattern files: bare for exact, dot-prefixed for wildcard
    pub fn pattern(&self) -> String {
        match self.kind {
            PatternKind::Exact => self.domain.clone(),
            PatternKind::Wildcard => format!(".{}", self.domain),
        }
    }
}

impl fmt::Display for PatternEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.ip, self.pattern())
    }
}

/// ASCII-lowercase a domain and strip a trailing root dot
pub fn normalize_domain(domain: &str) -> String {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    domain.to_ascii_lowercase()
}
