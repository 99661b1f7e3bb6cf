//! Replays host records against a pattern set.

use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::{info, warn};

use crate::pattern::PatternSet;
use crate::types::HostRecord;

/// A record the pattern set does not reproduce
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// No pattern matches the domain
    NotFound { domain: String },
    /// The matching pattern resolves to another IP
    Mismatch {
        domain: String,
        expected: Ipv4Addr,
        actual: Ipv4Addr,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::NotFound { domain } => write!(f, "{} not found", domain),
            Finding::Mismatch {
                domain,
                expected,
                actual,
            } => write!(f, "{} {} {}", domain, expected, actual),
        }
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Records resolved to their recorded IP
    pub matched: usize,
    /// Records checked
    pub total: usize,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// True when every record resolved to its recorded IP
    pub fn is_complete(&self) -> bool {
        self.matched == self.total
    }

    pub fn not_found(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::NotFound { .. }))
            .count()
    }

    pub fn mismatches(&self) -> usize {
        self.findings.len() - self.not_found()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in &self.findings {
            writeln!(f, "{}", finding)?;
        }
        write!(f, "{} {}", self.matched, self.total)
    }
}

/// Look up every record's domain and compare the result with its recorded IP.
///
/// `records` should already be deduplicated (see [`crate::IpGroups::records`]).
pub fn validate<'a>(
    records: impl IntoIterator<Item = &'a HostRecord>,
    patterns: &PatternSet,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for record in records {
        report.total += 1;
        match patterns.lookup(&record.domain) {
            None => {
                warn!(domain = %record.domain, "domain not found");
                report.findings.push(Finding::NotFound {
                    domain: record.domain.clone(),
                });
            }
            Some(actual) if actual != record.ip => {
                warn!(domain = %record.domain, expected = %record.ip, %actual, "ip mismatch");
                report.findings.push(Finding::Mismatch {
                    domain: record.domain.clone(),
                    expected: record.ip,
                    actual,
                });
            }
            Some(_) => report.matched += 1,
        }
    }

    info!(
        matched = report.matched,
        total = report.total,
        findings = report.findings.len(),
        "validation finished"
    );
    report
}
