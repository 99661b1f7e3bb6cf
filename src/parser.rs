use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{HostsError, Result};
use crate::types::HostRecord;

/// Field separator for hosts lines: any run of whitespace
static FIELD_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("FIELD_SEPARATOR: hardcoded regex is invalid"));

/// Records read from a hosts file, in input order
#[derive(Debug, Clone, Default)]
pub struct ParsedHosts {
    /// Valid `ip domain` records, duplicates included
    pub records: Vec<HostRecord>,
    /// Lines that were not a valid IPv4 followed by a domain
    pub skipped: usize,
    /// Blank and `#` comment lines
    pub comments: usize,
}

/// Parse hosts file text.
///
/// Each line is an IPv4 address and a domain separated by whitespace; further
/// fields are ignored. Anything else is skipped and counted.
pub fn parse_hosts(text: &str) -> ParsedHosts {
    let mut parsed = ParsedHosts::default();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            parsed.comments += 1;
            continue;
        }

        match parse_host_line(line) {
            Some(record) => parsed.records.push(record),
            None => {
                debug!(line = line_num + 1, content = line, "skipping malformed hosts line");
                parsed.skipped += 1;
            }
        }
    }

    if parsed.skipped > 0 {
        info!(skipped = parsed.skipped, "hosts lines skipped");
    }
    parsed
}

/// Parse a hosts file from disk
pub fn parse_hosts_file(path: impl AsRef<Path>) -> Result<ParsedHosts> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| HostsError::FileError {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_hosts(&text);
    info!(
        path = %path.display(),
        records = parsed.records.len(),
        skipped = parsed.skipped,
        "hosts file read"
    );
    Ok(parsed)
}

fn parse_host_line(line: &str) -> Option<HostRecord> {
    let mut fields = FIELD_SEPARATOR.split(line);
    let ip: Ipv4Addr = fields.next()?.parse().ok()?;
    let domain = fields.next()?;
    if domain.starts_with('#') {
        return None;
    }

    let record = HostRecord::new(ip, domain);
    if record.domain.is_empty() {
        return None;
    }
    Some(record)
}
