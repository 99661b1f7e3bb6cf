//! Hosts Wildcard - compacts a hosts file into wildcard domain patterns
//!
//! This library turns a flat `ip domain` list into a smaller list of
//! domain patterns and checks that the result still resolves every record:
//! - Hosts file parsing (IPv4 only, malformed lines skipped and counted)
//! - Duplicate-domain elimination, first association wins
//! - Suffix aggregation of sibling subdomains with conflict detection
//! - Most-specific-match lookup (exact before wildcard)
//! - Validation of a pattern set against the original records
//!
//! # Example
//!
//! ```rust
//! use hosts_wildcard::{aggregate, parse_hosts, validate, AggregateOptions, IpGroups};
//!
//! let hosts = "
//! 1.1.1.1  a.example.com
//! 1.1.1.1  b.example.com
//! 2.2.2.2  example.org
//! ";
//!
//! let parsed = parse_hosts(hosts);
//! let groups = IpGroups::from_records(parsed.records);
//! let patterns = aggregate(groups.groups(), &AggregateOptions::new());
//!
//! assert_eq!(patterns.lookup("c.example.com"), Some("1.1.1.1".parse().unwrap()));
//!
//! let report = validate(groups.records(), &patterns);
//! assert!(report.is_complete());
//! ```
//!
//! # Pattern File Format
//!
//! One pattern per line, IP and pattern separated by a tab:
//!
//! | Line | Matches |
//! |------|---------|
//! | `1.1.1.1\twww.example.com` | `www.example.com` only |
//! | `1.1.1.1\t.example.com` | `example.com` and every subdomain |

pub mod aggregate;
pub mod error;
pub mod group;
pub mod matcher;
pub mod parser;
pub mod pattern;
pub mod types;
pub mod validate;
pub mod workflow;

// Re-export commonly used items
pub use aggregate::{aggregate, AggregateOptions};
pub use error::{HostsError, PatternErrorKind, Result};
pub use group::{IpGroup, IpGroups};
pub use matcher::{common_suffix, SuffixMode};
pub use parser::{parse_hosts, parse_hosts_file, ParsedHosts};
pub use pattern::PatternSet;
pub use types::{normalize_domain, HostRecord, PatternEntry, PatternKind};
pub use validate::{validate, Finding, ValidationReport};
pub use workflow::{convert, validate_files, ConvertOptions, ConvertSummary};
