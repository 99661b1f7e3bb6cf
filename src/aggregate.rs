//! Suffix aggregation.
//!
//! Each IP group is compacted into as few patterns as possible by walking its
//! domains in reversed-character order and widening a running candidate to
//! the suffix it shares with the next domain. Widening stops when the shared
//! suffix would collide with another IP:
//!
//! - an earlier group already bound that suffix, or one of its ancestors, to
//!   a different IP,
//! - a domain of a different IP sits at or below that suffix, or
//! - a domain of a different IP is an ancestor of that suffix.
//!
//! Groups are processed largest first, ties in discovery order, so that broad
//! suffixes go to the IPs with the most domains.

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::net::Ipv4Addr;

use tracing::{debug, info, warn};

use crate::group::IpGroup;
use crate::matcher::{common_suffix, suffixes, SuffixMode};
use crate::pattern::PatternSet;
use crate::types::{PatternEntry, PatternKind};

/// Aggregation options.
#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    /// How shared suffixes are detected
    pub suffix_mode: SuffixMode,
}

impl AggregateOptions {
    /// Create new aggregation options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the suffix comparison mode.
    pub fn with_suffix_mode(mut self, mode: SuffixMode) -> Self {
        self.suffix_mode = mode;
        self
    }
}

/// Compact IP groups into a pattern set.
pub fn aggregate(groups: &[IpGroup], options: &AggregateOptions) -> PatternSet {
    let owners = SuffixOwners::build(groups);
    let mut patterns = PatternSet::new();

    for group in processing_order(groups) {
        compact_group(group, &owners, &mut patterns, options.suffix_mode);
    }

    let domains: usize = groups.iter().map(IpGroup::len).sum();
    info!(
        groups = groups.len(),
        domains,
        patterns = patterns.len(),
        "aggregation finished"
    );
    patterns
}

/// Largest group first; the sort is stable so equal sizes keep discovery order.
fn processing_order(groups: &[IpGroup]) -> Vec<&IpGroup> {
    let mut ordered: Vec<&IpGroup> = groups.iter().collect();
    ordered.sort_by_key(|g| Reverse(g.len()));
    ordered
}

/// A group member: a plain domain or a `.domain` wildcard seed
#[derive(Debug, Clone, Copy)]
struct Seed<'a> {
    name: &'a str,
    wildcard: bool,
}

impl<'a> Seed<'a> {
    fn parse(domain: &'a str) -> Self {
        match domain.strip_prefix('.') {
            Some(name) => Self {
                name,
                wildcard: true,
            },
            None => Self {
                name: domain,
                wildcard: false,
            },
        }
    }
}

fn reversed_order(a: &Seed<'_>, b: &Seed<'_>) -> Ordering {
    a.name.bytes().rev().cmp(b.name.bytes().rev())
}

fn compact_group(
    group: &IpGroup,
    owners: &SuffixOwners<'_>,
    patterns: &mut PatternSet,
    mode: SuffixMode,
) {
    let mut seeds: Vec<Seed<'_>> = group
        .domains
        .iter()
        .map(|d| Seed::parse(d))
        .filter(|s| !s.name.is_empty())
        .collect();
    seeds.sort_by(reversed_order);

    let Some(first) = seeds.first() else {
        return;
    };
    let mut candidate: &str = first.name;

    for pair in seeds.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        match common_suffix(candidate, next.name, mode) {
            Some(shared) if !conflicts(shared, group.ip, owners, patterns) => {
                candidate = shared;
            }
            Some(shared) => {
                debug!(ip = %group.ip, suffix = shared, "shared suffix collides with another ip");
                commit(patterns, candidate, prev, group.ip);
                candidate = next.name;
            }
            None => {
                commit(patterns, candidate, prev, group.ip);
                candidate = next.name;
            }
        }
    }

    if let Some(last) = seeds.last() {
        commit(patterns, candidate, last, group.ip);
    }
}

/// Commit the candidate closing a run. It stays exact only when it was never
/// widened past the run's last domain.
fn commit(patterns: &mut PatternSet, candidate: &str, closing: &Seed<'_>, ip: Ipv4Addr) {
    let kind = if candidate == closing.name && !closing.wildcard {
        PatternKind::Exact
    } else {
        PatternKind::Wildcard
    };
    let entry = PatternEntry {
        domain: candidate.to_string(),
        kind,
        ip,
    };
    debug!(%ip, pattern = %entry.pattern(), "pattern committed");

    if let Some(existing) = patterns.insert(entry) {
        if existing != ip {
            warn!(%ip, %existing, pattern = candidate, "pattern already bound to another ip");
        }
    }
}

fn conflicts(
    shared: &str,
    ip: Ipv4Addr,
    owners: &SuffixOwners<'_>,
    patterns: &PatternSet,
) -> bool {
    let bound_above = suffixes(shared).any(|s| patterns.bindings_at(s).any(|e| e.ip != ip));
    bound_above || owners.claimed_by_other(shared, ip) || owners.other_domain_above(shared, ip)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    One(Ipv4Addr),
    Many,
}

/// For every dot-bounded suffix present in the data set, which IPs own a
/// domain at or below it, plus the owners of the domains themselves.
#[derive(Debug, Default)]
struct SuffixOwners<'a> {
    owners: HashMap<&'a str, Owner>,
    domains: HashMap<&'a str, Owner>,
}

fn claim<'a>(map: &mut HashMap<&'a str, Owner>, key: &'a str, ip: Ipv4Addr) {
    map.entry(key)
        .and_modify(|owner| {
            if *owner != Owner::One(ip) {
                *owner = Owner::Many;
            }
        })
        .or_insert(Owner::One(ip));
}

fn held_by_other(owner: Option<&Owner>, ip: Ipv4Addr) -> bool {
    match owner {
        None => false,
        Some(Owner::One(owner)) => *owner != ip,
        Some(Owner::Many) => true,
    }
}

impl<'a> SuffixOwners<'a> {
    fn build(groups: &'a [IpGroup]) -> Self {
        let mut owners = HashMap::new();
        let mut domains = HashMap::new();
        for group in groups {
            for domain in &group.domains {
                let name = Seed::parse(domain).name;
                claim(&mut domains, name, group.ip);
                for suffix in suffixes(name) {
                    claim(&mut owners, suffix, group.ip);
                }
            }
        }
        Self { owners, domains }
    }

    /// True when a domain of some other IP is `suffix` or lies below it
    fn claimed_by_other(&self, suffix: &str, ip: Ipv4Addr) -> bool {
        held_by_other(self.owners.get(suffix), ip)
    }

    /// True when a domain of some other IP is a strict ancestor of `suffix`
    fn other_domain_above(&self, suffix: &str, ip: Ipv4Addr) -> bool {
        suffixes(suffix)
            .skip(1)
            .any(|parent| held_by_other(self.domains.get(parent), ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(a: u8) -> Ipv4Addr {
        Ipv4Addr::new(a, a, a, a)
    }

    fn group(a: u8, domains: &[&str]) -> IpGroup {
        IpGroup::new(ip(a), domains.iter().map(|d| d.to_string()).collect())
    }

    fn patterns_of(set: &PatternSet) -> Vec<String> {
        set.iter().map(|e| e.to_string()).collect()
    }

    fn run(groups: &[IpGroup]) -> PatternSet {
        aggregate(groups, &AggregateOptions::new())
    }

    #[test]
    fn test_siblings_become_wildcard() {
        let set = run(&[group(1, &["a.example.com", "b.example.com"])]);
        assert_eq!(patterns_of(&set), vec!["1.1.1.1\t.example.com"]);
    }

    #[test]
    fn test_single_domain_is_exact() {
        let set = run(&[group(1, &["www.example.com"])]);
        assert_eq!(patterns_of(&set), vec!["1.1.1.1\twww.example.com"]);
    }

    #[test]
    fn test_parent_and_child_become_wildcard() {
        let set = run(&[group(1, &["www.example.com", "example.com"])]);
        assert_eq!(patterns_of(&set), vec!["1.1.1.1\t.example.com"]);
    }

    #[test]
    fn test_unrelated_domains_stay_exact() {
        let set = run(&[group(1, &["a.com", "b.org"])]);
        // reversed order puts "gro.b" before "moc.a"
        assert_eq!(patterns_of(&set), vec!["1.1.1.1\tb.org", "1.1.1.1\ta.com"]);
    }

    #[test]
    fn test_runs_split_by_tld() {
        let set = run(&[group(
            1,
            &["a.example.com", "b.example.com", "x.example.org", "y.example.org"],
        )]);
        assert_eq!(
            patterns_of(&set),
            vec!["1.1.1.1\t.example.org", "1.1.1.1\t.example.com"]
        );
    }

    #[test]
    fn test_bound_ancestor_forces_exact() {
        // example.com belongs to 2.2.2.2, so 1.1.1.1 may not claim .example.com
        let set = run(&[
            group(1, &["a.example.com", "b.example.com"]),
            group(2, &["example.com"]),
        ]);
        for d in ["a.example.com", "b.example.com"] {
            assert_eq!(set.lookup(d), Some(ip(1)), "{d}");
        }
        assert_eq!(set.lookup("example.com"), Some(ip(2)));
        assert!(set.iter().all(|e| e.kind == PatternKind::Exact));
    }

    #[test]
    fn test_smaller_group_cannot_widen_over_bigger() {
        let set = run(&[
            group(2, &["x.example.com", "y.example.com"]),
            group(1, &["a.example.com", "b.example.com", "c.example.com"]),
        ]);
        for d in ["a.example.com", "b.example.com", "c.example.com"] {
            assert_eq!(set.lookup(d), Some(ip(1)), "{d}");
        }
        for d in ["x.example.com", "y.example.com"] {
            assert_eq!(set.lookup(d), Some(ip(2)), "{d}");
        }
        assert!(set
            .iter()
            .all(|e| !(e.kind == PatternKind::Wildcard && e.domain == "example.com")));
    }

    #[test]
    fn test_wider_suffix_kept_below_conflict() {
        let set = run(&[
            group(1, &["a.cdn.example.com", "b.cdn.example.com", "www.example.com"]),
            group(2, &["mail.example.com"]),
        ]);
        assert_eq!(set.lookup("a.cdn.example.com"), Some(ip(1)));
        assert_eq!(set.lookup("b.cdn.example.com"), Some(ip(1)));
        assert_eq!(set.lookup("www.example.com"), Some(ip(1)));
        assert_eq!(set.lookup("mail.example.com"), Some(ip(2)));
        assert!(set
            .iter()
            .any(|e| e.kind == PatternKind::Wildcard && e.domain == "cdn.example.com"));
    }

    #[test]
    fn test_processing_order_is_size_then_discovery() {
        let groups = [
            group(1, &["a.com"]),
            group(2, &["b.com", "c.com"]),
            group(3, &["d.com"]),
        ];
        let order: Vec<Ipv4Addr> = processing_order(&groups).iter().map(|g| g.ip).collect();
        assert_eq!(order, vec![ip(2), ip(1), ip(3)]);
    }

    #[test]
    fn test_wildcard_seed_stays_wildcard() {
        let set = run(&[group(1, &[".example.com"])]);
        assert_eq!(patterns_of(&set), vec!["1.1.1.1\t.example.com"]);
    }

    #[test]
    fn test_empty_group() {
        let set = run(&[group(1, &[])]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let groups = [
            group(1, &["a.x.com", "b.x.com", "c.y.com"]),
            group(2, &["d.x.com", "e.z.com", "f.z.com"]),
            group(3, &["y.com"]),
        ];
        assert_eq!(run(&groups), run(&groups));
    }

    #[test]
    fn test_suffix_owners() {
        let groups = [group(1, &["a.example.com"]), group(2, &["b.example.com"])];
        let owners = SuffixOwners::build(&groups);
        assert!(owners.claimed_by_other("example.com", ip(1)));
        assert!(owners.claimed_by_other("b.example.com", ip(1)));
        assert!(!owners.claimed_by_other("a.example.com", ip(1)));
        assert!(!owners.claimed_by_other("example.org", ip(1)));
    }

    #[test]
    fn test_other_domain_above() {
        let groups = [group(1, &["a.cdn.example.com"]), group(2, &["example.com"])];
        let owners = SuffixOwners::build(&groups);
        assert!(owners.other_domain_above("cdn.example.com", ip(1)));
        assert!(!owners.other_domain_above("cdn.example.com", ip(2)));
        // the suffix itself is not its own ancestor
        assert!(!owners.other_domain_above("example.com", ip(1)));
    }

    #[test]
    fn test_other_ip_ancestor_blocks_widening() {
        // 2.2.2.2 is processed after 1.1.1.1, yet example.com still blocks .cdn.example.com
        let set = run(&[
            group(1, &["a.cdn.example.com", "b.cdn.example.com"]),
            group(2, &["example.com"]),
        ]);
        assert_eq!(
            patterns_of(&set),
            vec![
                "1.1.1.1\ta.cdn.example.com",
                "1.1.1.1\tb.cdn.example.com",
                "2.2.2.2\texample.com",
            ]
        );
    }

    #[test]
    fn test_same_ip_ancestor_allows_widening() {
        let set = run(&[group(
            1,
            &["a.cdn.example.com", "b.cdn.example.com", "example.com"],
        )]);
        assert_eq!(patterns_of(&set), vec!["1.1.1.1\t.example.com"]);
    }

    #[test]
    fn test_single_label_parent_stays_exact() {
        // a one-label parent is never a shared suffix, so no .localhost wildcard
        let set = run(&[group(1, &["localhost", "x.localhost"])]);
        assert_eq!(
            patterns_of(&set),
            vec!["1.1.1.1\tlocalhost", "1.1.1.1\tx.localhost"]
        );
        assert_eq!(set.lookup("y.localhost"), None);
    }

    #[test]
    fn test_substring_mode_is_literal() {
        let options = AggregateOptions::new().with_suffix_mode(SuffixMode::Substring);
        // "ab.com" is not a label-boundary suffix of "b.cab.com"
        let groups = [group(1, &["x.ab.com", "b.cab.com"])];
        let literal = aggregate(&groups, &options);
        let bounded = run(&groups);
        assert!(literal.iter().any(|e| e.domain == "ab.com"));
        assert!(bounded.iter().all(|e| e.kind == PatternKind::Exact));
    }
}
