//! Dot-bounded suffix helpers and the common-suffix comparator used by the
//! aggregator.

/// Fewest labels a shared suffix may have to be worth a wildcard
pub const MIN_SHARED_LABELS: usize = 2;

/// How a shortened candidate suffix is tested against the other domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuffixMode {
    /// Candidate must equal the other domain or be one of its dot-bounded suffixes
    #[default]
    LabelBoundary,
    /// Candidate may occur anywhere in the other domain, even inside a label
    Substring,
}

impl SuffixMode {
    fn holds(self, candidate: &str, other: &str) -> bool {
        match self {
            SuffixMode::LabelBoundary => other == candidate || is_subdomain_of(other, candidate),
            SuffixMode::Substring => other.contains(candidate),
        }
    }

    fn is_strict_parent(self, parent: &str, child: &str) -> bool {
        match self {
            SuffixMode::LabelBoundary => {
                label_count(parent) >= MIN_SHARED_LABELS && is_subdomain_of(child, parent)
            }
            SuffixMode::Substring => child.contains(&format!(".{}", parent)),
        }
    }
}

/// Number of dot-separated labels; zero for the empty string
fn label_count(domain: &str) -> usize {
    if domain.is_empty() {
        0
    } else {
        domain.bytes().filter(|&b| b == b'.').count() + 1
    }
}

/// True when `domain` is a strict subdomain of `parent`
pub fn is_subdomain_of(domain: &str, parent: &str) -> bool {
    !parent.is_empty()
        && domain.len() > parent.len()
        && domain.ends_with(parent)
        && domain.as_bytes()[domain.len() - parent.len() - 1] == b'.'
}

/// Iterate the dot-bounded suffixes of a domain, most specific first.
///
/// `"a.b.com"` yields `"a.b.com"`, `"b.com"`, `"com"`.
pub fn suffixes(domain: &str) -> Suffixes<'_> {
    Suffixes {
        rest: (!domain.is_empty()).then_some(domain),
    }
}

/// Iterator returned by [`suffixes`]
#[derive(Debug, Clone)]
pub struct Suffixes<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for Suffixes<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let current = self.rest?;
        self.rest = current.split_once('.').map(|(_, parent)| parent);
        Some(current)
    }
}

/// Longest common dot-bounded suffix of `a` and `b` with at least
/// [`MIN_SHARED_LABELS`] labels, or `None`.
///
/// The result is always a suffix of `a`. Labels are dropped from the left of
/// `a` one at a time and the first candidate that `mode` accepts for `b` wins.
pub fn common_suffix<'a>(a: &'a str, b: &str, mode: SuffixMode) -> Option<&'a str> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a == b {
        return Some(a);
    }
    if mode.is_strict_parent(a, b) {
        return Some(a);
    }

    let mut candidate = a;
    while let Some((_, shorter)) = candidate.split_once('.') {
        if label_count(shorter) < MIN_SHARED_LABELS {
            return None;
        }
        if mode.holds(shorter, b) {
            return Some(shorter);
        }
        candidate = shorter;
    }
    None
}
