mod suffix;

pub use suffix::{common_suffix, is_subdomain_of, suffixes, SuffixMode, Suffixes, MIN_SHARED_LABELS};
