//! File-to-file driver: read hosts, aggregate, write patterns, validate.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::aggregate::{aggregate, AggregateOptions};
use crate::error::{HostsError, Result};
use crate::group::IpGroups;
use crate::matcher::SuffixMode;
use crate::parser::parse_hosts_file;
use crate::pattern::PatternSet;
use crate::validate::{validate, ValidationReport};

/// Default hosts file read by `convert`
pub const DEFAULT_INPUT: &str = "hosts.txt";

/// Extension appended to the input path to name the pattern file
pub const PATTERN_EXTENSION: &str = "vhosts";

/// Conversion options.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Hosts file to read
    pub input: PathBuf,
    /// Pattern file to write; `<input>.vhosts` when unset
    pub output: Option<PathBuf>,
    /// How shared suffixes are detected
    pub suffix_mode: SuffixMode,
    /// Re-read the written file and validate it against the input
    pub validate: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: None,
            suffix_mode: SuffixMode::default(),
            validate: true,
        }
    }
}

impl ConvertOptions {
    /// Create new conversion options for a hosts file.
    pub fn new(input: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Set the pattern file path.
    pub fn with_output(mut self, output: impl AsRef<Path>) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    /// Set the suffix comparison mode.
    pub fn with_suffix_mode(mut self, mode: SuffixMode) -> Self {
        self.suffix_mode = mode;
        self
    }

    /// Enable or disable validation after writing.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Pattern file path, explicit or derived from the input
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let mut name = self.input.clone().into_os_string();
                name.push(".");
                name.push(PATTERN_EXTENSION);
                PathBuf::from(name)
            }
        }
    }
}

/// What a conversion run read, produced and verified
#[derive(Debug, Clone, Serialize)]
pub struct ConvertSummary {
    pub output: PathBuf,
    /// Valid records read, duplicates included
    pub records: usize,
    /// Malformed lines skipped
    pub skipped: usize,
    /// Records dropped because their domain was already seen
    pub duplicates: usize,
    pub groups: usize,
    pub patterns: usize,
    /// Present when validation ran
    pub validation: Option<ValidationReport>,
}

/// Aggregate a hosts file into a pattern file, then validate the written file.
pub fn convert(options: &ConvertOptions) -> Result<ConvertSummary> {
    let output = options.output_path();
    if output == options.input {
        return Err(HostsError::ConfigError(format!(
            "output would overwrite input: {}",
            output.display()
        )));
    }

    let parsed = parse_hosts_file(&options.input)?;
    let records = parsed.records.len();
    let groups = IpGroups::from_records(parsed.records);

    let aggregate_options = AggregateOptions::new().with_suffix_mode(options.suffix_mode);
    let patterns = aggregate(groups.groups(), &aggregate_options);
    patterns.save(&output)?;
    info!(
        input = %options.input.display(),
        output = %output.display(),
        groups = groups.len(),
        patterns = patterns.len(),
        "hosts converted"
    );

    let validation = if options.validate {
        let written = PatternSet::load(&output)?;
        Some(validate(groups.records(), &written))
    } else {
        None
    };

    Ok(ConvertSummary {
        output,
        records,
        skipped: parsed.skipped,
        duplicates: groups.duplicates(),
        groups: groups.len(),
        patterns: patterns.len(),
        validation,
    })
}

/// Validate an existing pattern file against a hosts file
pub fn validate_files(
    hosts: impl AsRef<Path>,
    patterns: impl AsRef<Path>,
) -> Result<ValidationReport> {
    let parsed = parse_hosts_file(hosts)?;
    let groups = IpGroups::from_records(parsed.records);
    let patterns = PatternSet::load(patterns)?;
    Ok(validate(groups.records(), &patterns))
}
