use thiserror::Error;

/// Classifies pattern file errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternErrorKind {
    /// Pattern domain is empty or is a bare dot
    EmptyDomain,
    /// Same pattern bound twice to different IPs
    Conflict,
}

/// Hosts wildcard error types
#[derive(Error, Debug)]
pub enum HostsError {
    #[error("Parse error at line {line}: {message}")]
    ParseErrorAtLine { line: usize, message: String },

    #[error("Invalid pattern: {message}")]
    InvalidPattern {
        kind: PatternErrorKind,
        message: String,
    },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Failed to access '{}': {source}", .path.display())]
    FileError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HostsError>;
