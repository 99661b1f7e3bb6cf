use std::{fs::metadata, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

#[derive(Parser, Debug)]
#[command(name = "hosts-wildcard", author, version, about, long_about = None)]
pub struct Args {
    /// log level, -v info, -vv debug, -vvv trace; RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compact a hosts file into a wildcard pattern file, then validate it
    Convert {
        /// Hosts file with one `ip domain` record per line
        #[arg(
            env = "HOSTS_WILDCARD_INPUT",
            default_value = "hosts.txt",
            value_hint = ValueHint::FilePath
        )]
        input: PathBuf,

        /// Pattern file to write, defaults to <INPUT>.vhosts
        #[arg(short, long, env = "HOSTS_WILDCARD_OUTPUT", value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Match shared suffixes as plain substrings instead of on label boundaries
        #[arg(long)]
        substring_match: bool,

        /// Skip validation of the written pattern file
        #[arg(long)]
        no_validate: bool,
    },
    /// Check that a pattern file reproduces every record of a hosts file
    Validate {
        #[arg(value_hint = ValueHint::FilePath, value_parser = validate_readable_file)]
        hosts: PathBuf,

        #[arg(value_hint = ValueHint::FilePath, value_parser = validate_readable_file)]
        patterns: PathBuf,
    },
    /// Resolve domains against a pattern file
    Lookup {
        #[arg(value_hint = ValueHint::FilePath, value_parser = validate_readable_file)]
        patterns: PathBuf,

        /// Domains to resolve
        #[arg(required = true, num_args = 1..)]
        domains: Vec<String>,
    },
}

pub fn get_args() -> Args {
    Args::parse()
}

fn validate_readable_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    let meta = metadata(&path).map_err(|_| format!("'{}' does not exist", s))?;

    if !meta.is_file() {
        return Err(format!("'{}' is not a file", s));
    }

    if std::fs::File::open(&path).is_err() {
        return Err(format!("'{}' is not readable (permission denied)", s));
    }

    Ok(path)
}
