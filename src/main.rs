//! hosts-wildcard command line.
//!
//! ```bash
//! hosts-wildcard convert hosts.txt            # writes hosts.txt.vhosts and validates it
//! hosts-wildcard validate hosts.txt hosts.txt.vhosts
//! hosts-wildcard lookup hosts.txt.vhosts www.example.com
//! ```

use std::process::ExitCode;

use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use hosts_wildcard::{
    convert, normalize_domain, validate_files, ConvertOptions, HostsError, PatternSet, SuffixMode,
};

mod cli;

use crate::cli::{get_args, Args, Commands, OutputFormat};

fn main() -> ExitCode {
    let args = get_args();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // RUST_LOG, when set, takes precedence over -v
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), HostsError> {
    match args.command {
        Commands::Convert {
            input,
            output,
            substring_match,
            no_validate,
        } => {
            let mut options = ConvertOptions::new(input).with_validation(!no_validate);
            if let Some(output) = output {
                options = options.with_output(output);
            }
            if substring_match {
                options = options.with_suffix_mode(SuffixMode::Substring);
            }

            let summary = convert(&options)?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Text => {
                    println!(
                        "{} records ({} skipped, {} duplicates) in {} groups -> {} patterns in {}",
                        summary.records,
                        summary.skipped,
                        summary.duplicates,
                        summary.groups,
                        summary.patterns,
                        summary.output.display()
                    );
                    if let Some(report) = &summary.validation {
                        println!("{}", report);
                    }
                }
            }
        }
        Commands::Validate { hosts, patterns } => {
            let report = validate_files(hosts, patterns)?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => println!("{}", report),
            }
        }
        Commands::Lookup { patterns, domains } => {
            let patterns = PatternSet::load(patterns)?;
            let mut results = Vec::with_capacity(domains.len());
            for domain in &domains {
                let domain = normalize_domain(domain);
                let entry = patterns.lookup_entry(&domain).cloned();
                results.push((domain, entry));
            }

            match args.format {
                OutputFormat::Json => {
                    let json: Vec<_> = results
                        .iter()
                        .map(|(domain, entry)| {
                            serde_json::json!({ "domain": domain, "match": entry })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                OutputFormat::Text => {
                    for (domain, entry) in &results {
                        match entry {
                            Some(e) => println!("{}\t{}\t{}", domain, e.ip, e.pattern()),
                            None => println!("{} not found", domain),
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
