//! Integration tests for the file-to-file conversion workflow.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use hosts_wildcard::{convert, validate_files, ConvertOptions, Finding, PatternSet, SuffixMode};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hosts_wildcard_{}", name));
    let _ = fs::create_dir_all(&dir);
    dir
}

fn write_file(path: &PathBuf, lines: &[&str]) {
    let mut f = fs::File::create(path).unwrap();
    for line in lines {
        writeln!(f, "{}", line).unwrap();
    }
}

const HOSTS: &[&str] = &[
    "# test hosts",
    "203.0.113.10  www.example.com",
    "203.0.113.10  img.example.com",
    "203.0.113.10  api.example.com",
    "203.0.113.20  example.org",
    "203.0.113.20  www.example.org",
    "198.51.100.1  solo.example.net",
    "203.0.113.99  www.example.com",
    "fe80::1       v6.example.com",
    "garbage line",
];

#[test]
fn test_convert_writes_and_validates() {
    let dir = scratch_dir("convert");
    let input = dir.join("hosts.txt");
    write_file(&input, HOSTS);

    let summary = convert(&ConvertOptions::new(&input)).unwrap();
    assert_eq!(summary.output, dir.join("hosts.txt.vhosts"));
    assert_eq!(summary.records, 7);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.groups, 3);
    assert_eq!(summary.patterns, 3);

    let report = summary.validation.expect("validation ran");
    assert_eq!(report.total, 6);
    assert!(report.is_complete());

    let text = fs::read_to_string(&summary.output).unwrap();
    assert_eq!(
        text,
        "203.0.113.10\t.example.com\n203.0.113.20\t.example.org\n198.51.100.1\tsolo.example.net\n"
    );

    let _ = fs::remove_file(&input);
    let _ = fs::remove_file(&summary.output);
    let _ = fs::remove_dir(&dir);
}

#[test]
fn test_convert_without_validation() {
    let dir = scratch_dir("no_validate");
    let input = dir.join("hosts.txt");
    let output = dir.join("custom.out");
    write_file(&input, HOSTS);

    let options = ConvertOptions::new(&input)
        .with_output(&output)
        .with_validation(false)
        .with_suffix_mode(SuffixMode::Substring);
    let summary = convert(&options).unwrap();
    assert!(summary.validation.is_none());
    assert!(!PatternSet::load(&output).unwrap().is_empty());

    let _ = fs::remove_file(&input);
    let _ = fs::remove_file(&output);
    let _ = fs::remove_dir(&dir);
}

#[test]
fn test_substring_mode_loses_partial_label_match() {
    let dir = scratch_dir("substring");
    let input = dir.join("hosts.txt");
    let literal = dir.join("literal.vhosts");
    let bounded = dir.join("bounded.vhosts");
    write_file(&input, &["1.1.1.1 x.ab.com", "1.1.1.1 b.cab.com"]);

    // "ab.com" occurs inside "cab.com", so the literal comparator widens to .ab.com
    let options = ConvertOptions::new(&input)
        .with_output(&literal)
        .with_suffix_mode(SuffixMode::Substring);
    let report = convert(&options).unwrap().validation.expect("validation ran");
    assert_eq!(report.total, 2);
    assert_eq!(report.matched, 1);
    assert_eq!(
        report.findings,
        vec![Finding::NotFound {
            domain: "b.cab.com".into()
        }]
    );
    assert_eq!(fs::read_to_string(&literal).unwrap(), "1.1.1.1\t.ab.com\n");

    let options = ConvertOptions::new(&input).with_output(&bounded);
    let report = convert(&options).unwrap().validation.expect("validation ran");
    assert!(report.is_complete());

    let _ = fs::remove_file(&input);
    let _ = fs::remove_file(&literal);
    let _ = fs::remove_file(&bounded);
    let _ = fs::remove_dir(&dir);
}

#[test]
fn test_validate_files_reports_findings() {
    let dir = scratch_dir("validate");
    let hosts = dir.join("hosts.txt");
    let patterns = dir.join("hosts.txt.vhosts");
    write_file(
        &hosts,
        &[
            "1.1.1.1 a.example.com",
            "1.1.1.1 b.example.com",
            "2.2.2.2 c.example.com",
            "3.3.3.3 missing.org",
        ],
    );
    write_file(&patterns, &["1.1.1.1\t.example.com"]);

    let report = validate_files(&hosts, &patterns).unwrap();
    assert_eq!(report.total, 4);
    assert_eq!(report.matched, 2);
    assert_eq!(report.mismatches(), 1);
    assert_eq!(report.not_found(), 1);
    assert!(report.findings.contains(&Finding::Mismatch {
        domain: "c.example.com".into(),
        expected: "2.2.2.2".parse().unwrap(),
        actual: "1.1.1.1".parse().unwrap(),
    }));

    let _ = fs::remove_file(&hosts);
    let _ = fs::remove_file(&patterns);
    let _ = fs::remove_dir(&dir);
}

#[test]
fn test_validate_files_rejects_malformed_pattern_file() {
    let dir = scratch_dir("malformed");
    let hosts = dir.join("hosts.txt");
    let patterns = dir.join("bad.vhosts");
    write_file(&hosts, &["1.1.1.1 a.example.com"]);
    write_file(&patterns, &["1.1.1.1 .example.com"]);

    assert!(validate_files(&hosts, &patterns).is_err());

    let _ = fs::remove_file(&hosts);
    let _ = fs::remove_file(&patterns);
    let _ = fs::remove_dir(&dir);
}
