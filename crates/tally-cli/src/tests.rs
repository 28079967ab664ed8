//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands;

/// Write a CSV fixture into a temp dir, returning the guard and the path
fn write_fixture(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

const SMALL_CSV: &str = "\
date,description,category,amount
01/05/2024,Starbucks coffee,,5.00
01/06/2024,Uber ride downtown,,14.20
01/07/2024,Netflix subscription,,15.99
";

/// Two well-separated classes, enough rows for the training minimum
fn labeled_csv() -> String {
    let mut csv = String::from("date,description,category,amount\n");
    for day in 1..=12 {
        csv.push_str(&format!("01/{:02}/2024,burger shack meal,Food,12.50\n", day));
    }
    for day in 13..=24 {
        csv.push_str(&format!("01/{:02}/2024,city taxi ride,Transport,23.00\n", day));
    }
    csv
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_check() {
    let cli = Cli::try_parse_from(["tally", "check"]).unwrap();
    assert!(matches!(cli.command, Commands::Check));
    assert!(!cli.verbose);
}

#[test]
fn test_parse_classify_defaults() {
    let cli = Cli::try_parse_from(["tally", "classify", "--file", "tx.csv"]).unwrap();
    match cli.command {
        Commands::Classify {
            file,
            output,
            strategy,
            concurrency,
        } => {
            assert_eq!(file, PathBuf::from("tx.csv"));
            assert!(output.is_none());
            assert_eq!(strategy, "rule");
            assert_eq!(concurrency, 4);
        }
        _ => panic!("expected classify command"),
    }
}

#[test]
fn test_parse_classify_overrides() {
    let cli = Cli::try_parse_from([
        "tally", "classify", "-f", "tx.csv", "-o", "out.csv", "-s", "semantic", "-c", "8",
    ])
    .unwrap();
    match cli.command {
        Commands::Classify {
            output,
            strategy,
            concurrency,
            ..
        } => {
            assert_eq!(output, Some(PathBuf::from("out.csv")));
            assert_eq!(strategy, "semantic");
            assert_eq!(concurrency, 8);
        }
        _ => panic!("expected classify command"),
    }
}

#[test]
fn test_parse_verbose_global() {
    let cli = Cli::try_parse_from(["tally", "-v", "analyze", "--file", "tx.csv"]).unwrap();
    assert!(cli.verbose);
}

#[test]
fn test_parse_classify_requires_file() {
    assert!(Cli::try_parse_from(["tally", "classify"]).is_err());
}

// ========== Classify Command Tests ==========

#[tokio::test]
async fn test_cmd_classify_rule_to_file() {
    let (_dir, input) = write_fixture("tx.csv", SMALL_CSV);
    let output = input.with_file_name("out.csv");

    let result = commands::cmd_classify(&input, Some(&output), "rule", 4).await;
    assert!(result.is_ok());

    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with("date,description,category,amount"));
    assert!(contents.contains("Starbucks coffee,Food"));
    assert!(contents.contains("Uber ride downtown,Transport"));
    assert!(contents.contains("Netflix subscription,Entertainment"));
}

#[tokio::test]
async fn test_cmd_classify_stdout() {
    let (_dir, input) = write_fixture("tx.csv", SMALL_CSV);
    let result = commands::cmd_classify(&input, None, "rule", 4).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_classify_unknown_strategy() {
    let (_dir, input) = write_fixture("tx.csv", SMALL_CSV);
    let result = commands::cmd_classify(&input, None, "neural", 4).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unknown strategy"));
}

#[tokio::test]
async fn test_cmd_classify_missing_file() {
    let result = commands::cmd_classify(Path::new("/nonexistent/tx.csv"), None, "rule", 4).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Failed to open"));
}

#[tokio::test]
async fn test_cmd_classify_statistical_small_file_falls_back() {
    // Too few rows to train, so every row degrades to the rule engine
    let (_dir, input) = write_fixture("tx.csv", SMALL_CSV);
    let output = input.with_file_name("out.csv");

    let result = commands::cmd_classify(&input, Some(&output), "statistical", 4).await;
    assert!(result.is_ok());

    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.contains("Starbucks coffee,Food"));
}

#[tokio::test]
async fn test_cmd_classify_statistical_trained() {
    let (_dir, input) = write_fixture("labeled.csv", &labeled_csv());
    let output = input.with_file_name("out.csv");

    let result = commands::cmd_classify(&input, Some(&output), "statistical", 4).await;
    assert!(result.is_ok());

    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.contains("burger shack meal,Food"));
    assert!(contents.contains("city taxi ride,Transport"));
}

// ========== Train Command Tests ==========

#[test]
fn test_cmd_train_reports_accuracy() {
    let (_dir, input) = write_fixture("labeled.csv", &labeled_csv());
    let result = commands::cmd_train(&input);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_train_refusal_is_not_an_error() {
    let (_dir, input) = write_fixture("tiny.csv", SMALL_CSV);
    let result = commands::cmd_train(&input);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_train_empty_file() {
    let (_dir, input) = write_fixture("empty.csv", "date,description,category,amount\n");
    let result = commands::cmd_train(&input);
    assert!(result.is_err());
}

// ========== Analyze Command Tests ==========

#[test]
fn test_cmd_analyze_text() {
    let (_dir, input) = write_fixture("labeled.csv", &labeled_csv());
    let result = commands::cmd_analyze(&input, false);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_analyze_json() {
    let (_dir, input) = write_fixture("labeled.csv", &labeled_csv());
    let result = commands::cmd_analyze(&input, true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_analyze_empty_file() {
    let (_dir, input) = write_fixture("empty.csv", "date,description,category,amount\n");
    let result = commands::cmd_analyze(&input, false);
    assert!(result.is_err());
}

// ========== Helper Function Tests ==========

#[test]
fn test_load_batch_cleans_currency() {
    let csv = "date,description,category,amount\n01/05/2024,Electric bill,Utilities,\"$1,234.56\"\n";
    let (_dir, input) = write_fixture("tx.csv", csv);

    let batch = commands::load_batch(&input).unwrap();
    assert_eq!(batch.transactions.len(), 1);
    assert!((batch.transactions[0].amount - 1234.56).abs() < 1e-9);
    assert_eq!(batch.transactions[0].category, "Utilities");
}
