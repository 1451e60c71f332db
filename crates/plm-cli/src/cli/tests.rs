//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_run_defaults() {
    match parse(&["plm", "run"]) {
        CliCommand::Run {
            manifest,
            output_dir,
            workers,
            best_effort,
        } => {
            assert!(manifest.is_none());
            assert!(output_dir.is_none());
            assert!(workers.is_none());
            assert!(!best_effort);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_overrides() {
    match parse(&[
        "plm",
        "run",
        "--manifest",
        "catalog.toml",
        "--output-dir",
        "/tmp/playlists",
        "--workers",
        "2",
        "--best-effort",
    ]) {
        CliCommand::Run {
            manifest,
            output_dir,
            workers,
            best_effort,
        } => {
            assert_eq!(manifest, Some(PathBuf::from("catalog.toml")));
            assert_eq!(output_dir, Some(PathBuf::from("/tmp/playlists")));
            assert_eq!(workers, Some(2));
            assert!(best_effort);
        }
        _ => panic!("expected Run with overrides"),
    }
}

#[test]
fn cli_parse_validate() {
    match parse(&["plm", "validate", "catalog.toml"]) {
        CliCommand::Validate { manifest } => {
            assert_eq!(manifest, PathBuf::from("catalog.toml"));
        }
        _ => panic!("expected Validate"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["plm", "checksum", "/tmp/epgbrasil.m3u"]) {
        CliCommand::Checksum { path } => {
            assert_eq!(path, PathBuf::from("/tmp/epgbrasil.m3u"));
        }
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["plm", "frobnicate"]).is_err());
}
