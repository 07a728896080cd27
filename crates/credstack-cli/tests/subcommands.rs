//! Subcommand entry points driven against the shared wallet fixture.

use std::fs;
use std::path::PathBuf;

use credstack_cli::audit::{run_audit, AuditArgs};
use credstack_cli::check::{check_documents, run_check, CheckArgs};
use credstack_cli::config::{CliConfig, ResolveFlags};
use credstack_cli::resolve::{run_resolve, OutputFormat, ResolveArgs, EXIT_REJECTED};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../credstack-schema/tests/fixtures/wallet-schemas.json")
}

fn resolve_args(credential_type: &str, data: &str) -> ResolveArgs {
    ResolveArgs {
        credential_type: credential_type.to_string(),
        schemas: fixture(),
        payload: None,
        data: Some(data.to_string()),
        no_audit: false,
        format: OutputFormat::Text,
        flags: ResolveFlags::default(),
    }
}

const DANGLING: &str = r##"{
  "schemas": {
    "Contact": {
      "$id": "Contact",
      "anyOf": [ { "allOf": [ { "$ref": "#/schemas/Phone" } ] } ]
    }
  }
}"##;

#[test]
fn resolve_accepts_a_conforming_payload() {
    let args = resolve_args("SsnCredential", r#"{ "ssn": "123-45-6789" }"#);
    assert_eq!(run_resolve(&args, &CliConfig::default()).unwrap(), 0);
}

#[test]
fn resolve_rejection_uses_its_own_exit_code() {
    let args = resolve_args("SsnCredential", "{}");
    assert_eq!(run_resolve(&args, &CliConfig::default()).unwrap(), EXIT_REJECTED);

    let unknown = resolve_args("NoSuchCredential", "{}");
    assert_eq!(run_resolve(&unknown, &CliConfig::default()).unwrap(), EXIT_REJECTED);
}

#[test]
fn resolve_honours_lenient_numbers_from_config_or_flag() {
    let payload = r#"{ "annualIncome": "85000" }"#;
    let strict = resolve_args("IncomeCredential", payload);
    assert_eq!(run_resolve(&strict, &CliConfig::default()).unwrap(), EXIT_REJECTED);

    let mut config = CliConfig::default();
    config.resolve.lenient_numbers = true;
    assert_eq!(run_resolve(&strict, &config).unwrap(), 0);

    let mut flagged = resolve_args("IncomeCredential", payload);
    flagged.flags.lenient_numbers = true;
    assert_eq!(run_resolve(&flagged, &CliConfig::default()).unwrap(), 0);
}

#[test]
fn resolve_reads_yaml_payload_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ssn.yaml");
    fs::write(&path, "ssn: 123-45-6789\n").unwrap();
    let mut args = resolve_args("SsnCredential", "{}");
    args.data = None;
    args.payload = Some(path);
    args.format = OutputFormat::Json;
    assert_eq!(run_resolve(&args, &CliConfig::default()).unwrap(), 0);
}

#[test]
fn resolve_reports_malformed_data_as_error() {
    let args = resolve_args("SsnCredential", "{ not json");
    let err = run_resolve(&args, &CliConfig::default()).unwrap_err();
    assert!(format!("{err:#}").contains("--data is not valid JSON"), "{err:#}");
}

#[test]
fn resolve_refuses_a_collection_that_fails_audit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dangling.json");
    fs::write(&path, DANGLING).unwrap();

    let mut args = resolve_args("Contact", "{}");
    args.schemas = path;
    assert!(run_resolve(&args, &CliConfig::default()).is_err());

    args.no_audit = true;
    assert_eq!(run_resolve(&args, &CliConfig::default()).unwrap(), EXIT_REJECTED);
}

#[test]
fn audit_exit_code_tracks_findings() {
    let clean = AuditArgs { documents: vec![fixture()], format: OutputFormat::Text };
    assert_eq!(run_audit(&clean).unwrap(), 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dangling.json");
    fs::write(&path, DANGLING).unwrap();
    let dirty = AuditArgs { documents: vec![fixture(), path], format: OutputFormat::Json };
    assert_eq!(run_audit(&dirty).unwrap(), 1);
}

#[test]
fn check_separates_failures_from_errors() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.yaml");
    fs::write(&bad, "schemas:\n  X:\n    properties: {}\n").unwrap();

    let args = CheckArgs { documents: vec![fixture(), bad.clone()] };
    let reports = check_documents(&args).unwrap();
    assert!(reports[0].passed());
    assert!(!reports[1].passed());
    assert_eq!(run_check(&args).unwrap(), 1);

    let missing = CheckArgs { documents: vec![dir.path().join("absent.json")] };
    assert!(run_check(&missing).is_err());

    assert_eq!(run_check(&CheckArgs { documents: vec![fixture()] }).unwrap(), 0);
}
