//! # Audit Subcommand
//!
//! Decode schema collections and report structural findings: required
//! fields that are never declared, selects without options, dangling
//! references and similar defects that the meta-schema cannot express.
//!
//! ```bash
//! credstack audit wallet-schemas.json
//! credstack audit --format json schemas/*.yaml
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use credstack_schema::document::read_document;
use credstack_schema::{audit_collection, AuditFinding, MetaSchemaValidator};

use crate::resolve::OutputFormat;

/// Arguments for the audit subcommand.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Collection documents to audit.
    #[arg(required = true, value_name = "FILE")]
    pub documents: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the audit subcommand. Returns 1 when any finding is reported.
pub fn run_audit(args: &AuditArgs) -> Result<u8> {
    let validator = MetaSchemaValidator::new()?;
    let mut findings: Vec<(String, AuditFinding)> = Vec::new();

    for path in &args.documents {
        let origin = path.display().to_string();
        let collection = validator.decode_value(read_document(path)?, &origin)?;
        let found = audit_collection(&collection);
        tracing::info!(
            document = %origin,
            schemas = collection.len(),
            findings = found.len(),
            "audited collection"
        );
        findings.extend(found.into_iter().map(|f| (origin.clone(), f)));
    }

    println!("{}", render_findings(&findings, args.format)?);
    Ok(if findings.is_empty() { 0 } else { 1 })
}

/// Render `(document, finding)` pairs.
pub fn render_findings(findings: &[(String, AuditFinding)], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = findings
                .iter()
                .map(|(document, finding)| -> Result<serde_json::Value, serde_json::Error> {
                    let mut entry = serde_json::to_value(finding)?;
                    entry["document"] = serde_json::Value::String(document.clone());
                    Ok(entry)
                })
                .collect::<Result<_, serde_json::Error>>()?;
            Ok(serde_json::to_string_pretty(&entries)?)
        }
        OutputFormat::Text if findings.is_empty() => Ok("No findings.".to_string()),
        OutputFormat::Text => {
            let mut lines: Vec<String> = findings
                .iter()
                .map(|(document, finding)| format!("{document}: {finding}"))
                .collect();
            lines.push(format!("{} finding(s)", findings.len()));
            Ok(lines.join("\n"))
        }
    }
}
