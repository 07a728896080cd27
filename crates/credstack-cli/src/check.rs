//! # Check Subcommand
//!
//! Validate documents against the bundled collection meta-schema only.
//! Useful in CI before a collection is published.
//!
//! ```bash
//! credstack check schemas/*.json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use credstack_schema::document::read_document;
use credstack_schema::{MetaSchemaValidator, ValidationViolations};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Collection documents to check.
    #[arg(required = true, value_name = "FILE")]
    pub documents: Vec<PathBuf>,
}

/// Result of checking one document.
#[derive(Debug)]
pub struct CheckReport {
    pub document: String,
    pub outcome: Result<(), ValidationViolations>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Meta-validate every document. Unreadable documents are errors, not
/// failed checks.
pub fn check_documents(args: &CheckArgs) -> Result<Vec<CheckReport>> {
    let validator = MetaSchemaValidator::new()?;
    args.documents
        .iter()
        .map(|path| -> Result<CheckReport> {
            let document = read_document(path)?;
            Ok(CheckReport {
                document: path.display().to_string(),
                outcome: validator.validate(&document),
            })
        })
        .collect()
}

/// Execute the check subcommand. Returns 1 when any document fails.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let reports = check_documents(args)?;
    let mut failed = 0usize;
    for report in &reports {
        match &report.outcome {
            Ok(()) => println!("OK    {}", report.document),
            Err(violations) => {
                failed += 1;
                println!("FAIL  {} ({} violation(s))", report.document, violations.len());
                println!("{violations}");
            }
        }
    }
    tracing::info!(checked = reports.len(), failed, "meta-schema check complete");
    Ok(if failed == 0 { 0 } else { 1 })
}
