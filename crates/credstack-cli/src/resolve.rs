//! # Resolve Subcommand
//!
//! Resolve a credential payload against a schema collection and print the
//! matched branch and effective property set.
//!
//! ```bash
//! credstack resolve --schemas wallet-schemas.json SsnCredential --data '{"ssn":"123-45-6789"}'
//! credstack resolve --schemas wallet-schemas.yaml AddressCredential --payload address.json --format json
//! ```
//!
//! Exit codes: `0` resolved, `2` payload rejected, `1` anything else.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use credstack_schema::document::read_document;
use credstack_schema::{
    MatchedBranch, MetaSchemaValidator, ResolveError, ResolvedSchema, SchemaResolver,
};

use crate::config::{CliConfig, ResolveFlags};

/// Exit code for a payload the schema rejects.
pub const EXIT_REJECTED: u8 = 2;

/// Output rendering.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the resolve subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Credential type to resolve against.
    pub credential_type: String,

    /// Schema collection document (.json, .yaml or .yml).
    #[arg(long, value_name = "FILE")]
    pub schemas: PathBuf,

    /// Payload document (.json, .yaml or .yml), or `-` for JSON on stdin.
    #[arg(long, value_name = "FILE", conflicts_with = "data", required_unless_present = "data")]
    pub payload: Option<PathBuf>,

    /// Inline JSON payload.
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,

    /// Skip the structural audit of the collection.
    #[arg(long)]
    pub no_audit: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub flags: ResolveFlags,
}

/// Execute the resolve subcommand.
pub fn run_resolve(args: &ResolveArgs, config: &CliConfig) -> Result<u8> {
    let options = args.flags.apply(config.resolve);
    tracing::debug!(?options, "resolver options");

    let validator = MetaSchemaValidator::new()?;
    let document = read_document(&args.schemas)?;
    let origin = args.schemas.display().to_string();
    let collection = if args.no_audit {
        validator.decode_value(document, &origin)?
    } else {
        validator.load_value(document, &origin)?
    };

    let payload = read_payload(args)?;
    let outcome = SchemaResolver::new(&collection, options).resolve(&args.credential_type, &payload);
    let code = match &outcome {
        Ok(_) => 0,
        Err(_) => EXIT_REJECTED,
    };
    println!("{}", render_outcome(&args.credential_type, &outcome, args.format)?);
    Ok(code)
}

fn read_payload(args: &ResolveArgs) -> Result<Value> {
    match (&args.data, &args.payload) {
        (Some(inline), _) => serde_json::from_str(inline).context("--data is not valid JSON"),
        (None, Some(path)) if path == Path::new("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read payload from stdin")?;
            serde_json::from_str(&buf).context("stdin payload is not valid JSON")
        }
        (None, Some(path)) => Ok(read_document(path)?),
        (None, None) => anyhow::bail!("one of --payload or --data is required"),
    }
}

/// Render a resolution outcome in the requested format.
pub fn render_outcome(
    credential_type: &str,
    outcome: &Result<ResolvedSchema, ResolveError>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let value = match outcome {
                Ok(resolved) => json!({ "credentialType": credential_type, "resolved": resolved }),
                Err(e) => json!({
                    "credentialType": credential_type,
                    "error": { "code": e.code(), "message": e.to_string() }
                }),
            };
            Ok(serde_json::to_string_pretty(&value)?)
        }
        OutputFormat::Text => Ok(match outcome {
            Ok(resolved) => render_text(credential_type, resolved),
            Err(e) => format!("{credential_type}: rejected [{}] {e}", e.code()),
        }),
    }
}

fn render_text(credential_type: &str, resolved: &ResolvedSchema) -> String {
    let branch = match &resolved.branch {
        MatchedBranch::Atomic => "atomic".to_string(),
        MatchedBranch::OneOf { index } => format!("oneOf[{index}]"),
        MatchedBranch::AnyOf { indices } => format!("anyOf{indices:?}"),
    };
    let mut lines = vec![format!(
        "{credential_type}: resolved via {branch}{}",
        if resolved.conditional_applied { " (conditional applied)" } else { "" }
    )];
    for (name, prop) in &resolved.properties {
        let marker = if resolved.required.contains(name) { "*" } else { " " };
        lines.push(format!(
            "  {marker} {name}: {} [{}, {}]",
            prop.title, prop.display_format, prop.property_type
        ));
    }
    lines.join("\n")
}
