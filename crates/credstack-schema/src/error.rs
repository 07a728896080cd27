//! Errors raised while loading or checking a credential schema collection.
//!
//! Payload resolution failures are a separate type,
//! [`ResolveError`](crate::resolve::ResolveError): they describe a bad
//! payload, not a bad schema document.

use std::fmt;

use thiserror::Error;

use crate::audit::AuditFinding;
use crate::document::ValidationViolations;

/// Error loading, meta-validating or auditing a schema collection.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document file could not be read.
    #[error("failed to read schema document '{path}': {source}")]
    Io {
        /// Path of the document.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document extension is not one the loader understands.
    #[error("unsupported schema document '{path}': expected .json, .yaml or .yml")]
    UnsupportedFormat {
        /// Path of the document.
        path: String,
    },

    /// The document is not well-formed JSON or YAML.
    #[error("failed to parse schema document '{path}': {reason}")]
    Parse {
        /// Path of the document, or `<inline>` for in-memory text.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The document parsed but does not have the collection wire shape.
    #[error("schema document '{path}' does not match the collection format:\n{violations}")]
    NonConforming {
        /// Path of the document, or `<inline>` for in-memory text.
        path: String,
        /// Meta-schema violations.
        violations: ValidationViolations,
    },

    /// The document matched the meta-schema but did not decode.
    #[error("failed to decode schema document '{path}': {reason}")]
    Decode {
        /// Path of the document, or `<inline>` for in-memory text.
        path: String,
        /// Decoder message.
        reason: String,
    },

    /// The collection decoded but breaks structural invariants.
    #[error("schema collection has {} structural finding(s):\n{}", .findings.len(), Findings(.findings))]
    Invalid {
        /// Every finding, in collection order.
        findings: Vec<AuditFinding>,
    },

    /// The bundled meta-schema failed to compile.
    #[error("failed to compile the collection meta-schema: {reason}")]
    MetaSchema {
        /// Compiler message.
        reason: String,
    },
}

struct Findings<'a>(&'a [AuditFinding]);

impl fmt::Display for Findings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, finding) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {finding}")?;
        }
        Ok(())
    }
}
