//! # Schema Collection Documents
//!
//! Loads a [`CredentialSchemaDto`] from a JSON or YAML document in three
//! stages, each with its own error:
//!
//! 1. **Meta-validation.** The parsed document is checked against the
//!    bundled Draft 2020-12 description of the collection wire shape
//!    (`schemas/credential-schema-collection.schema.json`). Violations are
//!    reported with instance and schema paths, all at once.
//! 2. **Decoding.** The value is decoded into the typed model.
//! 3. **Audit.** Structural invariants are checked
//!    (see [`audit`](crate::audit)).
//!
//! YAML documents are converted to JSON before validation, so both formats
//! go through the same checks.

use std::fmt;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::SchemaError;
use crate::model::CredentialSchemaDto;

/// The bundled meta-schema for collection documents.
pub const COLLECTION_META_SCHEMA: &str =
    include_str!("../schemas/credential-schema-collection.schema.json");

const INLINE_ORIGIN: &str = "<inline>";

/// A single meta-schema violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating node in the document.
    pub instance_path: String,
    /// JSON Pointer path within the meta-schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of meta-schema violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Text format of a collection document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension (`.json`, `.yaml`, `.yml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Validates and loads collection documents against the bundled
/// meta-schema.
///
/// The meta-schema is compiled once at construction. A validator is
/// `Send + Sync` and can be shared across threads.
pub struct MetaSchemaValidator {
    validator: Validator,
}

impl fmt::Debug for MetaSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaSchemaValidator").finish_non_exhaustive()
    }
}

impl MetaSchemaValidator {
    /// Compile the bundled meta-schema.
    pub fn new() -> Result<Self, SchemaError> {
        let schema: Value =
            serde_json::from_str(COLLECTION_META_SCHEMA).map_err(|e| SchemaError::MetaSchema {
                reason: e.to_string(),
            })?;
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts.build(&schema).map_err(|e| SchemaError::MetaSchema {
            reason: e.to_string(),
        })?;
        Ok(Self { validator })
    }

    /// Check a parsed document against the meta-schema, collecting every
    /// violation.
    pub fn validate(&self, instance: &Value) -> Result<(), ValidationViolations> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationViolations { violations })
        }
    }

    /// Meta-validate and decode a document without auditing it.
    pub fn decode_value(
        &self,
        document: Value,
        origin: &str,
    ) -> Result<CredentialSchemaDto, SchemaError> {
        self.validate(&document)
            .map_err(|violations| SchemaError::NonConforming {
                path: origin.to_string(),
                violations,
            })?;
        serde_json::from_value(document).map_err(|e| SchemaError::Decode {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Meta-validate, decode and audit a parsed document.
    pub fn load_value(
        &self,
        document: Value,
        origin: &str,
    ) -> Result<CredentialSchemaDto, SchemaError> {
        let collection = self.decode_value(document, origin)?.validated()?;
        tracing::info!(
            origin,
            schemas = collection.len(),
            "loaded credential schema collection"
        );
        Ok(collection)
    }

    /// Parse, meta-validate, decode and audit document text.
    pub fn load_str(
        &self,
        content: &str,
        format: DocumentFormat,
    ) -> Result<CredentialSchemaDto, SchemaError> {
        let document = parse_document(content, format, INLINE_ORIGIN)?;
        self.load_value(document, INLINE_ORIGIN)
    }

    /// Read and load a `.json`, `.yaml` or `.yml` document.
    pub fn load_file(&self, path: &Path) -> Result<CredentialSchemaDto, SchemaError> {
        let origin = path.display().to_string();
        let document = read_document(path)?;
        self.load_value(document, &origin)
    }
}

/// Read a document file and parse it into a JSON value according to its
/// extension.
pub fn read_document(path: &Path) -> Result<Value, SchemaError> {
    let origin = path.display().to_string();
    let format = DocumentFormat::from_path(path).ok_or_else(|| SchemaError::UnsupportedFormat {
        path: origin.clone(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: origin.clone(),
        source,
    })?;
    tracing::debug!(path = %origin, ?format, bytes = content.len(), "read schema document");
    parse_document(&content, format, &origin)
}

/// Parse document text into a JSON value.
pub fn parse_document(
    content: &str,
    format: DocumentFormat,
    origin: &str,
) -> Result<Value, SchemaError> {
    let parse_error = |reason: String| SchemaError::Parse {
        path: origin.to_string(),
        reason,
    };
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|e| parse_error(format!("invalid JSON: {e}")))
        }
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(content)
                .map_err(|e| parse_error(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml).map_err(parse_error)
        }
    }
}

/// Load a collection file with a freshly compiled meta-schema.
pub fn load_collection(path: &Path) -> Result<CredentialSchemaDto, SchemaError> {
    MetaSchemaValidator::new()?.load_file(path)
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Scalar map keys are stringified; tags are dropped.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
