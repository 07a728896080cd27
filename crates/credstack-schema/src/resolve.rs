//! # Credential Schema Resolver
//!
//! Given a credential type's schema and a candidate `data` payload, decide
//! which branch of the schema applies and produce the effective property
//! set the payload is validated against.
//!
//! ## Evaluation Order
//!
//! 1. The payload must be a JSON object.
//! 2. For `anyOf`, every `$ref` of every candidate is resolved against the
//!    collection before any candidate is evaluated. A missing target fails
//!    the whole resolution with `UNRESOLVED_REFERENCE`.
//! 3. A composite schema's top-level `required` fields are checked.
//! 4. Each candidate (or the atomic schema itself) is evaluated:
//!    conditional branch, then required fields, then value types, then the
//!    closed-set check when the candidate has `additionalProperties: false`
//!    or, for `oneOf`, the schema has `unevaluatedProperties: false`.
//!
//! `oneOf` needs exactly one matching candidate. `anyOf` needs at least
//! one; its effective set is the union over matched candidates in order,
//! earlier candidates winning on key collision. With
//! `unevaluatedProperties: false` the payload must stay inside that union. A reference candidate
//! resolves each referenced schema against the same payload and layers its
//! own properties over theirs.
//!
//! ## Purity
//!
//! Resolution reads the collection and the payload and nothing else. A
//! [`SchemaResolver`] holds only a shared borrow and a copy of its options,
//! so any number of threads may resolve through it concurrently.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{
    json_type_name, AnyOfCandidate, AtomicCredentialSchema, CompositeCredentialSchema,
    CompositeProperties, CompositeReference, Composition, CredentialSchema, CredentialSchemaDto,
    CredentialSchemaShape, PrimitiveType, PropertyBlock, PropertyMap,
};

type Fields = Map<String, Value>;

/// Resolver tuning. Every field has a default, so a partial config file
/// is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Numeric strings satisfy `number` and `integer` properties.
    pub lenient_numbers: bool,
    /// A `null` value counts as an absent field.
    pub null_as_absent: bool,
    /// Maximum nesting of `$ref` resolution.
    pub max_reference_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            lenient_numbers: false,
            null_as_absent: false,
            max_reference_depth: 16,
        }
    }
}

/// Which part of the schema the payload matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MatchedBranch {
    Atomic,
    OneOf { index: usize },
    AnyOf { indices: Vec<usize> },
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSchema {
    /// `$id` of the resolved schema.
    pub schema_id: String,
    /// The effective property set.
    pub properties: PropertyMap,
    /// Every field that was required of the payload.
    pub required: BTreeSet<String>,
    pub branch: MatchedBranch,
    /// Whether any `then` branch was layered in.
    pub conditional_applied: bool,
}

impl ResolvedSchema {
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
}

/// Why one composite candidate did not match.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFailure {
    /// Position of the candidate in its `anyOf`/`oneOf` list.
    pub index: usize,
    pub reason: Box<ResolveError>,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "candidate {}: {}", self.index, self.reason)
    }
}

struct Failures<'a>(&'a [CandidateFailure]);

impl fmt::Display for Failures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// A payload could not be resolved against a schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// No composite candidate matched.
    #[error("no candidate of '{schema}' matched: {}", Failures(.failures))]
    NoMatch {
        schema: String,
        failures: Vec<CandidateFailure>,
    },

    /// More than one `oneOf` candidate matched.
    #[error("oneOf of '{schema}' is ambiguous: candidates {matched:?} all matched")]
    AmbiguousMatch { schema: String, matched: Vec<usize> },

    /// A `$ref` names no schema in the collection.
    #[error("reference '{reference}' names no schema in the collection")]
    UnresolvedReference { reference: String },

    /// A required field is absent.
    #[error("missing required field '{field}'")]
    MissingRequiredField { field: String },

    /// A field's value has the wrong JSON type.
    #[error("field '{field}' must be {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: PrimitiveType,
        found: &'static str,
    },

    /// A closed candidate, or the union of a closed `anyOf`, saw a field it does not declare.
    #[error("field '{field}' is not declared by any matched branch")]
    UndeclaredField { field: String },

    /// The credential type has no schema in the collection.
    #[error("no schema for credential type '{0}'")]
    UnknownCredentialType(String),

    /// `$ref` resolution came back to a schema already being resolved.
    #[error("reference cycle: {}", .path.join(" -> "))]
    ReferenceCycle { path: Vec<String> },

    /// `$ref` resolution nested deeper than the configured limit.
    #[error("reference nesting exceeds {limit} levels")]
    ReferenceDepthExceeded { limit: usize },

    /// The payload is not a JSON object.
    #[error("payload must be an object, found {found}")]
    InvalidPayload { found: &'static str },
}

impl ResolveError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoMatch { .. } => "NO_MATCH",
            Self::AmbiguousMatch { .. } => "AMBIGUOUS_MATCH",
            Self::UnresolvedReference { .. } => "UNRESOLVED_REFERENCE",
            Self::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::UndeclaredField { .. } => "UNDECLARED_FIELD",
            Self::UnknownCredentialType(_) => "UNKNOWN_CREDENTIAL_TYPE",
            Self::ReferenceCycle { .. } => "REFERENCE_CYCLE",
            Self::ReferenceDepthExceeded { .. } => "REFERENCE_DEPTH_EXCEEDED",
            Self::InvalidPayload { .. } => "INVALID_PAYLOAD",
        }
    }

    /// Whether the error is a defect of the schema collection rather than
    /// of the payload. Such errors abort resolution instead of counting as
    /// one candidate's failure.
    pub fn is_schema_defect(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedReference { .. }
                | Self::ReferenceCycle { .. }
                | Self::ReferenceDepthExceeded { .. }
        )
    }
}

/// Properties, required set and conditional flag of one evaluated unit.
#[derive(Debug, Default)]
struct Effective {
    properties: PropertyMap,
    required: BTreeSet<String>,
    conditional_applied: bool,
}

/// Resolves payloads against the schemas of one collection.
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    collection: &'a CredentialSchemaDto,
    options: ResolveOptions,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(collection: &'a CredentialSchemaDto, options: ResolveOptions) -> Self {
        Self {
            collection,
            options,
        }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve `payload` against the schema registered for
    /// `credential_type`.
    pub fn resolve(
        &self,
        credential_type: &str,
        payload: &Value,
    ) -> Result<ResolvedSchema, ResolveError> {
        let schema = self
            .collection
            .get(credential_type)
            .ok_or_else(|| ResolveError::UnknownCredentialType(credential_type.to_string()))?;
        let result = self.resolve_schema(schema, payload);
        match &result {
            Ok(resolved) => tracing::debug!(
                credential_type,
                branch = ?resolved.branch,
                properties = resolved.properties.len(),
                "resolved payload"
            ),
            Err(e) => tracing::debug!(credential_type, code = e.code(), error = %e, "payload rejected"),
        }
        result
    }

    /// Resolve `payload` against `schema`. References in `schema` are
    /// looked up in this resolver's collection.
    pub fn resolve_schema(
        &self,
        schema: &CredentialSchema,
        payload: &Value,
    ) -> Result<ResolvedSchema, ResolveError> {
        let fields = payload.as_object().ok_or(ResolveError::InvalidPayload {
            found: json_type_name(payload),
        })?;
        let mut stack = vec![schema.id().to_string()];
        self.resolve_in(schema, fields, &mut stack)
    }

    fn resolve_in(
        &self,
        schema: &CredentialSchema,
        fields: &Fields,
        stack: &mut Vec<String>,
    ) -> Result<ResolvedSchema, ResolveError> {
        match schema {
            CredentialSchema::Atomic(atomic) => self.resolve_atomic(atomic, fields),
            CredentialSchema::Composite(composite) => {
                self.resolve_composite(composite, fields, stack)
            }
        }
    }

    fn resolve_atomic(
        &self,
        schema: &AtomicCredentialSchema,
        fields: &Fields,
    ) -> Result<ResolvedSchema, ResolveError> {
        let effective = self.apply_block(&schema.block, &schema.required, fields);
        self.check_required(&effective.required, fields)?;
        self.check_types(&effective.properties, fields)?;
        Ok(ResolvedSchema {
            schema_id: schema.id.clone(),
            properties: effective.properties,
            required: effective.required,
            branch: MatchedBranch::Atomic,
            conditional_applied: effective.conditional_applied,
        })
    }

    fn resolve_composite(
        &self,
        schema: &CompositeCredentialSchema,
        fields: &Fields,
        stack: &mut Vec<String>,
    ) -> Result<ResolvedSchema, ResolveError> {
        let closed = !schema.unevaluated_properties;
        let (branch, mut effective) = match &schema.composition {
            Composition::OneOf(candidates) => {
                self.check_required(&schema.required, fields)?;
                self.resolve_one_of(schema, candidates, fields, closed)?
            }
            Composition::AnyOf(candidates) => {
                let targets = self.lookup_references(candidates)?;
                self.check_required(&schema.required, fields)?;
                self.resolve_any_of(schema, candidates, &targets, fields, stack, closed)?
            }
        };
        effective.required.extend(schema.required.iter().cloned());
        Ok(ResolvedSchema {
            schema_id: schema.id.clone(),
            properties: effective.properties,
            required: effective.required,
            branch,
            conditional_applied: effective.conditional_applied,
        })
    }

    fn resolve_one_of(
        &self,
        schema: &CompositeCredentialSchema,
        candidates: &[CompositeProperties],
        fields: &Fields,
        closed: bool,
    ) -> Result<(MatchedBranch, Effective), ResolveError> {
        let mut matched = Vec::new();
        let mut failures = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            match self.evaluate_inline(candidate, fields, closed) {
                Ok(effective) => {
                    tracing::debug!(schema = %schema.id, index, "oneOf candidate matched");
                    matched.push((index, effective));
                }
                Err(reason) => {
                    tracing::debug!(schema = %schema.id, index, code = reason.code(), "oneOf candidate rejected");
                    failures.push(CandidateFailure {
                        index,
                        reason: Box::new(reason),
                    });
                }
            }
        }

        match matched.len() {
            0 => Err(ResolveError::NoMatch {
                schema: schema.id.clone(),
                failures,
            }),
            1 => {
                let (index, effective) = matched.remove(0);
                Ok((MatchedBranch::OneOf { index }, effective))
            }
            _ => Err(ResolveError::AmbiguousMatch {
                schema: schema.id.clone(),
                matched: matched.into_iter().map(|(i, _)| i).collect(),
            }),
        }
    }

    fn resolve_any_of(
        &self,
        schema: &CompositeCredentialSchema,
        candidates: &[AnyOfCandidate],
        targets: &[Vec<&CredentialSchema>],
        fields: &Fields,
        stack: &mut Vec<String>,
        closed: bool,
    ) -> Result<(MatchedBranch, Effective), ResolveError> {
        let mut indices = Vec::new();
        let mut failures = Vec::new();
        let mut union = Effective::default();

        // Schema-level closure applies to the union, not to each candidate.
        for (index, (candidate, refs)) in candidates.iter().zip(targets).enumerate() {
            let outcome = match candidate {
                AnyOfCandidate::Inline(inline) => self.evaluate_inline(inline, fields, false),
                AnyOfCandidate::Reference(reference) => {
                    self.evaluate_reference(reference, refs, fields, stack)
                }
            };
            match outcome {
                Ok(effective) => {
                    tracing::debug!(schema = %schema.id, index, "anyOf candidate matched");
                    indices.push(index);
                    for (name, prop) in effective.properties {
                        union.properties.entry(name).or_insert(prop);
                    }
                    union.required.extend(effective.required);
                    union.conditional_applied |= effective.conditional_applied;
                }
                Err(reason) if reason.is_schema_defect() => return Err(reason),
                Err(reason) => {
                    tracing::debug!(schema = %schema.id, index, code = reason.code(), "anyOf candidate rejected");
                    failures.push(CandidateFailure {
                        index,
                        reason: Box::new(reason),
                    });
                }
            }
        }

        if indices.is_empty() {
            return Err(ResolveError::NoMatch {
                schema: schema.id.clone(),
                failures,
            });
        }
        if closed {
            self.check_closed(&union.properties, fields)?;
        }
        Ok((MatchedBranch::AnyOf { indices }, union))
    }

    /// Look up every reference of every candidate, in candidate order.
    fn lookup_references(
        &self,
        candidates: &[AnyOfCandidate],
    ) -> Result<Vec<Vec<&'a CredentialSchema>>, ResolveError> {
        candidates
            .iter()
            .map(|candidate| {
                candidate
                    .references()
                    .iter()
                    .map(|r| {
                        self.collection
                            .lookup(&r.reference)
                            .map(|(_, target)| target)
                            .ok_or_else(|| ResolveError::UnresolvedReference {
                                reference: r.reference.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    fn evaluate_inline(
        &self,
        candidate: &CompositeProperties,
        fields: &Fields,
        closed: bool,
    ) -> Result<Effective, ResolveError> {
        let effective = self.apply_block(&candidate.block, &candidate.required, fields);
        self.check_required(&effective.required, fields)?;
        self.check_types(&effective.properties, fields)?;
        if closed || !candidate.additional_properties {
            self.check_closed(&effective.properties, fields)?;
        }
        Ok(effective)
    }

    fn evaluate_reference(
        &self,
        candidate: &CompositeReference,
        targets: &[&CredentialSchema],
        fields: &Fields,
        stack: &mut Vec<String>,
    ) -> Result<Effective, ResolveError> {
        let mut merged = Effective::default();
        for target in targets {
            let id = target.id().to_string();
            if stack.contains(&id) {
                let mut path = stack.clone();
                path.push(id);
                return Err(ResolveError::ReferenceCycle { path });
            }
            if stack.len() > self.options.max_reference_depth {
                return Err(ResolveError::ReferenceDepthExceeded {
                    limit: self.options.max_reference_depth,
                });
            }

            stack.push(id);
            let resolved = self.resolve_in(target, fields, stack);
            stack.pop();
            let resolved = resolved?;

            merged.properties.extend(resolved.properties);
            merged.required.extend(resolved.required);
            merged.conditional_applied |= resolved.conditional_applied;
        }

        let own = self.apply_block(&candidate.block, &candidate.required, fields);
        merged.properties.extend(own.properties);
        merged.required.extend(own.required);
        merged.conditional_applied |= own.conditional_applied;

        self.check_required(&merged.required, fields)?;
        self.check_types(&merged.properties, fields)?;
        Ok(merged)
    }

    /// Base properties and required list, with the `then` branch layered
    /// on when its `if` clause holds.
    fn apply_block(&self, block: &PropertyBlock, required: &[String], fields: &Fields) -> Effective {
        let mut effective = Effective {
            properties: block.properties.clone(),
            required: required.iter().cloned().collect(),
            conditional_applied: false,
        };
        let visible = self.visible_fields(fields);
        if let Some(then) = block.active_branch(&visible) {
            tracing::trace!(properties = then.properties.len(), "conditional branch applied");
            effective
                .properties
                .extend(then.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
            effective.required.extend(then.required.iter().cloned());
            effective.conditional_applied = true;
        }
        effective
    }

    /// The payload as conditionals see it: without `null`s when those
    /// count as absent.
    fn visible_fields<'f>(&self, fields: &'f Fields) -> Cow<'f, Fields> {
        if self.options.null_as_absent && fields.values().any(Value::is_null) {
            Cow::Owned(
                fields
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )
        } else {
            Cow::Borrowed(fields)
        }
    }

    fn is_present(&self, fields: &Fields, name: &str) -> bool {
        fields
            .get(name)
            .is_some_and(|v| !(self.options.null_as_absent && v.is_null()))
    }

    fn check_required<'r>(
        &self,
        required: impl IntoIterator<Item = &'r String>,
        fields: &Fields,
    ) -> Result<(), ResolveError> {
        match required.into_iter().find(|name| !self.is_present(fields, name)) {
            Some(name) => Err(ResolveError::MissingRequiredField {
                field: name.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_types(&self, properties: &PropertyMap, fields: &Fields) -> Result<(), ResolveError> {
        for (name, value) in fields {
            if self.options.null_as_absent && value.is_null() {
                continue;
            }
            let Some(prop) = properties.get(name) else { continue };
            if !prop.property_type.accepts(value, self.options.lenient_numbers) {
                return Err(ResolveError::TypeMismatch {
                    field: name.clone(),
                    expected: prop.property_type,
                    found: json_type_name(value),
                });
            }
        }
        Ok(())
    }

    fn check_closed(&self, properties: &PropertyMap, fields: &Fields) -> Result<(), ResolveError> {
        match fields
            .iter()
            .find(|(name, value)| {
                !properties.contains_key(name.as_str())
                    && !(self.options.null_as_absent && value.is_null())
            })
        {
            Some((name, _)) => Err(ResolveError::UndeclaredField {
                field: name.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prop(ty: &str) -> Value {
        json!({ "title": "t", "displayFormat": "String", "type": ty })
    }

    fn collection(doc: Value) -> CredentialSchemaDto {
        serde_json::from_value(json!({ "schemas": doc })).unwrap()
    }

    fn ssn() -> CredentialSchemaDto {
        collection(json!({
            "SsnCredential": {
                "$id": "SsnCredential",
                "type": "object",
                "properties": { "ssn": prop("string") },
                "required": ["ssn"]
            }
        }))
    }

    #[test]
    fn test_atomic_success_and_missing_field() {
        let dto = ssn();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let ok = resolver
            .resolve("SsnCredential", &json!({ "ssn": "123-45-6789" }))
            .unwrap();
        assert_eq!(ok.property_names().collect::<Vec<_>>(), vec!["ssn"]);
        assert_eq!(ok.branch, MatchedBranch::Atomic);
        assert!(!ok.conditional_applied);

        let err = resolver.resolve("SsnCredential", &json!({})).unwrap_err();
        assert_eq!(err, ResolveError::MissingRequiredField { field: "ssn".into() });
        assert_eq!(err.code(), "MISSING_REQUIRED_FIELD");
    }

    #[test]
    fn test_atomic_type_mismatch() {
        let dto = ssn();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let err = resolver
            .resolve("SsnCredential", &json!({ "ssn": 123456789 }))
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::TypeMismatch {
                field: "ssn".into(),
                expected: PrimitiveType::String,
                found: "integer",
            }
        );
        assert_eq!(err.to_string(), "field 'ssn' must be string, found integer");
    }

    #[test]
    fn test_atomic_allows_extra_fields() {
        let dto = ssn();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        assert!(resolver
            .resolve("SsnCredential", &json!({ "ssn": "1", "note": 5 }))
            .is_ok());
    }

    #[test]
    fn test_unknown_type_and_non_object_payload() {
        let dto = ssn();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        assert_eq!(
            resolver.resolve("Nope", &json!({})).unwrap_err().code(),
            "UNKNOWN_CREDENTIAL_TYPE"
        );
        assert_eq!(
            resolver.resolve("SsnCredential", &json!([1])).unwrap_err(),
            ResolveError::InvalidPayload { found: "array" }
        );
    }

    #[test]
    fn test_null_as_absent() {
        let dto = ssn();
        let strict = SchemaResolver::new(&dto, ResolveOptions::default());
        assert_eq!(
            strict.resolve("SsnCredential", &json!({ "ssn": null })).unwrap_err().code(),
            "TYPE_MISMATCH"
        );
        let lenient = SchemaResolver::new(
            &dto,
            ResolveOptions {
                null_as_absent: true,
                ..ResolveOptions::default()
            },
        );
        assert_eq!(
            lenient.resolve("SsnCredential", &json!({ "ssn": null })).unwrap_err().code(),
            "MISSING_REQUIRED_FIELD"
        );
    }

    #[test]
    fn test_lenient_numbers() {
        let dto = collection(json!({
            "Income": {
                "$id": "Income",
                "properties": { "amount": prop("number") },
                "required": ["amount"]
            }
        }));
        let payload = json!({ "amount": "52000.50" });
        let strict = SchemaResolver::new(&dto, ResolveOptions::default());
        assert_eq!(strict.resolve("Income", &payload).unwrap_err().code(), "TYPE_MISMATCH");
        let lenient = SchemaResolver::new(
            &dto,
            ResolveOptions {
                lenient_numbers: true,
                ..ResolveOptions::default()
            },
        );
        assert!(lenient.resolve("Income", &payload).is_ok());
    }

    fn one_of() -> CredentialSchemaDto {
        collection(json!({
            "Contact": {
                "$id": "Contact",
                "required": [],
                "unevaluatedProperties": true,
                "oneOf": [
                    { "properties": { "email": prop("string") }, "required": ["email"], "additionalProperties": false },
                    { "properties": { "phone": prop("string") }, "required": ["phone"], "additionalProperties": false },
                    { "properties": { "email": prop("string"), "phone": prop("string") }, "required": ["email", "phone"], "additionalProperties": false }
                ]
            }
        }))
    }

    #[test]
    fn test_one_of_selects_single_candidate() {
        let dto = one_of();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let resolved = resolver
            .resolve("Contact", &json!({ "phone": "+15555550100" }))
            .unwrap();
        assert_eq!(resolved.branch, MatchedBranch::OneOf { index: 1 });
        assert_eq!(resolved.property_names().collect::<Vec<_>>(), vec!["phone"]);
    }

    #[test]
    fn test_one_of_closed_candidates_disambiguate() {
        let dto = one_of();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let resolved = resolver
            .resolve("Contact", &json!({ "email": "a@b.c", "phone": "1" }))
            .unwrap();
        assert_eq!(resolved.branch, MatchedBranch::OneOf { index: 2 });
    }

    #[test]
    fn test_one_of_no_match_reports_each_candidate() {
        let dto = one_of();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        match resolver.resolve("Contact", &json!({ "fax": "1" })).unwrap_err() {
            ResolveError::NoMatch { schema, failures } => {
                assert_eq!(schema, "Contact");
                assert_eq!(failures.len(), 3);
                assert_eq!(failures[0].reason.code(), "MISSING_REQUIRED_FIELD");
            }
            other => panic!("expected NoMatch, got {other:?}"),
        }
    }

    #[test]
    fn test_one_of_ambiguous() {
        let dto = collection(json!({
            "Open": {
                "$id": "Open",
                "oneOf": [
                    { "properties": { "a": prop("string") }, "required": ["a"] },
                    { "properties": { "b": prop("string") } }
                ]
            }
        }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let err = resolver.resolve("Open", &json!({ "a": "x" })).unwrap_err();
        assert_eq!(
            err,
            ResolveError::AmbiguousMatch { schema: "Open".into(), matched: vec![0, 1] }
        );
    }

    #[test]
    fn test_unevaluated_properties_false_closes_candidates() {
        let dto = collection(json!({
            "Closed": {
                "$id": "Closed",
                "unevaluatedProperties": false,
                "oneOf": [
                    { "properties": { "a": prop("string") }, "required": ["a"] }
                ]
            }
        }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        assert!(resolver.resolve("Closed", &json!({ "a": "x" })).is_ok());
        match resolver.resolve("Closed", &json!({ "a": "x", "b": "y" })).unwrap_err() {
            ResolveError::NoMatch { failures, .. } => {
                assert_eq!(*failures[0].reason, ResolveError::UndeclaredField { field: "b".into() });
            }
            other => panic!("expected NoMatch, got {other:?}"),
        }
    }

    #[test]
    fn test_closed_any_of_accepts_payload_spanning_branches() {
        let dto = collection(json!({
            "Contact": {
                "$id": "Contact",
                "unevaluatedProperties": false,
                "anyOf": [
                    { "properties": { "email": prop("string") }, "required": ["email"] },
                    { "properties": { "phone": prop("string") }, "required": ["phone"] }
                ]
            }
        }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());

        let both = resolver
            .resolve("Contact", &json!({ "email": "ada@example.com", "phone": "+15550100" }))
            .unwrap();
        assert_eq!(both.branch, MatchedBranch::AnyOf { indices: vec![0, 1] });
        assert_eq!(both.property_names().collect::<Vec<_>>(), vec!["email", "phone"]);

        let err = resolver
            .resolve("Contact", &json!({ "email": "ada@example.com", "fax": "x" }))
            .unwrap_err();
        assert_eq!(err, ResolveError::UndeclaredField { field: "fax".into() });
    }

    #[test]
    fn test_any_of_candidate_additional_properties_still_closes_it() {
        let dto = collection(json!({
            "Contact": {
                "$id": "Contact",
                "anyOf": [
                    { "properties": { "email": prop("string") }, "required": ["email"], "additionalProperties": false },
                    { "properties": { "phone": prop("string") } }
                ]
            }
        }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let resolved = resolver
            .resolve("Contact", &json!({ "email": "ada@example.com", "phone": "+15550100" }))
            .unwrap();
        assert_eq!(resolved.branch, MatchedBranch::AnyOf { indices: vec![1] });
    }

    #[test]
    fn test_composite_top_level_required_checked_first() {
        let dto = collection(json!({
            "Named": {
                "$id": "Named",
                "required": ["name"],
                "oneOf": [{ "properties": { "name": prop("string") } }]
            }
        }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        assert_eq!(
            resolver.resolve("Named", &json!({})).unwrap_err(),
            ResolveError::MissingRequiredField { field: "name".into() }
        );
        let ok = resolver.resolve("Named", &json!({ "name": "A" })).unwrap();
        assert!(ok.required.contains("name"));
    }

    fn any_of() -> CredentialSchemaDto {
        collection(json!({
            "Phone": {
                "$id": "https://schemas.example.com/Phone",
                "properties": { "phone": prop("string"), "label": { "title": "Phone label", "displayFormat": "String", "type": "string" } },
                "required": ["phone"]
            },
            "Contact": {
                "$id": "Contact",
                "anyOf": [
                    {
                        "properties": {
                            "email": prop("string"),
                            "label": { "title": "Email label", "displayFormat": "String", "type": "string" }
                        },
                        "required": ["email"]
                    },
                    {
                        "allOf": [{ "$ref": "#/schemas/Phone" }],
                        "properties": { "extension": prop("integer") }
                    }
                ]
            }
        }))
    }

    #[test]
    fn test_any_of_union_earlier_candidate_wins() {
        let dto = any_of();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let resolved = resolver
            .resolve("Contact", &json!({ "email": "a@b.c", "phone": "1" }))
            .unwrap();
        assert_eq!(resolved.branch, MatchedBranch::AnyOf { indices: vec![0, 1] });
        assert_eq!(
            resolved.property_names().collect::<Vec<_>>(),
            vec!["email", "extension", "label", "phone"]
        );
        assert_eq!(resolved.properties["label"].title, "Email label");
        assert_eq!(
            resolved.required.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["email", "phone"]
        );
    }

    #[test]
    fn test_any_of_reference_candidate_alone() {
        let dto = any_of();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let resolved = resolver
            .resolve("Contact", &json!({ "phone": "1", "extension": 12 }))
            .unwrap();
        assert_eq!(resolved.branch, MatchedBranch::AnyOf { indices: vec![1] });
        assert!(resolved.contains("extension"));

        let err = resolver
            .resolve("Contact", &json!({ "phone": "1", "extension": "twelve" }))
            .unwrap_err();
        assert_eq!(err.code(), "NO_MATCH");
    }

    #[test]
    fn test_any_of_unresolved_reference() {
        let dto = collection(json!({
            "Contact": {
                "$id": "Contact",
                "required": ["never-present"],
                "anyOf": [
                    { "properties": { "email": prop("string") } },
                    { "allOf": [{ "$ref": "#/schemas/Missing" }] }
                ]
            }
        }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        assert_eq!(
            resolver.resolve("Contact", &json!({ "email": "a@b.c" })).unwrap_err(),
            ResolveError::UnresolvedReference { reference: "#/schemas/Missing".into() }
        );
    }

    #[test]
    fn test_reference_cycle_detected() {
        let dto = collection(json!({
            "A": { "$id": "A", "anyOf": [{ "allOf": [{ "$ref": "B" }] }] },
            "B": { "$id": "B", "anyOf": [{ "allOf": [{ "$ref": "A" }] }] }
        }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        assert_eq!(
            resolver.resolve("A", &json!({})).unwrap_err(),
            ResolveError::ReferenceCycle {
                path: vec!["A".into(), "B".into(), "A".into()]
            }
        );
    }

    #[test]
    fn test_reference_depth_limit() {
        let dto = collection(json!({
            "A": { "$id": "A", "anyOf": [{ "allOf": [{ "$ref": "B" }] }] },
            "B": { "$id": "B", "anyOf": [{ "allOf": [{ "$ref": "C" }] }] },
            "C": { "$id": "C", "properties": {} }
        }));
        let shallow = SchemaResolver::new(
            &dto,
            ResolveOptions {
                max_reference_depth: 1,
                ..ResolveOptions::default()
            },
        );
        assert_eq!(
            shallow.resolve("A", &json!({})).unwrap_err(),
            ResolveError::ReferenceDepthExceeded { limit: 1 }
        );
        let deep = SchemaResolver::new(&dto, ResolveOptions::default());
        assert!(deep.resolve("A", &json!({})).is_ok());
    }

    fn conditional() -> CredentialSchemaDto {
        collection(json!({
            "IdDocument": {
                "$id": "IdDocument",
                "properties": {
                    "kind": prop("string"),
                    "number": { "title": "Document number", "displayFormat": "String", "type": "string" }
                },
                "if": {
                    "properties": { "kind": { "type": "string", "const": "passport" } },
                    "required": ["kind"]
                },
                "then": {
                    "properties": {
                        "number": { "title": "Passport number", "displayFormat": "String", "type": "string" },
                        "country": prop("string")
                    },
                    "required": ["country"]
                },
                "required": ["kind"]
            }
        }))
    }

    #[test]
    fn test_conditional_merges_then_branch() {
        let dto = conditional();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let resolved = resolver
            .resolve("IdDocument", &json!({ "kind": "passport", "country": "US" }))
            .unwrap();
        assert!(resolved.conditional_applied);
        assert_eq!(
            resolved.property_names().collect::<Vec<_>>(),
            vec!["country", "kind", "number"]
        );
        assert_eq!(resolved.properties["number"].title, "Passport number");
    }

    #[test]
    fn test_conditional_then_required_only_on_match() {
        let dto = conditional();
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        assert_eq!(
            resolver.resolve("IdDocument", &json!({ "kind": "passport" })).unwrap_err(),
            ResolveError::MissingRequiredField { field: "country".into() }
        );
        let resolved = resolver.resolve("IdDocument", &json!({ "kind": "license" })).unwrap();
        assert!(!resolved.conditional_applied);
        assert_eq!(resolved.property_names().collect::<Vec<_>>(), vec!["kind", "number"]);
        assert_eq!(resolved.properties["number"].title, "Document number");
    }

    #[test]
    fn test_error_codes_are_upper_snake() {
        let samples = [
            ResolveError::NoMatch { schema: "s".into(), failures: vec![] },
            ResolveError::AmbiguousMatch { schema: "s".into(), matched: vec![0, 1] },
            ResolveError::UnresolvedReference { reference: "r".into() },
            ResolveError::MissingRequiredField { field: "f".into() },
            ResolveError::TypeMismatch { field: "f".into(), expected: PrimitiveType::Null, found: "string" },
            ResolveError::UndeclaredField { field: "f".into() },
            ResolveError::UnknownCredentialType("t".into()),
            ResolveError::ReferenceCycle { path: vec![] },
            ResolveError::ReferenceDepthExceeded { limit: 1 },
            ResolveError::InvalidPayload { found: "null" },
        ];
        for e in &samples {
            assert!(e.code().chars().all(|c| c.is_ascii_uppercase() || c == '_'), "{}", e.code());
        }
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: ResolveOptions = serde_json::from_value(json!({ "lenient_numbers": true })).unwrap();
        assert!(options.lenient_numbers);
        assert_eq!(options.max_reference_depth, 16);
    }
}
