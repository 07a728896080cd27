//! # Structural Audit of Credential Schemas
//!
//! Decoding only guarantees that a schema has the right shape. The rules
//! here catch schemas that decode but cannot be used correctly: required
//! fields nothing declares, select inputs with nothing to select, half a
//! conditional, and references the collection cannot resolve.
//!
//! Each finding carries a JSON Pointer into the schema document so that
//! authors can jump straight to the offending node.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::SchemaError;
use crate::model::{
    AnyOfCandidate, AtomicCredentialSchema, CompositeCredentialSchema, Composition,
    CredentialSchema, CredentialSchemaDto, CredentialSchemaShape, PropertyBlock, PropertyMap,
    SchemaRef,
};

/// The invariant a finding reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditRule {
    /// A `required` entry names a property no applicable map declares.
    RequiredNotDeclared,
    /// A `Select` input has no options.
    SelectWithoutOptions,
    /// An `if` clause with no `then` branch. It can never apply.
    IfWithoutThen,
    /// A `then` branch with no `if` clause. It can never apply.
    ThenWithoutIf,
    /// An `if.required` entry that is not one of the clause's discriminators.
    IfRequiredNotDeclared,
    /// A `$ref` that names no schema in the collection.
    DanglingReference,
    /// An `anyOf`/`oneOf` with no candidates. Nothing can match it.
    EmptyComposition,
}

impl AuditRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredNotDeclared => "required-not-declared",
            Self::SelectWithoutOptions => "select-without-options",
            Self::IfWithoutThen => "if-without-then",
            Self::ThenWithoutIf => "then-without-if",
            Self::IfRequiredNotDeclared => "if-required-not-declared",
            Self::DanglingReference => "dangling-reference",
            Self::EmptyComposition => "empty-composition",
        }
    }
}

impl fmt::Display for AuditRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural problem in one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFinding {
    /// Credential type name of the schema.
    pub schema: String,
    /// JSON Pointer to the offending node, relative to the schema.
    pub json_path: String,
    pub rule: AuditRule,
    pub message: String,
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} [{}]: {}", self.schema, self.json_path, self.rule, self.message)
    }
}

struct Auditor<'a> {
    schema: &'a str,
    collection: Option<&'a CredentialSchemaDto>,
    findings: Vec<AuditFinding>,
}

impl Auditor<'_> {
    fn report(&mut self, json_path: String, rule: AuditRule, message: String) {
        self.findings.push(AuditFinding {
            schema: self.schema.to_string(),
            json_path,
            rule,
            message,
        });
    }

    fn atomic(&mut self, schema: &AtomicCredentialSchema) {
        self.block(&schema.block, &schema.required, Declared::Own, "");
    }

    /// Property names a reference candidate inherits from its targets,
    /// following nested `anyOf` references. `None` when there is no
    /// collection to look in or a target is missing.
    fn inherited(&self, references: &[SchemaRef]) -> Option<BTreeSet<String>> {
        let collection = self.collection?;
        let mut names = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut pending: Vec<&str> = references.iter().map(|r| r.reference.as_str()).collect();
        while let Some(reference) = pending.pop() {
            let (key, target) = collection.lookup(reference)?;
            if !visited.insert(key) {
                continue;
            }
            names.extend(target.declared_properties().into_keys());
            if let Some(CompositeCredentialSchema {
                composition: Composition::AnyOf(candidates),
                ..
            }) = target.as_composite()
            {
                pending.extend(
                    candidates
                        .iter()
                        .flat_map(|c| c.references())
                        .map(|r| r.reference.as_str()),
                );
            }
        }
        Some(names)
    }

    fn composite(&mut self, schema: &CompositeCredentialSchema) {
        let keyword = schema.composition.keyword();
        if schema.composition.is_empty() {
            self.report(
                format!("/{keyword}"),
                AuditRule::EmptyComposition,
                format!("{keyword} has no candidates"),
            );
        }

        match &schema.composition {
            Composition::OneOf(candidates) => {
                for (i, c) in candidates.iter().enumerate() {
                    self.block(&c.block, &c.required, Declared::Own, &format!("/oneOf/{i}"));
                }
            }
            Composition::AnyOf(candidates) => {
                for (i, c) in candidates.iter().enumerate() {
                    let base = format!("/anyOf/{i}");
                    for (j, r) in c.references().iter().enumerate() {
                        self.reference(&r.reference, &format!("{base}/allOf/{j}/$ref"));
                    }
                    let inherited = match c {
                        AnyOfCandidate::Inline(_) => None,
                        AnyOfCandidate::Reference(r) => Some(self.inherited(&r.all_of)),
                    };
                    let declared = match &inherited {
                        None => Declared::Own,
                        Some(Some(names)) => Declared::Inherited(names),
                        Some(None) => Declared::Unknown,
                    };
                    self.block(c.block(), c.required(), declared, &base);
                }
            }
        }

        // Top-level required must be declared by every candidate. A
        // reference candidate counts what its targets declare; one whose
        // targets cannot be looked up is skipped.
        let candidates = candidate_declarations(&schema.composition);
        for (i, field) in schema.required.iter().enumerate() {
            let missing: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(_, (block, refs))| {
                    if block.declared_names().any(|n| n == field) {
                        return false;
                    }
                    match refs {
                        None => true,
                        Some(refs) => self
                            .inherited(refs)
                            .is_some_and(|names| !names.contains(field.as_str())),
                    }
                })
                .map(|(idx, _)| idx)
                .collect();
            if !missing.is_empty() {
                self.report(
                    format!("/required/{i}"),
                    AuditRule::RequiredNotDeclared,
                    format!("required field '{field}' is not declared by candidate(s) {missing:?}"),
                );
            }
        }
    }

    fn block(
        &mut self,
        block: &PropertyBlock,
        required: &[String],
        declared: Declared<'_>,
        base: &str,
    ) {
        self.required_declared(
            required,
            &block.properties,
            None,
            declared,
            &format!("{base}/required"),
        );
        self.inputs(&block.properties, &format!("{base}/properties"));

        match (&block.if_clause, &block.then) {
            (Some(cond), then) => {
                let constrained: BTreeSet<&str> = cond.properties.keys().map(String::as_str).collect();
                for (i, field) in cond.required.iter().enumerate() {
                    if !constrained.contains(field.as_str()) {
                        self.report(
                            format!("{base}/if/required/{i}"),
                            AuditRule::IfRequiredNotDeclared,
                            format!("if clause requires '{field}' but does not constrain it"),
                        );
                    }
                }
                match then {
                    Some(then) => {
                        self.required_declared(
                            &then.required,
                            &block.properties,
                            Some(&then.properties),
                            declared,
                            &format!("{base}/then/required"),
                        );
                        self.inputs(&then.properties, &format!("{base}/then/properties"));
                    }
                    None => self.report(
                        format!("{base}/if"),
                        AuditRule::IfWithoutThen,
                        "if clause has no then branch".to_string(),
                    ),
                }
            }
            (None, Some(then)) => {
                self.inputs(&then.properties, &format!("{base}/then/properties"));
                self.report(
                    format!("{base}/then"),
                    AuditRule::ThenWithoutIf,
                    "then branch has no if clause".to_string(),
                );
            }
            (None, None) => {}
        }
    }

    fn required_declared(
        &mut self,
        required: &[String],
        base: &PropertyMap,
        then: Option<&PropertyMap>,
        declared: Declared<'_>,
        path: &str,
    ) {
        let inherited = match declared {
            Declared::Unknown => return,
            Declared::Own => None,
            Declared::Inherited(names) => Some(names),
        };
        for (i, field) in required.iter().enumerate() {
            let found = base.contains_key(field)
                || then.is_some_and(|t| t.contains_key(field))
                || inherited.is_some_and(|names| names.contains(field));
            if !found {
                self.report(
                    format!("{path}/{i}"),
                    AuditRule::RequiredNotDeclared,
                    format!("required field '{field}' is not declared"),
                );
            }
        }
    }

    fn inputs(&mut self, properties: &PropertyMap, path: &str) {
        for (name, prop) in properties {
            let Some(input) = &prop.input else { continue };
            if !input.has_required_options() {
                self.report(
                    format!("{path}/{}/input/options", escape_pointer(name)),
                    AuditRule::SelectWithoutOptions,
                    format!("select input for '{name}' has no options"),
                );
            }
        }
    }

    fn reference(&mut self, reference: &str, path: &str) {
        let Some(collection) = self.collection else { return };
        if collection.lookup(reference).is_none() {
            self.report(
                path.to_string(),
                AuditRule::DanglingReference,
                format!("reference '{reference}' names no schema in the collection"),
            );
        }
    }
}

/// Where a block's `required` entries may be declared besides its own maps.
#[derive(Clone, Copy)]
enum Declared<'s> {
    Own,
    /// Also in these names, inherited through `$ref`.
    Inherited(&'s BTreeSet<String>),
    /// The inherited names cannot be known; skip the check.
    Unknown,
}

/// Each candidate's own block and, for reference candidates, its refs.
fn candidate_declarations(
    composition: &Composition,
) -> Vec<(&PropertyBlock, Option<&[SchemaRef]>)> {
    match composition {
        Composition::OneOf(candidates) => candidates.iter().map(|c| (&c.block, None)).collect(),
        Composition::AnyOf(candidates) => candidates
            .iter()
            .map(|c| match c {
                AnyOfCandidate::Inline(p) => (&p.block, None),
                AnyOfCandidate::Reference(r) => (&r.block, Some(r.all_of.as_slice())),
            })
            .collect(),
    }
}

/// RFC 6901 escaping for a property name used as a pointer segment.
fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Audit one schema.
///
/// Pass the owning collection to also check `$ref` targets; without it,
/// references are not checked.
pub fn audit_schema(
    name: &str,
    schema: &CredentialSchema,
    collection: Option<&CredentialSchemaDto>,
) -> Vec<AuditFinding> {
    let mut auditor = Auditor {
        schema: name,
        collection,
        findings: Vec::new(),
    };
    match schema {
        CredentialSchema::Atomic(a) => auditor.atomic(a),
        CredentialSchema::Composite(c) => auditor.composite(c),
    }
    auditor.findings
}

/// Audit every schema in a collection, in credential type order.
pub fn audit_collection(collection: &CredentialSchemaDto) -> Vec<AuditFinding> {
    collection
        .schemas
        .iter()
        .flat_map(|(name, schema)| audit_schema(name, schema, Some(collection)))
        .collect()
}

impl CredentialSchemaDto {
    /// Return the collection if it has no audit findings.
    pub fn validated(self) -> Result<Self, SchemaError> {
        let findings = audit_collection(&self);
        if findings.is_empty() {
            Ok(self)
        } else {
            Err(SchemaError::Invalid { findings })
        }
    }
}
