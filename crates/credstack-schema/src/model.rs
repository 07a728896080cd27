//! # Credential Schema Model (schema-resolver v2)
//!
//! JSON-Schema-like descriptions of a credential type's `data` payload:
//! which fields exist, how they are displayed, how they are collected
//! from a user, and how the shape branches on the payload's contents.
//!
//! ## Variants
//!
//! A [`CredentialSchema`] is either **atomic** (a flat property map) or
//! **composite** (candidates combined with `anyOf` or `oneOf`). The wire
//! format has no tag, so decoding discriminates explicitly: a document
//! carrying `anyOf` or `oneOf` is composite, anything else is atomic, and
//! a document carrying both combinators is rejected. `anyOf` candidates
//! are discriminated the same way: a candidate with `allOf` is a
//! reference candidate, anything else is inline.
//!
//! ## Conditional Branches
//!
//! Any property block may carry an `if`/`then` pair. The `if` clause names
//! discriminator properties and the literal each must equal; when the
//! payload matches, the `then` properties are layered over the base
//! properties and the `then.required` list applies.

use std::collections::BTreeMap;
use std::fmt;

use credstack_core::{DisplayFormat, InputFormat};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Property name to property descriptor. Ordered so that resolved
/// property sets and audit output are deterministic.
pub type PropertyMap = BTreeMap<String, CredentialSchemaProperty>;

/// The JSON primitive a property's value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }

    /// Whether `value` is compatible with this type.
    ///
    /// With `lenient_numbers`, a string holding a decimal number satisfies
    /// `number`, and one holding an integer satisfies `integer`. Form
    /// inputs deliver everything as text.
    pub fn accepts(&self, value: &Value, lenient_numbers: bool) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => {
                value.is_number()
                    || (lenient_numbers
                        && value
                            .as_str()
                            .and_then(|s| s.trim().parse::<f64>().ok())
                            .is_some_and(f64::is_finite))
            }
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0)
                    || (lenient_numbers
                        && value.as_str().is_some_and(|s| s.trim().parse::<i64>().is_ok()))
            }
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Null => value.is_null(),
        }
    }

    fn object() -> Self {
        Self::Object
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The JSON type name of a payload value, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One entry of a select input's option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectOption {
    /// The value doubles as its label.
    Plain(String),
    Labeled { value: String, label: String },
}

impl SelectOption {
    pub fn value(&self) -> &str {
        match self {
            Self::Plain(v) => v,
            Self::Labeled { value, .. } => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Plain(v) => v,
            Self::Labeled { label, .. } => label,
        }
    }
}

/// The input used to collect a credential value from the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSchemaInput {
    #[serde(rename = "type")]
    pub kind: InputFormat,
    /// Options for select inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    /// Regex pattern for text inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl CredentialSchemaInput {
    /// A select input must offer at least one option. Other kinds may
    /// carry options but never need them.
    pub fn has_required_options(&self) -> bool {
        !self.kind.requires_options() || self.options.as_ref().is_some_and(|o| !o.is_empty())
    }
}

/// Display, format and input metadata for one credential field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSchemaProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    pub title: String,
    pub display_format: DisplayFormat,
    #[serde(rename = "type")]
    pub property_type: PrimitiveType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<CredentialSchemaInput>,
}

/// A discriminator inside an `if` clause: the property must equal `const`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstProperty {
    #[serde(rename = "type")]
    pub property_type: PrimitiveType,
    #[serde(rename = "const")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The `if` half of a conditional branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfClause {
    #[serde(rename = "type", default = "PrimitiveType::object")]
    pub schema_type: PrimitiveType,
    pub properties: BTreeMap<String, ConstProperty>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl IfClause {
    /// Whether every discriminator in the clause holds for `fields`.
    ///
    /// A discriminator that is absent from the payload, or present with a
    /// non-string value, does not match.
    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        self.required.iter().all(|name| fields.contains_key(name))
            && self.properties.iter().all(|(name, discriminator)| {
                fields
                    .get(name)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v == discriminator.value)
            })
    }
}

/// The `then` half of a conditional branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThenBranch {
    #[serde(rename = "type", default = "PrimitiveType::object")]
    pub schema_type: PrimitiveType,
    pub properties: PropertyMap,
    #[serde(default)]
    pub required: Vec<String>,
}

/// A property map with an optional conditional branch. Shared by atomic
/// schemas and every kind of composite candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBlock {
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub if_clause: Option<IfClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<ThenBranch>,
}

impl PropertyBlock {
    /// The `then` branch, if the block has a complete conditional whose
    /// `if` clause holds for `fields`.
    pub fn active_branch(&self, fields: &Map<String, Value>) -> Option<&ThenBranch> {
        match (&self.if_clause, &self.then) {
            (Some(cond), Some(then)) if cond.matches(fields) => Some(then),
            _ => None,
        }
    }

    /// Names declared by the base map or the `then` branch.
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .keys()
            .chain(self.then.iter().flat_map(|t| t.properties.keys()))
            .map(String::as_str)
    }
}

/// A flat schema: one property map, one required list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicCredentialSchema {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "type", default = "PrimitiveType::object")]
    pub schema_type: PrimitiveType,
    #[serde(flatten)]
    pub block: PropertyBlock,
    #[serde(default)]
    pub required: Vec<String>,
}

/// An inline composite candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeProperties {
    #[serde(flatten)]
    pub block: PropertyBlock,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// When false, the payload may not carry fields this candidate does
    /// not declare.
    #[serde(default = "default_true")]
    pub additional_properties: bool,
}

/// A `$ref` to another schema of the same collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// A composite candidate assembled from other schemas (`allOf`) plus an
/// optional property block of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeReference {
    pub all_of: Vec<SchemaRef>,
    #[serde(flatten)]
    pub block: PropertyBlock,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// An `anyOf` candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnyOfCandidate {
    Reference(CompositeReference),
    Inline(CompositeProperties),
}

impl AnyOfCandidate {
    /// References this candidate pulls in; empty for inline candidates.
    pub fn references(&self) -> &[SchemaRef] {
        match self {
            Self::Reference(r) => &r.all_of,
            Self::Inline(_) => &[],
        }
    }

    pub fn block(&self) -> &PropertyBlock {
        match self {
            Self::Reference(r) => &r.block,
            Self::Inline(p) => &p.block,
        }
    }

    pub fn required(&self) -> &[String] {
        match self {
            Self::Reference(r) => &r.required,
            Self::Inline(p) => &p.required,
        }
    }
}

impl<'de> Deserialize<'de> for AnyOfCandidate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if value.get("allOf").is_some() {
            serde_json::from_value(value).map(Self::Reference).map_err(D::Error::custom)
        } else {
            serde_json::from_value(value).map(Self::Inline).map_err(D::Error::custom)
        }
    }
}

/// How a composite schema combines its candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    /// At least one candidate must match.
    AnyOf(Vec<AnyOfCandidate>),
    /// Exactly one candidate must match.
    OneOf(Vec<CompositeProperties>),
}

impl Composition {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::AnyOf(_) => "anyOf",
            Self::OneOf(_) => "oneOf",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::AnyOf(c) => c.len(),
            Self::OneOf(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A schema composed from candidate property blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CompositeWire", into = "CompositeWire")]
pub struct CompositeCredentialSchema {
    pub id: String,
    /// Fields the payload must carry whichever candidate matches.
    pub required: Vec<String>,
    /// When false, a candidate only matches if the payload carries no
    /// field outside the candidate's effective property set.
    pub unevaluated_properties: bool,
    pub composition: Composition,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompositeWire {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default = "default_true")]
    unevaluated_properties: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    any_of: Option<Vec<AnyOfCandidate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    one_of: Option<Vec<CompositeProperties>>,
}

impl TryFrom<CompositeWire> for CompositeCredentialSchema {
    type Error = String;

    fn try_from(wire: CompositeWire) -> Result<Self, Self::Error> {
        let composition = match (wire.any_of, wire.one_of) {
            (Some(any), None) => Composition::AnyOf(any),
            (None, Some(one)) => Composition::OneOf(one),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "composite schema {:?} declares both anyOf and oneOf",
                    wire.id
                ))
            }
            (None, None) => {
                return Err(format!(
                    "composite schema {:?} declares neither anyOf nor oneOf",
                    wire.id
                ))
            }
        };
        Ok(Self {
            id: wire.id,
            required: wire.required,
            unevaluated_properties: wire.unevaluated_properties,
            composition,
        })
    }
}

impl From<CompositeCredentialSchema> for CompositeWire {
    fn from(schema: CompositeCredentialSchema) -> Self {
        let (any_of, one_of) = match schema.composition {
            Composition::AnyOf(c) => (Some(c), None),
            Composition::OneOf(c) => (None, Some(c)),
        };
        Self {
            id: schema.id,
            required: schema.required,
            unevaluated_properties: schema.unevaluated_properties,
            any_of,
            one_of,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Capabilities shared by every schema variant.
pub trait CredentialSchemaShape {
    /// The schema's `$id`.
    fn id(&self) -> &str;

    /// Top-level required fields.
    fn required(&self) -> &[String];

    /// Every property the schema declares without following references:
    /// base maps and `then` branches, first declaration winning.
    fn declared_properties(&self) -> PropertyMap;
}

fn merge_block_into(block: &PropertyBlock, out: &mut PropertyMap) {
    let then_props = block.then.iter().flat_map(|t| t.properties.iter());
    for (name, prop) in block.properties.iter().chain(then_props) {
        out.entry(name.clone()).or_insert_with(|| prop.clone());
    }
}

impl CredentialSchemaShape for AtomicCredentialSchema {
    fn id(&self) -> &str {
        &self.id
    }

    fn required(&self) -> &[String] {
        &self.required
    }

    fn declared_properties(&self) -> PropertyMap {
        let mut out = PropertyMap::new();
        merge_block_into(&self.block, &mut out);
        out
    }
}

impl CredentialSchemaShape for CompositeCredentialSchema {
    fn id(&self) -> &str {
        &self.id
    }

    fn required(&self) -> &[String] {
        &self.required
    }

    fn declared_properties(&self) -> PropertyMap {
        let mut out = PropertyMap::new();
        match &self.composition {
            Composition::AnyOf(cands) => {
                for c in cands {
                    merge_block_into(c.block(), &mut out);
                }
            }
            Composition::OneOf(cands) => {
                for c in cands {
                    merge_block_into(&c.block, &mut out);
                }
            }
        }
        out
    }
}

/// A credential type's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CredentialSchema {
    Atomic(AtomicCredentialSchema),
    Composite(CompositeCredentialSchema),
}

impl CredentialSchema {
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    pub fn as_atomic(&self) -> Option<&AtomicCredentialSchema> {
        match self {
            Self::Atomic(a) => Some(a),
            Self::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeCredentialSchema> {
        match self {
            Self::Composite(c) => Some(c),
            Self::Atomic(_) => None,
        }
    }
}

impl CredentialSchemaShape for CredentialSchema {
    fn id(&self) -> &str {
        match self {
            Self::Atomic(a) => a.id(),
            Self::Composite(c) => c.id(),
        }
    }

    fn required(&self) -> &[String] {
        match self {
            Self::Atomic(a) => a.required(),
            Self::Composite(c) => c.required(),
        }
    }

    fn declared_properties(&self) -> PropertyMap {
        match self {
            Self::Atomic(a) => a.declared_properties(),
            Self::Composite(c) => c.declared_properties(),
        }
    }
}

impl<'de> Deserialize<'de> for CredentialSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if value.get("anyOf").is_some() || value.get("oneOf").is_some() {
            serde_json::from_value(value).map(Self::Composite).map_err(D::Error::custom)
        } else {
            serde_json::from_value(value).map(Self::Atomic).map_err(D::Error::custom)
        }
    }
}

/// The schema-resolver v2 response: credential type name to schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSchemaDto {
    pub schemas: BTreeMap<String, CredentialSchema>,
}

impl CredentialSchemaDto {
    pub fn get(&self, credential_type: &str) -> Option<&CredentialSchema> {
        self.schemas.get(credential_type)
    }

    /// Find the schema a `$ref` points at.
    ///
    /// Tries, in order: the reference as a credential type name, a schema
    /// whose `$id` equals the reference, and the final `/`- or
    /// `#`-separated segment of the reference as a credential type name.
    pub fn lookup(&self, reference: &str) -> Option<(&str, &CredentialSchema)> {
        if let Some((name, schema)) = self.schemas.get_key_value(reference) {
            return Some((name.as_str(), schema));
        }

        if let Some((name, schema)) = self.schemas.iter().find(|(_, s)| s.id() == reference) {
            return Some((name.as_str(), schema));
        }

        let tail = reference
            .rsplit(['/', '#'])
            .next()
            .filter(|t| !t.is_empty() && *t != reference)?;
        self.schemas
            .get_key_value(tail)
            .map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn credential_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
