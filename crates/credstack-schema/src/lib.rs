//! # credstack-schema — Credential Schemas
//!
//! Typed model and resolution logic for the two schema-resolver APIs.
//!
//! ## Display Groupings (`grouping`)
//!
//! The v1 response: credential types bucketed under display headings.
//! Shape only.
//!
//! ## Credential Schemas (`model`)
//!
//! The v2 response: per credential type, an atomic or composite
//! JSON-Schema-like description of the credential's `data` payload, with
//! display and input metadata per field. Decoding discriminates the
//! variants explicitly and rejects unknown display or input formats.
//!
//! ## Checking and Loading (`audit`, `document`)
//!
//! [`audit_collection`] reports structural defects that decoding cannot
//! catch. [`MetaSchemaValidator`] checks raw documents against the bundled
//! meta-schema and loads them through decode and audit. Key function:
//!
//! - [`load_collection`] — JSON or YAML file to an audited
//!   [`CredentialSchemaDto`].
//!
//! ## Resolution (`resolve`)
//!
//! [`SchemaResolver`] decides which branch of a schema a payload matches
//! and returns the effective property set, or a typed [`ResolveError`].
//!
//! ## Crate Policy
//!
//! - Depends only on `credstack-core` internally.
//! - Resolution is pure: no I/O, no interior mutability, no global state.
//! - Loading is the only I/O, and every error names the document.

pub mod audit;
pub mod document;
pub mod error;
pub mod grouping;
pub mod model;
pub mod resolve;

pub use audit::{audit_collection, audit_schema, AuditFinding, AuditRule};
pub use document::{
    load_collection, DocumentFormat, MetaSchemaValidator, ValidationViolations, Violation,
};
pub use error::SchemaError;
pub use grouping::{
    CredentialSchemaData, PresentationSchema, PresentationSchemaAttributes, SchemaGroupings,
    SchemaPresentationDto,
};
pub use model::{
    AnyOfCandidate, AtomicCredentialSchema, CompositeCredentialSchema, CompositeProperties,
    CompositeReference, Composition, ConstProperty, CredentialSchema, CredentialSchemaDto,
    CredentialSchemaInput, CredentialSchemaProperty, CredentialSchemaShape, IfClause,
    PrimitiveType, PropertyBlock, PropertyMap, SchemaRef, SelectOption, ThenBranch,
};
pub use resolve::{
    CandidateFailure, MatchedBranch, ResolveError, ResolveOptions, ResolvedSchema, SchemaResolver,
};
