//! Property tests for resolver invariants and schema wire round trips.

use std::collections::{BTreeMap, BTreeSet};

use credstack_schema::{
    CredentialSchema, CredentialSchemaDto, MatchedBranch, ResolveError, ResolveOptions,
    SchemaResolver,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const PRIMITIVES: [&str; 4] = ["string", "number", "integer", "boolean"];

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,7}".prop_filter("reserved discriminator", |s| s != "kind")
}

fn sample_value(ty: &str) -> Value {
    match ty {
        "string" => json!("value"),
        "number" => json!(1.5),
        "integer" => json!(7),
        "boolean" => json!(true),
        _ => Value::Null,
    }
}

fn property(title: &str, ty: &str) -> Value {
    json!({ "title": title, "displayFormat": "String", "type": ty })
}

fn single(name: &str, schema: Value) -> CredentialSchemaDto {
    serde_json::from_value(json!({ "schemas": { name: schema } })).unwrap()
}

/// Field name to (primitive type, required).
fn atomic_fields() -> impl Strategy<Value = BTreeMap<String, (&'static str, bool)>> {
    prop::collection::btree_map(
        field_name(),
        (prop::sample::select(PRIMITIVES.to_vec()), any::<bool>()),
        1..6,
    )
}

fn atomic_doc(fields: &BTreeMap<String, (&'static str, bool)>) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|(name, (ty, _))| (name.clone(), property(name, ty)))
        .collect();
    let required: Vec<&String> = fields
        .iter()
        .filter(|(_, (_, required))| *required)
        .map(|(name, _)| name)
        .collect();
    json!({ "$id": "Generated", "type": "object", "properties": properties, "required": required })
}

fn full_payload(fields: &BTreeMap<String, (&'static str, bool)>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, (ty, _))| (name.clone(), sample_value(ty)))
        .collect()
}

proptest! {
    #[test]
    fn atomic_well_typed_payload_resolves(fields in atomic_fields()) {
        let dto = single("Generated", atomic_doc(&fields));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let payload = Value::Object(full_payload(&fields));

        let resolved = resolver.resolve("Generated", &payload).unwrap();
        let names: BTreeSet<&str> = resolved.property_names().collect();
        let expected: BTreeSet<&str> = fields.keys().map(String::as_str).collect();
        prop_assert_eq!(names, expected);
        prop_assert_eq!(resolved.branch, MatchedBranch::Atomic);
    }

    #[test]
    fn atomic_missing_required_field_is_reported(fields in atomic_fields()) {
        let dto = single("Generated", atomic_doc(&fields));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());

        for (name, (_, required)) in &fields {
            if !required {
                continue;
            }
            let mut payload = full_payload(&fields);
            payload.remove(name);
            let err = resolver.resolve("Generated", &Value::Object(payload)).unwrap_err();
            prop_assert_eq!(err, ResolveError::MissingRequiredField { field: name.clone() });
        }
    }

    #[test]
    fn conditional_branch_merges_with_then_precedence(
        base in prop::collection::btree_set(field_name(), 0..4),
        then in prop::collection::btree_set(field_name(), 1..4),
        matched in any::<bool>(),
    ) {
        let mut base_props: Map<String, Value> =
            base.iter().map(|n| (n.clone(), property("base", "string"))).collect();
        base_props.insert("kind".into(), property("base", "string"));
        let then_props: Map<String, Value> =
            then.iter().map(|n| (n.clone(), property("then", "string"))).collect();

        let dto = single("Conditional", json!({
            "$id": "Conditional",
            "properties": base_props,
            "if": { "properties": { "kind": { "type": "string", "const": "X" } }, "required": ["kind"] },
            "then": { "properties": then_props }
        }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let discriminator = if matched { "X" } else { "Y" };
        let resolved = resolver.resolve("Conditional", &json!({ "kind": discriminator })).unwrap();

        let mut expected: BTreeSet<String> = base.clone();
        expected.insert("kind".into());
        if matched {
            expected.extend(then.iter().cloned());
        }
        let names: BTreeSet<String> = resolved.properties.keys().cloned().collect();
        prop_assert_eq!(names, expected);
        prop_assert_eq!(resolved.conditional_applied, matched);

        for (name, prop) in &resolved.properties {
            let from_then = matched && then.contains(name);
            prop_assert_eq!(prop.title.as_str(), if from_then { "then" } else { "base" });
        }
    }

    #[test]
    fn one_of_selects_exactly_the_matching_closed_candidate(
        names in prop::collection::btree_set(field_name(), 2..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let candidates: Vec<Value> = names
            .iter()
            .map(|n| json!({
                "properties": { n.as_str(): property(n, "string") },
                "required": [n],
                "additionalProperties": false
            }))
            .collect();
        let dto = single("Choice", json!({ "$id": "Choice", "oneOf": candidates }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());

        let k = pick.index(names.len());
        let resolved = resolver.resolve("Choice", &json!({ names[k].as_str(): "v" })).unwrap();
        prop_assert_eq!(resolved.branch, MatchedBranch::OneOf { index: k });
    }

    #[test]
    fn one_of_two_open_matches_are_ambiguous(
        names in prop::collection::btree_set(field_name(), 2..6),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let (i, j) = (a.index(names.len()), b.index(names.len()));
        prop_assume!(i != j);
        let candidates: Vec<Value> = names
            .iter()
            .map(|n| json!({ "properties": { n.as_str(): property(n, "string") }, "required": [n] }))
            .collect();
        let dto = single("Choice", json!({ "$id": "Choice", "oneOf": candidates }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());

        let payload = json!({ names[i].as_str(): "v", names[j].as_str(): "w" });
        let err = resolver.resolve("Choice", &payload).unwrap_err();
        prop_assert_eq!(
            err,
            ResolveError::AmbiguousMatch { schema: "Choice".into(), matched: vec![i.min(j), i.max(j)] }
        );
    }

    #[test]
    fn any_of_dangling_reference_is_unresolved(
        missing in field_name(),
        payload in prop::collection::btree_map(field_name(), "[a-z]{0,4}", 0..4),
    ) {
        let dto = single("Contact", json!({
            "$id": "Contact",
            "anyOf": [
                { "properties": {} },
                { "allOf": [{ "$ref": format!("#/schemas/{missing}") }] }
            ]
        }));
        let resolver = SchemaResolver::new(&dto, ResolveOptions::default());
        let payload: Map<String, Value> =
            payload.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
        let err = resolver.resolve("Contact", &Value::Object(payload)).unwrap_err();
        prop_assert_eq!(err.code(), "UNRESOLVED_REFERENCE");
    }

    #[test]
    fn atomic_schema_wire_round_trip(fields in atomic_fields()) {
        let schema: CredentialSchema = serde_json::from_value(atomic_doc(&fields)).unwrap();
        let wire = serde_json::to_string(&schema).unwrap();
        let back: CredentialSchema = serde_json::from_str(&wire).unwrap();
        prop_assert_eq!(back, schema);
    }

    #[test]
    fn composite_schema_wire_round_trip(
        names in prop::collection::btree_set(field_name(), 1..5),
        closed in any::<bool>(),
        use_one_of in any::<bool>(),
    ) {
        let candidates: Vec<Value> = names
            .iter()
            .map(|n| json!({
                "properties": { n.as_str(): property(n, "string") },
                "required": [n],
                "additionalProperties": !closed
            }))
            .collect();
        let keyword = if use_one_of { "oneOf" } else { "anyOf" };
        let mut doc = json!({
            "$id": "Composite",
            "required": [],
            "unevaluatedProperties": !closed
        });
        doc[keyword] = Value::Array(candidates);
        if !use_one_of {
            doc["anyOf"]
                .as_array_mut()
                .unwrap()
                .push(json!({ "allOf": [{ "$ref": "#/schemas/Other" }] }));
        }

        let schema: CredentialSchema = serde_json::from_value(doc).unwrap();
        prop_assert!(schema.is_composite());
        let wire = serde_json::to_string(&schema).unwrap();
        let back: CredentialSchema = serde_json::from_str(&wire).unwrap();
        prop_assert_eq!(back, schema);
    }
}
