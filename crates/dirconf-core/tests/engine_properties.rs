//! Property-based tests for the reconciliation engine.
//!
//! These tests check the laws every plan must satisfy:
//! - Idempotence: applying a plan and planning again yields nothing
//! - No-op stability: a record compared to itself yields nothing
//! - Set-diff minimality: collection deltas never touch shared elements
//! - Determinism: identical inputs serialize to identical plans
//! - Discriminator completeness: records built from a variant's allowed
//!   attributes always validate

use dirconf_core::{
    AttributeKind, AttributeValue, CollectionDelta, ConfigurationRecord, DiscriminatorPolicy, FieldSpec,
    VariantPolicy, build_operations,
};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("description"),
        FieldSpec::bool("enabled"),
        FieldSpec::integer("samples_per_update_interval"),
        FieldSpec::float("critical_value"),
        FieldSpec::set("member_server"),
        FieldSpec::string("config_version").read_only(),
    ]
}

fn string_value() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        Just(AttributeValue::Absent),
        Just(AttributeValue::Null),
        Just(AttributeValue::string("")),
        "[a-c]{1,3}".prop_map(AttributeValue::String),
    ]
}

fn bool_value() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        Just(AttributeValue::Absent),
        Just(AttributeValue::Null),
        any::<bool>().prop_map(AttributeValue::Bool),
    ]
}

fn integer_value() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        Just(AttributeValue::Absent),
        (-1000i64..1000).prop_map(AttributeValue::Integer),
    ]
}

fn float_value() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        Just(AttributeValue::Absent),
        Just(AttributeValue::Null),
        (-1000.0f64..1000.0).prop_map(AttributeValue::Float),
        (-10i64..10).prop_map(AttributeValue::Integer),
        // Server spellings; non-finite ones never decode into a record
        float_spelling().prop_filter_map("non-finite spelling", |s| {
            AttributeValue::from_json(AttributeKind::Float, &json!(s)).ok()
        }),
    ]
}

fn float_spelling() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,3}(\\.[0-9]{1,2})?",
        Just("NaN".to_string()),
        Just("inf".to_string()),
        Just("-Infinity".to_string()),
    ]
}

fn set_items() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-f]", 0..6)
}

fn set_value() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        Just(AttributeValue::Absent),
        Just(AttributeValue::Null),
        set_items().prop_map(AttributeValue::set),
    ]
}

fn record_strategy() -> impl Strategy<Value = ConfigurationRecord> {
    (
        string_value(),
        bool_value(),
        integer_value(),
        float_value(),
        set_value(),
        string_value(),
    )
        .prop_map(|(description, enabled, samples, critical, members, version)| {
            ConfigurationRecord::for_fields(&fields())
                .with("description", description)
                .with("enabled", enabled)
                .with("samples_per_update_interval", samples)
                .with("critical_value", critical)
                .with("member_server", members)
                .with("config_version", version)
        })
}

// =============================================================================
// DECODING PROPERTIES
// =============================================================================

mod decoding_properties {
    use super::*;

    proptest! {
        /// Decoded floats are finite or rejected, so they always equal themselves
        #[test]
        fn decoded_floats_are_finite(spelling in float_spelling()) {
            match AttributeValue::from_json(AttributeKind::Float, &json!(spelling)) {
                Ok(AttributeValue::Float(f)) => prop_assert!(f.is_finite()),
                Ok(other) => prop_assert!(false, "unexpected {:?}", other),
                Err(message) => prop_assert!(message.contains("finite"), "{}", message),
            }
        }
    }
}

// =============================================================================
// OPERATION SEQUENCER PROPERTIES
// =============================================================================

mod sequencer_properties {
    use super::*;

    proptest! {
        /// Idempotence: plan(desired, apply(observed, plan(desired, observed))) is empty
        #[test]
        fn plan_is_idempotent(
            desired in record_strategy(),
            observed in record_strategy(),
        ) {
            let ops = build_operations(&desired, &observed, &fields()).unwrap();
            let converged = observed.apply(&ops);
            let again = build_operations(&desired, &converged, &fields()).unwrap();
            prop_assert!(again.is_empty(), "second plan was {:?}", again);
        }

        /// No-op stability: a record never differs from itself
        #[test]
        fn identical_records_plan_nothing(record in record_strategy()) {
            let ops = build_operations(&record, &record, &fields()).unwrap();
            prop_assert!(ops.is_empty());
        }

        /// Determinism: identical inputs produce byte-identical plans
        #[test]
        fn plan_is_deterministic(
            desired in record_strategy(),
            observed in record_strategy(),
        ) {
            let first = build_operations(&desired, &observed, &fields()).unwrap();
            let second = build_operations(&desired.clone(), &observed.clone(), &fields()).unwrap();
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }

        /// Read-only attributes never appear in a plan
        #[test]
        fn read_only_never_planned(
            desired in record_strategy(),
            observed in record_strategy(),
        ) {
            let ops = build_operations(&desired, &observed, &fields()).unwrap();
            prop_assert!(ops.iter().all(|op| op.attribute != "config_version"));
        }
    }
}

// =============================================================================
// COLLECTION DELTA PROPERTIES
// =============================================================================

mod collection_properties {
    use super::*;

    proptest! {
        /// Minimality: deltas are bounded by the union and skip shared elements
        #[test]
        fn delta_is_minimal(desired in set_items(), observed in set_items()) {
            let delta = CollectionDelta::between(&desired, &observed);

            let desired_set: HashSet<&String> = desired.iter().collect();
            let observed_set: HashSet<&String> = observed.iter().collect();
            let union: HashSet<&String> = desired_set.union(&observed_set).copied().collect();

            prop_assert!(delta.to_add.len() + delta.to_remove.len() <= union.len());
            prop_assert!(delta.to_add.iter().all(|e| !observed_set.contains(e)));
            prop_assert!(delta.to_remove.iter().all(|e| !desired_set.contains(e)));
        }

        /// Each element appears at most once in a delta
        #[test]
        fn delta_has_no_duplicates(desired in set_items(), observed in set_items()) {
            let delta = CollectionDelta::between(&desired, &observed);
            let adds: HashSet<&String> = delta.to_add.iter().collect();
            let removes: HashSet<&String> = delta.to_remove.iter().collect();
            prop_assert_eq!(adds.len(), delta.to_add.len());
            prop_assert_eq!(removes.len(), delta.to_remove.len());
        }
    }
}

// =============================================================================
// DISCRIMINATOR PROPERTIES
// =============================================================================

mod discriminator_properties {
    use super::*;

    fn gauge_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::string("gauge_data_source"),
            FieldSpec::string("description"),
            FieldSpec::float("critical_value"),
            FieldSpec::float("warning_value"),
            FieldSpec::string("critical_value_pattern"),
            FieldSpec::string("warning_value_pattern"),
            FieldSpec::set("include_resource"),
        ]
    }

    fn gauge_policy() -> DiscriminatorPolicy {
        DiscriminatorPolicy::new(
            &gauge_fields(),
            vec![
                VariantPolicy::new("numeric")
                    .require(["gauge_data_source"])
                    .allow(["description", "critical_value", "warning_value", "include_resource"]),
                VariantPolicy::new("indicator")
                    .require(["gauge_data_source"])
                    .allow([
                        "description",
                        "critical_value_pattern",
                        "warning_value_pattern",
                        "include_resource",
                    ]),
            ],
        )
        .unwrap()
    }

    fn concrete_for(field: &FieldSpec) -> AttributeValue {
        match field.kind {
            dirconf_core::AttributeKind::Float => AttributeValue::Float(1.5),
            dirconf_core::AttributeKind::Set => AttributeValue::set(["cpu"]),
            _ => AttributeValue::string("value"),
        }
    }

    proptest! {
        /// Completeness: populating any subset of allowed attributes plus all
        /// required ones validates clean
        #[test]
        fn allowed_records_validate(
            use_indicator in any::<bool>(),
            mask in prop::collection::vec(any::<bool>(), 7),
        ) {
            let policy = gauge_policy();
            let tag = if use_indicator { "indicator" } else { "numeric" };
            let variant = policy.variant(tag).unwrap();
            prop_assert!(variant.required.is_subset(&variant.allowed));

            let mut record = ConfigurationRecord::for_fields(&gauge_fields()).with_variant(tag);
            for (field, include) in gauge_fields().iter().zip(mask) {
                let required = variant.required.contains(&field.name);
                if required || (include && variant.allows(&field.name)) {
                    record.set(field.name.clone(), concrete_for(field));
                }
            }
            prop_assert!(policy.validate(&record).is_empty());
        }

        /// A prepared record always validates, whatever it held for other variants
        #[test]
        fn prepared_records_validate(use_indicator in any::<bool>()) {
            let policy = gauge_policy();
            let tag = if use_indicator { "indicator" } else { "numeric" };
            let record = ConfigurationRecord::for_fields(&gauge_fields())
                .with_variant(tag)
                .with("gauge_data_source", "CPU Usage");
            let prepared = policy.prepare(&record).unwrap();
            prop_assert!(policy.validate(&prepared).is_empty());
        }
    }
}
