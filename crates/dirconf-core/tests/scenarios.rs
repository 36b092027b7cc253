//! End-to-end scenarios: plan against an observed record, apply the plan the
//! way the server would, then map the server's answer back.

use dirconf_core::{
    AttributeValue, ConfigurationRecord, DiscriminatorPolicy, FieldSpec, MappingWarning,
    Operation, ResponseBody, ResponsePayload, VariantPolicy, build_operations, detect_scalar,
    map_response,
};
use serde_json::{Value, json};

fn gauge_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("gauge_data_source"),
        FieldSpec::string("description"),
        FieldSpec::bool("enabled"),
        FieldSpec::duration("update_interval"),
        FieldSpec::float("critical_value"),
        FieldSpec::string("critical_value_pattern"),
        FieldSpec::set("servers"),
    ]
}

fn gauge_policy() -> DiscriminatorPolicy {
    DiscriminatorPolicy::new(
        &gauge_fields(),
        vec![
            VariantPolicy::new("numeric")
                .require(["gauge_data_source"])
                .allow(["description", "enabled", "update_interval", "critical_value", "servers"]),
            VariantPolicy::new("indicator")
                .require(["gauge_data_source"])
                .allow([
                    "description",
                    "enabled",
                    "update_interval",
                    "critical_value_pattern",
                    "servers",
                ]),
        ],
    )
    .unwrap()
}

fn empty() -> ConfigurationRecord {
    ConfigurationRecord::for_fields(&gauge_fields())
}

#[test]
fn scalar_replace() {
    let desired = empty().with("enabled", true);
    let observed = empty().with("enabled", false);
    let ops = build_operations(&desired, &observed, &gauge_fields()).unwrap();
    assert_eq!(ops, vec![Operation::replace("enabled", vec![json!(true)])]);
}

#[test]
fn set_delta() {
    let desired = empty().with("servers", AttributeValue::set(["A", "B", "C"]));
    let observed = empty().with("servers", AttributeValue::set(["A", "D"]));
    let ops = build_operations(&desired, &observed, &gauge_fields()).unwrap();
    assert_eq!(
        ops,
        vec![
            Operation::add("servers", ["B", "C"]),
            Operation::delete("servers", ["D"]),
        ]
    );
    assert_eq!(
        serde_json::to_value(&ops).unwrap(),
        json!([
            {"op": "add", "path": "servers", "value": ["B", "C"]},
            {"op": "remove", "path": "servers", "value": ["D"]},
        ])
    );
}

#[test]
fn null_empty_equivalence() {
    assert_eq!(
        detect_scalar("description", &AttributeValue::string(""), &AttributeValue::Null),
        None
    );
    assert_eq!(
        detect_scalar("description", &AttributeValue::string(""), &AttributeValue::string("x")),
        Some(Operation::replace("description", vec![json!("")]))
    );
}

#[test]
fn variant_violation() {
    let record = empty()
        .with_variant("numeric")
        .with("gauge_data_source", "CPU Usage")
        .with("critical_value_pattern", "down");
    let errors = gauge_policy().validate(&record);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].attribute.as_deref(), Some("critical_value_pattern"));
    assert!(errors[0].message.contains("numeric"));
}

#[test]
fn secret_preservation() {
    let fields = vec![
        FieldSpec::string("trust_store_file"),
        FieldSpec::string("trust_store_pin").write_only(),
    ];
    let expected = ConfigurationRecord::for_fields(&fields)
        .with_variant("file-based")
        .with("trust_store_file", "config/truststore")
        .with("trust_store_pin", "secret");
    let payload = ResponsePayload::new().with_slot(
        "file-based",
        Some(
            ResponseBody::new()
                .with("trust_store_file", json!("config/truststore"))
                .with("trust_store_pin", Value::Null),
        ),
    );
    let mapped = map_response(&payload, &expected, &fields).unwrap();
    assert_eq!(
        mapped.record.get("trust_store_pin"),
        Some(&AttributeValue::string("secret"))
    );
    assert!(mapped.warnings.is_empty());
}

#[test]
fn variant_switch_clears_foreign_attributes() {
    let policy = gauge_policy();
    let observed = empty()
        .with_variant("numeric")
        .with("gauge_data_source", "CPU Usage")
        .with("critical_value", 95.0);
    let desired = empty()
        .with_variant("indicator")
        .with("gauge_data_source", "CPU Usage")
        .with("critical_value_pattern", "down");

    let prepared = policy.prepare(&desired).unwrap();
    let ops = build_operations(&prepared, &observed, &gauge_fields()).unwrap();

    // Floats have no null sentinel on the wire; only the pattern is patched
    assert_eq!(
        ops,
        vec![Operation::replace("critical_value_pattern", vec![json!("down")])]
    );
}

#[test]
fn full_cycle_converges() {
    let fields = gauge_fields();
    let desired = empty()
        .with_variant("numeric")
        .with("gauge_data_source", "CPU Usage")
        .with("description", "")
        .with("update_interval", "60 s")
        .with("servers", AttributeValue::set(["ds1", "ds2"]));
    let observed = empty()
        .with_variant("numeric")
        .with("gauge_data_source", "CPU Usage")
        .with("update_interval", "10 s")
        .with("servers", AttributeValue::set(["ds3"]));

    let prepared = gauge_policy().prepare(&desired).unwrap();
    let ops = build_operations(&prepared, &observed, &fields).unwrap();
    assert_eq!(ops.len(), 3);

    // The server canonicalizes the duration and reorders the set
    let payload = ResponsePayload::new()
        .with_slot(
            "numeric",
            Some(
                ResponseBody::new()
                    .with("gauge_data_source", json!("CPU Usage"))
                    .with("update_interval", json!("1 m"))
                    .with("servers", json!(["ds2", "ds1"])),
            ),
        )
        .with_slot("indicator", None);
    let mapped = map_response(&payload, &prepared, &fields).unwrap();

    assert_eq!(mapped.record.get("description"), Some(&AttributeValue::string("")));
    assert_eq!(mapped.record.get("update_interval"), Some(&AttributeValue::string("60 s")));
    assert_eq!(
        mapped.record.get("servers"),
        Some(&AttributeValue::set(["ds1", "ds2"]))
    );
    assert!(matches!(
        mapped.warnings.as_slice(),
        [MappingWarning::Reformatted { attribute, .. }] if attribute == "update_interval"
    ));

    // Nothing left to do on the next plan
    let next = build_operations(&prepared, &mapped.record, &fields).unwrap();
    assert!(next.is_empty(), "unexpected drift: {next:?}");
}
