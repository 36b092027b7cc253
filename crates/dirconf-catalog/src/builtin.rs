//! Built-in resource kinds.

use dirconf_core::{FieldSpec, Format, VariantPolicy};

use crate::Result;
use crate::kind::ResourceKind;

/// All built-in kinds
pub fn all() -> Result<Vec<ResourceKind>> {
    Ok(vec![gauge()?, trust_manager_provider()?, server_group()])
}

/// Monitoring gauges, measured either against numeric thresholds or
/// against string patterns.
pub fn gauge() -> Result<ResourceKind> {
    let fields = vec![
        FieldSpec::string("gauge_data_source"),
        FieldSpec::string("description"),
        FieldSpec::bool("enabled"),
        FieldSpec::string("override_severity").with_format(Format::CaseInsensitive),
        FieldSpec::set("alert_level"),
        FieldSpec::duration("update_interval"),
        FieldSpec::integer("samples_per_update_interval"),
        FieldSpec::set("include_resource"),
        FieldSpec::string("server_unavailable_severity_level")
            .with_format(Format::CaseInsensitive),
        FieldSpec::string("server_degraded_severity_level").with_format(Format::CaseInsensitive),
        FieldSpec::float("critical_value"),
        FieldSpec::float("major_value"),
        FieldSpec::float("minor_value"),
        FieldSpec::float("warning_value"),
        FieldSpec::string("critical_value_pattern"),
        FieldSpec::string("major_value_pattern"),
        FieldSpec::string("minor_value_pattern"),
        FieldSpec::string("warning_value_pattern"),
    ];
    let shared = [
        "description",
        "enabled",
        "override_severity",
        "alert_level",
        "update_interval",
        "samples_per_update_interval",
        "include_resource",
        "server_unavailable_severity_level",
        "server_degraded_severity_level",
    ];

    ResourceKind::new("gauge", fields).with_variants(vec![
        VariantPolicy::new("numeric")
            .require(["gauge_data_source"])
            .allow(shared)
            .allow(["critical_value", "major_value", "minor_value", "warning_value"]),
        VariantPolicy::new("indicator")
            .require(["gauge_data_source"])
            .allow(shared)
            .allow([
                "critical_value_pattern",
                "major_value_pattern",
                "minor_value_pattern",
                "warning_value_pattern",
            ]),
    ])
}

/// Trust manager providers. `trust_store_pin` is never echoed back.
pub fn trust_manager_provider() -> Result<ResourceKind> {
    let fields = vec![
        FieldSpec::bool("enabled"),
        FieldSpec::bool("include_jvm_trust_manager").with_wire_name("includeJVMTrustManager"),
        FieldSpec::string("trust_store_file"),
        FieldSpec::string("trust_store_type").with_format(Format::CaseInsensitive),
        FieldSpec::string("trust_store_pin").write_only(),
        FieldSpec::string("trust_store_pin_file"),
        FieldSpec::string("trust_store_pin_passphrase_provider"),
        FieldSpec::string("extension_class"),
        FieldSpec::set("extension_argument"),
    ];

    ResourceKind::new("trust_manager_provider", fields).with_variants(vec![
        VariantPolicy::new("file-based")
            .require(["enabled", "trust_store_file"])
            .allow([
                "include_jvm_trust_manager",
                "trust_store_type",
                "trust_store_pin",
                "trust_store_pin_file",
                "trust_store_pin_passphrase_provider",
            ]),
        VariantPolicy::new("jvm-default").require(["enabled"]),
        VariantPolicy::new("third-party")
            .require(["enabled", "extension_class"])
            .allow(["include_jvm_trust_manager", "extension_argument"]),
        VariantPolicy::new("blind-trust")
            .require(["enabled"])
            .allow(["include_jvm_trust_manager"]),
    ])
}

/// Server groups; not polymorphic
pub fn server_group() -> ResourceKind {
    ResourceKind::new("server_group", vec![FieldSpec::set("member_server")])
}
