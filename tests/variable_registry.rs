// tests/variable_registry.rs

use stackdag::errors::VarError;
use stackdag::vars::{VarKind, VarRegistry, VarSpec, VarValue};

#[test]
fn duplicate_declaration_is_rejected() {
    let mut vars = VarRegistry::new();
    vars.declare(VarSpec::required("eks_cluster")).unwrap();

    let err = vars.declare(VarSpec::optional("eks_cluster")).unwrap_err();
    assert_eq!(err, VarError::DuplicateKey("eks_cluster".to_string()));
}

#[test]
fn default_violating_type_is_rejected() {
    let mut vars = VarRegistry::new();
    let err = vars
        .declare(
            VarSpec::optional("eks_node_max_capacity")
                .types(&[VarKind::Int])
                .default("not-a-number"),
        )
        .unwrap_err();
    assert!(matches!(err, VarError::InvalidDefault { key, .. } if key == "eks_node_max_capacity"));
}

#[test]
fn default_violating_choices_is_rejected() {
    let mut vars = VarRegistry::new();
    let err = vars
        .declare(
            VarSpec::optional("external_dns_policy")
                .choices(&["upsert-only", "sync"])
                .default("delete-everything"),
        )
        .unwrap_err();
    assert!(matches!(err, VarError::InvalidDefault { .. }));
}

#[test]
fn resolving_undeclared_key_is_rejected() {
    let mut vars = VarRegistry::new();
    let err = vars.resolve("ghost", VarValue::from("x")).unwrap_err();
    assert_eq!(err, VarError::UnknownKey("ghost".to_string()));
}

#[test]
fn type_mismatch_is_rejected_at_resolution() {
    let mut vars = VarRegistry::new();
    vars.declare(VarSpec::optional("count").types(&[VarKind::Int]))
        .unwrap();

    let err = vars.resolve("count", VarValue::from("many")).unwrap_err();
    assert!(matches!(err, VarError::TypeMismatch { key, .. } if key == "count"));
}

#[test]
fn choice_violation_is_rejected_at_resolution() {
    let mut vars = VarRegistry::new();
    vars.declare(
        VarSpec::optional("capacity_type").choices(&["ON_DEMAND", "SPOT"]),
    )
    .unwrap();

    let err = vars
        .resolve("capacity_type", VarValue::from("RESERVED"))
        .unwrap_err();
    assert!(matches!(err, VarError::ChoiceViolation { key, .. } if key == "capacity_type"));
}

#[test]
fn strings_coerce_to_declared_scalar_types() {
    let mut vars = VarRegistry::new();
    vars.declare(VarSpec::optional("count").types(&[VarKind::Int]))
        .unwrap();
    vars.declare(VarSpec::optional("version").types(&[VarKind::Float]))
        .unwrap();
    vars.declare(VarSpec::optional("enabled").types(&[VarKind::Bool]))
        .unwrap();

    vars.resolve("count", VarValue::from("2")).unwrap();
    vars.resolve("version", VarValue::from("1.25")).unwrap();
    vars.resolve("enabled", VarValue::from("true")).unwrap();

    assert_eq!(vars.value_of("count"), Some(&VarValue::Int(2)));
    assert_eq!(vars.value_of("version"), Some(&VarValue::Float(1.25)));
    assert_eq!(vars.value_of("enabled"), Some(&VarValue::Bool(true)));
}

#[test]
fn null_sentinel_string_coerces_when_null_is_allowed() {
    let mut vars = VarRegistry::new();
    vars.declare(
        VarSpec::optional("remote_stateful_bucket").types(&[VarKind::Str, VarKind::Null]),
    )
    .unwrap();
    vars.declare(VarSpec::optional("name").types(&[VarKind::Str]))
        .unwrap();

    vars.resolve("remote_stateful_bucket", VarValue::from("null"))
        .unwrap();
    assert_eq!(vars.value_of("remote_stateful_bucket"), Some(&VarValue::Null));

    // Without null in the type set, "null" is just a string.
    vars.resolve("name", VarValue::from("null")).unwrap();
    assert_eq!(
        vars.value_of("name"),
        Some(&VarValue::Str("null".to_string()))
    );
}

#[test]
fn int_widens_to_float_when_only_float_is_allowed() {
    let mut vars = VarRegistry::new();
    vars.declare(VarSpec::optional("version").types(&[VarKind::Float]))
        .unwrap();

    vars.resolve("version", VarValue::Int(1)).unwrap();
    assert_eq!(vars.value_of("version"), Some(&VarValue::Float(1.0)));
}

#[test]
fn verify_all_reports_every_missing_key_at_once() {
    let mut vars = VarRegistry::new();
    vars.declare(VarSpec::required("eks_cluster")).unwrap();
    vars.declare(VarSpec::required("vpc_id")).unwrap();
    vars.declare(VarSpec::optional("region")).unwrap();
    vars.declare(VarSpec::required("ami").default("AL2_x86_64"))
        .unwrap();

    let err = vars.verify_all().unwrap_err();
    assert_eq!(
        err,
        VarError::MissingRequired(vec!["eks_cluster".to_string(), "vpc_id".to_string()])
    );

    // Idempotent: no resolution in between, identical report.
    assert_eq!(vars.verify_all().unwrap_err(), err);

    vars.resolve("eks_cluster", VarValue::from("dev1")).unwrap();
    assert_eq!(
        vars.verify_all().unwrap_err(),
        VarError::MissingRequired(vec!["vpc_id".to_string()])
    );

    vars.resolve("vpc_id", VarValue::from("vpc-1")).unwrap();
    vars.verify_all().unwrap();
}

#[test]
fn values_for_tag_filters_and_falls_back_to_defaults() {
    let mut vars = VarRegistry::new();
    vars.declare(
        VarSpec::required("eks_cluster").tags(&["cluster", "nodegroups"]),
    )
    .unwrap();
    vars.declare(
        VarSpec::optional("region").default("us-west-1").tags(&["cluster"]),
    )
    .unwrap();
    vars.declare(VarSpec::optional("unset_no_default").tags(&["cluster"]))
        .unwrap();
    vars.declare(VarSpec::optional("disksize").default(25).tags(&["nodegroups"]))
        .unwrap();

    vars.resolve("eks_cluster", VarValue::from("dev1")).unwrap();
    vars.resolve("region", VarValue::from("eu-west-1")).unwrap();

    let cluster = vars.values_for_tag("cluster");
    assert_eq!(cluster.get("eks_cluster"), Some(&VarValue::from("dev1")));
    // Resolved value wins over the default.
    assert_eq!(cluster.get("region"), Some(&VarValue::from("eu-west-1")));
    // Unresolved, no default: not invented.
    assert!(!cluster.contains_key("unset_no_default"));
    // Wrong tag: filtered out.
    assert!(!cluster.contains_key("disksize"));

    let nodegroups = vars.values_for_tag("nodegroups");
    assert_eq!(nodegroups.get("disksize"), Some(&VarValue::Int(25)));
    assert_eq!(nodegroups.get("eks_cluster"), Some(&VarValue::from("dev1")));
}

#[test]
fn re_resolution_overwrites_until_build_time() {
    let mut vars = VarRegistry::new();
    vars.declare(VarSpec::optional("region")).unwrap();

    vars.resolve("region", VarValue::from("us-west-1")).unwrap();
    vars.resolve("region", VarValue::from("eu-west-1")).unwrap();
    assert_eq!(vars.value_of("region"), Some(&VarValue::from("eu-west-1")));
}
