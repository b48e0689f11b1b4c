// tests/config_loading.rs

use std::fs;

use stackdag::config;
use stackdag::errors::StackdagError;
use stackdag::vars::VarValue;

#[test]
fn loads_a_flat_toml_table_with_native_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Stackvars.toml");
    fs::write(
        &path,
        r#"
eks_cluster = "dev1"
eks_node_max_capacity = 4
eks_cluster_version = 1.25
publish_to_saas = true
eks_node_instance_types = ["t3.medium", "t3.large"]
"#,
    )
    .unwrap();

    let inputs = config::load_from_path(&path).unwrap();

    assert_eq!(inputs.get("eks_cluster"), Some(&VarValue::from("dev1")));
    assert_eq!(inputs.get("eks_node_max_capacity"), Some(&VarValue::Int(4)));
    assert_eq!(
        inputs.get("eks_cluster_version"),
        Some(&VarValue::Float(1.25))
    );
    assert_eq!(inputs.get("publish_to_saas"), Some(&VarValue::Bool(true)));
    assert_eq!(
        inputs.get("eks_node_instance_types"),
        Some(&VarValue::from(vec!["t3.medium", "t3.large"]))
    );
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Stackvars.toml");
    fs::write(&path, "eks_cluster = ").unwrap();

    let err = config::load_from_path(&path).unwrap_err();
    assert!(matches!(err, StackdagError::TomlError(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = config::load_from_path("/nonexistent/Stackvars.toml").unwrap_err();
    assert!(matches!(err, StackdagError::IoError(_)));
}
