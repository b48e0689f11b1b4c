// src/stacks/aws_eks2.rs

//! EKS cluster with the GitOps add-on chain: base Helm packages, external
//! DNS, then ArgoCD CRDs and ArgoCD itself.

use std::collections::BTreeMap;

use crate::dag::{JobGraph, JobSpec};
use crate::errors::{Result, StackdagError};
use crate::stack::{ResourceLookup, Stack};
use crate::vars::{VarKind, VarSpec, VarValue};

pub const NAME: &str = "aws_eks2";

const ALL_PHASES: &[&str] = &[
    "cluster",
    "base_helm",
    "external_dns",
    "argocd_crds",
    "argocd",
];

pub fn declare() -> Result<Stack> {
    let mut stack = Stack::new(NAME);

    // Runtime image used to execute terraform.
    stack.declare(
        VarSpec::optional("tf_runtime")
            .default("tofu:1.9.1")
            .types(&[VarKind::Str])
            .tags(ALL_PHASES),
    )?;

    stack.declare(
        VarSpec::required("eks_cluster")
            .types(&[VarKind::Str])
            .tags(ALL_PHASES),
    )?;

    stack.declare(
        VarSpec::optional("aws_default_region")
            .default("us-west-1")
            .tags(ALL_PHASES),
    )?;

    stack.declare(
        VarSpec::optional("cloud_tags_hash")
            .default(VarValue::Null)
            .types(&[VarKind::Str, VarKind::Null])
            .tags(ALL_PHASES),
    )?;

    stack.declare(
        VarSpec::optional("remote_stateful_bucket")
            .default(VarValue::Null)
            .types(&[VarKind::Str, VarKind::Null])
            .tags(ALL_PHASES),
    )?;

    stack.declare(
        VarSpec::required("general_external_dns_role")
            .types(&[VarKind::Str])
            .tags(&["external_dns"]),
    )?;

    stack.declare(
        VarSpec::required("domain_filters")
            .types(&[VarKind::List])
            .tags(&["external_dns"]),
    )?;

    stack.declare(
        VarSpec::optional("external_dns_policy")
            .default("upsert-only")
            .choices(&["upsert-only", "sync"])
            .tags(&["external_dns"]),
    )?;

    stack.add_job(
        JobSpec::new("eks_cluster")
            .timeout_secs(3600)
            .wait_interval_secs(120)
            .retries(1)
            .automation_phase("infrastructure")
            .human_description("Create EKS cluster")
            .values_tag("cluster"),
    )?;

    stack.add_job(
        JobSpec::new("base_helm")
            .timeout_secs(1800)
            .wait_interval_secs(120)
            .automation_phase("infrastructure")
            .human_description("Install Base Helm Packages")
            .values_tag("base_helm"),
    )?;

    stack.add_job(
        JobSpec::new("external_dns")
            .timeout_secs(1800)
            .wait_interval_secs(120)
            .automation_phase("infrastructure")
            .human_description("Install External DNS")
            .values_tag("external_dns"),
    )?;

    stack.add_job(
        JobSpec::new("argocd_crds")
            .timeout_secs(1800)
            .wait_interval_secs(120)
            .automation_phase("infrastructure")
            .human_description("Install ArgoCD CRDS")
            .values_tag("argocd_crds"),
    )?;

    stack.add_job(
        JobSpec::new("argocd")
            .timeout_secs(1800)
            .wait_interval_secs(120)
            .automation_phase("infrastructure")
            .human_description("Install ArgoCD")
            .values_tag("argocd"),
    )?;

    stack.on_success("eks_cluster", "base_helm")?;
    stack.on_success("base_helm", "external_dns")?;
    stack.on_success("external_dns", "argocd_crds")?;
    stack.on_success("argocd_crds", "argocd")?;

    Ok(stack)
}

/// Declare, resolve inputs, verify and produce the run-ready graph.
pub fn build(
    inputs: &BTreeMap<String, VarValue>,
    _lookup: &dyn ResourceLookup,
) -> Result<JobGraph> {
    let mut stack = declare()?;
    stack.resolve_inputs(inputs)?;
    stack.verify_variables()?;
    finalize(&mut stack)?;
    stack.build()
}

fn finalize(stack: &mut Stack) -> Result<()> {
    let Some(cluster) = stack
        .get_attr("eks_cluster")
        .and_then(|v| v.as_str())
        .map(str::to_string)
    else {
        return Err(StackdagError::ConfigError(
            "eks_cluster must resolve to a string".to_string(),
        ));
    };

    stack.describe_job("eks_cluster", &format!("Create EKS cluster {cluster}"))?;
    stack.describe_job("base_helm", &format!("Create Base Helm {cluster}"))?;
    stack.describe_job("external_dns", &format!("Install External DNS on {cluster}"))?;
    stack.describe_job("argocd_crds", &format!("Install ArgoCD CRDS on {cluster}"))?;
    stack.describe_job("argocd", &format!("Install ArgoCD on {cluster}"))?;

    Ok(())
}
