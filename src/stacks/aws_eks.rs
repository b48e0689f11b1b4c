// src/stacks/aws_eks.rs

//! EKS cluster plus managed nodegroup, as a two-job chain.

use std::collections::BTreeMap;

use tracing::debug;

use crate::dag::{JobGraph, JobSpec};
use crate::errors::{Result, StackdagError};
use crate::stack::{ResourceLookup, Stack};
use crate::vars::{VarKind, VarSpec, VarValue};

pub const NAME: &str = "aws_eks";

/// Declare the stack: variables for both phases, the two jobs, and the
/// success edge between them.
pub fn declare() -> Result<Stack> {
    let mut stack = Stack::new(NAME);

    // Runtime image used to execute terraform.
    stack.declare(
        VarSpec::optional("tf_runtime")
            .default("tofu:1.9.1")
            .types(&[VarKind::Str])
            .tags(&["cluster", "nodegroups"]),
    )?;

    stack.declare(
        VarSpec::required("eks_cluster")
            .types(&[VarKind::Str])
            .tags(&["cluster", "nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("aws_default_region")
            .default("us-west-1")
            .tags(&["cluster", "nodegroups"]),
    )?;

    stack.declare(VarSpec::optional("eks_cluster_subnet_ids").tags(&["cluster"]))?;

    stack.declare(
        VarSpec::optional("cloud_tags_hash")
            .default(VarValue::Null)
            .types(&[VarKind::Str, VarKind::Null])
            .tags(&["cluster", "nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("remote_stateful_bucket")
            .default(VarValue::Null)
            .types(&[VarKind::Str, VarKind::Null])
            .tags(&["cluster", "nodegroups"]),
    )?;

    declare_cluster_vars(&mut stack)?;
    declare_nodegroup_vars(&mut stack)?;

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
        JobSpec::new("eks_nodegroup")
            .timeout_secs(3600)
            .wait_interval_secs(120)
            .automation_phase("infrastructure")
            .human_description("Create EKS nodegroup")
            .values_tag("nodegroups"),
    )?;

    stack.on_success("eks_cluster", "eks_nodegroup")?;

    Ok(stack)
}

fn declare_cluster_vars(stack: &mut Stack) -> Result<()> {
    stack.declare(
        VarSpec::required("vpc_id")
            .types(&[VarKind::Str])
            .tags(&["cluster"]),
    )?;

    stack.declare(
        VarSpec::required("eks_cluster_sg_id")
            .types(&[VarKind::Str])
            .tags(&["cluster"]),
    )?;

    // Mapping an EKS service account to an AWS role.
    stack.declare(
        VarSpec::optional("role_name")
            .default(VarValue::Null)
            .types(&[VarKind::Str, VarKind::Null])
            .tags(&["cluster"]),
    )?;

    stack.declare(
        VarSpec::optional("eks_cluster_version")
            .default(1.25)
            .types(&[VarKind::Float])
            .tags(&["cluster"]),
    )?;

    stack.declare(
        VarSpec::optional("publish_to_saas")
            .default(VarValue::Null)
            .types(&[VarKind::Bool, VarKind::Null])
            .tags(&["cluster"]),
    )?;

    Ok(())
}

fn declare_nodegroup_vars(stack: &mut Stack) -> Result<()> {
    stack.declare(
        VarSpec::required("eks_node_capacity_type")
            .default("ON_DEMAND")
            .choices(&["ON_DEMAND", "SPOT"])
            .types(&[VarKind::Str])
            .tags(&["nodegroups"]),
    )?;

    stack.declare(
        VarSpec::required("eks_node_ami_type")
            .default("AL2_x86_64")
            .choices(&["AL2_x86_64", "AL2_x86_64_GPU", "AL2_ARM_64", "CUSTOM"])
            .types(&[VarKind::Str])
            .tags(&["nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("eks_node_instance_types")
            .default(VarValue::from(vec!["t3.medium"]))
            .types(&[VarKind::List])
            .tags(&["nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("eks_node_role_arn")
            .default(VarValue::Null)
            .types(&[VarKind::Str, VarKind::Null])
            .tags(&["cluster", "nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("eks_node_max_capacity")
            .default(2)
            .types(&[VarKind::Int])
            .tags(&["nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("eks_node_min_capacity")
            .default(1)
            .types(&[VarKind::Int])
            .tags(&["nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("eks_node_desired_capacity")
            .default(1)
            .types(&[VarKind::Int])
            .tags(&["nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("eks_node_disksize")
            .default(25)
            .types(&[VarKind::Int])
            .tags(&["nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("eks_node_group_name")
            .default(VarValue::Null)
            .types(&[VarKind::Str, VarKind::Null])
            .tags(&["nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("timeout")
            .default(1800)
            .tags(&["nodegroups"]),
    )?;

    stack.declare(
        VarSpec::optional("eks_node_group_subnet_ids")
            .default(VarValue::Null)
            .tags(&["nodegroups"]),
    )?;

    Ok(())
}

/// Declare, resolve inputs, apply the nodegroup fallbacks and produce the
/// run-ready graph.
pub fn build(
    inputs: &BTreeMap<String, VarValue>,
    lookup: &dyn ResourceLookup,
) -> Result<JobGraph> {
    let mut stack = declare()?;
    stack.resolve_inputs(inputs)?;
    stack.verify_variables()?;
    finalize(&mut stack, lookup)?;
    stack.build()
}

/// Post-resolution wiring that the declarations alone cannot express.
fn finalize(stack: &mut Stack, lookup: &dyn ResourceLookup) -> Result<()> {
    let Some(cluster) = stack
        .get_attr("eks_cluster")
        .and_then(|v| v.as_str())
        .map(str::to_string)
    else {
        return Err(StackdagError::ConfigError(
            "eks_cluster must resolve to a string".to_string(),
        ));
    };

    // Nodegroup subnets default to the cluster's subnets.
    if stack.get_attr("eks_node_group_subnet_ids").is_none() {
        match stack.get_attr("eks_cluster_subnet_ids").cloned() {
            Some(subnets) => stack.set_variable("eks_node_group_subnet_ids", subnets)?,
            None => {
                return Err(StackdagError::ConfigError(
                    "needs to provide eks_cluster_subnet_ids or eks_node_group_subnet_ids"
                        .to_string(),
                ));
            }
        }
    }

    // The node role ARN can come from the cluster resource of a prior run.
    if stack.get_attr("eks_node_role_arn").is_none() {
        match lookup.lookup(&cluster, "eks") {
            Ok(attrs) => {
                if let Some(arn) = attrs.get("node_role_arn") {
                    stack.set_variable("eks_node_role_arn", arn.clone())?;
                }
            }
            Err(err) => {
                // The ARN is optional; the nodegroup execgroup can derive it.
                debug!(cluster = %cluster, %err, "no prior cluster resource");
            }
        }
    }

    if stack.get_attr("eks_node_group_name").is_none() {
        stack.set_variable("eks_node_group_name", format!("{cluster}-nodegroup-main"))?;
    }

    stack.describe_job("eks_cluster", &format!("Create EKS cluster {cluster}"))?;
    stack.describe_job("eks_nodegroup", &format!("Create EKS nodegroup {cluster}"))?;

    Ok(())
}
