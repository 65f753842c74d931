//! dispatch::resolve
//!
//! Recursive requirement resolution.
//!
//! # Algorithm
//!
//! A required parameter the caller did not supply is derived by invoking
//! its producing operation on the command's target plugin. The producing
//! operation is the schema's explicit `producer` mapping when one is
//! declared, otherwise the operation with the parameter's own name.
//! Resolution is depth-first: the producing operation's own requirements
//! are resolved first, then it is invoked with the known set restricted to
//! its declared `required` names, and its return value is stored under the
//! parameter's name.
//!
//! Results are memoized in the [`ParameterSet`] for the duration of one
//! dispatch, so a shared requirement is produced once. Direct
//! caller-supplied values always take precedence over derived ones.
//!
//! # Termination
//!
//! The in-progress set tracks parameters currently being resolved. A
//! parameter that transitively requires itself is a registry defect and
//! fails with [`DispatchError::CyclicRequirement`] instead of recursing
//! unboundedly. Context parameters are seeded into the set before
//! resolution starts and therefore never trigger it.

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;

use crate::plugin::{OperationSchema, Plugin};

use super::error::DispatchError;
use super::params::{ParamValue, ParameterSet};

/// One unresolved required parameter and the operation that produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// The parameter to fill.
    pub parameter: String,
    /// The operation that produces it.
    pub producer: String,
}

impl Requirement {
    /// A requirement with an explicit producer.
    pub fn new(parameter: impl Into<String>, producer: impl Into<String>) -> Self {
        Requirement {
            parameter: parameter.into(),
            producer: producer.into(),
        }
    }

    /// A requirement following the name convention: the producing
    /// operation has the parameter's own name.
    pub fn conventional(parameter: impl Into<String>) -> Self {
        let parameter = parameter.into();
        let producer = parameter.clone();
        Requirement {
            parameter,
            producer,
        }
    }
}

/// The requirements a schema leaves unresolved, given the known set.
pub fn requirements_of(schema: &OperationSchema, params: &ParameterSet) -> Vec<Requirement> {
    schema
        .required()
        .iter()
        .filter(|name| !params.contains(name))
        .map(|name| Requirement::new(name.clone(), schema.producer_for(name)))
        .collect()
}

/// Resolve every requirement in `missing` into `params`.
///
/// # Errors
///
/// - [`DispatchError::UnsatisfiableRequirement`] if a producing operation
///   does not exist on the plugin
/// - [`DispatchError::CyclicRequirement`] on a requirement cycle
/// - [`DispatchError::Plugin`] if a producing operation fails
pub async fn resolve_requirements(
    plugin: &dyn Plugin,
    missing: Vec<Requirement>,
    params: &mut ParameterSet,
) -> Result<(), DispatchError> {
    let mut in_progress = BTreeSet::new();
    resolve_inner(plugin, missing, params, &mut in_progress).await
}

/// Depth-first resolution step. Boxed for async recursion.
fn resolve_inner<'a>(
    plugin: &'a dyn Plugin,
    missing: Vec<Requirement>,
    params: &'a mut ParameterSet,
    in_progress: &'a mut BTreeSet<String>,
) -> Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send + 'a>> {
    Box::pin(async move {
        for requirement in missing {
            let Requirement { parameter, producer } = requirement;

            // An earlier sibling's resolution may have produced this one.
            if params.contains(&parameter) {
                continue;
            }
            if !in_progress.insert(parameter.clone()) {
                return Err(DispatchError::CyclicRequirement(parameter));
            }

            let schema = plugin
                .schema()
                .get(&producer)
                .ok_or_else(|| DispatchError::UnsatisfiableRequirement(parameter.clone()))?;

            let subreqs = requirements_of(schema, params);
            resolve_inner(plugin, subreqs, &mut *params, &mut *in_progress).await?;

            let args = params.restrict_to(schema.required());
            let value = plugin
                .invoke(&producer, &args)
                .await
                .map_err(|source| DispatchError::Plugin {
                    plugin: plugin.name().to_string(),
                    source,
                })?;

            params.insert_derived(parameter.clone(), ParamValue::Text(value));
            in_progress.remove(&parameter);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{MockPlugin, OperationSchema, PluginError};

    fn text(s: &str) -> ParamValue {
        ParamValue::Text(s.to_string())
    }

    fn conventional(names: &[&str]) -> Vec<Requirement> {
        names.iter().map(|n| Requirement::conventional(*n)).collect()
    }

    #[tokio::test]
    async fn missing_parameter_is_produced_by_its_operation() {
        let plugin = MockPlugin::new("instances").with_operation(
            "instance_id",
            OperationSchema::new(&["instance_name"], &[]),
            "i-0fa3dde55b3ba0",
        );

        let mut params = ParameterSet::new();
        params.insert_direct("instance_name", text("test-instance"));

        resolve_requirements(&plugin, conventional(&["instance_id"]), &mut params)
            .await
            .unwrap();

        assert_eq!(params.text("instance_id"), Some("i-0fa3dde55b3ba0"));
    }

    #[tokio::test]
    async fn explicit_producer_overrides_the_name_convention() {
        let plugin = MockPlugin::new("instances").with_operation(
            "lookup_id",
            OperationSchema::new(&["instance_name"], &[]),
            "i-0001",
        );

        let mut params = ParameterSet::new();
        params.insert_direct("instance_name", text("web-1"));

        resolve_requirements(
            &plugin,
            vec![Requirement::new("instance_id", "lookup_id")],
            &mut params,
        )
        .await
        .unwrap();

        // The value lands under the parameter name, not the producer's.
        assert_eq!(params.text("instance_id"), Some("i-0001"));
        assert_eq!(plugin.invocation_count("lookup_id"), 1);
    }

    #[tokio::test]
    async fn requirements_of_reads_schema_producers() {
        let schema = OperationSchema::new(&["instance_id", "channel"], &[])
            .with_producer("instance_id", "lookup_id");
        let mut params = ParameterSet::new();
        params.insert_context("channel", text("ABCDE33"));

        let reqs = requirements_of(&schema, &params);
        assert_eq!(reqs, vec![Requirement::new("instance_id", "lookup_id")]);
    }

    #[tokio::test]
    async fn producing_operation_receives_only_its_declared_parameters() {
        let plugin = MockPlugin::new("instances").with_operation(
            "instance_id",
            OperationSchema::new(&["instance_name"], &[]),
            "i-0001",
        );

        let mut params = ParameterSet::new();
        params.insert_direct("instance_name", text("web-1"));
        params.insert_direct("unrelated", text("noise"));

        resolve_requirements(&plugin, conventional(&["instance_id"]), &mut params)
            .await
            .unwrap();

        let invocation = &plugin.invocations()[0];
        assert_eq!(invocation.params.text("instance_name"), Some("web-1"));
        assert!(!invocation.params.contains("unrelated"));
    }

    #[tokio::test]
    async fn resolution_recurses_through_a_chain() {
        // region <- zone <- datacenter, with only `datacenter` supplied.
        let plugin = MockPlugin::new("topo")
            .with_operation("region", OperationSchema::new(&["zone"], &[]), "eu-west")
            .with_operation("zone", OperationSchema::new(&["datacenter"], &[]), "eu-west-1a");

        let mut params = ParameterSet::new();
        params.insert_direct("datacenter", text("dc-7"));

        resolve_requirements(&plugin, conventional(&["region"]), &mut params)
            .await
            .unwrap();

        assert_eq!(params.text("zone"), Some("eu-west-1a"));
        assert_eq!(params.text("region"), Some("eu-west"));
    }

    #[tokio::test]
    async fn shared_requirement_is_produced_once() {
        let plugin = MockPlugin::new("topo")
            .with_operation("a", OperationSchema::new(&["shared"], &[]), "a-value")
            .with_operation("b", OperationSchema::new(&["shared"], &[]), "b-value")
            .with_operation("shared", OperationSchema::new(&[], &[]), "common");

        let mut params = ParameterSet::new();
        resolve_requirements(&plugin, conventional(&["a", "b"]), &mut params)
            .await
            .unwrap();

        assert_eq!(plugin.invocation_count("shared"), 1);
        assert_eq!(params.text("shared"), Some("common"));
    }

    #[tokio::test]
    async fn derived_value_never_overwrites_direct() {
        let plugin = MockPlugin::new("instances").with_operation(
            "instance_id",
            OperationSchema::new(&[], &[]),
            "i-derived",
        );

        let mut params = ParameterSet::new();
        params.insert_direct("instance_id", text("i-direct"));

        resolve_requirements(&plugin, conventional(&["instance_id"]), &mut params)
            .await
            .unwrap();

        // Already satisfied: no invocation, value untouched.
        assert_eq!(plugin.invocation_count("instance_id"), 0);
        assert_eq!(params.text("instance_id"), Some("i-direct"));
    }

    #[tokio::test]
    async fn missing_producer_is_unsatisfiable() {
        let plugin = MockPlugin::new("instances");
        let mut params = ParameterSet::new();

        let result =
            resolve_requirements(&plugin, conventional(&["instance_name"]), &mut params).await;
        assert!(matches!(
            result,
            Err(DispatchError::UnsatisfiableRequirement(name)) if name == "instance_name"
        ));
    }

    #[tokio::test]
    async fn mutual_cycle_is_detected() {
        let plugin = MockPlugin::new("cyclic")
            .with_operation("a", OperationSchema::new(&["b"], &[]), "unreachable")
            .with_operation("b", OperationSchema::new(&["a"], &[]), "unreachable");

        let mut params = ParameterSet::new();
        let result = resolve_requirements(&plugin, conventional(&["a"]), &mut params).await;
        assert!(matches!(result, Err(DispatchError::CyclicRequirement(_))));
    }

    #[tokio::test]
    async fn self_cycle_is_detected() {
        let plugin = MockPlugin::new("cyclic").with_operation(
            "a",
            OperationSchema::new(&["a"], &[]),
            "unreachable",
        );

        let mut params = ParameterSet::new();
        let result = resolve_requirements(&plugin, conventional(&["a"]), &mut params).await;
        assert!(matches!(
            result,
            Err(DispatchError::CyclicRequirement(name)) if name == "a"
        ));
    }

    #[tokio::test]
    async fn producer_failure_maps_to_plugin_error() {
        let plugin = MockPlugin::new("instances")
            .with_operation("instance_id", OperationSchema::new(&[], &[]), "unused")
            .with_failure(
                "instance_id",
                PluginError::NotFound("no instance named 'ghost'".into()),
            );

        let mut params = ParameterSet::new();
        let result =
            resolve_requirements(&plugin, conventional(&["instance_id"]), &mut params).await;
        assert!(matches!(
            result,
            Err(DispatchError::Plugin { plugin, .. }) if plugin == "instances"
        ));
    }
}
