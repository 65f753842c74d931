//! Integration tests for the dispatch pipeline.
//!
//! These tests drive the dispatcher end-to-end over mock plugins:
//! - positional and flagged argument equivalence
//! - recursive requirement resolution, memoization, and cycle detection
//! - broadcast/private reply shaping and acknowledgment selection
//! - help enumeration
//! - error classification

use std::sync::Arc;

use peon::dispatch::{
    Command, CommandTable, DispatchContext, Dispatcher, FixedAck, ACK_PHRASES, BUILTIN_PLUGIN,
};
use peon::plugin::{MockPlugin, OperationSchema, PluginError, PluginRegistry};

/// A mock instance-control plugin mirroring the shipped schema set, plus an
/// id-addressed stop operation to exercise resolution.
fn instances_plugin() -> MockPlugin {
    MockPlugin::new("instances")
        .with_operation(
            "instance_names",
            OperationSchema::new(&["channel"], &[])
                .with_help("Returns a list of the instance names your channel can see."),
            "\"test-instance\", \"web-1\"",
        )
        .with_operation(
            "instance_id",
            OperationSchema::new(&["instance_name", "channel"], &[])
                .with_help("Returns an instance id when given the instance's name."),
            "i-0fa3dde55b3ba0",
        )
        .with_operation(
            "instance_state",
            OperationSchema::new(&["instance_name"], &["dry_run"])
                .with_help("Returns the state of the instance with the matching name."),
            "Instance state: running",
        )
        .with_operation(
            "stop_instance",
            OperationSchema::new(&["instance_name"], &["dry_run", "force"])
                .with_help("Shuts down the named instance."),
            "Instance changing: running --> stopping",
        )
        .with_operation(
            "stop_by_id",
            OperationSchema::new(&["instance_id"], &["force"]),
            "Instance changing: running --> stopping",
        )
}

fn table() -> CommandTable {
    let mut table = CommandTable::new();
    table
        .register(Command::new("list-instances", "instances", "instance_names", false))
        .unwrap();
    table
        .register(Command::new("status", "instances", "instance_state", true))
        .unwrap();
    table
        .register(Command::new("stop", "instances", "stop_instance", true))
        .unwrap();
    table
        .register(Command::new("stop-by-id", "instances", "stop_by_id", true))
        .unwrap();
    table
        .register(Command::new("help", BUILTIN_PLUGIN, "help", false))
        .unwrap();
    table
}

fn dispatcher_over(plugin: MockPlugin) -> Dispatcher {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(plugin)).unwrap();
    Dispatcher::new(table(), registry).with_ack_source(Box::new(FixedAck(1)))
}

fn ctx() -> DispatchContext {
    DispatchContext::new("ABCDE33", "test-user")
}

mod argument_binding {
    use super::*;

    #[tokio::test]
    async fn positional_and_flagged_forms_are_equivalent() {
        let positional = instances_plugin();
        dispatcher_over(positional.clone())
            .dispatch("status test-instance", &ctx())
            .await;

        let flagged = instances_plugin();
        dispatcher_over(flagged.clone())
            .dispatch("status --instance_name test-instance", &ctx())
            .await;

        let a = &positional.invocations()[0];
        let b = &flagged.invocations()[0];
        assert_eq!(a.operation, b.operation);
        assert_eq!(a.params.text("instance_name"), Some("test-instance"));
        assert_eq!(
            a.params.text("instance_name"),
            b.params.text("instance_name")
        );
    }

    #[tokio::test]
    async fn status_scenario_binds_positionally_and_broadcasts() {
        let plugin = instances_plugin();
        let reply = dispatcher_over(plugin.clone())
            .dispatch("status test-instance", &ctx())
            .await;

        let invocation = &plugin.invocations()[0];
        assert_eq!(invocation.operation, "instance_state");
        assert_eq!(invocation.params.text("instance_name"), Some("test-instance"));

        assert_eq!(reply.public(), Some("Instance state: running"));
        assert_eq!(reply.private(), ACK_PHRASES[1]);
    }

    #[tokio::test]
    async fn stop_scenario_sets_force_but_not_dry_run() {
        let plugin = instances_plugin();
        dispatcher_over(plugin.clone())
            .dispatch("stop --instance_name test-instance --force", &ctx())
            .await;

        let invocation = &plugin.invocations()[0];
        assert_eq!(invocation.operation, "stop_instance");
        assert_eq!(invocation.params.text("instance_name"), Some("test-instance"));
        assert!(invocation.params.switch("force"));
        assert!(!invocation.params.switch("dry_run"));
    }

    #[tokio::test]
    async fn quoted_instance_names_stay_one_token() {
        let plugin = instances_plugin();
        dispatcher_over(plugin.clone())
            .dispatch("status \"my instance\"", &ctx())
            .await;

        let invocation = &plugin.invocations()[0];
        assert_eq!(invocation.params.text("instance_name"), Some("my instance"));
    }
}

mod requirement_resolution {
    use super::*;

    #[tokio::test]
    async fn missing_id_is_derived_from_the_supplied_name() {
        let plugin = instances_plugin();
        let reply = dispatcher_over(plugin.clone())
            .dispatch("stop-by-id --instance_name test-instance", &ctx())
            .await;

        // The resolver located `instance_id`, fed it the supplied name and
        // the context channel, and cached the produced id.
        let lookup = &plugin.invocations()[0];
        assert_eq!(lookup.operation, "instance_id");
        assert_eq!(lookup.params.text("instance_name"), Some("test-instance"));
        assert_eq!(lookup.params.text("channel"), Some("ABCDE33"));

        let stop = &plugin.invocations()[1];
        assert_eq!(stop.operation, "stop_by_id");
        assert_eq!(stop.params.text("instance_id"), Some("i-0fa3dde55b3ba0"));

        assert_eq!(reply.public(), Some("Instance changing: running --> stopping"));
    }

    #[tokio::test]
    async fn directly_supplied_id_skips_resolution() {
        let plugin = instances_plugin();
        dispatcher_over(plugin.clone())
            .dispatch("stop-by-id --instance_id i-1234567890", &ctx())
            .await;

        assert_eq!(plugin.invocation_count("instance_id"), 0);
        let stop = &plugin.invocations()[0];
        assert_eq!(stop.params.text("instance_id"), Some("i-1234567890"));
    }

    #[tokio::test]
    async fn context_channel_fills_listing_requirement() {
        let plugin = instances_plugin();
        let reply = dispatcher_over(plugin.clone())
            .dispatch("list-instances", &ctx())
            .await;

        let invocation = &plugin.invocations()[0];
        assert_eq!(invocation.params.text("channel"), Some("ABCDE33"));
        assert_eq!(reply.private(), "\"test-instance\", \"web-1\"");
        assert_eq!(reply.public(), None);
    }

    #[tokio::test]
    async fn explicit_producer_mapping_is_honored_end_to_end() {
        let plugin = MockPlugin::new("instances")
            .with_operation(
                "halt",
                OperationSchema::new(&["instance_id"], &[]).with_producer("instance_id", "lookup_id"),
                "Instance changing: running --> stopping",
            )
            .with_operation(
                "lookup_id",
                OperationSchema::new(&["instance_name"], &[]),
                "i-0042",
            );
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(plugin.clone())).unwrap();
        let mut table = CommandTable::new();
        table
            .register(Command::new("halt", "instances", "halt", false))
            .unwrap();
        let dispatcher = Dispatcher::new(table, registry);

        dispatcher
            .dispatch("halt --instance_name web-1", &ctx())
            .await;

        assert_eq!(plugin.invocation_count("lookup_id"), 1);
        let halt = plugin
            .invocations()
            .into_iter()
            .find(|i| i.operation == "halt")
            .unwrap();
        assert_eq!(halt.params.text("instance_id"), Some("i-0042"));
    }

    #[tokio::test]
    async fn unsatisfiable_requirement_names_the_parameter() {
        let plugin = instances_plugin();
        let reply = dispatcher_over(plugin)
            .dispatch("stop-by-id", &ctx())
            .await;

        // No instance_name supplied, so instance_id's own requirement has
        // no producer either.
        assert_eq!(
            reply.private(),
            "error: no way to satisfy required parameter 'instance_name'"
        );
        assert_eq!(reply.public(), None);
    }

    #[tokio::test]
    async fn cyclic_configuration_fails_instead_of_hanging() {
        let plugin = MockPlugin::new("cyclic")
            .with_operation("entry", OperationSchema::new(&["a"], &[]), "unreachable")
            .with_operation("a", OperationSchema::new(&["b"], &[]), "unreachable")
            .with_operation("b", OperationSchema::new(&["a"], &[]), "unreachable");
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(plugin)).unwrap();
        let mut table = CommandTable::new();
        table
            .register(Command::new("loop", "cyclic", "entry", false))
            .unwrap();
        let dispatcher = Dispatcher::new(table, registry);

        let reply = dispatcher.dispatch("loop", &ctx()).await;
        assert!(reply.private().starts_with("error: cyclic requirement"));
        assert_eq!(reply.public(), None);
    }
}

mod reply_shaping {
    use super::*;

    #[tokio::test]
    async fn broadcast_success_always_has_both_fields() {
        let reply = dispatcher_over(instances_plugin())
            .dispatch("status test-instance", &ctx())
            .await;
        assert!(reply.public().is_some());
        assert!(!reply.private().is_empty());
    }

    #[tokio::test]
    async fn broadcast_failure_is_private_only() {
        let plugin = instances_plugin().with_failure(
            "instance_state",
            PluginError::Api {
                status: 500,
                message: "boom".into(),
            },
        );
        let reply = dispatcher_over(plugin)
            .dispatch("status test-instance", &ctx())
            .await;

        assert_eq!(reply.public(), None);
        assert_eq!(
            reply.private(),
            "error with plugin instances: API error: 500 - boom"
        );
    }

    #[tokio::test]
    async fn non_broadcast_command_never_has_a_public_field() {
        let reply = dispatcher_over(instances_plugin())
            .dispatch("list-instances", &ctx())
            .await;
        assert_eq!(reply.public(), None);

        let json = serde_json::to_value(&reply).unwrap();
        assert!(json.get("public").is_none());
    }

    #[tokio::test]
    async fn acknowledgment_is_always_from_the_phrase_list() {
        // Default (random) source across repeated dispatches.
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(instances_plugin())).unwrap();
        let dispatcher = Dispatcher::new(table(), registry);

        for _ in 0..50 {
            let reply = dispatcher.dispatch("status test-instance", &ctx()).await;
            assert!(ACK_PHRASES.contains(&reply.private()));
        }
    }

    #[tokio::test]
    async fn dry_run_reports_the_command_name() {
        let plugin = instances_plugin().with_failure("stop_instance", PluginError::DryRun);
        let reply = dispatcher_over(plugin)
            .dispatch("stop test-instance --dry_run", &ctx())
            .await;

        assert_eq!(
            reply.private(),
            "stop: dry run successful, no changes were made"
        );
        assert_eq!(reply.public(), None);
    }
}

mod help {
    use super::*;

    #[tokio::test]
    async fn enumerates_every_command_with_contract() {
        let reply = dispatcher_over(instances_plugin())
            .dispatch("help", &ctx())
            .await;
        let text = reply.private();

        assert!(text.starts_with("Peon is your friendly worker"));
        for name in ["list-instances", "status", "stop", "stop-by-id", "help"] {
            assert!(text.contains(&format!("{}:", name)), "missing {}", name);
        }
        assert!(text.contains("status: Returns the state of the instance with the matching name.\n"));
        assert!(text.contains("\t- instance_name: required\n"));
        assert!(text.contains("\t- dry_run: switch\n"));
        assert_eq!(reply.public(), None);
    }

    #[tokio::test]
    async fn follows_registration_order() {
        let reply = dispatcher_over(instances_plugin())
            .dispatch("help", &ctx())
            .await;
        let text = reply.private().to_string();

        let positions: Vec<usize> = ["list-instances:", "status:", "stop:", "stop-by-id:", "help:"]
            .iter()
            .map(|n| text.find(n).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

mod error_classification {
    use super::*;

    #[tokio::test]
    async fn unknown_command_names_the_word() {
        let reply = dispatcher_over(instances_plugin())
            .dispatch("bogus-command foo", &ctx())
            .await;
        assert_eq!(reply.private(), "error: unknown command: bogus-command");
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let reply = dispatcher_over(instances_plugin())
            .dispatch("Status test-instance", &ctx())
            .await;
        assert_eq!(reply.private(), "error: unknown command: Status");
    }

    #[tokio::test]
    async fn unterminated_quote_is_malformed() {
        let reply = dispatcher_over(instances_plugin())
            .dispatch("status \"test", &ctx())
            .await;
        assert_eq!(reply.private(), "error: malformed input: unterminated quote");
    }

    #[tokio::test]
    async fn trailing_flag_without_value_is_malformed() {
        let reply = dispatcher_over(instances_plugin())
            .dispatch("stop --instance_name", &ctx())
            .await;
        assert_eq!(
            reply.private(),
            "error: malformed input: flag --instance_name has no value"
        );
    }
}
