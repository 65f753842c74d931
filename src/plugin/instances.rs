//! plugin::instances
//!
//! Instance-control plugin backed by the compute HTTP API.
//!
//! # Design
//!
//! This module implements the [`Plugin`] trait against the compute control
//! plane's JSON API. Instances are addressed by name; visibility is scoped
//! by the invoking channel for listing and id lookup, and by the bearer
//! token for everything else.
//!
//! # Dry Runs
//!
//! The `dry_run` switch is forwarded to the API, which answers a dry-run
//! request with HTTP 412 and code `DryRunOperation`. That response maps to
//! [`PluginError::DryRun`] so the dispatcher can acknowledge the no-op
//! without claiming a state change happened.
//!
//! # Example
//!
//! ```ignore
//! use peon::plugin::{InstanceControl, Plugin};
//!
//! let plugin = InstanceControl::new("https://compute.internal/api", Some("token".into()));
//! let out = plugin.invoke("instance_state", &params).await?;
//! assert!(out.starts_with("Instance state:"));
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::dispatch::ParameterSet;

use super::schema::{OperationSchema, SchemaMap};
use super::traits::{Plugin, PluginError};

/// Plugin name commands are registered against.
pub const PLUGIN_NAME: &str = "instances";

/// Per-request timeout for compute API calls. A hung control plane must
/// surface as a plugin error, not stall the dispatcher.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One instance record as the API reports it.
#[derive(Debug, Clone, Deserialize)]
struct InstanceRecord {
    id: String,
    name: String,
}

/// Response to instance listing/lookup.
#[derive(Debug, Deserialize)]
struct InstanceList {
    instances: Vec<InstanceRecord>,
}

/// Response to a state query. `state` is absent for instances the control
/// plane has no status record for, which means stopped.
#[derive(Debug, Deserialize)]
struct StateResponse {
    state: Option<String>,
}

/// Body for start/stop/reboot requests.
#[derive(Debug, Serialize)]
struct ChangeRequest {
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    force: Option<bool>,
}

/// Response to a start/stop request.
#[derive(Debug, Deserialize)]
struct StateChange {
    previous_state: String,
    current_state: String,
}

/// Error body the API attaches to non-success responses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Instance-control plugin over the compute HTTP API.
pub struct InstanceControl {
    /// HTTP client for making requests
    client: Client,
    /// API base URL (configurable per deployment)
    api_base: String,
    /// Bearer token, if the deployment requires one
    token: Option<String>,
    /// Declared operation schemas
    schema: SchemaMap,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for InstanceControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceControl")
            .field("api_base", &self.api_base)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl InstanceControl {
    /// Create a plugin instance for the given API base URL.
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        InstanceControl {
            client: Client::new(),
            api_base,
            token,
            schema: Self::declared_schema(),
        }
    }

    /// The operation schemas this plugin declares.
    fn declared_schema() -> SchemaMap {
        let mut schema = SchemaMap::new();
        schema.insert(
            "instance_names".to_string(),
            OperationSchema::new(&["channel"], &[])
                .with_help("Returns a list of the instance names your channel can see."),
        );
        schema.insert(
            "instance_id".to_string(),
            OperationSchema::new(&["instance_name", "channel"], &[])
                .with_help("Returns an instance id when given the instance's name."),
        );
        schema.insert(
            "instance_state".to_string(),
            OperationSchema::new(&["instance_name"], &["dry_run"])
                .with_help("Returns the state of the instance with the matching name."),
        );
        schema.insert(
            "start_instance".to_string(),
            OperationSchema::new(&["instance_name"], &["dry_run"]).with_help(
                "Ensures the named instance is running. Safe to run on a running instance.",
            ),
        );
        schema.insert(
            "stop_instance".to_string(),
            OperationSchema::new(&["instance_name"], &["dry_run", "force"])
                .with_help("Shuts down the named instance."),
        );
        schema.insert(
            "reboot_instance".to_string(),
            OperationSchema::new(&["instance_name"], &["dry_run"])
                .with_help("Restarts the named instance."),
        );
        schema
    }

    /// Build a request with auth and timeout applied.
    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.timeout(REQUEST_TIMEOUT);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Build URL for an instance endpoint.
    fn instance_url(&self, name: &str, action: &str) -> String {
        format!("{}/instances/{}/{}", self.api_base, name, action)
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, PluginError> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| PluginError::Api {
                status: status.as_u16(),
                message: format!("failed to parse response: {}", e),
            })
        } else {
            Err(self.error_from_response(response, status).await)
        }
    }

    /// Map an error response to a `PluginError`.
    async fn error_from_response(&self, response: Response, status: StatusCode) -> PluginError {
        let body = response.json::<ApiErrorResponse>().await.unwrap_or(ApiErrorResponse {
            code: None,
            message: None,
        });
        let message = body.message.unwrap_or_else(|| "unknown error".to_string());

        match status {
            StatusCode::PRECONDITION_FAILED if body.code.as_deref() == Some("DryRunOperation") => {
                PluginError::DryRun
            }
            StatusCode::UNAUTHORIZED => PluginError::AuthFailed("invalid or expired token".into()),
            StatusCode::FORBIDDEN => PluginError::AuthFailed(message),
            StatusCode::NOT_FOUND => PluginError::NotFound(message),
            _ => PluginError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// List the names of instances visible to `channel`.
    async fn instance_names(&self, channel: &str) -> Result<String, PluginError> {
        let url = format!("{}/instances", self.api_base);
        let response = self
            .request(self.client.get(&url).query(&[("channel", channel)]))
            .send()
            .await
            .map_err(|e| PluginError::Network(e.to_string()))?;

        let list: InstanceList = self.handle_response(response).await?;
        let names: Vec<String> = list
            .instances
            .iter()
            .map(|i| format!("\"{}\"", i.name))
            .collect();
        Ok(names.join(", "))
    }

    /// Resolve an instance name to its id, scoped to `channel`.
    async fn instance_id(&self, instance_name: &str, channel: &str) -> Result<String, PluginError> {
        let url = format!("{}/instances", self.api_base);
        let response = self
            .request(
                self.client
                    .get(&url)
                    .query(&[("channel", channel), ("name", instance_name)]),
            )
            .send()
            .await
            .map_err(|e| PluginError::Network(e.to_string()))?;

        let list: InstanceList = self.handle_response(response).await?;
        list.instances
            .first()
            .map(|i| i.id.clone())
            .ok_or_else(|| PluginError::NotFound(format!("no instance named '{}'", instance_name)))
    }

    /// Query the state of the named instance.
    async fn instance_state(&self, instance_name: &str, dry_run: bool) -> Result<String, PluginError> {
        let url = self.instance_url(instance_name, "state");
        let mut builder = self.client.get(&url);
        if dry_run {
            builder = builder.query(&[("dry_run", "true")]);
        }
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(|e| PluginError::Network(e.to_string()))?;

        let state: StateResponse = self.handle_response(response).await?;
        Ok(format!(
            "Instance state: {}",
            state.state.as_deref().unwrap_or("stopped")
        ))
    }

    /// Start the named instance.
    async fn start_instance(&self, instance_name: &str, dry_run: bool) -> Result<String, PluginError> {
        let change = self
            .post_change(instance_name, "start", ChangeRequest { dry_run, force: None })
            .await?;
        Ok(format_state_change(
            &change.previous_state,
            &change.current_state,
        ))
    }

    /// Stop the named instance.
    async fn stop_instance(
        &self,
        instance_name: &str,
        dry_run: bool,
        force: bool,
    ) -> Result<String, PluginError> {
        let change = self
            .post_change(
                instance_name,
                "stop",
                ChangeRequest {
                    dry_run,
                    force: Some(force),
                },
            )
            .await?;
        Ok(format_state_change(
            &change.previous_state,
            &change.current_state,
        ))
    }

    /// Reboot the named instance.
    async fn reboot_instance(&self, instance_name: &str, dry_run: bool) -> Result<String, PluginError> {
        let url = self.instance_url(instance_name, "reboot");
        let response = self
            .request(
                self.client
                    .post(&url)
                    .json(&ChangeRequest { dry_run, force: None }),
            )
            .send()
            .await
            .map_err(|e| PluginError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok("Instance is rebooting".to_string())
        } else {
            Err(self.error_from_response(response, status).await)
        }
    }

    /// POST a state-change request and parse the reported transition.
    async fn post_change(
        &self,
        instance_name: &str,
        action: &str,
        body: ChangeRequest,
    ) -> Result<StateChange, PluginError> {
        let url = self.instance_url(instance_name, action);
        let response = self
            .request(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| PluginError::Network(e.to_string()))?;
        self.handle_response(response).await
    }
}

/// Format a reported state transition.
fn format_state_change(prev: &str, curr: &str) -> String {
    if prev == curr {
        format!("Instance state has not changed from: {}", curr)
    } else {
        format!("Instance changing: {} --> {}", prev, curr)
    }
}

/// Pull a required text argument out of the parameter set.
fn require<'a>(params: &'a ParameterSet, name: &str) -> Result<&'a str, PluginError> {
    params
        .text(name)
        .ok_or_else(|| PluginError::MissingArgument(name.to_string()))
}

#[async_trait]
impl Plugin for InstanceControl {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn schema(&self) -> &SchemaMap {
        &self.schema
    }

    async fn invoke(&self, operation: &str, params: &ParameterSet) -> Result<String, PluginError> {
        match operation {
            "instance_names" => self.instance_names(require(params, "channel")?).await,
            "instance_id" => {
                self.instance_id(
                    require(params, "instance_name")?,
                    require(params, "channel")?,
                )
                .await
            }
            "instance_state" => {
                self.instance_state(require(params, "instance_name")?, params.switch("dry_run"))
                    .await
            }
            "start_instance" => {
                self.start_instance(require(params, "instance_name")?, params.switch("dry_run"))
                    .await
            }
            "stop_instance" => {
                self.stop_instance(
                    require(params, "instance_name")?,
                    params.switch("dry_run"),
                    params.switch("force"),
                )
                .await
            }
            "reboot_instance" => {
                self.reboot_instance(require(params, "instance_name")?, params.switch("dry_run"))
                    .await
            }
            other => Err(PluginError::UnknownOperation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_the_six_operations() {
        let plugin = InstanceControl::new("https://compute.internal/api", None);
        let ops: Vec<_> = plugin.schema().keys().cloned().collect();
        assert_eq!(
            ops,
            [
                "instance_id",
                "instance_names",
                "instance_state",
                "reboot_instance",
                "start_instance",
                "stop_instance",
            ]
        );
    }

    #[test]
    fn every_schema_validates() {
        let plugin = InstanceControl::new("https://compute.internal/api", None);
        for (op, schema) in plugin.schema() {
            assert!(schema.validate().is_ok(), "schema for {} invalid", op);
        }
    }

    #[test]
    fn stop_declares_force_and_dry_run() {
        let plugin = InstanceControl::new("https://compute.internal/api", None);
        let schema = &plugin.schema()["stop_instance"];
        assert_eq!(schema.required(), ["instance_name"]);
        assert!(schema.is_switch("dry_run"));
        assert!(schema.is_switch("force"));
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let plugin = InstanceControl::new("https://compute.internal/api/", None);
        assert_eq!(
            plugin.instance_url("web-1", "state"),
            "https://compute.internal/api/instances/web-1/state"
        );
    }

    #[test]
    fn state_change_formatting() {
        assert_eq!(
            format_state_change("stopped", "pending"),
            "Instance changing: stopped --> pending"
        );
        assert_eq!(
            format_state_change("running", "running"),
            "Instance state has not changed from: running"
        );
    }

    #[tokio::test]
    async fn unknown_operation_is_rejected() {
        let plugin = InstanceControl::new("https://compute.internal/api", None);
        let result = plugin.invoke("terminate", &ParameterSet::new()).await;
        assert_eq!(
            result,
            Err(PluginError::UnknownOperation("terminate".into()))
        );
    }

    #[tokio::test]
    async fn missing_argument_is_rejected_before_any_request() {
        let plugin = InstanceControl::new("https://compute.internal/api", None);
        let result = plugin.invoke("instance_state", &ParameterSet::new()).await;
        assert_eq!(
            result,
            Err(PluginError::MissingArgument("instance_name".into()))
        );
    }
}
