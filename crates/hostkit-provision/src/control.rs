//! Remote Start Endpoint
//!
//! Flag-gated trigger that lets an operator start a stopped server without
//! provider-console access. The handler is authorized for exactly one
//! action on exactly one instance; absence of the flag declares nothing.

use crate::compute::ComputeResource;
use crate::config::DeploymentConfig;
use hostkit_common::ResourceName;
use serde::{Deserialize, Serialize};

/// The one privileged action the handler may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlAction {
    /// Start or resume the instance. Never stop, terminate or modify.
    Start,
}

/// Stateless handler invoking the control action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlHandler {
    /// Handler identity.
    pub name: ResourceName,
    /// Actions the handler is authorized for.
    pub actions: Vec<ControlAction>,
    /// Authorization scope naming the specific instance, never a wildcard.
    pub resource_scope: String,
    /// Instance the handler acts on.
    pub instance: ResourceName,
    /// Invocation timeout in seconds.
    pub timeout_secs: u32,
}

/// Public request/response endpoint invoking the handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlEndpoint {
    /// Endpoint identity.
    pub name: ResourceName,
    /// Handler behind the endpoint.
    pub handler: ResourceName,
    /// What the endpoint does.
    pub description: String,
}

/// Handler plus endpoint, declared together or not at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSurface {
    /// The start handler.
    pub handler: ControlHandler,
    /// The public endpoint.
    pub endpoint: ControlEndpoint,
}

const HANDLER_TIMEOUT_SECS: u32 = 10;

/// Declares the optional control surface.
pub struct ControlApiProvisioner;

impl ControlApiProvisioner {
    /// Declare the start trigger when the config enables it. Returns `None`
    /// otherwise: no hidden always-on control surface.
    pub fn provision(config: &DeploymentConfig, server: &ComputeResource) -> Option<ControlSurface> {
        if !config.restart_api {
            return None;
        }

        let handler_name = ResourceName::scoped(&config.prefix, "StartServerFn");
        let handler = ControlHandler {
            name: handler_name.clone(),
            actions: vec![ControlAction::Start],
            resource_scope: format!(
                "arn:aws:ec2:*:{}:instance/{}",
                config.account, server.name
            ),
            instance: server.name.clone(),
            timeout_secs: HANDLER_TIMEOUT_SECS,
        };
        let endpoint = ControlEndpoint {
            name: ResourceName::scoped(&config.prefix, "StartServerApi"),
            handler: handler_name,
            description: "Trigger start of the game server".into(),
        };

        Some(ControlSurface { handler, endpoint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{BootstrapSequencer, PayloadLocator};
    use crate::compute::ComputeProvisioner;
    use crate::inventory::test_inventory;
    use crate::network::NetworkResolver;
    use crate::security::SecurityPolicyBuilder;

    async fn server(config: &DeploymentConfig) -> ComputeResource {
        let inv = test_inventory();
        let ctx = NetworkResolver::new(&inv).resolve(config).await.unwrap();
        let policies = SecurityPolicyBuilder::build(&config.prefix, &ctx);
        let payload = PayloadLocator::new("assets", "payload.zip");
        let bootstrap = BootstrapSequencer::sequence(
            &payload,
            &ResourceName::scoped(&config.prefix, "SaveData"),
        );
        ComputeProvisioner::provision(&config.prefix, &ctx, policies.compute.id, bootstrap, &payload)
    }

    #[tokio::test]
    async fn test_disabled_flag_declares_nothing() {
        let config = DeploymentConfig::new("Game", "123456789012");
        let server = server(&config).await;
        assert!(ControlApiProvisioner::provision(&config, &server).is_none());
    }

    #[tokio::test]
    async fn test_enabled_flag_declares_start_only_handler() {
        let config = DeploymentConfig::new("Game", "123456789012").with_restart_api();
        let server = server(&config).await;
        let surface = ControlApiProvisioner::provision(&config, &server).unwrap();

        assert_eq!(surface.handler.actions, vec![ControlAction::Start]);
        assert_eq!(surface.handler.instance, server.name);
        assert_eq!(surface.endpoint.handler, surface.handler.name);
    }

    #[tokio::test]
    async fn test_scope_embeds_account_and_instance_identity() {
        let config = DeploymentConfig::new("Game", "123456789012").with_restart_api();
        let server = server(&config).await;
        let surface = ControlApiProvisioner::provision(&config, &server).unwrap();

        assert!(surface.handler.resource_scope.contains("123456789012"));
        assert!(surface
            .handler
            .resource_scope
            .contains(server.name.as_str()));
        assert!(!surface.handler.resource_scope.ends_with("instance/*"));
    }
}
