//! Security Policy Derivation
//!
//! Two ingress policies are derived from the resolved network context: the
//! compute policy opens the game port to the world, and the storage-mount
//! policy admits only traffic from principals holding the compute policy.
//! The storage policy references the compute policy by identity, never by a
//! copied membership list, so a change to the compute policy's scope narrows
//! or widens the mount policy with it.

use crate::network::NetworkContext;
use hostkit_common::constants::{GAME_PORT, NFS_PORT};
use hostkit_common::ResourceName;
use serde::{Deserialize, Serialize};

/// Identity of a security policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub ResourceName);

/// Where ingress traffic may originate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerSource {
    /// Any IPv4 source.
    AnyIpv4,
    /// Principals holding the referenced policy.
    Policy(PolicyId),
}

/// Transport protocol of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// TCP
    Tcp,
    /// UDP
    Udp,
}

/// One ingress rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    /// Allowed traffic source.
    pub source: PeerSource,
    /// Transport protocol.
    pub protocol: Protocol,
    /// Destination port.
    pub port: u16,
    /// Human-readable purpose of the rule.
    pub purpose: String,
}

/// Named set of ingress rules bound to a network-attached resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Policy identity.
    pub id: PolicyId,
    /// Network the policy is scoped to.
    pub network_id: String,
    /// What the policy protects.
    pub description: String,
    /// Ingress rules.
    pub rules: Vec<IngressRule>,
}

/// The pair of policies every deployment carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityPolicies {
    /// Policy on the compute instance.
    pub compute: SecurityPolicy,
    /// Policy on the storage mount point.
    pub storage_mount: SecurityPolicy,
}

/// Derives ingress policies from the resolved network context.
pub struct SecurityPolicyBuilder;

impl SecurityPolicyBuilder {
    /// Build the compute and storage-mount policies.
    pub fn build(prefix: &str, ctx: &NetworkContext) -> SecurityPolicies {
        let compute_id = PolicyId(ResourceName::scoped(prefix, "ServerSecurityGroup"));
        let compute = SecurityPolicy {
            id: compute_id.clone(),
            network_id: ctx.network.id.clone(),
            description: "Allow game clients to connect to server".into(),
            rules: vec![IngressRule {
                source: PeerSource::AnyIpv4,
                protocol: Protocol::Tcp,
                port: GAME_PORT,
                purpose: "Game port".into(),
            }],
        };

        let storage_mount = SecurityPolicy {
            id: PolicyId(ResourceName::scoped(prefix, "StorageMountSg")),
            network_id: ctx.network.id.clone(),
            description: "Allow NFS mount point access from the server policy".into(),
            rules: vec![IngressRule {
                source: PeerSource::Policy(compute_id),
                protocol: Protocol::Tcp,
                port: NFS_PORT,
                purpose: "Storage mount".into(),
            }],
        };

        SecurityPolicies {
            compute,
            storage_mount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentConfig;
    use crate::inventory::test_inventory;
    use crate::network::NetworkResolver;

    async fn context() -> NetworkContext {
        let inv = test_inventory();
        NetworkResolver::new(&inv)
            .resolve(&DeploymentConfig::new("Game", "A"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_compute_policy_opens_game_port_to_any() {
        let policies = SecurityPolicyBuilder::build("Game", &context().await);
        assert_eq!(policies.compute.rules.len(), 1);
        let rule = &policies.compute.rules[0];
        assert_eq!(rule.source, PeerSource::AnyIpv4);
        assert_eq!(rule.port, GAME_PORT);
        assert_eq!(rule.protocol, Protocol::Tcp);
    }

    #[tokio::test]
    async fn test_storage_policy_references_compute_policy_by_identity() {
        let policies = SecurityPolicyBuilder::build("Game", &context().await);
        assert_eq!(policies.storage_mount.rules.len(), 1);
        let rule = &policies.storage_mount.rules[0];
        assert_eq!(rule.source, PeerSource::Policy(policies.compute.id.clone()));
        assert_eq!(rule.port, NFS_PORT);
        // The mount point is never reachable from the open internet.
        assert!(policies
            .storage_mount
            .rules
            .iter()
            .all(|r| r.source != PeerSource::AnyIpv4));
    }

    #[tokio::test]
    async fn test_policies_are_scoped_to_resolved_network() {
        let ctx = context().await;
        let policies = SecurityPolicyBuilder::build("Game", &ctx);
        assert_eq!(policies.compute.network_id, ctx.network.id);
        assert_eq!(policies.storage_mount.network_id, ctx.network.id);
    }
}
