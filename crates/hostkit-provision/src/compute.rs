//! Server Instance Declaration
//!
//! Declares the compute resource that runs the game server. The instance is
//! replaceable by design: any change to the first-boot sequence forces a
//! fresh instance, because first-boot scripts cannot be safely re-run on a
//! live machine.

use crate::bootstrap::{BootstrapSequence, PayloadLocator};
use crate::network::NetworkContext;
use crate::security::PolicyId;
use hostkit_common::ResourceName;
use serde::{Deserialize, Serialize};

/// CPU architecture of the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuArch {
    /// 64-bit Arm
    Arm64,
    /// 64-bit x86
    X86_64,
}

/// Base machine image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineImage {
    /// Image family name.
    pub family: String,
    /// Architecture. Must match the instance class.
    pub arch: CpuArch,
}

/// Boot/data disk specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSpec {
    /// Device name.
    pub device: String,
    /// Size in GiB, sized for the application payload plus save staging.
    pub size_gib: u32,
}

/// Permission granted to the instance identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleGrant {
    /// Provider-managed policy attached to the instance role.
    ManagedPolicy(String),
    /// Read access to the payload source so first boot can fetch it.
    ReadPayload(PayloadLocator),
}

/// The game server instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeResource {
    /// Instance identity.
    pub name: ResourceName,
    /// Fixed size class.
    pub instance_type: String,
    /// Base image.
    pub image: MachineImage,
    /// Single boot/data disk.
    pub disk: DiskSpec,
    /// Subnet the instance is placed in.
    pub subnet_id: String,
    /// Ingress policy applied to the instance.
    pub policy: PolicyId,
    /// Ordered first-boot sequence. Owned exclusively by this resource.
    pub bootstrap: BootstrapSequence,
    /// Permissions granted to the instance identity.
    pub grants: Vec<RoleGrant>,
    /// Replacement token derived from the bootstrap sequence. A new token
    /// means the apply engine must replace the instance, never mutate it.
    pub replacement_token: String,
}

const INSTANCE_TYPE: &str = "t4g.medium";
const IMAGE_FAMILY: &str = "amazon-linux-2";
const DISK_DEVICE: &str = "/dev/sda1";
const DISK_SIZE_GIB: u32 = 15;

/// Managed policy granting session-manager access. The compute policy only
/// opens the game port, so remote administration has to go through the
/// management channel rather than inbound SSH.
const MANAGEMENT_CHANNEL_POLICY: &str = "AmazonSSMManagedInstanceCore";

/// Declares the server instance.
pub struct ComputeProvisioner;

impl ComputeProvisioner {
    /// Declare the instance in the resolved subnet with the compute policy
    /// and the given first-boot sequence.
    pub fn provision(
        prefix: &str,
        ctx: &NetworkContext,
        policy: PolicyId,
        bootstrap: BootstrapSequence,
        payload: &PayloadLocator,
    ) -> ComputeResource {
        let replacement_token = bootstrap.fingerprint();
        ComputeResource {
            name: ResourceName::scoped(prefix, "Server"),
            instance_type: INSTANCE_TYPE.into(),
            image: MachineImage {
                family: IMAGE_FAMILY.into(),
                arch: CpuArch::Arm64,
            },
            disk: DiskSpec {
                device: DISK_DEVICE.into(),
                size_gib: DISK_SIZE_GIB,
            },
            subnet_id: ctx.subnet.id.clone(),
            policy,
            bootstrap,
            grants: vec![
                RoleGrant::ManagedPolicy(MANAGEMENT_CHANNEL_POLICY.into()),
                RoleGrant::ReadPayload(payload.clone()),
            ],
            replacement_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::BootstrapSequencer;
    use crate::config::DeploymentConfig;
    use crate::inventory::test_inventory;
    use crate::network::NetworkResolver;
    use crate::security::SecurityPolicyBuilder;

    async fn provision_with(payload: &PayloadLocator) -> ComputeResource {
        let inv = test_inventory();
        let config = DeploymentConfig::new("Game", "A");
        let ctx = NetworkResolver::new(&inv).resolve(&config).await.unwrap();
        let policies = SecurityPolicyBuilder::build("Game", &ctx);
        let storage_name = ResourceName::scoped("Game", "SaveData");
        let bootstrap = BootstrapSequencer::sequence(payload, &storage_name);
        ComputeProvisioner::provision("Game", &ctx, policies.compute.id, bootstrap, payload)
    }

    #[tokio::test]
    async fn test_instance_placed_in_resolved_public_subnet() {
        let payload = PayloadLocator::new("assets", "payload.zip");
        let server = provision_with(&payload).await;
        assert_eq!(server.subnet_id, "subnet-pub");
        assert_eq!(server.instance_type, "t4g.medium");
        assert_eq!(server.image.arch, CpuArch::Arm64);
    }

    #[tokio::test]
    async fn test_management_channel_grant_is_always_present() {
        let payload = PayloadLocator::new("assets", "payload.zip");
        let server = provision_with(&payload).await;
        assert!(server
            .grants
            .iter()
            .any(|g| matches!(g, RoleGrant::ManagedPolicy(p) if p == "AmazonSSMManagedInstanceCore")));
        assert!(server
            .grants
            .iter()
            .any(|g| matches!(g, RoleGrant::ReadPayload(p) if p == &payload)));
    }

    #[tokio::test]
    async fn test_bootstrap_change_forces_replacement() {
        let a = provision_with(&PayloadLocator::new("assets", "payload.zip")).await;
        let b = provision_with(&PayloadLocator::new("assets", "payload-v2.zip")).await;
        assert_ne!(a.replacement_token, b.replacement_token);

        let same = provision_with(&PayloadLocator::new("assets", "payload.zip")).await;
        assert_eq!(a.replacement_token, same.replacement_token);
    }

    #[tokio::test]
    async fn test_replacement_token_matches_bootstrap_fingerprint() {
        let payload = PayloadLocator::new("assets", "payload.zip");
        let server = provision_with(&payload).await;
        assert_eq!(server.replacement_token, server.bootstrap.fingerprint());
    }
}
