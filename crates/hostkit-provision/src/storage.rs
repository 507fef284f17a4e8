//! Save-Data Storage
//!
//! Declares the persistent volume that outlives the server instance. Save
//! data is the only state worth keeping; the instance itself is replaceable.

use crate::security::PolicyId;
use hostkit_common::constants::COLD_TIER_AFTER_DAYS;
use hostkit_common::ResourceName;
use serde::{Deserialize, Serialize};

/// Throughput tier of the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThroughputMode {
    /// Burst credits suit intermittent game-session load.
    Bursting,
    /// Fixed provisioned throughput.
    Provisioned,
}

/// Performance mode of the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceMode {
    /// Low-latency general purpose.
    GeneralPurpose,
    /// Higher aggregate throughput at higher latency.
    MaxIo,
}

/// What happens to the volume when the owning deployment is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    /// Keep the resource. Save data must survive instance teardown.
    Retain,
    /// Destroy with the deployment.
    Destroy,
}

/// Tiering rule for infrequently accessed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRule {
    /// Days without access before transition to the cheaper tier.
    pub cold_after_days: u32,
}

/// Persistent, independently retained save-data volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageResource {
    /// Volume identity.
    pub name: ResourceName,
    /// Encryption at rest.
    pub encrypted: bool,
    /// Automatic backups.
    pub automatic_backups: bool,
    /// Throughput tier.
    pub throughput: ThroughputMode,
    /// Performance mode.
    pub performance: PerformanceMode,
    /// Cold-tier transition rule.
    pub lifecycle: LifecycleRule,
    /// Removal behavior.
    pub removal: RemovalPolicy,
    /// Ingress policy on the mount point.
    pub mount_policy: PolicyId,
}

/// Declares the save-data volume.
pub struct StorageProvisioner;

impl StorageProvisioner {
    /// Declare the volume bound to the storage-mount policy.
    pub fn provision(prefix: &str, mount_policy: PolicyId) -> StorageResource {
        StorageResource {
            name: ResourceName::scoped(prefix, "SaveData"),
            encrypted: true,
            automatic_backups: true,
            throughput: ThroughputMode::Bursting,
            performance: PerformanceMode::GeneralPurpose,
            lifecycle: LifecycleRule {
                cold_after_days: COLD_TIER_AFTER_DAYS,
            },
            removal: RemovalPolicy::Retain,
            mount_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mount_policy() -> PolicyId {
        PolicyId(ResourceName::scoped("Game", "StorageMountSg"))
    }

    #[test]
    fn test_storage_is_encrypted_backed_up_and_retained() {
        let storage = StorageProvisioner::provision("Game", mount_policy());
        assert!(storage.encrypted);
        assert!(storage.automatic_backups);
        assert_eq!(storage.removal, RemovalPolicy::Retain);
        assert_eq!(storage.throughput, ThroughputMode::Bursting);
    }

    #[test]
    fn test_cold_tier_window_is_fixed() {
        let storage = StorageProvisioner::provision("Game", mount_policy());
        assert_eq!(storage.lifecycle.cold_after_days, 90);
    }

    #[test]
    fn test_storage_binds_mount_policy() {
        let policy = mount_policy();
        let storage = StorageProvisioner::provision("Game", policy.clone());
        assert_eq!(storage.mount_policy, policy);
    }
}
