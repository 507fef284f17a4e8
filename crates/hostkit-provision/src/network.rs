//! Network Resolution
//!
//! Turns the optional network inputs of a [`DeploymentConfig`] into a
//! concrete network + subnet placement. Two strategies exist for each level:
//! an explicit identifier supplied by the caller, or discovery by
//! classification (default network, public subnet). Resolution is a pure
//! read over external inventory.

use crate::config::DeploymentConfig;
use crate::inventory::{InventoryError, NetworkInventory, NetworkQuery, NetworkRecord, SubnetRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the network was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkSelector {
    /// Caller supplied the network identifier.
    Explicit(String),
    /// Use the account's default network.
    Default,
}

/// How the subnet was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubnetSelector {
    /// Caller supplied the exact subnet and its zone.
    Explicit {
        /// Subnet identifier.
        subnet_id: String,
        /// Zone the subnet lives in.
        availability_zone: String,
    },
    /// Any externally reachable subnet of the resolved network.
    DiscoverPublic,
}

impl NetworkSelector {
    /// Derive the selector from configuration.
    pub fn from_config(config: &DeploymentConfig) -> Self {
        match &config.network_id {
            Some(id) => Self::Explicit(id.clone()),
            None => Self::Default,
        }
    }
}

impl SubnetSelector {
    /// Derive the selector from configuration. Assumes the config already
    /// passed validation, so the pair is either complete or absent.
    pub fn from_config(config: &DeploymentConfig) -> Self {
        match (&config.subnet_id, &config.availability_zone) {
            (Some(subnet_id), Some(availability_zone)) => Self::Explicit {
                subnet_id: subnet_id.clone(),
                availability_zone: availability_zone.clone(),
            },
            _ => Self::DiscoverPublic,
        }
    }
}

/// Resolved placement for the compute resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkContext {
    /// The resolved network.
    pub network: NetworkRecord,
    /// The resolved subnet within it.
    pub subnet: SubnetRecord,
    /// How the network was selected.
    pub network_selector: NetworkSelector,
    /// How the subnet was selected.
    pub subnet_selector: SubnetSelector,
}

/// Resolves network placement against external inventory.
pub struct NetworkResolver<'a> {
    inventory: &'a dyn NetworkInventory,
}

impl<'a> NetworkResolver<'a> {
    /// Create a resolver over the given inventory.
    pub fn new(inventory: &'a dyn NetworkInventory) -> Self {
        Self { inventory }
    }

    /// Resolve the network context for a validated configuration.
    pub async fn resolve(&self, config: &DeploymentConfig) -> Result<NetworkContext, ResolveError> {
        let network_selector = NetworkSelector::from_config(config);
        let subnet_selector = SubnetSelector::from_config(config);

        let query = match &network_selector {
            NetworkSelector::Explicit(id) => NetworkQuery::ById(id.clone()),
            NetworkSelector::Default => NetworkQuery::Default,
        };
        let network = self
            .inventory
            .find_network(&query)
            .await?
            .ok_or_else(|| match &network_selector {
                NetworkSelector::Explicit(id) => ResolveError::NetworkNotFound(id.clone()),
                NetworkSelector::Default => ResolveError::NoDefaultNetwork,
            })?;
        debug!(network = %network.id, "resolved network");

        let subnets = self.inventory.list_subnets(&network.id).await?;
        let subnet = match &subnet_selector {
            SubnetSelector::Explicit {
                subnet_id,
                availability_zone,
            } => subnets
                .into_iter()
                .find(|s| &s.id == subnet_id && &s.availability_zone == availability_zone)
                .ok_or_else(|| ResolveError::SubnetNotFound {
                    subnet_id: subnet_id.clone(),
                    availability_zone: availability_zone.clone(),
                })?,
            SubnetSelector::DiscoverPublic => subnets
                .into_iter()
                .find(|s| s.is_public)
                .ok_or_else(|| ResolveError::NoPublicSubnet(network.id.clone()))?,
        };
        debug!(subnet = %subnet.id, zone = %subnet.availability_zone, "resolved subnet");

        Ok(NetworkContext {
            network,
            subnet,
            network_selector,
            subnet_selector,
        })
    }
}

/// Network resolution errors
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("network not found: {0}")]
    NetworkNotFound(String),
    #[error("account has no default network")]
    NoDefaultNetwork,
    #[error("subnet {subnet_id} not found in zone {availability_zone}")]
    SubnetNotFound {
        subnet_id: String,
        availability_zone: String,
    },
    #[error("network {0} has no public subnet")]
    NoPublicSubnet(String),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}
