//! External Network Inventory
//!
//! Composition never creates networks; it resolves against inventory the
//! provider already holds. The lookup seam is an async trait so a provider
//! SDK adapter can slot in without touching the resolver. Lookups are
//! idempotent reads and may be retried or cached per deployment run.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A virtual network known to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRecord {
    /// Provider-assigned network identifier.
    pub id: String,
    /// Whether this is the account's default network.
    pub is_default: bool,
    /// Network CIDR block.
    pub cidr: String,
}

/// A subnet inside a known network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetRecord {
    /// Provider-assigned subnet identifier.
    pub id: String,
    /// Availability zone the subnet lives in.
    pub availability_zone: String,
    /// Whether the subnet is externally reachable.
    pub is_public: bool,
}

/// How to look a network up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkQuery {
    /// Resolve the network with this exact identifier.
    ById(String),
    /// Resolve the account's default network.
    Default,
}

/// Read-only view over the provider's network inventory.
#[async_trait]
pub trait NetworkInventory: Send + Sync {
    /// Find the network matching the query, if any.
    async fn find_network(&self, query: &NetworkQuery) -> Result<Option<NetworkRecord>, InventoryError>;

    /// List subnets of a network.
    async fn list_subnets(&self, network_id: &str) -> Result<Vec<SubnetRecord>, InventoryError>;
}

/// Inventory lookup errors
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// Transient transport failure; the caller may retry the query.
    #[error("inventory unavailable: {0}")]
    Unavailable(String),
}

/// In-memory inventory for tests and offline composition.
#[derive(Debug, Default)]
pub struct StaticInventory {
    networks: Vec<NetworkRecord>,
    subnets: Vec<(String, SubnetRecord)>,
}

impl StaticInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a network.
    pub fn with_network(mut self, network: NetworkRecord) -> Self {
        self.networks.push(network);
        self
    }

    /// Add a subnet under a network.
    pub fn with_subnet(mut self, network_id: &str, subnet: SubnetRecord) -> Self {
        self.subnets.push((network_id.to_string(), subnet));
        self
    }
}

#[async_trait]
impl NetworkInventory for StaticInventory {
    async fn find_network(&self, query: &NetworkQuery) -> Result<Option<NetworkRecord>, InventoryError> {
        let found = match query {
            NetworkQuery::ById(id) => self.networks.iter().find(|n| &n.id == id),
            NetworkQuery::Default => self.networks.iter().find(|n| n.is_default),
        };
        Ok(found.cloned())
    }

    async fn list_subnets(&self, network_id: &str) -> Result<Vec<SubnetRecord>, InventoryError> {
        Ok(self
            .subnets
            .iter()
            .filter(|(nid, _)| nid == network_id)
            .map(|(_, s)| s.clone())
            .collect())
    }
}

/// Per-run read cache around any inventory.
///
/// A deployment run may query the same network or subnet list more than
/// once; the underlying lookups are idempotent, so first answers are kept
/// for the lifetime of the run.
pub struct CachedInventory {
    inner: Arc<dyn NetworkInventory>,
    networks: DashMap<NetworkQuery, Option<NetworkRecord>>,
    subnets: DashMap<String, Vec<SubnetRecord>>,
}

impl CachedInventory {
    /// Wrap an inventory with a per-run cache.
    pub fn new(inner: Arc<dyn NetworkInventory>) -> Self {
        Self {
            inner,
            networks: DashMap::new(),
            subnets: DashMap::new(),
        }
    }
}

#[async_trait]
impl NetworkInventory for CachedInventory {
    async fn find_network(&self, query: &NetworkQuery) -> Result<Option<NetworkRecord>, InventoryError> {
        if let Some(hit) = self.networks.get(query) {
            return Ok(hit.clone());
        }
        let answer = self.inner.find_network(query).await?;
        self.networks.insert(query.clone(), answer.clone());
        Ok(answer)
    }

    async fn list_subnets(&self, network_id: &str) -> Result<Vec<SubnetRecord>, InventoryError> {
        if let Some(hit) = self.subnets.get(network_id) {
            return Ok(hit.clone());
        }
        let answer = self.inner.list_subnets(network_id).await?;
        self.subnets.insert(network_id.to_string(), answer.clone());
        Ok(answer)
    }
}

#[cfg(test)]
pub(crate) fn test_inventory() -> StaticInventory {
    StaticInventory::new()
        .with_network(NetworkRecord {
            id: "vpc-default".into(),
            is_default: true,
            cidr: "172.31.0.0/16".into(),
        })
        .with_network(NetworkRecord {
            id: "vpc-custom".into(),
            is_default: false,
            cidr: "10.0.0.0/16".into(),
        })
        .with_subnet(
            "vpc-default",
            SubnetRecord {
                id: "subnet-pub".into(),
                availability_zone: "us-east-1a".into(),
                is_public: true,
            },
        )
        .with_subnet(
            "vpc-default",
            SubnetRecord {
                id: "subnet-priv".into(),
                availability_zone: "us-east-1b".into(),
                is_public: false,
            },
        )
        .with_subnet(
            "vpc-custom",
            SubnetRecord {
                id: "subnet-custom".into(),
                availability_zone: "us-east-1c".into(),
                is_public: true,
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_static_inventory_default_lookup() {
        let inv = test_inventory();
        let net = inv.find_network(&NetworkQuery::Default).await.unwrap().unwrap();
        assert_eq!(net.id, "vpc-default");
    }

    #[tokio::test]
    async fn test_static_inventory_by_id() {
        let inv = test_inventory();
        let net = inv
            .find_network(&NetworkQuery::ById("vpc-custom".into()))
            .await
            .unwrap()
            .unwrap();
        assert!(!net.is_default);
    }

    struct CountingInventory {
        inner: StaticInventory,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NetworkInventory for CountingInventory {
        async fn find_network(&self, query: &NetworkQuery) -> Result<Option<NetworkRecord>, InventoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_network(query).await
        }

        async fn list_subnets(&self, network_id: &str) -> Result<Vec<SubnetRecord>, InventoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_subnets(network_id).await
        }
    }

    #[tokio::test]
    async fn test_cache_answers_repeat_queries_once() {
        let counting = Arc::new(CountingInventory {
            inner: test_inventory(),
            calls: AtomicUsize::new(0),
        });
        let cached = CachedInventory::new(counting.clone());

        for _ in 0..3 {
            cached.find_network(&NetworkQuery::Default).await.unwrap();
            cached.list_subnets("vpc-default").await.unwrap();
        }

        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }
}
