//! Composition Orchestrator
//!
//! Single fail-fast pass from a validated [`DeploymentConfig`] to a
//! dependency-ordered [`ResourceGraph`]: validate → resolve network →
//! derive policies → storage → bootstrap → compute → address → optional
//! control surface. Either the whole graph is produced or nothing is.

use crate::address::{AddressPublisher, PublicAddress};
use crate::bootstrap::{BootstrapSequencer, PayloadLocator, SequenceError};
use crate::compute::{ComputeProvisioner, ComputeResource};
use crate::config::{ConfigError, DeploymentConfig};
use crate::control::{ControlApiProvisioner, ControlSurface};
use crate::graph::{GraphError, ResourceGraph, ResourceKind, ResourceNode};
use crate::inventory::{CachedInventory, NetworkInventory};
use crate::network::{NetworkContext, NetworkResolver, ResolveError};
use crate::security::{SecurityPolicies, SecurityPolicyBuilder};
use crate::storage::{StorageProvisioner, StorageResource};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of one composition run.
#[derive(Debug, Clone, Serialize)]
pub struct Composition {
    /// Per-run identifier. Metadata only; resource identities stay
    /// deterministic across runs of the same configuration.
    pub run_id: Uuid,
    /// When composition finished.
    pub composed_at: DateTime<Utc>,
    /// Resolved network placement.
    pub network: NetworkContext,
    /// Derived ingress policies.
    pub policies: SecurityPolicies,
    /// Save-data volume.
    pub storage: StorageResource,
    /// Server instance.
    pub server: ComputeResource,
    /// Public address binding.
    pub address: PublicAddress,
    /// Optional start trigger.
    pub control: Option<ControlSurface>,
    /// Dependency-ordered graph for the apply engine.
    pub graph: ResourceGraph,
}

/// Summary of a completed composition run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    /// Run identifier.
    pub run_id: Uuid,
    /// Deployment prefix of the run.
    pub prefix: String,
    /// When the run finished.
    pub composed_at: DateTime<Utc>,
    /// Number of declared resources.
    pub resources: usize,
}

/// Composes the resource graph for one deployment.
pub struct Orchestrator {
    inventory: Arc<dyn NetworkInventory>,
    /// Completed runs. Each run composes in isolation; this is bookkeeping
    /// only and never feeds back into composition.
    runs: RwLock<Vec<RunRecord>>,
}

impl Orchestrator {
    /// Create an orchestrator over the given inventory.
    pub fn new(inventory: Arc<dyn NetworkInventory>) -> Self {
        Self {
            inventory,
            runs: RwLock::new(Vec::new()),
        }
    }

    /// Summaries of completed runs, oldest first.
    pub fn history(&self) -> Vec<RunRecord> {
        self.runs.read().clone()
    }

    /// Compose the full resource graph. Fails fast before any resource is
    /// declared; a partial graph is never returned.
    pub async fn compose(
        &self,
        config: DeploymentConfig,
        payload: PayloadLocator,
    ) -> Result<Composition, ComposeError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, prefix = %config.prefix, "composing deployment");

        // Malformed input surfaces before anything else happens.
        config.validate()?;

        // Inventory reads are idempotent; cache them for the run.
        let inventory = CachedInventory::new(self.inventory.clone());
        let network = NetworkResolver::new(&inventory).resolve(&config).await?;
        info!(network = %network.network.id, subnet = %network.subnet.id, "network resolved");

        let policies = SecurityPolicyBuilder::build(&config.prefix, &network);
        let storage = StorageProvisioner::provision(&config.prefix, policies.storage_mount.id.clone());

        let bootstrap = BootstrapSequencer::sequence(&payload, &storage.name);
        bootstrap.verify_order()?;

        let server = ComputeProvisioner::provision(
            &config.prefix,
            &network,
            policies.compute.id.clone(),
            bootstrap,
            &payload,
        );
        let address = AddressPublisher::publish(&config.prefix, &server);
        let control = ControlApiProvisioner::provision(&config, &server);
        debug!(control = control.is_some(), "control surface gated");

        let graph = build_graph(&policies, &storage, &server, &address, control.as_ref())?;
        info!(resources = graph.nodes().len(), "composition complete");

        let composed_at = Utc::now();
        self.runs.write().push(RunRecord {
            run_id,
            prefix: config.prefix.clone(),
            composed_at,
            resources: graph.nodes().len(),
        });

        Ok(Composition {
            run_id,
            composed_at,
            network,
            policies,
            storage,
            server,
            address,
            control,
            graph,
        })
    }
}

fn build_graph(
    policies: &SecurityPolicies,
    storage: &StorageResource,
    server: &ComputeResource,
    address: &PublicAddress,
    control: Option<&ControlSurface>,
) -> Result<ResourceGraph, ComposeError> {
    let mut graph = ResourceGraph::new();

    let compute_policy = &policies.compute.id.0;
    let storage_policy = &policies.storage_mount.id.0;

    graph.add(
        node(compute_policy, ResourceKind::SecurityPolicy, &policies.compute)?,
        &[],
    )?;
    // The mount policy admits the compute policy's holders, so it depends
    // on that policy existing first.
    graph.add(
        node(storage_policy, ResourceKind::SecurityPolicy, &policies.storage_mount)?,
        &[compute_policy],
    )?;
    graph.add(
        node(&storage.name, ResourceKind::Storage, storage)?,
        &[storage_policy],
    )?;
    // The instance carries the compute policy and its bootstrap references
    // the storage identity.
    graph.add(
        node(&server.name, ResourceKind::Compute, server)?,
        &[compute_policy, &storage.name],
    )?;
    graph.add(
        node(&address.name, ResourceKind::PublicAddress, address)?,
        &[&server.name],
    )?;

    if let Some(surface) = control {
        graph.add(
            node(&surface.handler.name, ResourceKind::ControlHandler, &surface.handler)?,
            &[&server.name],
        )?;
        graph.add(
            node(&surface.endpoint.name, ResourceKind::ControlEndpoint, &surface.endpoint)?,
            &[&surface.handler.name],
        )?;
    }

    Ok(graph)
}

fn node<T: Serialize>(
    name: &hostkit_common::ResourceName,
    kind: ResourceKind,
    spec: &T,
) -> Result<ResourceNode, ComposeError> {
    Ok(ResourceNode {
        name: name.clone(),
        kind,
        spec: serde_json::to_value(spec)?,
    })
}

/// Composition errors
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Malformed input, surfaced before composition.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    /// Inventory holds no network/subnet satisfying the constraints.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolveError),
    /// A component composed before its dependency. Programming defect.
    #[error("dependency violation: {0}")]
    DependencyViolation(#[from] GraphError),
    /// The bootstrap sequence broke its ordering invariant. Programming defect.
    #[error("bootstrap sequence invalid: {0}")]
    Sequence(#[from] SequenceError),
    /// A resource spec failed to serialize.
    #[error("spec serialization failed: {0}")]
    Spec(#[from] serde_json::Error),
}

impl From<ComposeError> for hostkit_common::ProvisionError {
    /// Collapse into the shared error taxonomy for callers that only care
    /// about the kind. Sequence and spec failures are internal invariant
    /// breaks and classify as dependency violations.
    fn from(err: ComposeError) -> Self {
        use hostkit_common::ProvisionError;
        match &err {
            ComposeError::Configuration(_) => ProvisionError::Configuration(err.to_string()),
            ComposeError::Resolution(_) => ProvisionError::Resolution(err.to_string()),
            ComposeError::DependencyViolation(_)
            | ComposeError::Sequence(_)
            | ComposeError::Spec(_) => ProvisionError::DependencyViolation(err.to_string()),
        }
    }
}
