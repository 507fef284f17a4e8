//! HostKit Provisioning
//!
//! Turns a small deployment configuration into a fully specified,
//! dependency-ordered resource graph for hosting a single game server
//! instance, plus an optional remote start endpoint.
//!
//! Composition is one synchronous, side-effect-free pass: the same
//! configuration always yields the same graph. The only external touchpoint
//! is the read-only network inventory; materializing the graph belongs to
//! the provider's apply engine.
//!
//! # Composition order
//!
//! ```text
//! DeploymentConfig
//!   └─ NetworkResolver ──► NetworkContext
//!        └─ SecurityPolicyBuilder ──► compute policy, storage-mount policy
//!             ├─ StorageProvisioner ──► save-data volume
//!             │    └─ BootstrapSequencer ──► 5 ordered first-boot steps
//!             │         └─ ComputeProvisioner ──► server instance
//!             │              ├─ AddressPublisher ──► public address
//!             │              └─ ControlApiProvisioner ──► start trigger (flag-gated)
//!             └──────────────────────────► ResourceGraph
//! ```

#![warn(missing_docs)]

pub mod address;
pub mod bootstrap;
pub mod compute;
pub mod config;
pub mod control;
pub mod graph;
pub mod inventory;
pub mod network;
pub mod orchestrator;
pub mod security;
pub mod storage;
pub mod synth;

pub use bootstrap::{BootstrapSequence, BootstrapSequencer, BootstrapStep, PayloadLocator};
pub use compute::{ComputeProvisioner, ComputeResource};
pub use config::DeploymentConfig;
pub use graph::{DependencyEdge, ResourceGraph, ResourceKind};
pub use inventory::{NetworkInventory, StaticInventory};
pub use network::{NetworkContext, NetworkResolver};
pub use orchestrator::{ComposeError, Composition, Orchestrator, RunRecord};
pub use security::{SecurityPolicies, SecurityPolicyBuilder};
pub use storage::{StorageProvisioner, StorageResource};
pub use synth::GraphDocument;
