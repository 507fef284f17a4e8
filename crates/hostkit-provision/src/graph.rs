//! Resource Graph
//!
//! The composition output handed to the external apply engine: declared
//! resources plus explicit depends-on edges. Nodes can only be added after
//! their dependencies, so insertion order is already a valid materialization
//! order and a violation is a programming defect, not a user error.

use hostkit_common::ResourceName;
use serde::{Deserialize, Serialize};

/// Kind of a declared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Ingress security policy.
    SecurityPolicy,
    /// Persistent save-data volume.
    Storage,
    /// Server instance.
    Compute,
    /// Stable public address.
    PublicAddress,
    /// Control handler.
    ControlHandler,
    /// Control endpoint.
    ControlEndpoint,
}

/// One declared resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Logical identity.
    pub name: ResourceName,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Full resource specification.
    pub spec: serde_json::Value,
}

/// Depends-on edge: `consumer` is never materialized before `dependency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The resource that requires the other.
    pub consumer: ResourceName,
    /// The resource that must exist first.
    pub dependency: ResourceName,
}

/// Dependency-ordered set of declared resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    edges: Vec<DependencyEdge>,
}

impl ResourceGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, declaring its dependencies. Every dependency must
    /// already be present in the graph.
    pub fn add(
        &mut self,
        node: ResourceNode,
        depends_on: &[&ResourceName],
    ) -> Result<(), GraphError> {
        if self.contains(&node.name) {
            return Err(GraphError::Duplicate(node.name.clone()));
        }
        for dep in depends_on {
            if !self.contains(dep) {
                return Err(GraphError::MissingDependency {
                    consumer: node.name.clone(),
                    dependency: (*dep).clone(),
                });
            }
        }
        for dep in depends_on {
            self.edges.push(DependencyEdge {
                consumer: node.name.clone(),
                dependency: (*dep).clone(),
            });
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Whether a resource is declared.
    pub fn contains(&self, name: &ResourceName) -> bool {
        self.nodes.iter().any(|n| &n.name == name)
    }

    /// Declared resources in materialization order.
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    /// Explicit dependency edges.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Names in materialization order (dependencies first).
    pub fn ordering(&self) -> Vec<&ResourceName> {
        self.nodes.iter().map(|n| &n.name).collect()
    }

    /// Resources of a kind.
    pub fn of_kind(&self, kind: ResourceKind) -> Vec<&ResourceNode> {
        self.nodes.iter().filter(|n| n.kind == kind).collect()
    }
}

/// Graph construction errors
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("resource declared twice: {0}")]
    Duplicate(ResourceName),
    #[error("{consumer} composed before its dependency {dependency}")]
    MissingDependency {
        consumer: ResourceName,
        dependency: ResourceName,
    },
}
