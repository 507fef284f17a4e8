//! Public Address Binding
//!
//! Allocates one stable public address for the instance. The binding records
//! the instance's replacement token: when the instance is replaced the
//! address must be rebound, not left pointing at a terminated machine.

use crate::compute::ComputeResource;
use hostkit_common::ResourceName;
use serde::{Deserialize, Serialize};

/// Stable public address bound to the server instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicAddress {
    /// Address identity.
    pub name: ResourceName,
    /// Instance the address is bound to.
    pub instance: ResourceName,
    /// Replacement token of the instance at binding time.
    pub bound_to_token: String,
}

/// Binds a public address to the declared instance.
pub struct AddressPublisher;

impl AddressPublisher {
    /// Publish the address for the given instance.
    pub fn publish(prefix: &str, server: &ComputeResource) -> PublicAddress {
        PublicAddress {
            name: ResourceName::scoped(prefix, "Eip"),
            instance: server.name.clone(),
            bound_to_token: server.replacement_token.clone(),
        }
    }
}
