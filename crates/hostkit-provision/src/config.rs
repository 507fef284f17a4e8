//! Deployment Configuration
//!
//! Immutable input to composition. Loaded once by the caller and passed by
//! value into the orchestrator; there is no ambient global configuration.

use serde::{Deserialize, Serialize};

/// Deployment configuration for a single game server instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Naming prefix applied to every declared resource.
    pub prefix: String,
    /// Existing network to deploy into. When absent the account's default
    /// network is discovered instead.
    #[serde(default)]
    pub network_id: Option<String>,
    /// Exact subnet to bind. Must co-occur with `availability_zone`.
    #[serde(default)]
    pub subnet_id: Option<String>,
    /// Availability zone of `subnet_id`. Must co-occur with `subnet_id`.
    #[serde(default)]
    pub availability_zone: Option<String>,
    /// Enable the remote start endpoint.
    #[serde(default)]
    pub restart_api: bool,
    /// Tenant/owner identifier used to scope the control action's grant.
    pub account: String,
}

impl DeploymentConfig {
    /// Create a minimal configuration with discovery defaults.
    pub fn new(prefix: &str, account: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            network_id: None,
            subnet_id: None,
            availability_zone: None,
            restart_api: false,
            account: account.to_string(),
        }
    }

    /// Pin the deployment to an existing network.
    pub fn with_network(mut self, network_id: &str) -> Self {
        self.network_id = Some(network_id.to_string());
        self
    }

    /// Pin the deployment to an exact subnet in a zone.
    pub fn with_subnet(mut self, subnet_id: &str, availability_zone: &str) -> Self {
        self.subnet_id = Some(subnet_id.to_string());
        self.availability_zone = Some(availability_zone.to_string());
        self
    }

    /// Enable the remote start endpoint.
    pub fn with_restart_api(mut self) -> Self {
        self.restart_api = true;
        self
    }

    /// Validate the configuration before any composition begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if self.account.is_empty() {
            return Err(ConfigError::EmptyAccount);
        }
        // Subnet id and zone are a pair: one without the other cannot be
        // resolved to a concrete placement.
        match (&self.subnet_id, &self.availability_zone) {
            (Some(_), None) => Err(ConfigError::PartialSubnet("availability_zone")),
            (None, Some(_)) => Err(ConfigError::PartialSubnet("subnet_id")),
            _ => Ok(()),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("prefix must not be empty")]
    EmptyPrefix,
    #[error("account must not be empty")]
    EmptyAccount,
    #[error("partial subnet specification: missing {0}")]
    PartialSubnet(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_is_valid() {
        let config = DeploymentConfig::new("Satisfactory", "123456789012");
        assert!(config.validate().is_ok());
        assert!(!config.restart_api);
    }

    #[test]
    fn test_subnet_without_zone_is_rejected() {
        let mut config = DeploymentConfig::new("Satisfactory", "123456789012");
        config.subnet_id = Some("subnet-1".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PartialSubnet("availability_zone"))
        ));
    }

    #[test]
    fn test_zone_without_subnet_is_rejected() {
        let mut config = DeploymentConfig::new("Satisfactory", "123456789012");
        config.availability_zone = Some("us-east-1a".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PartialSubnet("subnet_id"))
        ));
    }

    #[test]
    fn test_full_subnet_pair_is_valid() {
        let config = DeploymentConfig::new("Satisfactory", "123456789012")
            .with_subnet("subnet-1", "us-east-1a");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: DeploymentConfig =
            serde_json::from_str(r#"{"prefix":"Game","account":"A"}"#).unwrap();
        assert!(config.network_id.is_none());
        assert!(!config.restart_api);
        assert!(config.validate().is_ok());
    }
}
