//! Client configuration loading from YAML files
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! standard host-meta discovery behaviour.

use crate::{DiscoveryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default location of the domain-level document. `{domain}` is replaced.
pub const DEFAULT_HOST_META_TEMPLATE: &str = "http://{domain}/.well-known/host-meta";

/// Default relation marking the link to the per-user service document
pub const DEFAULT_DISCOVERY_REL: &str = "describedby";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Discovery client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Domain-level document URL with a `{domain}` placeholder
    pub host_meta_template: String,

    /// Relation type selecting the service link in the domain document
    pub discovery_rel: String,

    /// Timeout applied by the HTTP transport to each fetch
    pub timeout_secs: u64,

    /// User-Agent header sent with each fetch
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host_meta_template: DEFAULT_HOST_META_TEMPLATE.to_string(),
            discovery_rel: DEFAULT_DISCOVERY_REL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("webfinger-lookup/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DiscoveryError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            DiscoveryError::Config(msg) => {
                DiscoveryError::Config(format!("{} (in {:?})", msg, path))
            }
            other => other,
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: ClientConfig = serde_yaml::from_str(yaml)
            .map_err(|e| DiscoveryError::Config(format!("Failed to parse config YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Build the domain-level document URL for `domain`
    pub fn host_meta_url(&self, domain: &str) -> String {
        self.host_meta_template.replace("{domain}", domain)
    }

    fn validate(&self) -> Result<()> {
        if !self.host_meta_template.contains("{domain}") {
            return Err(DiscoveryError::Config(format!(
                "host_meta_template must contain {{domain}}: {}",
                self.host_meta_template
            )));
        }
        if self.discovery_rel.trim().is_empty() {
            return Err(DiscoveryError::Config(
                "discovery_rel must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
