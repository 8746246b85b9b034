//! Connection parameters handed to the deployment layer.

use std::path::PathBuf;

use serde::Deserialize;
use toml::Value;

use crate::constants::{KEY_FABRIC, KEY_PYE};
use crate::error::ConfigError;
use crate::resolver::VariableResolver;

/// The resolved `FABRIC` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FabricConfig {
    pub host: String,
    pub user: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub connect_kwargs: Option<toml::Table>,
}

/// Everything needed to open a deployment connection.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTarget {
    pub fabric: FabricConfig,
    /// Python executable on the remote host.
    pub pye: String,
    pub deploy_dir: PathBuf,
}

impl RemoteTarget {
    /// Resolve `FABRIC` and `PYE`; both are required.
    ///
    /// # Errors
    ///
    /// - `ConfigError::SectionNotFound` when either section is missing
    /// - `ConfigError::InvalidValue` when `FABRIC` lacks a string `host` or
    ///   `user`, or `PYE` is not a string
    pub fn from_resolver(resolver: &VariableResolver<'_>) -> Result<Self, ConfigError> {
        let fabric = Value::Table(resolver.resolve(KEY_FABRIC)?)
            .try_into::<FabricConfig>()
            .map_err(|e| ConfigError::InvalidValue {
                key: KEY_FABRIC.to_string(),
                message: format!("must contain string 'host' and 'user': {}", e.message()),
            })?;

        let pye = resolver
            .resolve(KEY_PYE)?
            .get(KEY_PYE)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: KEY_PYE.to_string(),
                message: "must be a string".to_string(),
            })?;

        tracing::debug!(host = %fabric.host, user = %fabric.user, pye = %pye, "Remote target");
        Ok(Self {
            fabric,
            pye,
            deploy_dir: resolver.deploy_dir(),
        })
    }
}
