//! Buff configuration loading

use super::ConfigError;
use crate::buff::{BuffConfig, BuffConfigSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Container for buff configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffsConfig {
    #[serde(default)]
    pub buffs: Vec<BuffConfig>,
}

/// Load buff configurations from a TOML file
pub fn load_buff_configs(path: &Path) -> Result<BuffConfigSet, ConfigError> {
    let config: BuffsConfig = super::load_toml(path)?;
    build_set(config)
}

/// Load buff configurations from a TOML string
pub fn parse_buff_configs(content: &str) -> Result<BuffConfigSet, ConfigError> {
    let config: BuffsConfig = super::parse_toml(content)?;
    build_set(config)
}

fn build_set(config: BuffsConfig) -> Result<BuffConfigSet, ConfigError> {
    let mut seen = HashSet::new();
    let mut set = BuffConfigSet::new();
    for buff in config.buffs {
        if buff.id.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "buff '{}' has an empty id",
                buff.name
            )));
        }
        if buff.duration < -1 {
            return Err(ConfigError::ValidationError(format!(
                "buff '{}' has duration {}; use -1 for infinite",
                buff.id, buff.duration
            )));
        }
        if !seen.insert(buff.id.clone()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate buff id '{}'",
                buff.id
            )));
        }
        set.register(buff);
    }
    Ok(set)
}
