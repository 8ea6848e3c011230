//! Configuration loading from TOML files

mod buffs;
mod constants;

pub use buffs::{load_buff_configs, parse_buff_configs, BuffsConfig};
pub use constants::{CombatConstants, DamageConstants, HealConstants};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load combat constants, validating the ranges the calculators rely on
pub fn load_constants(path: &Path) -> Result<CombatConstants, ConfigError> {
    let constants: CombatConstants = load_toml(path)?;
    validate_constants(&constants)?;
    Ok(constants)
}

pub fn parse_constants(content: &str) -> Result<CombatConstants, ConfigError> {
    let constants: CombatConstants = parse_toml(content)?;
    validate_constants(&constants)?;
    Ok(constants)
}

fn validate_constants(constants: &CombatConstants) -> Result<(), ConfigError> {
    let damage = &constants.damage;
    if !(0.0..1.0).contains(&damage.max_mitigation) {
        return Err(ConfigError::ValidationError(format!(
            "max_mitigation must be in [0, 1), got {}",
            damage.max_mitigation
        )));
    }
    if damage.min_damage > damage.max_damage {
        return Err(ConfigError::ValidationError(format!(
            "min_damage {} exceeds max_damage {}",
            damage.min_damage, damage.max_damage
        )));
    }
    let heal = &constants.heal;
    if !(0.0..=1.0).contains(&heal.max_reduction) {
        return Err(ConfigError::ValidationError(format!(
            "max_reduction must be in [0, 1], got {}",
            heal.max_reduction
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(parse_constants("[damage]\nmax_mitigation = 1.0\n").is_err());
        assert!(parse_constants("[damage]\nmin_damage = 10\nmax_damage = 5\n").is_err());
        assert!(parse_constants("[heal]\nmax_reduction = 0.5\n").is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = load_constants(Path::new("/nonexistent/combat.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
