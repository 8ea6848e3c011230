//! Combat constants configuration

use serde::{Deserialize, Serialize};

/// Tunable combat constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatConstants {
    #[serde(default)]
    pub damage: DamageConstants,
    #[serde(default)]
    pub heal: HealConstants,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageConstants {
    #[serde(default = "default_true")]
    pub critical_enabled: bool,
    /// Crit chance for steps without their own critical config
    #[serde(default)]
    pub default_critical_rate: f64,
    #[serde(default = "default_critical_multiplier")]
    pub default_critical_multiplier: f64,
    #[serde(default = "default_true")]
    pub defense_enabled: bool,
    /// Upper bound of defense mitigation, kept below 1
    #[serde(default = "default_max_mitigation")]
    pub max_mitigation: f64,
    /// Roll the target's EVADE before anything else
    #[serde(default = "default_true")]
    pub dodge_enabled: bool,
    #[serde(default)]
    pub min_damage: f64,
    #[serde(default = "default_max_damage")]
    pub max_damage: f64,
}

impl Default for DamageConstants {
    fn default() -> Self {
        DamageConstants {
            critical_enabled: true,
            default_critical_rate: 0.0,
            default_critical_multiplier: 1.5,
            defense_enabled: true,
            max_mitigation: 0.9,
            dodge_enabled: true,
            min_damage: 0.0,
            max_damage: 9999.0,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_critical_multiplier() -> f64 {
    1.5
}
fn default_max_mitigation() -> f64 {
    0.9
}
fn default_max_damage() -> f64 {
    9999.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealConstants {
    /// Buff ids that reduce incoming healing
    #[serde(default = "default_reduction_buffs")]
    pub reduction_buffs: Vec<String>,
    /// Fraction removed per matching buff
    #[serde(default = "default_reduction_per_debuff")]
    pub reduction_per_debuff: f64,
    #[serde(default = "default_max_reduction")]
    pub max_reduction: f64,
}

impl Default for HealConstants {
    fn default() -> Self {
        HealConstants {
            reduction_buffs: default_reduction_buffs(),
            reduction_per_debuff: 0.2,
            max_reduction: 0.8,
        }
    }
}

fn default_reduction_buffs() -> Vec<String> {
    ["buff_heal_reduction", "poison", "buff_curse"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_reduction_per_debuff() -> f64 {
    0.2
}
fn default_max_reduction() -> f64 {
    0.8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_toml;

    #[test]
    fn test_partial_sections_keep_defaults() {
        let toml = r#"
[damage]
default_critical_rate = 0.05
max_damage = 500

[heal]
reduction_buffs = ["buff_curse"]
"#;
        let constants: CombatConstants = parse_toml(toml).unwrap();
        assert!((constants.damage.default_critical_rate - 0.05).abs() < f64::EPSILON);
        assert!((constants.damage.max_damage - 500.0).abs() < f64::EPSILON);
        assert!(constants.damage.critical_enabled);
        assert!((constants.damage.max_mitigation - 0.9).abs() < f64::EPSILON);
        assert_eq!(constants.heal.reduction_buffs, vec!["buff_curse".to_string()]);
        assert!((constants.heal.max_reduction - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_file_is_default() {
        let constants: CombatConstants = parse_toml("").unwrap();
        assert_eq!(constants, CombatConstants::default());
    }
}
