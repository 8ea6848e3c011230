//! Skill steps - the damage/heal part of a skill definition

use crate::types::Attribute;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a hit is mitigated by the target's defenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    /// Blend of DEF and MDEF
    #[default]
    Normal,
    /// MDEF only
    Magic,
    /// DEF only
    Physical,
    /// Ignores defenses
    True,
}

/// A source attribute scaled into the base value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtraValue {
    pub attribute: Attribute,
    pub ratio: f64,
}

/// Numeric part of a damage or heal step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationConfig {
    pub base_value: f64,
    #[serde(default)]
    pub extra_values: Vec<ExtraValue>,
    /// Damage steps only
    #[serde(default)]
    pub attack_type: AttackType,
    /// Heal steps only
    #[serde(default)]
    pub is_single_turn: bool,
}

impl CalculationConfig {
    pub fn new(base_value: f64) -> Self {
        CalculationConfig {
            base_value,
            extra_values: Vec::new(),
            attack_type: AttackType::Normal,
            is_single_turn: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalConfig {
    /// Chance in [0, 1]; 1 or more always crits
    pub rate: f64,
    pub multiplier: f64,
}

/// One damage or heal step of a skill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillStep {
    #[serde(default)]
    pub skill_id: Option<String>,
    /// A step without a calculation resolves to 0
    #[serde(default)]
    pub calculation: Option<CalculationConfig>,
    /// Scales the result by `1 + modifier × target attribute / 100`
    #[serde(default)]
    pub target_modifiers: BTreeMap<Attribute, f64>,
    #[serde(default)]
    pub critical: Option<CriticalConfig>,
}

impl SkillStep {
    /// Empty step with no calculation
    pub fn new() -> Self {
        Self::default()
    }

    pub fn damage(base_value: f64, attack_type: AttackType) -> Self {
        SkillStep {
            calculation: Some(CalculationConfig {
                attack_type,
                ..CalculationConfig::new(base_value)
            }),
            ..Self::default()
        }
    }

    pub fn heal(base_value: f64) -> Self {
        SkillStep {
            calculation: Some(CalculationConfig::new(base_value)),
            ..Self::default()
        }
    }

    pub fn with_skill_id(mut self, skill_id: &str) -> Self {
        self.skill_id = Some(skill_id.to_string());
        self
    }

    /// Add a scaling term; ignored when the step has no calculation
    pub fn with_extra(mut self, attribute: Attribute, ratio: f64) -> Self {
        if let Some(calculation) = self.calculation.as_mut() {
            calculation.extra_values.push(ExtraValue { attribute, ratio });
        }
        self
    }

    pub fn with_target_modifier(mut self, attribute: Attribute, modifier: f64) -> Self {
        self.target_modifiers.insert(attribute, modifier);
        self
    }

    pub fn with_critical(mut self, rate: f64, multiplier: f64) -> Self {
        self.critical = Some(CriticalConfig { rate, multiplier });
        self
    }

    pub fn single_turn(mut self) -> Self {
        if let Some(calculation) = self.calculation.as_mut() {
            calculation.is_single_turn = true;
        }
        self
    }
}
