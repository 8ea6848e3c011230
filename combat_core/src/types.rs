//! Core types shared across the combat core

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Simulated time in milliseconds
pub type Millis = u64;

/// Attributes a combatant exposes to modifiers and calculators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribute {
    /// Maximum health
    Hp,
    Mp,
    Atk,
    Def,
    /// Magic defense
    Mdef,
    Spd,
    CritRate,
    CritDmg,
    Accuracy,
    /// Dodge chance (0.0-1.0)
    Evade,
    Lifesteal,
    Regeneration,
    ManaRegen,
    DamageBoost,
    DamageReduce,
    PhysicalDamageReduction,
    /// Affinity boosted by nature buffs
    NaturePower,
}

impl Attribute {
    /// Get all attributes
    pub fn all() -> &'static [Attribute] {
        &[
            Attribute::Hp,
            Attribute::Mp,
            Attribute::Atk,
            Attribute::Def,
            Attribute::Mdef,
            Attribute::Spd,
            Attribute::CritRate,
            Attribute::CritDmg,
            Attribute::Accuracy,
            Attribute::Evade,
            Attribute::Lifesteal,
            Attribute::Regeneration,
            Attribute::ManaRegen,
            Attribute::DamageBoost,
            Attribute::DamageReduce,
            Attribute::PhysicalDamageReduction,
            Attribute::NaturePower,
        ]
    }

    /// Canonical upper-case key, as used in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Hp => "HP",
            Attribute::Mp => "MP",
            Attribute::Atk => "ATK",
            Attribute::Def => "DEF",
            Attribute::Mdef => "MDEF",
            Attribute::Spd => "SPD",
            Attribute::CritRate => "CRIT_RATE",
            Attribute::CritDmg => "CRIT_DMG",
            Attribute::Accuracy => "ACCURACY",
            Attribute::Evade => "EVADE",
            Attribute::Lifesteal => "LIFESTEAL",
            Attribute::Regeneration => "REGENERATION",
            Attribute::ManaRegen => "MANA_REGEN",
            Attribute::DamageBoost => "DAMAGE_BOOST",
            Attribute::DamageReduce => "DAMAGE_REDUCE",
            Attribute::PhysicalDamageReduction => "PHYSICAL_DAMAGE_REDUCTION",
            Attribute::NaturePower => "NATURE_POWER",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an attribute key is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attribute: {0}")]
pub struct UnknownAttribute(pub String);

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::all()
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}

/// How a modifier combines with the base value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierType {
    /// Flat addition
    Additive,
    /// Fraction of the original base value, summed with additive
    Percentage,
    /// Compounding `(1 + value)` factor
    Multiplicative,
}

/// Crowd-control effect carried by a buff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    #[default]
    None,
    Stun,
    Silence,
    Root,
    Sleep,
}

impl ControlType {
    /// Whether the controlled character may still use skills
    pub fn allows_skills(&self) -> bool {
        !matches!(self, ControlType::Stun | ControlType::Silence | ControlType::Sleep)
    }
}

/// What happens when a buff is applied to a character already carrying it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackRule {
    /// Every application is its own instance
    #[default]
    Independent,
    /// Existing instances are removed before the new one is added
    Refresh,
    /// At most `max_stacks` instances; further applications refresh the oldest
    Limited,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_round_trip_names() {
        for attr in Attribute::all() {
            assert_eq!(attr.as_str().parse::<Attribute>().unwrap(), *attr);
        }
        assert_eq!("crit_rate".parse::<Attribute>().unwrap(), Attribute::CritRate);
        assert!("element".parse::<Attribute>().is_err());
    }

    #[test]
    fn test_attribute_serde_matches_key() {
        let json = serde_json::to_string(&Attribute::PhysicalDamageReduction).unwrap();
        assert_eq!(json, "\"PHYSICAL_DAMAGE_REDUCTION\"");
        let attr: Attribute = serde_json::from_str("\"MDEF\"").unwrap();
        assert_eq!(attr, Attribute::Mdef);
    }

    #[test]
    fn test_control_allows_skills() {
        assert!(ControlType::None.allows_skills());
        assert!(ControlType::Root.allows_skills());
        assert!(!ControlType::Stun.allows_skills());
        assert!(!ControlType::Silence.allows_skills());
    }
}
