//! combat_core - Buff, modifier and damage resolution for turn-based combat
//!
//! This library provides:
//! - ModifierStack: Three-tier attribute modifiers (additive, percentage, multiplicative)
//! - BuffSystem: Time-driven buff lifecycle with pluggable scripts
//! - DamageCalculator / HealCalculator: Skill steps resolved against derived attributes
//! - Battle: A self-contained combat session tying them together

pub mod battle;
pub mod buff;
pub mod character;
pub mod combat;
pub mod config;
pub mod modifier;
pub mod prelude;
pub mod types;

// Re-export core types for convenience
pub use battle::{AttackOutcome, Battle, BattleError};
pub use buff::{
    BuffConfig, BuffConfigSet, BuffContext, BuffError, BuffInstance, BuffScript, BuffSystem,
    EffectKind, PeriodicEffect, ScriptError, ScriptRegistry, UpdateReport,
};
pub use character::{Character, CharacterLookup, Roster};
pub use combat::{
    AttackType, CalculationLog, Combatant, DamageCalculator, DamageResult, HealCalculator,
    Participant, SkillStep,
};
pub use config::{CombatConstants, ConfigError};
pub use modifier::{Modifier, ModifierBreakdown, ModifierStack};
pub use types::{Attribute, ControlType, Millis, ModifierType, StackRule};
