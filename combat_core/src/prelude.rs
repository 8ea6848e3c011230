//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Core types
pub use crate::types::{Attribute, ControlType, Millis, ModifierType, StackRule};
pub use crate::character::{Character, CharacterLookup, Roster};
pub use crate::modifier::ModifierStack;

// Buff system
pub use crate::buff::{
    BuffConfig, BuffContext, BuffScript, BuffSystem, EffectKind, HookResult, ScriptRegistry, UpdateReport,
};
pub use crate::buff::scripts::{
    AttributeBuff, BonusBuff, BoundedEntry, DriftingModifier, OverTimeEffect, ShieldBuff,
    StatusEffectBundle,
};

// Combat
pub use crate::combat::{AttackType, Combatant, DamageCalculator, HealCalculator, Participant, SkillStep};
pub use crate::battle::Battle;

// Config
pub use crate::config::{load_buff_configs, CombatConstants};
