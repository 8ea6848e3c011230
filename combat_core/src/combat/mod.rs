//! Damage and heal calculation

mod combatant;
mod damage;
mod heal;
mod log;
pub mod mitigation;
mod step;

pub use combatant::{Combatant, Participant};
pub use damage::{DamageCalculator, DamageModifier, DamageResult, LevelDifference, RandomVariance};
pub use heal::HealCalculator;
pub use log::{CalculationLog, ExtraValueLog, StepType};
pub use step::{AttackType, CalculationConfig, CriticalConfig, ExtraValue, SkillStep};
