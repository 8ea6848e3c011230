//! Damage calculation - turning a skill step + attributes into a final integer

use super::combatant::Combatant;
use super::log::{CalculationLog, ExtraValueLog, StepType};
use super::mitigation::{apply_mitigation, mitigation};
use super::step::{AttackType, SkillStep};
use crate::config::DamageConstants;
use crate::types::Attribute;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Outcome of one damage calculation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    pub damage: u32,
    pub is_miss: bool,
    pub is_critical: bool,
}

impl DamageResult {
    pub fn miss() -> Self {
        DamageResult {
            damage: 0,
            is_miss: true,
            is_critical: false,
        }
    }
}

/// A late-stage adjustment to damage, run after crits and before the final clamp
pub trait DamageModifier: Send + Sync {
    fn name(&self) -> &str;

    /// Higher runs first
    fn priority(&self) -> i32;

    fn modify(
        &self,
        damage: f64,
        source: &dyn Combatant,
        target: &dyn Combatant,
        rng: &mut dyn RngCore,
    ) -> f64;
}

/// +2% damage per level the source has over the target, -2% per level under
#[derive(Debug, Clone, Copy)]
pub struct LevelDifference {
    pub per_level: f64,
}

impl Default for LevelDifference {
    fn default() -> Self {
        LevelDifference { per_level: 0.02 }
    }
}

impl DamageModifier for LevelDifference {
    fn name(&self) -> &str {
        "level_difference"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn modify(
        &self,
        damage: f64,
        source: &dyn Combatant,
        target: &dyn Combatant,
        _rng: &mut dyn RngCore,
    ) -> f64 {
        let diff = source.level() as f64 - target.level() as f64;
        damage * (1.0 + diff * self.per_level).max(0.0)
    }
}

/// Uniform roll in `[min, max]`
#[derive(Debug, Clone, Copy)]
pub struct RandomVariance {
    pub min: f64,
    pub max: f64,
}

impl Default for RandomVariance {
    fn default() -> Self {
        RandomVariance { min: 0.9, max: 1.1 }
    }
}

impl DamageModifier for RandomVariance {
    fn name(&self) -> &str {
        "random_variance"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn modify(
        &self,
        damage: f64,
        _source: &dyn Combatant,
        _target: &dyn Combatant,
        rng: &mut dyn RngCore,
    ) -> f64 {
        if self.min >= self.max {
            return damage * self.max;
        }
        damage * rng.gen_range(self.min..=self.max)
    }
}

/// Damage calculator with its own append-only calculation log
pub struct DamageCalculator {
    settings: DamageConstants,
    modifiers: Vec<Box<dyn DamageModifier>>,
    logs: Vec<CalculationLog>,
}

impl fmt::Debug for DamageCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.modifiers.iter().map(|m| m.name()).collect();
        f.debug_struct("DamageCalculator")
            .field("settings", &self.settings)
            .field("modifiers", &names)
            .field("logs", &self.logs.len())
            .finish()
    }
}

impl Default for DamageCalculator {
    fn default() -> Self {
        Self::new(DamageConstants::default())
    }
}

impl DamageCalculator {
    pub fn new(settings: DamageConstants) -> Self {
        DamageCalculator {
            settings,
            modifiers: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// Register the level-difference and random-variance modifiers
    pub fn with_builtin_modifiers(mut self) -> Self {
        self.add_modifier(Box::new(LevelDifference::default()));
        self.add_modifier(Box::new(RandomVariance::default()));
        self
    }

    pub fn settings(&self) -> &DamageConstants {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut DamageConstants {
        &mut self.settings
    }

    /// Add a modifier, keeping the pipeline sorted by descending priority
    pub fn add_modifier(&mut self, modifier: Box<dyn DamageModifier>) {
        self.modifiers.push(modifier);
        self.modifiers.sort_by_key(|m| std::cmp::Reverse(m.priority()));
    }

    pub fn remove_modifier(&mut self, name: &str) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.name() != name);
        self.modifiers.len() != before
    }

    pub fn modifier_names(&self) -> Vec<&str> {
        self.modifiers.iter().map(|m| m.name()).collect()
    }

    /// Calculate the damage `source` deals to `target` with `step`
    ///
    /// A step without a calculation deals 0 and is not logged.
    pub fn calculate_damage(
        &mut self,
        step: &SkillStep,
        source: &dyn Combatant,
        target: &dyn Combatant,
        rng: &mut impl Rng,
    ) -> DamageResult {
        let Some(calculation) = &step.calculation else {
            debug!(source_id = source.id(), target_id = target.id(), "damage step has no calculation");
            return DamageResult::default();
        };

        let mut log = CalculationLog::new(StepType::Damage, source.id(), target.id());
        log.skill_id = step.skill_id.clone();

        // Step 1: Dodge
        if self.settings.dodge_enabled {
            let evade = target.attribute(Attribute::Evade);
            if evade > 0.0 && rng.gen::<f64>() < evade {
                log.is_miss = true;
                log.critical = Some(false);
                self.logs.push(log);
                debug!(source_id = source.id(), target_id = target.id(), "attack dodged");
                return DamageResult::miss();
            }
        }

        // Step 2: Base value plus source scaling
        log.base_value = calculation.base_value;
        for extra in &calculation.extra_values {
            let value = source.attribute(extra.attribute);
            log.extra_values.push(ExtraValueLog {
                attribute: extra.attribute,
                ratio: extra.ratio,
                attribute_value: value,
                contribution: value * extra.ratio,
            });
        }
        let mut damage = calculation.base_value + log.extra_total();

        // Step 3: Defense mitigation
        if self.settings.defense_enabled {
            let reduction = mitigation(
                calculation.attack_type,
                target.attribute(Attribute::Def),
                target.attribute(Attribute::Mdef),
                self.settings.max_mitigation,
            );
            damage = apply_mitigation(damage, reduction);

            if calculation.attack_type == AttackType::Physical {
                let reduction = target
                    .attribute(Attribute::PhysicalDamageReduction)
                    .max(0.0)
                    .min(self.settings.max_mitigation);
                damage = apply_mitigation(damage, reduction);
            }
        }

        // Step 4: Target modifiers
        if !step.target_modifiers.is_empty() {
            for (attribute, modifier) in &step.target_modifiers {
                damage *= 1.0 + modifier * target.attribute(*attribute) / 100.0;
            }
            log.modifiers = Some(step.target_modifiers.clone());
        }

        // Step 5: Critical hit
        let mut is_critical = false;
        if self.settings.critical_enabled {
            let (rate, multiplier) = match step.critical {
                Some(crit) => (crit.rate, crit.multiplier),
                None => (
                    self.settings.default_critical_rate,
                    self.settings.default_critical_multiplier,
                ),
            };
            is_critical = rate >= 1.0 || (rate > 0.0 && rng.gen::<f64>() < rate);
            if is_critical {
                damage *= multiplier;
            }
        }

        // Step 6: Modifier pipeline
        {
            let rng: &mut dyn RngCore = rng;
            for modifier in &self.modifiers {
                damage = modifier.modify(damage, source, target, rng);
            }
        }

        // Step 7: Clamp and floor
        let clamped = damage.max(self.settings.min_damage).min(self.settings.max_damage);
        let final_damage = to_outcome(clamped);

        log.final_value = final_damage;
        log.critical = Some(is_critical);
        self.logs.push(log);

        debug!(
            source_id = source.id(),
            target_id = target.id(),
            damage = final_damage,
            critical = is_critical,
            "damage calculated"
        );

        DamageResult {
            damage: final_damage,
            is_miss: false,
            is_critical,
        }
    }

    pub fn calculation_logs(&self) -> &[CalculationLog] {
        &self.logs
    }

    pub fn clear_calculation_logs(&mut self) {
        self.logs.clear();
    }
}

/// `max(0, floor(value))` as an integer outcome; NaN becomes 0
pub(crate) fn to_outcome(value: f64) -> u32 {
    let floored = value.floor();
    if floored.is_nan() || floored <= 0.0 {
        0
    } else if floored >= u32::MAX as f64 {
        u32::MAX
    } else {
        floored as u32
    }
}
