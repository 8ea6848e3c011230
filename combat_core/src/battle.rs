//! Battle - one combat session and everything it owns
//!
//! Holds the roster, the buff system and both calculators, so that separate
//! battles never share state. Damage and heals computed here are applied to
//! the characters' health directly.

use crate::buff::{
    BuffConfig, BuffConfigSet, BuffError, BuffSystem, EffectKind, ScriptRegistry, UpdateReport,
};
use crate::character::{Character, Roster};
use crate::combat::{DamageCalculator, DamageResult, HealCalculator, Participant, SkillStep};
use crate::config::CombatConstants;
use crate::types::{Attribute, Millis};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BattleError {
    #[error("character {0} is not in this battle")]
    UnknownCharacter(String),
    #[error("no buff config registered for {0}")]
    UnknownBuffConfig(String),
    #[error(transparent)]
    Buff(#[from] BuffError),
}

/// What an attack did to its target
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub result: DamageResult,
    /// Damage soaked up by shields
    pub absorbed: f64,
    /// Health actually lost
    pub health_lost: f64,
    pub is_killing_blow: bool,
}

#[derive(Debug, Default)]
pub struct Battle {
    roster: Roster,
    buffs: BuffSystem,
    damage: DamageCalculator,
    heal: HealCalculator,
    configs: BuffConfigSet,
}

impl Battle {
    pub fn new(constants: &CombatConstants) -> Self {
        Battle {
            roster: Roster::new(),
            buffs: BuffSystem::default(),
            damage: DamageCalculator::new(constants.damage.clone()),
            heal: HealCalculator::new(constants.heal.clone()),
            configs: BuffConfigSet::new(),
        }
    }

    /// Replace the script registry
    pub fn with_scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.buffs = BuffSystem::new(scripts);
        self
    }

    pub fn with_buff_configs(mut self, configs: BuffConfigSet) -> Self {
        info!(count = configs.len(), "buff configs loaded");
        self.configs = configs;
        self
    }

    // === Roster ===

    pub fn add_character(&mut self, character: Character) {
        debug!(character = %character.id, "joined battle");
        self.roster.insert(character);
    }

    /// Take a character out of the battle. Buffs left on it go dormant until they expire.
    pub fn remove_character(&mut self, id: &str) -> Option<Character> {
        self.roster.remove(id)
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.roster.get(id)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Derived attribute value of a character
    pub fn attribute(&self, id: &str, attribute: Attribute) -> Option<f64> {
        self.roster
            .get(id)
            .map(|c| self.buffs.attribute_value(c, attribute))
    }

    // === Buffs ===

    pub fn buffs(&self) -> &BuffSystem {
        &self.buffs
    }

    pub fn configs(&self) -> &BuffConfigSet {
        &self.configs
    }

    /// Apply a buff using its registered config
    pub fn add_buff(&mut self, character_id: &str, buff_id: &str) -> Result<String, BattleError> {
        let config = self
            .configs
            .get(buff_id)
            .ok_or_else(|| BattleError::UnknownBuffConfig(buff_id.to_string()))?;
        self.add_buff_with(character_id, config)
    }

    /// Apply a buff with an explicit config
    pub fn add_buff_with(
        &mut self,
        character_id: &str,
        config: impl Into<Arc<BuffConfig>>,
    ) -> Result<String, BattleError> {
        if self.roster.get(character_id).is_none() {
            return Err(BattleError::UnknownCharacter(character_id.to_string()));
        }
        let config = config.into();
        let buff_id = config.id.clone();
        let id = self.buffs.add_buff(&self.roster, character_id, &buff_id, config)?;
        Ok(id)
    }

    pub fn remove_buff(&mut self, instance_id: &str) -> bool {
        self.buffs.remove_buff(&self.roster, instance_id)
    }

    pub fn refresh_buff(&mut self, instance_id: &str) -> bool {
        self.buffs.refresh_buff(&self.roster, instance_id)
    }

    /// Advance time and apply every damage and heal tick the buffs fired
    pub fn tick(&mut self, delta: Millis) -> UpdateReport {
        let report = self.buffs.update(&self.roster, delta);
        self.apply_effects(&report);
        report
    }

    /// End a character's turn: count down its turn-limited buffs and apply their ticks
    pub fn end_turn(&mut self, character_id: &str) -> UpdateReport {
        let report = self.buffs.update_turn(&self.roster, character_id);
        self.apply_effects(&report);
        report
    }

    /// Damage goes through shields first; heals are cut by the target's heal reduction
    fn apply_effects(&mut self, report: &UpdateReport) {
        for effect in &report.effects {
            match effect.kind {
                EffectKind::Damage => {
                    let remaining = self.buffs.absorb_damage(&effect.character_id, effect.amount);
                    if let Some(character) = self.roster.get_mut(&effect.character_id) {
                        character.take_damage(remaining);
                    }
                }
                EffectKind::Heal => {
                    let Some(character) = self.roster.get(&effect.character_id) else {
                        continue;
                    };
                    let reduction = self
                        .heal
                        .heal_reduction(&Participant::new(character, &self.buffs));
                    let amount = (effect.amount * (1.0 - reduction)).floor();
                    if let Some(character) = self.roster.get_mut(&effect.character_id) {
                        character.heal(amount);
                    }
                }
            }
        }
    }

    // === Actions ===

    /// Calculate a damage step and apply it to the target, shields first
    pub fn attack(
        &mut self,
        source_id: &str,
        target_id: &str,
        step: &SkillStep,
        rng: &mut impl Rng,
    ) -> Result<AttackOutcome, BattleError> {
        let source = self
            .roster
            .get(source_id)
            .ok_or_else(|| BattleError::UnknownCharacter(source_id.to_string()))?;
        let target = self
            .roster
            .get(target_id)
            .ok_or_else(|| BattleError::UnknownCharacter(target_id.to_string()))?;

        let result = self.damage.calculate_damage(
            step,
            &Participant::new(source, &self.buffs),
            &Participant::new(target, &self.buffs),
            rng,
        );

        let mut outcome = AttackOutcome {
            result,
            ..AttackOutcome::default()
        };
        if result.damage == 0 {
            return Ok(outcome);
        }

        let incoming = result.damage as f64;
        let remaining = self.buffs.absorb_damage(target_id, incoming);
        outcome.absorbed = incoming - remaining;

        if let Some(target) = self.roster.get_mut(target_id) {
            let was_alive = target.is_alive();
            outcome.health_lost = target.take_damage(remaining);
            outcome.is_killing_blow = was_alive && !target.is_alive();
        }

        Ok(outcome)
    }

    /// Calculate a heal step and apply it to the target. Returns the health actually restored.
    pub fn heal(&mut self, source_id: &str, target_id: &str, step: &SkillStep) -> Result<u32, BattleError> {
        let source = self
            .roster
            .get(source_id)
            .ok_or_else(|| BattleError::UnknownCharacter(source_id.to_string()))?;
        let target = self
            .roster
            .get(target_id)
            .ok_or_else(|| BattleError::UnknownCharacter(target_id.to_string()))?;

        let amount = self.heal.calculate_heal(
            step,
            &Participant::new(source, &self.buffs),
            &Participant::new(target, &self.buffs),
        );

        let restored = match self.roster.get_mut(target_id) {
            Some(target) => target.heal(amount as f64),
            None => 0.0,
        };
        Ok(restored.max(0.0).round() as u32)
    }

    pub fn damage_calculator(&self) -> &DamageCalculator {
        &self.damage
    }

    pub fn damage_calculator_mut(&mut self) -> &mut DamageCalculator {
        &mut self.damage
    }

    pub fn heal_calculator(&self) -> &HealCalculator {
        &self.heal
    }

    /// Remove every buff, rewind the clock and clear the calculation logs
    pub fn reset(&mut self) {
        self.buffs.reset(&self.roster);
        self.damage.clear_calculation_logs();
        self.heal.clear_calculation_logs();
        info!("battle reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::AttackType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn battle() -> Battle {
        let mut configs = BuffConfigSet::new();
        configs.register(BuffConfig::new("shield", "Shield", 5000));
        configs.register(BuffConfig::new("poison", "Poison", 4000).as_debuff());

        let mut battle = Battle::default().with_buff_configs(configs);
        battle.add_character(
            Character::new("hero", "Hero", 300.0)
                .with_base(Attribute::Atk, 100.0)
                .with_base(Attribute::Def, 20.0),
        );
        battle.add_character(Character::new("slime", "Slime", 100.0));
        battle
    }

    #[test]
    fn test_attack_applies_damage() {
        let mut battle = battle();
        let mut rng = StdRng::seed_from_u64(42);
        let step = SkillStep::damage(0.0, AttackType::True).with_extra(Attribute::Atk, 0.6);

        let outcome = battle.attack("hero", "slime", &step, &mut rng).unwrap();
        assert_eq!(outcome.result.damage, 60);
        assert!((outcome.health_lost - 60.0).abs() < 0.01);
        assert!((battle.character("slime").unwrap().current_health - 40.0).abs() < 0.01);

        let outcome = battle.attack("hero", "slime", &step, &mut rng).unwrap();
        assert!(outcome.is_killing_blow);
        assert!(!battle.character("slime").unwrap().is_alive());
    }

    #[test]
    fn test_shield_soaks_attack() {
        let mut battle = battle();
        let mut rng = StdRng::seed_from_u64(42);
        battle.add_buff("hero", "shield").unwrap();
        // 100 + 300 * 0.1
        assert!((battle.buffs().shield_total("hero") - 130.0).abs() < 0.01);

        let step = SkillStep::damage(150.0, AttackType::True);
        let outcome = battle.attack("slime", "hero", &step, &mut rng).unwrap();
        assert!((outcome.absorbed - 130.0).abs() < 0.01);
        assert!((outcome.health_lost - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_tick_applies_poison() {
        let mut battle = battle();
        battle.add_buff("slime", "poison").unwrap();
        battle.tick(2000);
        // 10 * 1.2
        assert!((battle.character("slime").unwrap().current_health - 88.0).abs() < 0.01);
    }

    #[test]
    fn test_unknown_ids() {
        let mut battle = battle();
        assert_eq!(
            battle.add_buff("hero", "berserk"),
            Err(BattleError::UnknownBuffConfig("berserk".to_string()))
        );
        assert_eq!(
            battle.add_buff("ghost", "shield"),
            Err(BattleError::UnknownCharacter("ghost".to_string()))
        );
        assert!(battle.heal("hero", "ghost", &SkillStep::heal(10.0)).is_err());
    }

    #[test]
    fn test_heal_restores_health() {
        let mut battle = battle();
        let mut rng = StdRng::seed_from_u64(1);
        battle
            .attack("hero", "slime", &SkillStep::damage(30.0, AttackType::True), &mut rng)
            .unwrap();
        let healed = battle.heal("hero", "slime", &SkillStep::heal(50.0)).unwrap();
        assert_eq!(healed, 30);
        assert!(battle.character("slime").unwrap().is_full_health());
    }

    #[test]
    fn test_heal_on_dead_target_restores_nothing() {
        let mut battle = battle();
        let slime = battle.roster.get_mut("slime").unwrap();
        slime.take_damage(100.0);
        assert!(!slime.is_alive());

        let step = SkillStep::heal(0.0).with_extra(Attribute::Atk, 0.5);
        assert_eq!(battle.heal("hero", "slime", &step), Ok(0));
        assert_eq!(battle.character("slime").unwrap().current_health, 0.0);
        // The calculator still logged a positive heal
        assert_eq!(battle.heal_calculator().calculation_logs()[0].final_value, 50);
    }

    #[test]
    fn test_heal_over_time_is_reduced() {
        let mut configs = BuffConfigSet::new();
        configs.register(BuffConfig::new("heal_over_time", "Regrowth", 3000));
        configs.register(BuffConfig::new("buff_heal_reduction", "Wound", 3000).as_debuff());
        let mut battle = Battle::default().with_buff_configs(configs);
        let mut hero = Character::new("hero", "Hero", 300.0);
        hero.take_damage(200.0);
        battle.add_character(hero);

        battle.add_buff("hero", "heal_over_time").unwrap();
        battle.tick(1000);
        // 20 healed in full
        assert!((battle.character("hero").unwrap().current_health - 120.0).abs() < 0.01);

        battle.add_buff("hero", "buff_heal_reduction").unwrap();
        battle.tick(1000);
        // 20 * (1 - 0.2)
        assert!((battle.character("hero").unwrap().current_health - 136.0).abs() < 0.01);
    }

    #[test]
    fn test_end_turn_expires_turn_limited_buffs() {
        let mut battle = battle();
        let config = BuffConfig::new("poison", "Poison", -1).as_debuff().with_turns(2);
        battle.add_buff_with("slime", config).unwrap();

        assert!(battle.end_turn("slime").expired.is_empty());
        let report = battle.end_turn("slime");
        assert_eq!(report.expired.len(), 1);
        assert!(!battle.buffs().has_buff("slime", "poison"));
        // No clock time passed, so no poison ticks landed
        assert!(battle.character("slime").unwrap().is_full_health());
    }

    #[test]
    fn test_reset() {
        let mut battle = battle();
        battle.add_buff("hero", "shield").unwrap();
        battle.tick(1000);
        battle.reset();
        assert_eq!(battle.buffs().instance_count(), 0);
        assert_eq!(battle.buffs().now(), 0);
        assert!(battle.damage_calculator().calculation_logs().is_empty());
    }
}
