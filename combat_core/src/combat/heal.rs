//! Heal calculation

use super::combatant::Combatant;
use super::damage::to_outcome;
use super::log::{CalculationLog, ExtraValueLog, StepType};
use super::step::SkillStep;
use crate::config::HealConstants;
use tracing::debug;

/// Heal calculator with its own append-only calculation log
#[derive(Debug, Clone, Default)]
pub struct HealCalculator {
    settings: HealConstants,
    logs: Vec<CalculationLog>,
}

impl HealCalculator {
    pub fn new(settings: HealConstants) -> Self {
        HealCalculator {
            settings,
            logs: Vec::new(),
        }
    }

    pub fn settings(&self) -> &HealConstants {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut HealConstants {
        &mut self.settings
    }

    /// Fraction of healing removed by the target's heal-reduction debuffs
    pub fn heal_reduction(&self, target: &dyn Combatant) -> f64 {
        let count = self
            .settings
            .reduction_buffs
            .iter()
            .filter(|id| target.has_buff(id))
            .count();
        (count as f64 * self.settings.reduction_per_debuff)
            .max(0.0)
            .min(self.settings.max_reduction)
    }

    /// Calculate how much `source` heals `target` with `step`
    ///
    /// Never exceeds the target's missing health. A step without a calculation
    /// heals 0 and is not logged.
    pub fn calculate_heal(
        &mut self,
        step: &SkillStep,
        source: &dyn Combatant,
        target: &dyn Combatant,
    ) -> u32 {
        let Some(calculation) = &step.calculation else {
            debug!(source_id = source.id(), target_id = target.id(), "heal step has no calculation");
            return 0;
        };

        let mut log = CalculationLog::new(StepType::Heal, source.id(), target.id());
        log.skill_id = step.skill_id.clone();
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
        let mut heal = calculation.base_value + log.extra_total();

        if !step.target_modifiers.is_empty() {
            for (attribute, modifier) in &step.target_modifiers {
                heal *= 1.0 + modifier * target.attribute(*attribute) / 100.0;
            }
            log.modifiers = Some(step.target_modifiers.clone());
        }

        let reduction = self.heal_reduction(target);
        if reduction > 0.0 {
            heal *= 1.0 - reduction;
            debug!(target_id = target.id(), reduction, "healing reduced");
        }

        let headroom = (target.max_health() - target.current_health()).max(0.0);
        let final_heal = if heal > 0.0 {
            to_outcome(heal.min(headroom))
        } else {
            0
        };

        log.final_value = final_heal;
        self.logs.push(log);

        debug!(source_id = source.id(), target_id = target.id(), heal = final_heal, "heal calculated");
        final_heal
    }

    /// Whether the step's heal applies once rather than every turn
    pub fn is_single_turn_effect(&self, step: &SkillStep) -> bool {
        step.calculation
            .as_ref()
            .is_some_and(|c| c.is_single_turn)
    }

    pub fn calculation_logs(&self) -> &[CalculationLog] {
        &self.logs
    }

    pub fn clear_calculation_logs(&mut self) {
        self.logs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::{BuffConfig, BuffSystem};
    use crate::character::{Character, Roster};
    use crate::combat::combatant::Participant;
    use crate::types::Attribute;

    fn healer() -> Character {
        Character::new("priest", "Priest", 300.0).with_base(Attribute::Atk, 40.0)
    }

    fn wounded(current: f64) -> Character {
        let mut target = Character::new("knight", "Knight", 100.0);
        target.current_health = current;
        target
    }

    #[test]
    fn test_negative_heal_is_zero() {
        let mut calc = HealCalculator::default();
        let amount = calc.calculate_heal(&SkillStep::heal(-15.0), &healer(), &wounded(10.0));
        assert_eq!(amount, 0);
        assert_eq!(calc.calculation_logs().len(), 1);
    }

    #[test]
    fn test_clamped_to_headroom() {
        let mut calc = HealCalculator::default();
        let amount = calc.calculate_heal(&SkillStep::heal(50.0), &healer(), &wounded(95.0));
        assert_eq!(amount, 5);
    }

    #[test]
    fn test_full_health_target() {
        let mut calc = HealCalculator::default();
        let amount = calc.calculate_heal(&SkillStep::heal(50.0), &healer(), &wounded(100.0));
        assert_eq!(amount, 0);
    }

    #[test]
    fn test_extra_values() {
        let mut calc = HealCalculator::default();
        let step = SkillStep::heal(10.0).with_extra(Attribute::Atk, 0.5);
        let amount = calc.calculate_heal(&step, &healer(), &wounded(20.0));
        assert_eq!(amount, 30);
    }

    #[test]
    fn test_missing_calculation() {
        let mut calc = HealCalculator::default();
        assert_eq!(calc.calculate_heal(&SkillStep::new(), &healer(), &wounded(20.0)), 0);
        assert!(calc.calculation_logs().is_empty());
    }

    #[test]
    fn test_heal_reduction_from_debuffs() {
        let mut roster = Roster::new();
        roster.insert(healer());
        roster.insert(wounded(10.0));
        let mut buffs = BuffSystem::default();
        buffs
            .add_buff(&roster, "knight", "poison", BuffConfig::new("poison", "Poison", 5000))
            .unwrap();
        buffs
            .add_buff(
                &roster,
                "knight",
                "buff_heal_reduction",
                BuffConfig::new("buff_heal_reduction", "Grievous Wounds", 5000),
            )
            .unwrap();

        let mut calc = HealCalculator::default();
        let source = Participant::new(roster.get("priest").unwrap(), &buffs);
        let target = Participant::new(roster.get("knight").unwrap(), &buffs);
        assert!((calc.heal_reduction(&target) - 0.4).abs() < 0.0001);

        // 50 * 0.6
        let amount = calc.calculate_heal(&SkillStep::heal(50.0), &source, &target);
        assert_eq!(amount, 30);
    }

    #[test]
    fn test_reduction_capped() {
        let mut calc = HealCalculator::default();
        calc.settings_mut().reduction_per_debuff = 0.5;
        calc.settings_mut().max_reduction = 0.75;

        struct Cursed;
        impl Combatant for Cursed {
            fn id(&self) -> &str {
                "cursed"
            }
            fn level(&self) -> u32 {
                1
            }
            fn attribute(&self, _attribute: Attribute) -> f64 {
                0.0
            }
            fn current_health(&self) -> f64 {
                0.0
            }
            fn max_health(&self) -> f64 {
                1000.0
            }
            fn has_buff(&self, _buff_id: &str) -> bool {
                true
            }
        }

        assert!((calc.heal_reduction(&Cursed) - 0.75).abs() < 0.0001);
        let amount = calc.calculate_heal(&SkillStep::heal(100.0), &healer(), &Cursed);
        assert_eq!(amount, 25);
    }

    #[test]
    fn test_single_turn_flag() {
        let calc = HealCalculator::default();
        assert!(calc.is_single_turn_effect(&SkillStep::heal(10.0).single_turn()));
        assert!(!calc.is_single_turn_effect(&SkillStep::heal(10.0)));
        assert!(!calc.is_single_turn_effect(&SkillStep::new()));
    }
}
