//! Combatant - what the calculators need to know about a participant

use crate::buff::BuffSystem;
use crate::character::Character;
use crate::types::Attribute;

/// Read-only view of a battle participant
pub trait Combatant {
    fn id(&self) -> &str;
    fn level(&self) -> u32;
    /// Derived attribute value
    fn attribute(&self, attribute: Attribute) -> f64;
    fn current_health(&self) -> f64;
    fn max_health(&self) -> f64;
    fn has_buff(&self, buff_id: &str) -> bool;
}

/// A bare character sheet: base values, no buffs
impl Combatant for Character {
    fn id(&self) -> &str {
        &self.id
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn attribute(&self, attribute: Attribute) -> f64 {
        self.base_value(attribute)
    }

    fn current_health(&self) -> f64 {
        self.current_health
    }

    fn max_health(&self) -> f64 {
        Character::max_health(self)
    }

    fn has_buff(&self, _buff_id: &str) -> bool {
        false
    }
}

/// A character seen through the buffs currently on it
#[derive(Debug, Clone, Copy)]
pub struct Participant<'a> {
    pub character: &'a Character,
    pub buffs: &'a BuffSystem,
}

impl<'a> Participant<'a> {
    pub fn new(character: &'a Character, buffs: &'a BuffSystem) -> Self {
        Participant { character, buffs }
    }
}

impl Combatant for Participant<'_> {
    fn id(&self) -> &str {
        &self.character.id
    }

    fn level(&self) -> u32 {
        self.character.level
    }

    fn attribute(&self, attribute: Attribute) -> f64 {
        self.buffs.attribute_value(self.character, attribute)
    }

    fn current_health(&self) -> f64 {
        self.character.current_health
    }

    fn max_health(&self) -> f64 {
        self.character.max_health()
    }

    fn has_buff(&self, buff_id: &str) -> bool {
        self.buffs.has_buff(&self.character.id, buff_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::BuffConfig;
    use crate::character::Roster;

    #[test]
    fn test_participant_sees_buffs() {
        let mut roster = Roster::new();
        roster.insert(Character::new("hero", "Hero", 500.0).with_base(Attribute::Atk, 80.0));
        let mut buffs = BuffSystem::default();
        buffs
            .add_buff(
                &roster,
                "hero",
                "buff_atk_up",
                BuffConfig::new("buff_atk_up", "Attack Up", 1000),
            )
            .unwrap();

        let hero = roster.get("hero").unwrap();
        assert!((hero.attribute(Attribute::Atk) - 80.0).abs() < 0.01);

        let view = Participant::new(hero, &buffs);
        // Default stack bonus of 10
        assert!((view.attribute(Attribute::Atk) - 90.0).abs() < 0.01);
        assert!(view.has_buff("buff_atk_up"));
        assert!((view.max_health() - 500.0).abs() < 0.01);
    }
}
