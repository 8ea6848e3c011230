//! Character sheets and the roster that owns them

use crate::types::Attribute;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A combatant's base sheet plus its mutable resources
///
/// Base attribute values are never touched by buffs; derived values come from
/// combining them with the character's modifier stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Base attribute values. Missing attributes read as 0.
    #[serde(default)]
    pub base: BTreeMap<Attribute, f64>,
    pub current_health: f64,
    #[serde(default)]
    pub current_energy: f64,
    #[serde(default)]
    pub max_energy: f64,
}

fn default_level() -> u32 {
    1
}

impl Character {
    /// Create a character at full health
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_health: f64) -> Self {
        let mut base = BTreeMap::new();
        base.insert(Attribute::Hp, max_health);
        Character {
            id: id.into(),
            name: name.into(),
            level: 1,
            base,
            current_health: max_health,
            current_energy: 0.0,
            max_energy: 0.0,
        }
    }

    /// Set a base attribute value
    pub fn with_base(mut self, attribute: Attribute, value: f64) -> Self {
        self.set_base(attribute, value);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_energy(mut self, max_energy: f64) -> Self {
        self.max_energy = max_energy;
        self.current_energy = max_energy;
        self
    }

    pub fn set_base(&mut self, attribute: Attribute, value: f64) {
        self.base.insert(attribute, value);
        if attribute == Attribute::Hp {
            self.current_health = self.current_health.min(value);
        }
    }

    /// Base value of an attribute (0 when unset)
    pub fn base_value(&self, attribute: Attribute) -> f64 {
        self.base.get(&attribute).copied().unwrap_or(0.0)
    }

    pub fn max_health(&self) -> f64 {
        self.base_value(Attribute::Hp)
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    pub fn is_full_health(&self) -> bool {
        self.current_health >= self.max_health()
    }

    /// Apply damage, clamped at zero health. Returns damage actually taken.
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let before = self.current_health;
        self.current_health = (self.current_health - amount).max(0.0);
        before - self.current_health
    }

    /// Restore health, clamped at max health. Returns health actually restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || !self.is_alive() {
            return 0.0;
        }
        let before = self.current_health;
        self.current_health = (self.current_health + amount).min(self.max_health());
        self.current_health - before
    }

    /// Spend energy if enough is available
    pub fn spend_energy(&mut self, amount: f64) -> bool {
        if amount < 0.0 || self.current_energy < amount {
            return false;
        }
        self.current_energy = (self.current_energy - amount).max(0.0);
        true
    }

    pub fn restore_energy(&mut self, amount: f64) {
        self.current_energy = (self.current_energy + amount.max(0.0)).min(self.max_energy);
    }
}

/// Read-only lookup from character id to character
///
/// Buff contexts hold ids, never characters; this is how they resolve them.
pub trait CharacterLookup {
    fn character(&self, id: &str) -> Option<&Character>;
}

/// The characters taking part in one battle
#[derive(Debug, Clone, Default)]
pub struct Roster {
    characters: HashMap<String, Character>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character, replacing any with the same id
    pub fn insert(&mut self, character: Character) {
        self.characters.insert(character.id.clone(), character);
    }

    pub fn remove(&mut self, id: &str) -> Option<Character> {
        self.characters.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Character> {
        self.characters.get_mut(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.characters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl CharacterLookup for Roster {
    fn character(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut hero = Character::new("hero", "Hero", 100.0);
        assert!((hero.take_damage(30.0) - 30.0).abs() < f64::EPSILON);
        assert!((hero.take_damage(500.0) - 70.0).abs() < f64::EPSILON);
        assert_eq!(hero.current_health, 0.0);
        assert!(!hero.is_alive());
        assert_eq!(hero.take_damage(-5.0), 0.0);
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut hero = Character::new("hero", "Hero", 100.0);
        hero.take_damage(5.0);
        assert!((hero.heal(50.0) - 5.0).abs() < f64::EPSILON);
        assert!(hero.is_full_health());
    }

    #[test]
    fn test_dead_characters_cannot_heal() {
        let mut hero = Character::new("hero", "Hero", 100.0);
        hero.take_damage(100.0);
        assert_eq!(hero.heal(10.0), 0.0);
    }

    #[test]
    fn test_energy() {
        let mut mage = Character::new("mage", "Mage", 80.0).with_energy(50.0);
        assert!(mage.spend_energy(20.0));
        assert!(!mage.spend_energy(40.0));
        mage.restore_energy(100.0);
        assert!((mage.current_energy - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roster_lookup() {
        let mut roster = Roster::new();
        roster.insert(Character::new("hero", "Hero", 100.0).with_base(Attribute::Atk, 25.0));
        assert_eq!(roster.len(), 1);
        assert!((roster.character("hero").unwrap().base_value(Attribute::Atk) - 25.0).abs() < f64::EPSILON);
        assert!(roster.character("ghost").is_none());
        roster.remove("hero");
        assert!(roster.is_empty());
    }
}
