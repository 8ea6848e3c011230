//! BuffContext - What a buff script sees while one of its hooks runs

use super::config::BuffConfig;
use super::script::ScriptError;
use crate::character::{Character, CharacterLookup};
use crate::modifier::ModifierStack;
use crate::types::{Attribute, Millis, ModifierType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// A script-local variable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variable {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl From<f64> for Variable {
    fn from(v: f64) -> Self {
        Variable::Number(v)
    }
}

impl From<bool> for Variable {
    fn from(v: bool) -> Self {
        Variable::Flag(v)
    }
}

impl From<&str> for Variable {
    fn from(v: &str) -> Self {
        Variable::Text(v.to_string())
    }
}

impl From<String> for Variable {
    fn from(v: String) -> Self {
        Variable::Text(v)
    }
}

/// Per-instance scratch store. Absent variables stay absent; there is no implicit zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Variables {
    values: HashMap<String, Variable>,
}

impl Variables {
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Variable>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.values.remove(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(Variable::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(Variable::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Kind of a periodic effect fired by a buff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Damage,
    Heal,
}

/// A discrete tick (damage or heal) fired by a buff during an update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicEffect {
    pub instance_id: String,
    pub buff_id: String,
    pub character_id: String,
    pub kind: EffectKind,
    pub amount: f64,
}

/// The view a script gets onto its own instance during a hook
///
/// Variables are owned by the instance; the modifier stack belongs to the
/// instance's character. The character itself is resolved by id through the
/// roster and may be gone.
pub struct BuffContext<'a> {
    pub(crate) instance_id: &'a str,
    pub(crate) character_id: &'a str,
    pub(crate) config: &'a BuffConfig,
    pub(crate) start_time: Millis,
    pub(crate) expire_time: Option<Millis>,
    pub(crate) now: Millis,
    pub(crate) variables: &'a mut Variables,
    pub(crate) modifiers: &'a mut ModifierStack,
    pub(crate) characters: &'a dyn CharacterLookup,
    pub(crate) effects: &'a mut Vec<PeriodicEffect>,
}

impl<'a> BuffContext<'a> {
    pub fn instance_id(&self) -> &str {
        self.instance_id
    }

    pub fn character_id(&self) -> &str {
        self.character_id
    }

    pub fn config(&self) -> &BuffConfig {
        self.config
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Milliseconds since the instance started
    pub fn elapsed_time(&self) -> Millis {
        self.now.saturating_sub(self.start_time)
    }

    /// Milliseconds until expiry; negative once past it, `None` for infinite buffs
    pub fn remaining_time(&self) -> Option<i64> {
        self.expire_time.map(|expire| expire as i64 - self.now as i64)
    }

    // === Variables ===

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: &str, value: impl Into<Variable>) {
        self.variables.set(name, value);
    }

    pub fn remove_variable(&mut self, name: &str) {
        self.variables.remove(name);
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.variables.number(name)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.variables.flag(name)
    }

    // === Config parameters ===

    /// Numeric parameter, `default` when absent, null or not a number
    pub fn param_f64(&self, key: &str, default: f64) -> f64 {
        self.config.param(key).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn param_bool(&self, key: &str, default: bool) -> bool {
        self.config.param(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn param_str(&self, key: &str, default: &str) -> String {
        self.config
            .param(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    // === Character ===

    /// The owning character, `None` if it has left the battle
    pub fn character(&self) -> Option<&Character> {
        self.characters.character(self.character_id)
    }

    /// The owning character, or [`ScriptError::MissingCharacter`] if it has left
    pub fn require_character(&self) -> Result<&Character, ScriptError> {
        self.character()
            .ok_or_else(|| ScriptError::MissingCharacter(self.character_id.to_string()))
    }

    /// Derived attribute of the owning character, 0 when the character is gone
    pub fn attribute_value(&self, attribute: Attribute) -> f64 {
        self.character()
            .map(|c| self.modifiers.calculate(attribute, c.base_value(attribute)))
            .unwrap_or(0.0)
    }

    // === Modifiers ===

    /// Add a modifier owned by this instance
    pub fn add_modifier(&mut self, attribute: Attribute, value: f64, modifier_type: ModifierType) {
        self.modifiers
            .add_modifier(self.instance_id, attribute, value, modifier_type);
    }

    /// Remove this instance's modifiers on `attribute`
    pub fn remove_modifiers(&mut self, attribute: Attribute) {
        self.modifiers.remove_owned(self.instance_id, attribute);
    }

    /// Remove every modifier on `attribute`, including other buffs' contributions
    pub fn force_remove_modifiers(&mut self, attribute: Attribute) {
        self.modifiers.remove_modifiers(attribute);
    }

    /// Replace this instance's contribution to `attribute` with a single modifier
    pub fn set_modifier(&mut self, attribute: Attribute, value: f64, modifier_type: ModifierType) {
        self.remove_modifiers(attribute);
        self.add_modifier(attribute, value, modifier_type);
    }

    pub fn modifiers(&self) -> &ModifierStack {
        self.modifiers
    }

    // === Output ===

    /// Report a damage or heal tick to whoever is driving the update
    pub fn emit(&mut self, kind: EffectKind, amount: f64) {
        self.effects.push(PeriodicEffect {
            instance_id: self.instance_id.to_string(),
            buff_id: self.config.id.clone(),
            character_id: self.character_id.to_string(),
            kind,
            amount,
        });
    }

    pub fn log(&self, message: &str) {
        debug!(buff = %self.config.id, instance = %self.instance_id, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Roster;

    struct Fixture {
        config: BuffConfig,
        variables: Variables,
        modifiers: ModifierStack,
        roster: Roster,
        effects: Vec<PeriodicEffect>,
    }

    impl Fixture {
        fn new(config: BuffConfig) -> Self {
            let mut roster = Roster::new();
            roster.insert(Character::new("hero", "Hero", 500.0).with_base(Attribute::Atk, 100.0));
            Fixture {
                config,
                variables: Variables::default(),
                modifiers: ModifierStack::new(),
                roster,
                effects: Vec::new(),
            }
        }

        fn context(&mut self, character_id: &'static str) -> BuffContext<'_> {
            BuffContext {
                instance_id: "inst_1",
                character_id,
                config: &self.config,
                start_time: 1000,
                expire_time: Some(3000),
                now: 3500,
                variables: &mut self.variables,
                modifiers: &mut self.modifiers,
                characters: &self.roster,
                effects: &mut self.effects,
            }
        }
    }

    #[test]
    fn test_params_fall_back_on_absent_null_or_mistyped() {
        let config = BuffConfig::new("aura", "Aura", 2000)
            .with_param("pierce", true)
            .with_param("element", "fire")
            .with_param("power", "strong")
            .with_param("nothing", serde_json::Value::Null);
        let mut fixture = Fixture::new(config);
        let ctx = fixture.context("hero");

        assert!(ctx.param_bool("pierce", false));
        assert!(ctx.param_bool("missing", true));
        assert!(!ctx.param_bool("element", false));
        assert_eq!(ctx.param_str("element", "none"), "fire");
        assert_eq!(ctx.param_str("nothing", "none"), "none");
        assert_eq!(ctx.param_f64("power", 2.5), 2.5);
    }

    #[test]
    fn test_timing_is_signed_past_expiry() {
        let mut fixture = Fixture::new(BuffConfig::new("aura", "Aura", 2000));
        let ctx = fixture.context("hero");
        assert_eq!(ctx.elapsed_time(), 2500);
        assert_eq!(ctx.remaining_time(), Some(-500));
    }

    #[test]
    fn test_force_remove_clears_other_owners() {
        let mut fixture = Fixture::new(BuffConfig::new("aura", "Aura", 2000));
        fixture
            .modifiers
            .add_modifier("other", Attribute::Atk, 40.0, ModifierType::Additive);

        let mut ctx = fixture.context("hero");
        ctx.add_modifier(Attribute::Atk, 10.0, ModifierType::Additive);
        assert!((ctx.attribute_value(Attribute::Atk) - 150.0).abs() < 0.01);

        ctx.remove_modifiers(Attribute::Atk);
        assert!((ctx.attribute_value(Attribute::Atk) - 140.0).abs() < 0.01);

        ctx.add_modifier(Attribute::Atk, 10.0, ModifierType::Additive);
        ctx.force_remove_modifiers(Attribute::Atk);
        assert!((ctx.attribute_value(Attribute::Atk) - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_require_character() {
        let mut fixture = Fixture::new(BuffConfig::new("aura", "Aura", 2000));
        assert!(fixture.context("hero").require_character().is_ok());

        let ctx = fixture.context("ghost");
        assert_eq!(
            ctx.require_character().map(|c| c.id.clone()),
            Err(ScriptError::MissingCharacter("ghost".to_string()))
        );
        assert_eq!(ctx.attribute_value(Attribute::Atk), 0.0);
    }

    #[test]
    fn test_variables_have_no_implicit_default() {
        let mut vars = Variables::default();
        assert!(vars.number("bonus").is_none());

        vars.set("bonus", 15.0);
        vars.set("stunned", true);
        assert_eq!(vars.number("bonus"), Some(15.0));
        assert_eq!(vars.flag("stunned"), Some(true));
        // Wrong type reads as absent
        assert!(vars.number("stunned").is_none());

        vars.remove("bonus");
        assert!(vars.get("bonus").is_none());
        assert_eq!(vars.len(), 1);
    }
}
