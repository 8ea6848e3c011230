//! Buff configuration templates

use crate::types::{ControlType, Millis, StackRule};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable template describing one buff or debuff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffConfig {
    /// Unique identifier, also the script id (e.g., "poison", "buff_atk_up")
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Duration in milliseconds, -1 for infinite
    pub duration: i64,
    /// Duration in turns for turn-based battles, counted down by [`BuffSystem::update_turn`]
    ///
    /// [`BuffSystem::update_turn`]: crate::buff::BuffSystem::update_turn
    #[serde(default)]
    pub turns: Option<u32>,
    /// Advisory stack limit, enforced only under [`StackRule::Limited`]
    #[serde(default = "default_max_stacks")]
    pub max_stacks: u32,
    /// Cooldown in milliseconds (metadata for callers)
    #[serde(default)]
    pub cooldown: u64,
    #[serde(default)]
    pub is_debuff: bool,
    #[serde(default)]
    pub stack_rule: StackRule,
    #[serde(default)]
    pub control_type: ControlType,
    /// Higher wins when several control effects overlap
    #[serde(default)]
    pub control_priority: i32,
    /// Open parameter bag read by scripts
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

fn default_max_stacks() -> u32 {
    1
}

impl BuffConfig {
    /// Create a config with no parameters
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration: i64) -> Self {
        BuffConfig {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            duration,
            turns: None,
            max_stacks: 1,
            cooldown: 0,
            is_debuff: false,
            stack_rule: StackRule::Independent,
            control_type: ControlType::None,
            control_priority: 0,
            parameters: HashMap::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    /// Also expire after `turns` turns of the owning character
    pub fn with_turns(mut self, turns: u32) -> Self {
        self.turns = Some(turns);
        self
    }

    pub fn with_stacking(mut self, rule: StackRule, max_stacks: u32) -> Self {
        self.stack_rule = rule;
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_control(mut self, control_type: ControlType, priority: i32) -> Self {
        self.control_type = control_type;
        self.control_priority = priority;
        self
    }

    pub fn as_debuff(mut self) -> Self {
        self.is_debuff = true;
        self
    }

    pub fn is_infinite(&self) -> bool {
        self.duration < 0
    }

    /// Expiry time for an instance started at `start`, `None` when infinite
    pub fn expire_time(&self, start: Millis) -> Option<Millis> {
        if self.is_infinite() {
            None
        } else {
            Some(start.saturating_add(self.duration as Millis))
        }
    }

    /// Parameter value, `None` when absent or null
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key).filter(|v| !v.is_null())
    }
}

/// Buff configurations keyed by id
#[derive(Debug, Clone, Default)]
pub struct BuffConfigSet {
    configs: HashMap<String, Arc<BuffConfig>>,
}

impl BuffConfigSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a config, replacing any with the same id
    pub fn register(&mut self, config: BuffConfig) {
        self.configs.insert(config.id.clone(), Arc::new(config));
    }

    pub fn get(&self, id: &str) -> Option<Arc<BuffConfig>> {
        self.configs.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expire_time() {
        let finite = BuffConfig::new("haste", "Haste", 3000);
        assert_eq!(finite.expire_time(500), Some(3500));

        let infinite = BuffConfig::new("aura", "Aura", -1);
        assert!(infinite.is_infinite());
        assert_eq!(infinite.expire_time(500), None);
    }

    #[test]
    fn test_null_param_reads_as_absent() {
        let config = BuffConfig::new("poison", "Poison", 5000)
            .with_param("baseDamage", 12)
            .with_param("damageMultiplier", Value::Null);
        assert_eq!(config.param("baseDamage").and_then(Value::as_f64), Some(12.0));
        assert!(config.param("damageMultiplier").is_none());
        assert!(config.param("missing").is_none());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{ "id": "shield", "name": "Shield", "duration": 3000 }"#;
        let config: BuffConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_stacks, 1);
        assert_eq!(config.stack_rule, StackRule::Independent);
        assert_eq!(config.control_type, ControlType::None);
        assert!(config.parameters.is_empty());
    }
}
