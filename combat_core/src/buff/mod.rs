//! Buff system - time-limited effects layered onto characters
//!
//! The [`BuffSystem`] owns every live [`BuffInstance`] and each character's
//! [`ModifierStack`]. Scripts change attributes only through the context they
//! are handed while one of their hooks runs.

pub mod config;
pub mod context;
pub mod registry;
pub mod script;
pub mod scripts;

pub use config::{BuffConfig, BuffConfigSet};
pub use context::{BuffContext, EffectKind, PeriodicEffect, Variable, Variables};
pub use registry::ScriptRegistry;
pub use script::{crossed_interval, crossed_whole_second, BuffScript, HookResult, ScriptError};

use crate::character::{Character, CharacterLookup};
use crate::modifier::ModifierStack;
use crate::types::{Attribute, ControlType, Millis, StackRule};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuffError {
    #[error("no script registered for buff {0}")]
    UnknownScript(String),
}

/// One active application of a buff to a character
pub struct BuffInstance {
    pub instance_id: String,
    pub character_id: String,
    pub buff_id: String,
    pub config: Arc<BuffConfig>,
    pub start_time: Millis,
    /// `None` for infinite buffs
    pub expire_time: Option<Millis>,
    /// Turns left for turn-limited buffs
    pub remaining_turns: Option<u32>,
    pub is_active: bool,
    variables: Variables,
    script: Arc<dyn BuffScript>,
}

impl BuffInstance {
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Time left at `now`, negative once past expiry
    pub fn remaining_time(&self, now: Millis) -> Option<i64> {
        self.expire_time.map(|expire| expire as i64 - now as i64)
    }

    fn is_expired(&self, now: Millis) -> bool {
        self.expire_time.is_some_and(|expire| expire <= now)
    }
}

impl fmt::Debug for BuffInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuffInstance")
            .field("instance_id", &self.instance_id)
            .field("character_id", &self.character_id)
            .field("buff_id", &self.buff_id)
            .field("start_time", &self.start_time)
            .field("expire_time", &self.expire_time)
            .field("remaining_turns", &self.remaining_turns)
            .field("is_active", &self.is_active)
            .field("variables", &self.variables)
            .finish()
    }
}

/// What happened during one [`BuffSystem::update`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Damage and heal ticks fired by scripts, in dispatch order
    pub effects: Vec<PeriodicEffect>,
    /// Instances that expired and were removed
    pub expired: Vec<String>,
}

impl UpdateReport {
    pub fn total(&self, character_id: &str, kind: EffectKind) -> f64 {
        self.effects
            .iter()
            .filter(|e| e.character_id == character_id && e.kind == kind)
            .map(|e| e.amount)
            .sum()
    }
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    Apply,
    Update(Millis),
    Refresh,
    Remove,
}

/// Registry of live buff instances and the modifier stacks they drive
#[derive(Debug)]
pub struct BuffSystem {
    scripts: ScriptRegistry,
    /// Live instances in insertion order
    instances: Vec<BuffInstance>,
    stacks: HashMap<String, ModifierStack>,
    now: Millis,
    sequence: u64,
}

impl Default for BuffSystem {
    fn default() -> Self {
        Self::new(ScriptRegistry::with_defaults())
    }
}

impl BuffSystem {
    pub fn new(scripts: ScriptRegistry) -> Self {
        BuffSystem {
            scripts,
            instances: Vec::new(),
            stacks: HashMap::new(),
            now: 0,
            sequence: 0,
        }
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }

    pub fn scripts_mut(&mut self) -> &mut ScriptRegistry {
        &mut self.scripts
    }

    /// Apply `buff_id` to a character, returning the id of the affected instance
    ///
    /// Under [`StackRule::Limited`] with the stack limit reached no instance is
    /// created; the oldest one is refreshed and its id returned instead.
    pub fn add_buff(
        &mut self,
        characters: &dyn CharacterLookup,
        character_id: &str,
        buff_id: &str,
        config: impl Into<Arc<BuffConfig>>,
    ) -> Result<String, BuffError> {
        let config = config.into();
        let script = self
            .scripts
            .get(buff_id)
            .ok_or_else(|| BuffError::UnknownScript(buff_id.to_string()))?;

        let existing: Vec<String> = self
            .instances
            .iter()
            .filter(|i| i.character_id == character_id && i.buff_id == buff_id)
            .map(|i| i.instance_id.clone())
            .collect();

        match config.stack_rule {
            StackRule::Independent => {}
            StackRule::Refresh => {
                for id in &existing {
                    self.remove_buff(characters, id);
                }
            }
            StackRule::Limited => {
                if existing.len() >= config.max_stacks.max(1) as usize {
                    let oldest = existing[0].clone();
                    self.refresh_buff(characters, &oldest);
                    return Ok(oldest);
                }
            }
        }

        let instance_id = format!("{}_{}_{}_{}", character_id, buff_id, self.now, self.sequence);
        self.sequence += 1;

        self.instances.push(BuffInstance {
            instance_id: instance_id.clone(),
            character_id: character_id.to_string(),
            buff_id: buff_id.to_string(),
            expire_time: config.expire_time(self.now),
            remaining_turns: config.turns,
            config,
            start_time: self.now,
            is_active: true,
            variables: Variables::default(),
            script,
        });

        let mut effects = Vec::new();
        if let Some(instance) = self.instances.last_mut() {
            let stack = self.stacks.entry(instance.character_id.clone()).or_default();
            dispatch(instance, stack, characters, self.now, &mut effects, Hook::Apply);
        }
        debug!(character = %character_id, buff = %buff_id, instance = %instance_id, "buff applied");

        Ok(instance_id)
    }

    /// Remove an instance, running its `on_remove` hook. Returns false for unknown ids.
    pub fn remove_buff(&mut self, characters: &dyn CharacterLookup, instance_id: &str) -> bool {
        match self.position(instance_id) {
            Some(index) => {
                let mut discarded = Vec::new();
                self.remove_at(characters, index, &mut discarded);
                true
            }
            None => false,
        }
    }

    /// Re-apply an active instance: runs `on_refresh` then renews its duration
    pub fn refresh_buff(&mut self, characters: &dyn CharacterLookup, instance_id: &str) -> bool {
        let Some(index) = self.position(instance_id) else {
            return false;
        };

        let now = self.now;
        let instance = &mut self.instances[index];
        let stack = self.stacks.entry(instance.character_id.clone()).or_default();
        let mut effects = Vec::new();
        dispatch(instance, stack, characters, now, &mut effects, Hook::Refresh);
        instance.expire_time = instance.config.expire_time(now);
        instance.remaining_turns = instance.config.turns;

        debug!(instance = %instance_id, expire = ?instance.expire_time, "buff refreshed");
        true
    }

    /// Advance the clock by `delta` ms, run every update hook, then prune expired instances
    pub fn update(&mut self, characters: &dyn CharacterLookup, delta: Millis) -> UpdateReport {
        self.now = self.now.saturating_add(delta);
        let now = self.now;
        let mut report = UpdateReport::default();

        for instance in self.instances.iter_mut() {
            let stack = self.stacks.entry(instance.character_id.clone()).or_default();
            dispatch(instance, stack, characters, now, &mut report.effects, Hook::Update(delta));
        }

        let expired: Vec<String> = self
            .instances
            .iter()
            .filter(|i| i.is_expired(now))
            .map(|i| i.instance_id.clone())
            .collect();

        for id in expired {
            if let Some(index) = self.position(&id) {
                self.remove_at(characters, index, &mut report.effects);
                debug!(instance = %id, "buff expired");
                report.expired.push(id);
            }
        }

        report
    }

    /// End one turn of a character: count down its turn-limited buffs, run their
    /// update hooks with a zero delta, then prune the ones that ran out
    ///
    /// The clock does not move, so time-based expiry is left to [`BuffSystem::update`].
    pub fn update_turn(&mut self, characters: &dyn CharacterLookup, character_id: &str) -> UpdateReport {
        let now = self.now;
        let mut report = UpdateReport::default();

        for instance in self
            .instances
            .iter_mut()
            .filter(|i| i.character_id == character_id)
        {
            if let Some(turns) = instance.remaining_turns.as_mut() {
                *turns = turns.saturating_sub(1);
            }
            let stack = self.stacks.entry(instance.character_id.clone()).or_default();
            dispatch(instance, stack, characters, now, &mut report.effects, Hook::Update(0));
        }

        let expired: Vec<String> = self
            .instances
            .iter()
            .filter(|i| i.character_id == character_id && i.remaining_turns == Some(0))
            .map(|i| i.instance_id.clone())
            .collect();

        for id in expired {
            if let Some(index) = self.position(&id) {
                self.remove_at(characters, index, &mut report.effects);
                debug!(instance = %id, "buff ran out of turns");
                report.expired.push(id);
            }
        }

        report
    }

    /// Active instances on a character, oldest first
    pub fn buff_instances(&self, character_id: &str) -> Vec<&BuffInstance> {
        self.instances
            .iter()
            .filter(|i| i.character_id == character_id)
            .collect()
    }

    pub fn instance(&self, instance_id: &str) -> Option<&BuffInstance> {
        self.instances.iter().find(|i| i.instance_id == instance_id)
    }

    pub fn has_buff(&self, character_id: &str, buff_id: &str) -> bool {
        self.instances
            .iter()
            .any(|i| i.character_id == character_id && i.buff_id == buff_id)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Remove every buff on a character and drop its modifier stack
    pub fn clear_all_buffs(&mut self, characters: &dyn CharacterLookup, character_id: &str) {
        let mut discarded = Vec::new();
        while let Some(index) = self
            .instances
            .iter()
            .position(|i| i.character_id == character_id)
        {
            self.remove_at(characters, index, &mut discarded);
        }
        self.stacks.remove(character_id);
    }

    /// Remove every buff on every character and rewind the clock
    pub fn reset(&mut self, characters: &dyn CharacterLookup) {
        let mut discarded = Vec::new();
        while !self.instances.is_empty() {
            self.remove_at(characters, 0, &mut discarded);
        }
        self.stacks.clear();
        self.now = 0;
        self.sequence = 0;
    }

    // === Control effects ===

    /// Strongest control effect on a character, by config priority
    pub fn highest_priority_control(&self, character_id: &str) -> ControlType {
        self.instances
            .iter()
            .filter(|i| i.character_id == character_id && i.config.control_type != ControlType::None)
            .max_by_key(|i| i.config.control_priority)
            .map(|i| i.config.control_type)
            .unwrap_or(ControlType::None)
    }

    pub fn is_controlled(&self, character_id: &str) -> bool {
        self.highest_priority_control(character_id) != ControlType::None
    }

    pub fn can_act(&self, character_id: &str) -> bool {
        !self.is_controlled(character_id)
    }

    pub fn can_use_skill(&self, character_id: &str) -> bool {
        self.highest_priority_control(character_id).allows_skills()
    }

    // === Attributes ===

    pub fn modifier_stack(&self, character_id: &str) -> Option<&ModifierStack> {
        self.stacks.get(character_id)
    }

    /// Derived attribute: the character's base value run through its modifier stack
    pub fn attribute_value(&self, character: &Character, attribute: Attribute) -> f64 {
        let base = character.base_value(attribute);
        match self.stacks.get(&character.id) {
            Some(stack) => stack.calculate(attribute, base),
            None => base,
        }
    }

    // === Shields ===

    /// Drain a character's shields in application order, returning the damage left over
    pub fn absorb_damage(&mut self, character_id: &str, amount: f64) -> f64 {
        let mut remaining = amount.max(0.0);
        for instance in self
            .instances
            .iter_mut()
            .filter(|i| i.character_id == character_id)
        {
            if remaining <= 0.0 {
                break;
            }
            let Some(shield) = instance.variables.number(scripts::SHIELD_VALUE) else {
                continue;
            };
            let absorbed = shield.min(remaining).max(0.0);
            instance.variables.set(scripts::SHIELD_VALUE, shield - absorbed);
            remaining -= absorbed;
            if absorbed > 0.0 {
                debug!(instance = %instance.instance_id, absorbed, "shield absorbed damage");
            }
        }
        remaining
    }

    /// Shield points left on a character
    pub fn shield_total(&self, character_id: &str) -> f64 {
        self.instances
            .iter()
            .filter(|i| i.character_id == character_id)
            .filter_map(|i| i.variables.number(scripts::SHIELD_VALUE))
            .sum()
    }

    fn position(&self, instance_id: &str) -> Option<usize> {
        self.instances.iter().position(|i| i.instance_id == instance_id)
    }

    fn remove_at(
        &mut self,
        characters: &dyn CharacterLookup,
        index: usize,
        effects: &mut Vec<PeriodicEffect>,
    ) {
        let mut instance = self.instances.remove(index);
        instance.is_active = false;

        let stack = self.stacks.entry(instance.character_id.clone()).or_default();
        dispatch(&mut instance, stack, characters, self.now, effects, Hook::Remove);
        stack.remove_modifier(&instance.instance_id);

        debug!(instance = %instance.instance_id, "buff removed");
    }
}

/// Run one hook on an instance. Failures are logged and otherwise ignored.
fn dispatch(
    instance: &mut BuffInstance,
    stack: &mut ModifierStack,
    characters: &dyn CharacterLookup,
    now: Millis,
    effects: &mut Vec<PeriodicEffect>,
    hook: Hook,
) {
    let script = Arc::clone(&instance.script);
    let mut ctx = BuffContext {
        instance_id: &instance.instance_id,
        character_id: &instance.character_id,
        config: &instance.config,
        start_time: instance.start_time,
        expire_time: instance.expire_time,
        now,
        variables: &mut instance.variables,
        modifiers: stack,
        characters,
        effects,
    };

    let result = match hook {
        Hook::Apply => script.on_apply(&mut ctx),
        Hook::Update(delta) => script.on_update(&mut ctx, delta),
        Hook::Refresh => script.on_refresh(&mut ctx),
        Hook::Remove => script.on_remove(&mut ctx),
    };

    if let Err(err) = result {
        warn!(
            instance = %instance.instance_id,
            buff = %instance.buff_id,
            hook = ?hook,
            error = %err,
            "buff hook failed"
        );
    }
}
