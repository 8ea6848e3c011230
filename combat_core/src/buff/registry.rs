//! Script registry - maps buff ids to the script that drives them

use super::context::EffectKind;
use super::script::BuffScript;
use super::scripts::{
    AttributeBuff, BoundedEntry, DriftingModifier, OverTimeEffect, ShieldBuff, StatusEffectBundle,
};
use crate::types::{Attribute, ModifierType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Buff script registry
///
/// Scripts are stateless; one shared script serves every instance of its buff.
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, Arc<dyn BuffScript>>,
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.ids().collect();
        ids.sort_unstable();
        f.debug_struct("ScriptRegistry").field("scripts", &ids).finish()
    }
}

impl ScriptRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script under `id`, replacing any previous one
    pub fn register(&mut self, id: &str, script: impl BuffScript + 'static) {
        self.scripts.insert(id.to_string(), Arc::new(script));
    }

    /// Get a script by buff id
    pub fn get(&self, id: &str) -> Option<Arc<dyn BuffScript>> {
        self.scripts.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scripts.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Load the built-in scripts
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Attribute buffs
        registry.register(
            "buff_atk_up",
            AttributeBuff::new(Attribute::Atk, ModifierType::Additive).with_bonus("stackBonus", 10.0),
        );
        registry.register(
            "buff_def_up",
            AttributeBuff::new(Attribute::Def, ModifierType::Additive)
                .with_bonus("defenseBonus", 15.0)
                .with_growth(0.008)
                .with_refresh_bonus(8.0),
        );
        registry.register(
            "buff_speed_up",
            AttributeBuff::new(Attribute::Spd, ModifierType::Multiplicative).with_bonus("speedBonus", 0.2),
        );
        registry.register(
            "buff_dodge_up",
            DriftingModifier::recovering(
                BoundedEntry::bonus(Attribute::Evade, ModifierType::Multiplicative, "dodgeBonus", 0.2)
                    .capped(f64::INFINITY, 0.5),
                "decayRate",
                0.02,
            )
            .with_refresh_bonus(0.1),
        );

        // Damage over time
        registry.register(
            "poison",
            OverTimeEffect::damage(10.0, 2000)
                .with_multiplier(1.2)
                .with_refresh_bonus(5.0)
                .with_modifier(BoundedEntry::reduction(
                    Attribute::Spd,
                    ModifierType::Multiplicative,
                    "speedReduction",
                    0.2,
                )),
        );
        registry.register(
            "buff_strong_poison",
            OverTimeEffect::damage(15.0, 1500)
                .with_multiplier(1.3)
                .with_modifier_refresh(0.05, 3.0)
                .with_modifier(
                    BoundedEntry::reduction(Attribute::Spd, ModifierType::Multiplicative, "speedReduction", 0.2)
                        .capped(f64::INFINITY, 0.4),
                )
                .with_modifier(
                    BoundedEntry::reduction(Attribute::Atk, ModifierType::Multiplicative, "attackReduction", 0.15)
                        .capped(f64::INFINITY, 0.3),
                ),
        );

        // Heal over time
        registry.register(
            "heal_over_time",
            OverTimeEffect::heal(20.0, 1000).with_refresh_bonus(5.0),
        );

        registry.register("shield", ShieldBuff::default());

        // Status effects
        registry.register(
            "berserk",
            StatusEffectBundle::new()
                .with_keyed("attackBonus", Attribute::Atk, 100.0, ModifierType::Additive)
                .with(Attribute::CritRate, 0.2, ModifierType::Additive)
                .with(Attribute::CritDmg, 0.5, ModifierType::Additive)
                .with(Attribute::Def, -0.3, ModifierType::Multiplicative)
                .on_refresh_grant("refreshAttackBonus", Attribute::Atk, 20.0, ModifierType::Additive)
                .on_refresh_grant("refreshCritRateBonus", Attribute::CritRate, 0.05, ModifierType::Additive)
                .with_pulse(EffectKind::Damage, "selfDamage", 5.0),
        );
        registry.register(
            "mountain_god",
            StatusEffectBundle::new()
                .with_keyed("attackBonus", Attribute::Atk, 50.0, ModifierType::Additive)
                .with_keyed("defenseBonus", Attribute::Def, 30.0, ModifierType::Additive)
                .with(Attribute::CritRate, 0.1, ModifierType::Additive)
                .on_refresh_grant("refreshBonus", Attribute::Atk, 10.0, ModifierType::Additive)
                .with_pulse(EffectKind::Heal, "regeneration", 5.0),
        );
        registry.register(
            "buff_heal_reduction",
            StatusEffectBundle::new().with(Attribute::Regeneration, -0.5, ModifierType::Multiplicative),
        );

        // Bounded effects that wear off
        registry.register(
            "buff_stun",
            DriftingModifier::recovering(
                BoundedEntry::reduction(Attribute::Def, ModifierType::Multiplicative, "defenseReduction", 0.2)
                    .capped(f64::INFINITY, 0.4),
                "recoveryRate",
                0.05,
            )
            .with_refresh_bonus(0.1)
            .with_flag("isStunned"),
        );
        registry.register(
            "buff_hit_reduction",
            DriftingModifier::recovering(
                BoundedEntry::reduction(Attribute::Accuracy, ModifierType::Multiplicative, "hitReduction", 0.3)
                    .capped(f64::INFINITY, 0.8),
                "recoveryRate",
                0.05,
            )
            .with_refresh_bonus(0.1),
        );
        registry.register(
            "buff_speed_reduction",
            DriftingModifier::recovering(
                BoundedEntry::reduction(Attribute::Spd, ModifierType::Multiplicative, "speedReduction", 0.25)
                    .capped(f64::INFINITY, 0.6),
                "recoveryRate",
                0.03,
            )
            .with_refresh_bonus(0.1),
        );
        registry.register(
            "buff_crit_damage_reduction",
            DriftingModifier::recovering(
                BoundedEntry::reduction(
                    Attribute::CritDmg,
                    ModifierType::Multiplicative,
                    "critDamageReduction",
                    0.2,
                )
                .capped(f64::INFINITY, 0.5),
                "recoveryRate",
                0.02,
            )
            .with_refresh_bonus(0.05),
        );

        // Bounded effects that harden
        registry.register(
            "buff_stone_skin",
            DriftingModifier::growing(
                BoundedEntry::bonus(
                    Attribute::PhysicalDamageReduction,
                    ModifierType::Multiplicative,
                    "physicalReduction",
                    0.3,
                )
                .capped(0.6, 0.8),
                "enhancementRate",
                0.005,
            )
            .with_entry(
                BoundedEntry::reduction(Attribute::Spd, ModifierType::Multiplicative, "speedPenalty", 0.15)
                    .capped(0.3, 0.4)
                    .scaled(0.5, 0.3),
            )
            .with_refresh_bonus(0.1),
        );
        registry.register(
            "buff_mountain_child",
            DriftingModifier::growing(
                BoundedEntry::bonus(Attribute::NaturePower, ModifierType::Multiplicative, "natureBonus", 0.15)
                    .capped(0.3, 0.4),
                "enhancementRate",
                0.001,
            )
            .with_refresh_bonus(0.05)
            .with_regen("hpRegen", 5.0, 2.0),
        );

        registry
    }
}
