//! Multi-attribute status effects (berserk, mountain god, ...)

use crate::buff::context::{BuffContext, EffectKind};
use crate::buff::script::{crossed_whole_second, BuffScript, HookResult, ScriptError};
use crate::types::{Attribute, Millis, ModifierType};

use super::ModifierSpec;

/// A modifier whose value is read from `key`, falling back to the default modifier value
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedModifier {
    pub key: String,
    pub spec: ModifierSpec,
}

impl KeyedModifier {
    fn resolve(&self, ctx: &BuffContext<'_>) -> Result<f64, ScriptError> {
        let value = ctx.param_f64(&self.key, self.spec.value);
        if !value.is_finite() {
            return Err(ScriptError::InvalidParameter {
                key: self.key.clone(),
                reason: "not a finite number".to_string(),
            });
        }
        Ok(value)
    }
}

/// Damage or heal fired on every whole second
#[derive(Debug, Clone, PartialEq)]
pub struct Pulse {
    pub kind: EffectKind,
    pub key: String,
    pub default: f64,
}

/// Applies a fixed set of modifiers across several attributes
///
/// Entries read their value from `<ATTR>Modifier` unless given a key of their own,
/// and are applied all-or-nothing. Each refresh stacks one more copy of every
/// refresh grant on top.
#[derive(Debug, Clone, Default)]
pub struct StatusEffectBundle {
    pub entries: Vec<KeyedModifier>,
    pub refresh_grants: Vec<KeyedModifier>,
    pub pulse: Option<Pulse>,
}

impl StatusEffectBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, attribute: Attribute, value: f64, modifier_type: ModifierType) -> Self {
        let key = Self::key(attribute);
        self.with_keyed(&key, attribute, value, modifier_type)
    }

    pub fn with_keyed(mut self, key: &str, attribute: Attribute, value: f64, modifier_type: ModifierType) -> Self {
        self.entries.push(KeyedModifier {
            key: key.to_string(),
            spec: ModifierSpec::new(attribute, value, modifier_type),
        });
        self
    }

    /// Stack another modifier on every refresh
    pub fn on_refresh_grant(mut self, key: &str, attribute: Attribute, value: f64, modifier_type: ModifierType) -> Self {
        self.refresh_grants.push(KeyedModifier {
            key: key.to_string(),
            spec: ModifierSpec::new(attribute, value, modifier_type),
        });
        self
    }

    pub fn with_pulse(mut self, kind: EffectKind, key: &str, default: f64) -> Self {
        self.pulse = Some(Pulse {
            kind,
            key: key.to_string(),
            default,
        });
        self
    }

    fn key(attribute: Attribute) -> String {
        format!("{}Modifier", attribute.as_str())
    }
}

impl BuffScript for StatusEffectBundle {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        // Resolve everything first so a bad parameter leaves no partial state
        let values = self
            .entries
            .iter()
            .map(|entry| entry.resolve(ctx))
            .collect::<Result<Vec<_>, _>>()?;

        for (entry, value) in self.entries.iter().zip(values) {
            ctx.add_modifier(entry.spec.attribute, value, entry.spec.modifier_type);
            ctx.set_variable(&entry.key, value);
        }
        ctx.log(&format!("{} applied", ctx.config().name));
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta: Millis) -> HookResult {
        let Some(pulse) = &self.pulse else {
            return Ok(());
        };
        if !crossed_whole_second(ctx.elapsed_time(), delta) || ctx.character().is_none() {
            return Ok(());
        }

        let amount = ctx.param_f64(&pulse.key, pulse.default);
        if amount > 0.0 {
            ctx.emit(pulse.kind, amount);
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let values = self
            .refresh_grants
            .iter()
            .map(|grant| grant.resolve(ctx))
            .collect::<Result<Vec<_>, _>>()?;

        for (grant, value) in self.refresh_grants.iter().zip(values) {
            ctx.add_modifier(grant.spec.attribute, value, grant.spec.modifier_type);
            ctx.log(&format!("{} +{}", grant.spec.attribute, value));
        }
        Ok(())
    }
}
