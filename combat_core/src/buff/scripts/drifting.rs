//! Bounded modifiers that drift once per second
//!
//! Covers the debuffs that wear off gradually (stun, slows, hit and crit damage
//! reductions), the buffs that decay (dodge up) and the ones that harden over
//! time (stone skin, mountain child).

use crate::buff::context::{BuffContext, EffectKind};
use crate::buff::script::{crossed_whole_second, BuffScript, HookResult, ScriptError};
use crate::types::{Attribute, Millis, ModifierType};

/// One modifier whose magnitude lives in a variable and stays within caps
///
/// The magnitude is always non-negative; reductions are applied as `-magnitude`.
/// The parameter and the variable share the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedEntry {
    pub attribute: Attribute,
    pub modifier_type: ModifierType,
    pub key: String,
    pub default: f64,
    pub reduces: bool,
    /// Highest magnitude reachable by growing over time
    pub drift_cap: f64,
    /// Highest magnitude reachable by refreshing
    pub refresh_cap: f64,
    /// Share of the drift rate this entry moves by
    pub drift_scale: f64,
    /// Share of the refresh bonus this entry moves by
    pub refresh_scale: f64,
}

impl BoundedEntry {
    pub fn bonus(attribute: Attribute, modifier_type: ModifierType, key: &str, default: f64) -> Self {
        BoundedEntry {
            attribute,
            modifier_type,
            key: key.to_string(),
            default,
            reduces: false,
            drift_cap: f64::INFINITY,
            refresh_cap: f64::INFINITY,
            drift_scale: 1.0,
            refresh_scale: 1.0,
        }
    }

    pub fn reduction(attribute: Attribute, modifier_type: ModifierType, key: &str, default: f64) -> Self {
        BoundedEntry {
            reduces: true,
            ..Self::bonus(attribute, modifier_type, key, default)
        }
    }

    pub fn capped(mut self, drift_cap: f64, refresh_cap: f64) -> Self {
        self.drift_cap = drift_cap;
        self.refresh_cap = refresh_cap;
        self
    }

    pub fn scaled(mut self, drift_scale: f64, refresh_scale: f64) -> Self {
        self.drift_scale = drift_scale;
        self.refresh_scale = refresh_scale;
        self
    }

    /// Magnitude requested by the config
    pub fn resolve(&self, ctx: &BuffContext<'_>) -> Result<f64, ScriptError> {
        let value = ctx.param_f64(&self.key, self.default);
        if !value.is_finite() || value < 0.0 {
            return Err(ScriptError::InvalidParameter {
                key: self.key.clone(),
                reason: format!("expected a non-negative number, got {value}"),
            });
        }
        Ok(value)
    }

    pub fn magnitude(&self, ctx: &BuffContext<'_>) -> f64 {
        ctx.number(&self.key).unwrap_or(self.default)
    }

    /// Replace this entry's modifier with one of the given magnitude
    pub fn apply(&self, ctx: &mut BuffContext<'_>, magnitude: f64) {
        let value = if self.reduces { -magnitude } else { magnitude };
        ctx.set_modifier(self.attribute, value, self.modifier_type);
        ctx.set_variable(&self.key, magnitude);
    }

    /// Move up by `bonus` on refresh, never past the refresh cap
    pub fn refresh(&self, ctx: &mut BuffContext<'_>, bonus: f64) -> f64 {
        let current = self.magnitude(ctx);
        let raised = (current + bonus * self.refresh_scale).min(self.refresh_cap);
        self.apply(ctx, raised);
        raised
    }

    fn drift(&self, ctx: &mut BuffContext<'_>, drift: Drift, rate: f64) -> bool {
        let current = self.magnitude(ctx);
        let step = rate * self.drift_scale;
        let next = match drift {
            Drift::Recover => (current - step).max(0.0),
            Drift::Grow => (current + step).min(self.drift_cap),
        };
        let moved = match drift {
            Drift::Recover => next < current,
            Drift::Grow => next > current,
        };
        if moved {
            self.apply(ctx, next);
        }
        moved
    }
}

/// Direction a [`DriftingModifier`] moves in each second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    /// Magnitude shrinks toward zero
    Recover,
    /// Magnitude grows toward the drift cap
    Grow,
}

/// Heal fired once per second, raised by a fixed step on refresh
#[derive(Debug, Clone, PartialEq)]
pub struct Regen {
    pub key: String,
    pub default: f64,
    pub refresh_step: f64,
}

/// Modifiers that drift by `rate` on every whole-second crossing
///
/// Refresh pushes every entry up by `refreshBonus`, capped per entry.
#[derive(Debug, Clone)]
pub struct DriftingModifier {
    pub entries: Vec<BoundedEntry>,
    pub drift: Drift,
    /// Parameter holding the per-second drift
    pub rate_key: String,
    pub default_rate: f64,
    pub default_refresh_bonus: f64,
    /// Flag variable set while the effect is active (e.g. "isStunned")
    pub flag: Option<String>,
    pub regen: Option<Regen>,
}

impl DriftingModifier {
    pub fn recovering(entry: BoundedEntry, rate_key: &str, default_rate: f64) -> Self {
        DriftingModifier {
            entries: vec![entry],
            drift: Drift::Recover,
            rate_key: rate_key.to_string(),
            default_rate,
            default_refresh_bonus: 0.0,
            flag: None,
            regen: None,
        }
    }

    pub fn growing(entry: BoundedEntry, rate_key: &str, default_rate: f64) -> Self {
        DriftingModifier {
            drift: Drift::Grow,
            ..Self::recovering(entry, rate_key, default_rate)
        }
    }

    pub fn with_entry(mut self, entry: BoundedEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_refresh_bonus(mut self, bonus: f64) -> Self {
        self.default_refresh_bonus = bonus;
        self
    }

    pub fn with_flag(mut self, name: &str) -> Self {
        self.flag = Some(name.to_string());
        self
    }

    pub fn with_regen(mut self, key: &str, default: f64, refresh_step: f64) -> Self {
        self.regen = Some(Regen {
            key: key.to_string(),
            default,
            refresh_step,
        });
        self
    }
}

impl BuffScript for DriftingModifier {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let magnitudes = self
            .entries
            .iter()
            .map(|entry| entry.resolve(ctx))
            .collect::<Result<Vec<_>, _>>()?;

        for (entry, magnitude) in self.entries.iter().zip(magnitudes) {
            entry.apply(ctx, magnitude);
        }
        if let Some(flag) = &self.flag {
            ctx.set_variable(flag, true);
        }
        if let Some(regen) = &self.regen {
            let amount = ctx.param_f64(&regen.key, regen.default);
            ctx.set_variable(&regen.key, amount);
        }
        ctx.log(&format!("{} applied", ctx.config().name));
        Ok(())
    }

    fn on_remove(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        if let Some(flag) = &self.flag {
            ctx.set_variable(flag, false);
        }
        ctx.log(&format!("{} faded", ctx.config().name));
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta: Millis) -> HookResult {
        if !crossed_whole_second(ctx.elapsed_time(), delta) {
            return Ok(());
        }

        if let Some(regen) = &self.regen {
            let amount = ctx.number(&regen.key).unwrap_or(regen.default);
            if amount > 0.0 && ctx.character().is_some() {
                ctx.emit(EffectKind::Heal, amount);
            }
        }

        let rate = ctx.param_f64(&self.rate_key, self.default_rate);
        if rate <= 0.0 {
            return Ok(());
        }
        for entry in &self.entries {
            if entry.drift(ctx, self.drift, rate) {
                let magnitude = entry.magnitude(ctx);
                ctx.log(&format!("{} drifted to {:.3}", entry.attribute, magnitude));
            }
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param_f64("refreshBonus", self.default_refresh_bonus);
        for entry in &self.entries {
            let magnitude = entry.refresh(ctx, bonus);
            ctx.log(&format!("{} raised to {:.3}", entry.attribute, magnitude));
        }
        if let Some(regen) = &self.regen {
            let amount = ctx.number(&regen.key).unwrap_or(regen.default) + regen.refresh_step;
            ctx.set_variable(&regen.key, amount);
        }
        Ok(())
    }
}
