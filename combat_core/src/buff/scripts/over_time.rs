//! Damage- and heal-over-time effects

use crate::buff::context::{BuffContext, EffectKind};
use crate::buff::script::{BuffScript, HookResult, ScriptError};
use crate::types::Millis;

use super::BoundedEntry;

/// Parameter names for one kind of periodic effect
struct Keys {
    base: &'static str,
    interval: &'static str,
    multiplier: &'static str,
    bonus: &'static str,
}

const DAMAGE_KEYS: Keys = Keys {
    base: "baseDamage",
    interval: "damageInterval",
    multiplier: "damageMultiplier",
    bonus: "damageBonus",
};

const HEAL_KEYS: Keys = Keys {
    base: "baseHealing",
    interval: "healInterval",
    multiplier: "healMultiplier",
    bonus: "healingBonus",
};

/// What `refreshBonus` raises when the effect is refreshed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefreshMode {
    /// The base tick amount
    Amount,
    /// The lifetime modifiers; the base amount rises by a fixed step instead
    Modifiers { amount_step: f64 },
}

/// Fires a damage or heal tick every `interval` milliseconds
///
/// Tick magnitude grows geometrically with the number of intervals elapsed:
/// `floor((base + bonus) × multiplier ^ floor(elapsed / interval))`.
#[derive(Debug, Clone)]
pub struct OverTimeEffect {
    pub kind: EffectKind,
    pub default_amount: f64,
    /// Default tick interval in milliseconds
    pub default_interval: f64,
    pub default_multiplier: f64,
    pub default_refresh_bonus: f64,
    pub refresh_mode: RefreshMode,
    /// Modifiers applied for the lifetime of the effect
    pub modifiers: Vec<BoundedEntry>,
}

impl OverTimeEffect {
    pub fn damage(base: f64, interval: Millis) -> Self {
        OverTimeEffect {
            kind: EffectKind::Damage,
            default_amount: base,
            default_interval: interval as f64,
            default_multiplier: 1.0,
            default_refresh_bonus: 0.0,
            refresh_mode: RefreshMode::Amount,
            modifiers: Vec::new(),
        }
    }

    pub fn heal(base: f64, interval: Millis) -> Self {
        OverTimeEffect {
            kind: EffectKind::Heal,
            ..Self::damage(base, interval)
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.default_multiplier = multiplier;
        self
    }

    /// Refreshing raises the base amount by `refreshBonus`
    pub fn with_refresh_bonus(mut self, bonus: f64) -> Self {
        self.default_refresh_bonus = bonus;
        self.refresh_mode = RefreshMode::Amount;
        self
    }

    /// Refreshing deepens the modifiers by `refreshBonus` and the base amount by `amount_step`
    pub fn with_modifier_refresh(mut self, bonus: f64, amount_step: f64) -> Self {
        self.default_refresh_bonus = bonus;
        self.refresh_mode = RefreshMode::Modifiers { amount_step };
        self
    }

    pub fn with_modifier(mut self, entry: BoundedEntry) -> Self {
        self.modifiers.push(entry);
        self
    }

    fn keys(&self) -> &'static Keys {
        match self.kind {
            EffectKind::Damage => &DAMAGE_KEYS,
            EffectKind::Heal => &HEAL_KEYS,
        }
    }

    /// Tick magnitude after `ticks` whole intervals
    pub fn tick_amount(base: f64, multiplier: f64, ticks: u32) -> f64 {
        (base * multiplier.powi(ticks as i32)).floor()
    }
}

impl BuffScript for OverTimeEffect {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let keys = self.keys();
        let interval = ctx.param_f64(keys.interval, self.default_interval);
        if !(interval > 0.0) {
            return Err(ScriptError::InvalidParameter {
                key: keys.interval.to_string(),
                reason: format!("interval must be positive, got {interval}"),
            });
        }

        let magnitudes = self
            .modifiers
            .iter()
            .map(|entry| entry.resolve(ctx))
            .collect::<Result<Vec<_>, _>>()?;
        for (entry, magnitude) in self.modifiers.iter().zip(magnitudes) {
            entry.apply(ctx, magnitude);
        }

        let base = ctx.param_f64(keys.base, self.default_amount);
        ctx.set_variable("baseAmount", base);
        ctx.set_variable("interval", interval);
        ctx.set_variable("lastTickTime", 0.0);
        ctx.log(&format!("{:?} over time: {} every {}ms", self.kind, base, interval));
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, _delta: Millis) -> HookResult {
        let keys = self.keys();
        let elapsed = ctx.elapsed_time() as f64;
        let last_tick = ctx.number("lastTickTime").unwrap_or(0.0);
        let interval = ctx
            .number("interval")
            .unwrap_or(self.default_interval);

        if interval <= 0.0 || elapsed - last_tick < interval {
            return Ok(());
        }
        ctx.set_variable("lastTickTime", elapsed);

        ctx.require_character()?;

        let base = ctx.number("baseAmount").unwrap_or(self.default_amount)
            + ctx.param_f64(keys.bonus, 0.0);
        let multiplier = ctx.param_f64(keys.multiplier, self.default_multiplier);
        let ticks = (elapsed / interval).floor() as u32;
        let amount = Self::tick_amount(base, multiplier, ticks);

        if amount > 0.0 {
            ctx.emit(self.kind, amount);
            ctx.log(&format!("{:?} tick: {}", self.kind, amount));
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let base = ctx.number("baseAmount").unwrap_or(self.default_amount);
        let bonus = ctx.param_f64("refreshBonus", self.default_refresh_bonus);

        let raised = match self.refresh_mode {
            RefreshMode::Amount => base + bonus,
            RefreshMode::Modifiers { amount_step } => {
                for entry in &self.modifiers {
                    entry.refresh(ctx, bonus);
                }
                base + amount_step
            }
        };
        ctx.set_variable("baseAmount", raised);
        ctx.log(&format!("base amount raised to {}", raised));
        Ok(())
    }
}
