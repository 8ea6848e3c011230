//! Damage-absorbing shield

use crate::buff::context::BuffContext;
use crate::buff::script::{crossed_whole_second, BuffScript, HookResult};
use crate::types::{Attribute, Millis};

/// Variable holding the remaining shield points of an instance
pub const SHIELD_VALUE: &str = "shieldValue";
pub const MAX_SHIELD_VALUE: &str = "maxShieldValue";

/// Max health assumed when the owner is no longer in the battle
const FALLBACK_MAX_HEALTH: f64 = 1000.0;

/// Shield of `floor(baseShield × shieldScale + maxHP × 0.1)` points
///
/// Regenerates `shieldRegen` points per whole second up to its maximum.
/// Absorption itself is done by [`BuffSystem::absorb_damage`](crate::buff::BuffSystem::absorb_damage).
#[derive(Debug, Clone)]
pub struct ShieldBuff {
    pub default_base: f64,
    pub default_refresh_bonus: f64,
}

impl Default for ShieldBuff {
    fn default() -> Self {
        ShieldBuff {
            default_base: 100.0,
            default_refresh_bonus: 20.0,
        }
    }
}

impl ShieldBuff {
    pub fn shield_amount(base: f64, scale: f64, max_health: f64) -> f64 {
        (base * scale + max_health * 0.1).floor()
    }
}

impl BuffScript for ShieldBuff {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let base = ctx.param_f64("baseShield", self.default_base);
        let scale = ctx.param_f64("shieldScale", 1.0);
        let max_health = match ctx.character() {
            Some(_) => ctx.attribute_value(Attribute::Hp),
            None => FALLBACK_MAX_HEALTH,
        };

        let value = Self::shield_amount(base, scale, max_health);
        ctx.set_variable(SHIELD_VALUE, value);
        ctx.set_variable(MAX_SHIELD_VALUE, value);
        let regen = ctx.param_f64("shieldRegen", 0.0);
        ctx.set_variable("shieldRegen", regen);
        ctx.log(&format!("shield of {value}"));
        Ok(())
    }

    fn on_remove(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let remaining = ctx.number(SHIELD_VALUE).unwrap_or(0.0);
        ctx.log(&format!("shield broke with {remaining} left"));
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta: Millis) -> HookResult {
        let regen = ctx.number("shieldRegen").unwrap_or(0.0);
        if regen <= 0.0 || !crossed_whole_second(ctx.elapsed_time(), delta) {
            return Ok(());
        }

        let current = ctx.number(SHIELD_VALUE).unwrap_or(0.0);
        let max = ctx.number(MAX_SHIELD_VALUE).unwrap_or(current);
        if current < max {
            ctx.set_variable(SHIELD_VALUE, (current + regen).min(max));
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param_f64("refreshBonus", self.default_refresh_bonus);
        let current = ctx.number(SHIELD_VALUE).unwrap_or(0.0);
        let max = ctx.number(MAX_SHIELD_VALUE).unwrap_or(current);
        ctx.set_variable(SHIELD_VALUE, current + bonus);
        ctx.set_variable(MAX_SHIELD_VALUE, max + bonus);
        Ok(())
    }
}
