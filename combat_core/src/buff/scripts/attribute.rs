//! Single-attribute buffs
//!
//! Two independent variants: [`AttributeBuff`] keeps a named running bonus that
//! grows every whole second and intensifies on refresh only when configured to,
//! while [`BonusBuff`] always intensifies on refresh by a fraction of its default.

use crate::buff::context::BuffContext;
use crate::buff::script::{crossed_whole_second, BuffScript, HookResult, ScriptError};
use crate::types::{Attribute, Millis, ModifierType};

/// Attribute buff driven by `baseBonus`/`growthRate`/`refreshBonus` parameters
#[derive(Debug, Clone)]
pub struct AttributeBuff {
    pub attribute: Attribute,
    pub modifier_type: ModifierType,
    /// Parameter holding the starting bonus
    pub bonus_key: String,
    /// Starting bonus when the parameter is absent
    pub default_bonus: f64,
    pub default_growth_rate: f64,
    pub default_refresh_bonus: f64,
}

impl AttributeBuff {
    pub fn new(attribute: Attribute, modifier_type: ModifierType) -> Self {
        AttributeBuff {
            attribute,
            modifier_type,
            bonus_key: "baseBonus".to_string(),
            default_bonus: 0.0,
            default_growth_rate: 0.0,
            default_refresh_bonus: 0.0,
        }
    }

    /// Read the starting bonus from a different parameter
    pub fn with_bonus(mut self, key: &str, default_bonus: f64) -> Self {
        self.bonus_key = key.to_string();
        self.default_bonus = default_bonus;
        self
    }

    pub fn with_growth(mut self, rate: f64) -> Self {
        self.default_growth_rate = rate;
        self
    }

    pub fn with_refresh_bonus(mut self, bonus: f64) -> Self {
        self.default_refresh_bonus = bonus;
        self
    }

    fn variable_name(&self) -> String {
        format!("{}Bonus", self.attribute.as_str().to_lowercase())
    }

    fn base_bonus(&self, ctx: &BuffContext<'_>) -> f64 {
        ctx.param_f64(&self.bonus_key, self.default_bonus)
    }

    fn current_bonus(&self, ctx: &BuffContext<'_>) -> f64 {
        ctx.number(&self.variable_name())
            .unwrap_or_else(|| self.base_bonus(ctx))
    }

    fn apply_bonus(&self, ctx: &mut BuffContext<'_>, bonus: f64) {
        ctx.set_modifier(self.attribute, bonus, self.modifier_type);
        ctx.set_variable(&self.variable_name(), bonus);
    }
}

impl BuffScript for AttributeBuff {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = self.base_bonus(ctx);
        if !bonus.is_finite() {
            return Err(ScriptError::InvalidParameter {
                key: self.bonus_key.clone(),
                reason: "not a finite number".to_string(),
            });
        }
        self.apply_bonus(ctx, bonus);
        ctx.log(&format!("{} +{}", self.attribute, bonus));
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta: Millis) -> HookResult {
        let growth_rate = ctx.param_f64("growthRate", self.default_growth_rate);
        if growth_rate <= 0.0 || !crossed_whole_second(ctx.elapsed_time(), delta) {
            return Ok(());
        }

        let current = self.current_bonus(ctx);
        let grown = (current * (1.0 + growth_rate)).floor();
        if grown > current {
            self.apply_bonus(ctx, grown);
            ctx.log(&format!("{} grew to {}", self.attribute, grown));
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let refresh_bonus = ctx.param_f64("refreshBonus", self.default_refresh_bonus);
        if refresh_bonus <= 0.0 {
            ctx.log("refreshed");
            return Ok(());
        }

        let bonus = self.current_bonus(ctx) + refresh_bonus;
        self.apply_bonus(ctx, bonus);
        ctx.log(&format!("{} raised to {}", self.attribute, bonus));
        Ok(())
    }
}

/// Fixed attribute bonus read from the `bonus` parameter
#[derive(Debug, Clone)]
pub struct BonusBuff {
    pub attribute: Attribute,
    pub modifier_type: ModifierType,
    pub default_bonus: f64,
}

impl BonusBuff {
    pub fn new(attribute: Attribute, modifier_type: ModifierType, default_bonus: f64) -> Self {
        BonusBuff {
            attribute,
            modifier_type,
            default_bonus,
        }
    }

    fn current_bonus(&self, ctx: &BuffContext<'_>) -> f64 {
        ctx.number("baseBonus").unwrap_or(self.default_bonus)
    }
}

impl BuffScript for BonusBuff {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let bonus = ctx.param_f64("bonus", self.default_bonus);
        ctx.add_modifier(self.attribute, bonus, self.modifier_type);
        ctx.set_variable("baseBonus", bonus);
        Ok(())
    }

    fn on_update(&self, ctx: &mut BuffContext<'_>, delta: Millis) -> HookResult {
        let growth_rate = ctx.param_f64("growthRate", 0.0);
        if growth_rate <= 0.0 || !crossed_whole_second(ctx.elapsed_time(), delta) {
            return Ok(());
        }

        let current = self.current_bonus(ctx);
        let grown = (current * (1.0 + growth_rate)).floor();
        if grown > current {
            ctx.set_modifier(self.attribute, grown, self.modifier_type);
            ctx.set_variable("baseBonus", grown);
        }
        Ok(())
    }

    fn on_refresh(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        let refresh_bonus = ctx.param_f64("refreshBonus", self.default_bonus * 0.1);
        let bonus = self.current_bonus(ctx) + refresh_bonus;
        ctx.set_modifier(self.attribute, bonus, self.modifier_type);
        ctx.set_variable("baseBonus", bonus);
        ctx.log(&format!("{} bonus now {}", self.attribute, bonus));
        Ok(())
    }
}
