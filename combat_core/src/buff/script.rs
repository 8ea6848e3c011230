//! BuffScript - The behaviour behind a buff

use super::context::BuffContext;
use crate::types::Millis;
use thiserror::Error;

/// Failure inside a script hook. The buff system logs it and skips the trigger.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("character {0} is no longer in the battle")]
    MissingCharacter(String),
    #[error("invalid parameter {key}: {reason}")]
    InvalidParameter { key: String, reason: String },
    #[error("{0}")]
    Failed(String),
}

pub type HookResult = Result<(), ScriptError>;

/// Lifecycle hooks for a buff
///
/// Scripts hold only their configuration knobs; anything that changes while the
/// buff is active lives in the context's variables.
pub trait BuffScript: Send + Sync {
    /// Called exactly once when the instance is created
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult;

    /// Called once when the instance leaves the active state.
    ///
    /// Modifiers owned by the instance are removed by the buff system after
    /// this returns, whether or not it succeeded.
    fn on_remove(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        ctx.log("removed");
        Ok(())
    }

    /// Called on every update while active; `delta` is the time just advanced
    fn on_update(&self, _ctx: &mut BuffContext<'_>, _delta: Millis) -> HookResult {
        Ok(())
    }

    /// Called when the same buff is re-applied to an active instance
    fn on_refresh(&self, _ctx: &mut BuffContext<'_>) -> HookResult {
        Ok(())
    }
}

/// Whether advancing to `elapsed` by `delta` crossed a multiple of `interval`
///
/// `floor(elapsed / interval) > floor((elapsed - delta) / interval)`
pub fn crossed_interval(elapsed: Millis, delta: Millis, interval: Millis) -> bool {
    if interval == 0 || delta == 0 {
        return false;
    }
    elapsed / interval > elapsed.saturating_sub(delta) / interval
}

/// Whether the last update crossed a whole second
pub fn crossed_whole_second(elapsed: Millis, delta: Millis) -> bool {
    crossed_interval(elapsed, delta, 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossed_whole_second() {
        assert!(!crossed_whole_second(500, 500));
        assert!(crossed_whole_second(1000, 500));
        assert!(crossed_whole_second(1200, 400));
        assert!(!crossed_whole_second(1900, 800));
        // Large steps cross once per call
        assert!(crossed_whole_second(3500, 3000));
    }

    #[test]
    fn test_zero_delta_never_crosses() {
        assert!(!crossed_whole_second(1000, 0));
        assert!(!crossed_whole_second(0, 0));
    }

    #[test]
    fn test_custom_interval() {
        assert!(crossed_interval(2000, 100, 2000));
        assert!(!crossed_interval(1999, 100, 2000));
        assert!(!crossed_interval(2000, 100, 0));
    }
}
