//! Built-in buff scripts

mod attribute;
mod drifting;
mod over_time;
mod shield;
mod status;

pub use attribute::{AttributeBuff, BonusBuff};
pub use drifting::{BoundedEntry, Drift, DriftingModifier, Regen};
pub use over_time::{OverTimeEffect, RefreshMode};
pub use shield::{ShieldBuff, MAX_SHIELD_VALUE, SHIELD_VALUE};
pub use status::{KeyedModifier, Pulse, StatusEffectBundle};

use crate::types::{Attribute, ModifierType};
use serde::{Deserialize, Serialize};

/// One modifier a script applies for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub attribute: Attribute,
    pub value: f64,
    pub modifier_type: ModifierType,
}

impl ModifierSpec {
    pub fn new(attribute: Attribute, value: f64, modifier_type: ModifierType) -> Self {
        ModifierSpec {
            attribute,
            value,
            modifier_type,
        }
    }
}
