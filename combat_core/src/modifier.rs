//! ModifierStack - The three-tier modifier ledger (Additive + Percentage → Multiplicative)

use crate::types::{Attribute, ModifierType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single numeric contribution to one attribute, owned by one buff instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// Instance id of the buff that created this modifier
    pub owner: String,
    pub attribute: Attribute,
    pub value: f64,
    pub modifier_type: ModifierType,
}

/// Per-tier totals for one attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierBreakdown {
    pub base_value: f64,
    pub final_value: f64,
    /// Sum of additive values
    pub additive: f64,
    /// Sum of percentage values (as decimal)
    pub percentage: f64,
    /// Product of all `(1 + value)` multiplicative factors
    pub multiplicative: f64,
    pub modifiers: Vec<Modifier>,
}

/// Holds every active modifier for one character
///
/// Final value is calculated as:
/// `(base + Σadditive + base × Σpercentage) × Π(1 + multiplicative)`
///
/// Percentage modifiers always scale off the original base, and multiplicative
/// modifiers compound with each other rather than summing. The result does not
/// depend on insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifierStack {
    modifiers: BTreeMap<Attribute, Vec<Modifier>>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modifier. Duplicates are legal; nothing is merged.
    pub fn add_modifier(
        &mut self,
        owner: &str,
        attribute: Attribute,
        value: f64,
        modifier_type: ModifierType,
    ) {
        self.modifiers.entry(attribute).or_default().push(Modifier {
            owner: owner.to_string(),
            attribute,
            value,
            modifier_type,
        });
    }

    /// Remove every modifier owned by `owner`, across all attributes
    pub fn remove_modifier(&mut self, owner: &str) {
        self.retain(|m| m.owner != owner);
    }

    /// Remove `owner`'s modifiers on a single attribute
    pub fn remove_owned(&mut self, owner: &str, attribute: Attribute) {
        if let Some(stack) = self.modifiers.get_mut(&attribute) {
            stack.retain(|m| m.owner != owner);
            if stack.is_empty() {
                self.modifiers.remove(&attribute);
            }
        }
    }

    /// Remove every modifier on `attribute` regardless of owner.
    ///
    /// This clobbers other buffs' contributions to the same attribute; scripts
    /// should prefer [`ModifierStack::remove_owned`].
    pub fn remove_modifiers(&mut self, attribute: Attribute) {
        self.modifiers.remove(&attribute);
    }

    /// Modifiers on one attribute, or all modifiers when `attribute` is `None`
    pub fn modifiers(&self, attribute: Option<Attribute>) -> Vec<&Modifier> {
        match attribute {
            Some(attr) => self
                .modifiers
                .get(&attr)
                .map(|stack| stack.iter().collect())
                .unwrap_or_default(),
            None => self.modifiers.values().flatten().collect(),
        }
    }

    /// Calculate the final value of `attribute` from `base_value`. No rounding.
    pub fn calculate(&self, attribute: Attribute, base_value: f64) -> f64 {
        let Some(stack) = self.modifiers.get(&attribute) else {
            return base_value;
        };

        let (additive, percentage, multiplicative) = tier_totals(stack);
        let additive_sum = additive + base_value * percentage;
        (base_value + additive_sum) * multiplicative
    }

    /// Calculate with a per-tier breakdown, for logs and debugging views
    pub fn breakdown(&self, attribute: Attribute, base_value: f64) -> ModifierBreakdown {
        let stack = self.modifiers.get(&attribute).map(Vec::as_slice).unwrap_or(&[]);
        let (additive, percentage, multiplicative) = tier_totals(stack);

        ModifierBreakdown {
            base_value,
            final_value: self.calculate(attribute, base_value),
            additive,
            percentage,
            multiplicative,
            modifiers: stack.to_vec(),
        }
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.modifiers.clear();
    }

    /// Total number of modifier entries
    pub fn modifier_count(&self) -> usize {
        self.modifiers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    fn retain(&mut self, mut keep: impl FnMut(&Modifier) -> bool) {
        self.modifiers.retain(|_, stack| {
            stack.retain(|m| keep(m));
            !stack.is_empty()
        });
    }
}

/// Returns (Σadditive, Σpercentage, Π(1 + multiplicative))
fn tier_totals(stack: &[Modifier]) -> (f64, f64, f64) {
    let mut additive = 0.0;
    let mut percentage = 0.0;
    let mut multiplicative = 1.0;

    for modifier in stack {
        match modifier.modifier_type {
            ModifierType::Additive => additive += modifier.value,
            ModifierType::Percentage => percentage += modifier.value,
            ModifierType::Multiplicative => multiplicative *= 1.0 + modifier.value,
        }
    }

    (additive, percentage, multiplicative)
}
