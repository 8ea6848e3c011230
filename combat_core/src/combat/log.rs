//! Calculation log entries

use crate::types::Attribute;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    Damage,
    Heal,
}

/// One resolved scaling term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraValueLog {
    pub attribute: Attribute,
    pub ratio: f64,
    /// Source attribute value at calculation time
    pub attribute_value: f64,
    pub contribution: f64,
}

/// Record of one damage or heal calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationLog {
    /// Wall-clock milliseconds since the Unix epoch
    pub timestamp: u64,
    pub step_type: StepType,
    pub source_id: String,
    pub target_id: String,
    pub skill_id: Option<String>,
    pub base_value: f64,
    pub extra_values: Vec<ExtraValueLog>,
    pub final_value: u32,
    /// Damage only
    pub critical: Option<bool>,
    /// Damage only
    pub is_miss: bool,
    /// Target modifiers that were applied
    pub modifiers: Option<BTreeMap<Attribute, f64>>,
}

impl CalculationLog {
    pub fn new(step_type: StepType, source_id: &str, target_id: &str) -> Self {
        CalculationLog {
            timestamp: timestamp_millis(),
            step_type,
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            skill_id: None,
            base_value: 0.0,
            extra_values: Vec::new(),
            final_value: 0,
            critical: None,
            is_miss: false,
            modifiers: None,
        }
    }

    /// Sum of the scaling terms
    pub fn extra_total(&self) -> f64 {
        self.extra_values.iter().map(|e| e.contribution).sum()
    }
}

fn timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
