//! Defense mitigation - flat percentage reduction from DEF and MDEF

use super::step::AttackType;

/// Percent reduction per point of DEF against physical hits
pub const PHYSICAL_COEFFICIENT: f64 = 1.0;
/// Percent reduction per point of MDEF against magic hits
pub const MAGIC_COEFFICIENT: f64 = 1.0;
/// Percent reduction per point of combined DEF + MDEF against normal hits
pub const NORMAL_COEFFICIENT: f64 = 0.5;

/// Unclamped reduction fraction for an attack type
pub fn raw_mitigation(attack_type: AttackType, def: f64, mdef: f64) -> f64 {
    match attack_type {
        AttackType::True => 0.0,
        AttackType::Physical => def * PHYSICAL_COEFFICIENT / 100.0,
        AttackType::Magic => mdef * MAGIC_COEFFICIENT / 100.0,
        AttackType::Normal => (def + mdef) * NORMAL_COEFFICIENT / 100.0,
    }
}

/// Reduction fraction clamped to `[0, max_mitigation]`
///
/// `max_mitigation` is itself kept below 1 so some damage always gets through.
pub fn mitigation(attack_type: AttackType, def: f64, mdef: f64, max_mitigation: f64) -> f64 {
    let cap = max_mitigation.max(0.0).min(0.99);
    raw_mitigation(attack_type, def, mdef).max(0.0).min(cap)
}

/// Damage left after mitigation
pub fn apply_mitigation(damage: f64, mitigation: f64) -> f64 {
    damage * (1.0 - mitigation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_blends_both_defenses() {
        let m = mitigation(AttackType::Normal, 16.0, 8.0, 0.9);
        assert!((m - 0.12).abs() < 0.0001);
        assert!((apply_mitigation(50.0, m) - 44.0).abs() < 0.0001);
    }

    #[test]
    fn test_attack_types() {
        assert!((mitigation(AttackType::Physical, 30.0, 80.0, 0.9) - 0.3).abs() < 0.0001);
        assert!((mitigation(AttackType::Magic, 30.0, 80.0, 0.9) - 0.8).abs() < 0.0001);
        assert_eq!(mitigation(AttackType::True, 500.0, 500.0, 0.9), 0.0);
    }

    #[test]
    fn test_clamped() {
        assert!((mitigation(AttackType::Physical, 500.0, 0.0, 0.9) - 0.9).abs() < 0.0001);
        // Negative defense never amplifies damage
        assert_eq!(mitigation(AttackType::Physical, -40.0, 0.0, 0.9), 0.0);
        // A cap of 1 or more is pulled back below 1
        assert!(mitigation(AttackType::Physical, 500.0, 0.0, 1.5) < 1.0);
    }
}
