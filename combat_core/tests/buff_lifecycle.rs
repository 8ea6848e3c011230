use combat_core::prelude::*;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn roster() -> Roster {
    let mut roster = Roster::new();
    roster.insert(
        Character::new("hero", "Hero", 1000.0)
            .with_base(Attribute::Atk, 100.0)
            .with_base(Attribute::Def, 40.0),
    );
    roster
}

/// Counts hook calls and holds one ATK modifier while active
struct Counting {
    removed: Arc<AtomicUsize>,
}

impl BuffScript for Counting {
    fn on_apply(&self, ctx: &mut BuffContext<'_>) -> HookResult {
        ctx.add_modifier(Attribute::Atk, 25.0, ModifierType::Additive);
        Ok(())
    }

    fn on_remove(&self, _ctx: &mut BuffContext<'_>) -> HookResult {
        self.removed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn counting_system() -> (BuffSystem, Arc<AtomicUsize>) {
    let removed = Arc::new(AtomicUsize::new(0));
    let mut scripts = ScriptRegistry::new();
    scripts.register(
        "counted",
        Counting {
            removed: Arc::clone(&removed),
        },
    );
    (BuffSystem::new(scripts), removed)
}

#[test]
fn short_buff_is_gone_after_enough_updates() {
    let roster = roster();
    let (mut system, removed) = counting_system();
    system
        .add_buff(&roster, "hero", "counted", BuffConfig::new("counted", "Counted", 100))
        .unwrap();

    system.update(&roster, 50);
    assert_eq!(system.buff_instances("hero").len(), 1);

    system.update(&roster, 100);
    assert!(system.buff_instances("hero").is_empty());
    assert_eq!(removed.load(Ordering::SeqCst), 1);
}

#[test]
fn removing_twice_runs_on_remove_once() {
    let roster = roster();
    let (mut system, removed) = counting_system();
    let id = system
        .add_buff(&roster, "hero", "counted", BuffConfig::new("counted", "Counted", 5000))
        .unwrap();

    assert!(system.remove_buff(&roster, &id));
    assert!(!system.remove_buff(&roster, &id));
    assert_eq!(removed.load(Ordering::SeqCst), 1);

    // Expiry never resurrects or re-removes it
    system.update(&roster, 10_000);
    assert_eq!(removed.load(Ordering::SeqCst), 1);
}

#[test]
fn buffs_on_the_same_attribute_do_not_clobber_each_other() {
    let roster = roster();
    let mut system = BuffSystem::default();
    let hero = roster.get("hero").unwrap();

    let atk_up = system
        .add_buff(
            &roster,
            "hero",
            "buff_atk_up",
            BuffConfig::new("buff_atk_up", "Attack Up", 5000).with_param("stackBonus", 30),
        )
        .unwrap();
    system
        .add_buff(&roster, "hero", "berserk", BuffConfig::new("berserk", "Berserk", 5000))
        .unwrap();
    // 100 + 30 + 100
    assert!((system.attribute_value(hero, Attribute::Atk) - 230.0).abs() < 0.01);

    // Re-applying and refreshing the attack buff replaces only its own modifier
    let refreshed = BuffConfig::new("buff_atk_up", "Attack Up", 5000)
        .with_param("stackBonus", 30)
        .with_param("refreshBonus", 10);
    system.remove_buff(&roster, &atk_up);
    let atk_up = system.add_buff(&roster, "hero", "buff_atk_up", refreshed).unwrap();
    assert!(system.refresh_buff(&roster, &atk_up));
    assert!((system.attribute_value(hero, Attribute::Atk) - 240.0).abs() < 0.01);

    // Berserk's DEF penalty is untouched
    assert!((system.attribute_value(hero, Attribute::Def) - 28.0).abs() < 0.01);
}

#[test]
fn attribute_buff_grows_each_second() {
    let roster = roster();
    let mut system = BuffSystem::default();
    let hero = roster.get("hero").unwrap();
    let config = BuffConfig::new("buff_atk_up", "Attack Up", 10_000)
        .with_param("stackBonus", 10)
        .with_param("growthRate", 0.5);
    system.add_buff(&roster, "hero", "buff_atk_up", config).unwrap();

    system.update(&roster, 500);
    assert!((system.attribute_value(hero, Attribute::Atk) - 110.0).abs() < 0.01);

    system.update(&roster, 500);
    // floor(10 * 1.5)
    assert!((system.attribute_value(hero, Attribute::Atk) - 115.0).abs() < 0.01);

    system.update(&roster, 1000);
    // floor(15 * 1.5)
    assert!((system.attribute_value(hero, Attribute::Atk) - 122.0).abs() < 0.01);
}

#[test]
fn stun_blocks_actions_until_it_expires() {
    let roster = roster();
    let mut system = BuffSystem::default();
    let stun = BuffConfig::new("buff_stun", "Stun", 1500)
        .as_debuff()
        .with_control(ControlType::Stun, 10);
    let id = system.add_buff(&roster, "hero", "buff_stun", stun).unwrap();

    assert!(!system.can_act("hero"));
    assert_eq!(
        system.instance(&id).unwrap().variables().flag("isStunned"),
        Some(true)
    );

    system.update(&roster, 1500);
    assert!(system.can_act("hero"));
    assert!(system.can_use_skill("hero"));
}

#[test]
fn heal_over_time_reports_ticks() {
    let roster = roster();
    let mut system = BuffSystem::default();
    let config = BuffConfig::new("heal_over_time", "Regrowth", 3000).with_param("healingBonus", 5);
    system.add_buff(&roster, "hero", "heal_over_time", config).unwrap();

    let mut healed = 0.0;
    for _ in 0..3 {
        healed += system.update(&roster, 1000).total("hero", EffectKind::Heal);
    }
    assert!((healed - 75.0).abs() < 0.01);
}

proptest! {
    #[test]
    fn finite_buffs_always_expire(
        duration in 0i64..5000,
        steps in prop::collection::vec(1u64..700, 1..40),
    ) {
        let roster = roster();
        let mut system = BuffSystem::default();
        let hero = roster.get("hero").unwrap();
        let config = BuffConfig::new("buff_atk_up", "Attack Up", duration)
            .with_param("growthRate", 0.1);
        system.add_buff(&roster, "hero", "buff_atk_up", config).unwrap();

        let mut elapsed = 0u64;
        for delta in steps {
            system.update(&roster, delta);
            elapsed += delta;
        }

        if elapsed >= duration as u64 {
            prop_assert!(system.buff_instances("hero").is_empty());
            prop_assert_eq!(system.modifier_stack("hero").map_or(0, |s| s.modifier_count()), 0);
            prop_assert!((system.attribute_value(hero, Attribute::Atk) - 100.0).abs() < 1e-9);
        } else {
            prop_assert_eq!(system.buff_instances("hero").len(), 1);
        }
    }
}
