use restrict_core::{
    LiveOverrideStore, RestrictedSet, RestrictionEvaluator, RosterOptions, RuleSet, Verdict,
    WeaponRule,
};
use restrict_runtime::{ActorSnapshot, WeaponId};

fn squad(size: u64, awp_holders: u64) -> Vec<ActorSnapshot> {
    (0..size)
        .map(|id| {
            let actor = ActorSnapshot::new(id, 3);
            if id < awp_holders {
                actor.holding("weapon_awp")
            } else {
                actor
            }
        })
        .collect()
}

/// Weapons outside the restricted set are allowed for any roster, even one
/// where every player already carries several copies.
#[test]
fn unrestricted_weapon_ignores_roster_contents() {
    let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::limit(0));
    let restricted = RestrictedSet::from_rule_sets([&rules]);
    let overrides = LiveOverrideStore::new();
    let evaluator = RestrictionEvaluator::new(&restricted, &rules, &overrides);
    let deagle = WeaponId::new("weapon_deagle");

    for size in [0u64, 1, 5, 32] {
        let players: Vec<_> = (0..size)
            .map(|id| {
                ActorSnapshot::new(id, 3)
                    .holding("weapon_deagle")
                    .holding("weapon_deagle")
            })
            .collect();
        let actor = ActorSnapshot::new(1000, 3);
        for options in [
            RosterOptions::default(),
            RosterOptions {
                team_check: false,
                vip_exemption: false,
            },
        ] {
            assert_eq!(
                evaluator.evaluate(&deagle, &actor, &players, options),
                Verdict::NotRestricted,
                "roster of {size} should not restrict an unlisted weapon"
            );
        }
    }
}

#[test]
fn quota_caps_follow_truncation() {
    let overrides = LiveOverrideStore::new();
    let cases = [
        (10u64, 0.2, 2u32),
        (9, 0.25, 2),
        (4, 0.2, 0),
        (5, 0.2, 1),
        (20, 0.1, 2),
        (3, 1.0, 3),
    ];
    for (size, quota, expected) in cases {
        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::quota(quota));
        let restricted = RestrictedSet::from_rule_sets([&rules]);
        let evaluator = RestrictionEvaluator::new(&restricted, &rules, &overrides);
        let players = squad(size, u64::from(expected));
        let verdict = evaluator.evaluate(
            &WeaponId::new("weapon_awp"),
            &players[0],
            &players,
            RosterOptions::default(),
        );
        assert_eq!(
            verdict,
            Verdict::LimitReached { limit: expected },
            "{size} players at quota {quota}"
        );
    }
}

#[test]
fn disabled_dominates_looser_constraint() {
    let overrides = LiveOverrideStore::new();
    for rule in [
        WeaponRule::quota(0.0).with_limit(5),
        WeaponRule::quota(0.9).with_limit(0),
        WeaponRule::limit(0),
        WeaponRule::quota(0.0),
    ] {
        let rules = RuleSet::new().with_rule("weapon_awp", rule);
        let restricted = RestrictedSet::from_rule_sets([&rules]);
        let evaluator = RestrictionEvaluator::new(&restricted, &rules, &overrides);
        let players = squad(10, 0);
        let verdict = evaluator.evaluate(
            &WeaponId::new("weapon_awp"),
            &players[0],
            &players,
            RosterOptions::default(),
        );
        assert_eq!(verdict, Verdict::Disabled, "rule {rule}");
        assert_eq!(verdict.effective_limit(), Some(0));
    }
}
