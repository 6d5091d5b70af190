//! Quota and limit arithmetic for a single acquisition attempt.

use std::fmt;

use restrict_runtime::{ActorSnapshot, WeaponId};

use crate::overrides::LiveOverrideStore;
use crate::rules::{RestrictedSet, RuleSet, WeaponRule};

/// Decision for one acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NotRestricted,
    /// The configured quota or limit is a literal zero.
    Disabled,
    /// The team already holds `limit` or more copies.
    LimitReached { limit: u32 },
}

impl Verdict {
    pub fn is_restricted(&self) -> bool {
        !matches!(self, Verdict::NotRestricted)
    }

    /// Limit to show the player; `Disabled` reports zero.
    pub fn effective_limit(&self) -> Option<u32> {
        match self {
            Verdict::NotRestricted => None,
            Verdict::Disabled => Some(0),
            Verdict::LimitReached { limit } => Some(*limit),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::NotRestricted => f.write_str("not_restricted"),
            Verdict::Disabled => f.write_str("disabled"),
            Verdict::LimitReached { limit } => write!(f, "limit_reached({limit})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterOptions {
    /// Only players on the acquiring actor's team take part.
    pub team_check: bool,
    /// Weapons held by exempt players are left out of the tally.
    pub vip_exemption: bool,
}

impl Default for RosterOptions {
    fn default() -> Self {
        Self {
            team_check: true,
            vip_exemption: true,
        }
    }
}

/// Players that count toward a restriction for one attempt.
///
/// Every connected player (on the actor's team, when team checks are on)
/// counts toward the quota denominator. Only alive, non-exempt members
/// contribute held weapons to the tally.
#[derive(Debug)]
pub struct Roster<'a> {
    members: Vec<&'a ActorSnapshot>,
    vip_exemption: bool,
}

impl<'a> Roster<'a> {
    pub fn for_actor(
        actor: &ActorSnapshot,
        players: &'a [ActorSnapshot],
        options: RosterOptions,
    ) -> Self {
        let members = players
            .iter()
            .filter(|player| player.is_connected)
            .filter(|player| !options.team_check || player.team == actor.team)
            .collect();
        Self {
            members,
            vip_exemption: options.vip_exemption,
        }
    }

    pub fn eligible_count(&self) -> usize {
        self.members.len()
    }

    /// Copies of `weapon` held across the roster.
    pub fn count_held(&self, weapon: &WeaponId) -> usize {
        self.members
            .iter()
            .filter(|member| member.is_alive)
            .filter(|member| !(self.vip_exemption && member.has_exempt_permission))
            .map(|member| member.copies_of(weapon))
            .sum()
    }
}

/// Borrowed view of the engine state a verdict depends on.
#[derive(Debug, Clone, Copy)]
pub struct RestrictionEvaluator<'a> {
    restricted: &'a RestrictedSet,
    rules: &'a RuleSet,
    overrides: &'a LiveOverrideStore,
}

impl<'a> RestrictionEvaluator<'a> {
    pub fn new(
        restricted: &'a RestrictedSet,
        rules: &'a RuleSet,
        overrides: &'a LiveOverrideStore,
    ) -> Self {
        Self {
            restricted,
            rules,
            overrides,
        }
    }

    pub fn is_restricted_weapon(&self, weapon: &WeaponId) -> bool {
        self.restricted.contains(weapon.as_str())
    }

    /// Rule in force for `weapon` on the current map, overrides applied.
    pub fn rule_for(&self, weapon: &WeaponId) -> Option<WeaponRule> {
        self.overrides
            .effective_rule(weapon.as_str(), self.rules.get(weapon.as_str()))
    }

    pub fn evaluate(
        &self,
        weapon: &WeaponId,
        actor: &ActorSnapshot,
        players: &[ActorSnapshot],
        options: RosterOptions,
    ) -> Verdict {
        if !self.is_restricted_weapon(weapon) {
            return Verdict::NotRestricted;
        }
        let Some(rule) = self.rule_for(weapon) else {
            return Verdict::NotRestricted;
        };
        if rule.is_disabled() {
            return Verdict::Disabled;
        }

        let roster = Roster::for_actor(actor, players, options);
        let Some(limit) = rule.effective_limit(roster.eligible_count()) else {
            return Verdict::NotRestricted;
        };
        let held = roster.count_held(weapon);
        if held >= limit as usize {
            Verdict::LimitReached { limit }
        } else {
            Verdict::NotRestricted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u8 = 2;
    const CT: u8 = 3;

    fn awp() -> WeaponId {
        WeaponId::new("weapon_awp")
    }

    fn team(size: u64, side: u8, holders: u64) -> Vec<ActorSnapshot> {
        (0..size)
            .map(|index| {
                let actor = ActorSnapshot::new(side as u64 * 100 + index, side);
                if index < holders {
                    actor.holding("weapon_awp")
                } else {
                    actor
                }
            })
            .collect()
    }

    fn verdict(rules: &RuleSet, overrides: &LiveOverrideStore, players: &[ActorSnapshot]) -> Verdict {
        let restricted = RestrictedSet::from_rule_sets([rules]);
        let actor = ActorSnapshot::new(999, T);
        RestrictionEvaluator::new(&restricted, rules, overrides).evaluate(
            &awp(),
            &actor,
            players,
            RosterOptions::default(),
        )
    }

    #[test]
    fn unlisted_weapon_is_never_restricted() {
        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::limit(0));
        let restricted = RestrictedSet::from_rule_sets([&rules]);
        let overrides = LiveOverrideStore::new();
        let players = team(10, T, 10);
        let evaluator = RestrictionEvaluator::new(&restricted, &rules, &overrides);
        let actor = ActorSnapshot::new(1, T);
        let verdict = evaluator.evaluate(
            &WeaponId::new("weapon_ak47"),
            &actor,
            &players,
            RosterOptions::default(),
        );
        assert_eq!(verdict, Verdict::NotRestricted);
    }

    #[test]
    fn quota_uses_truncated_roster_share() {
        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::quota(0.2));
        let overrides = LiveOverrideStore::new();
        assert_eq!(verdict(&rules, &overrides, &team(10, T, 1)), Verdict::NotRestricted);
        assert_eq!(
            verdict(&rules, &overrides, &team(10, T, 2)),
            Verdict::LimitReached { limit: 2 }
        );

        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::quota(0.25));
        assert_eq!(
            verdict(&rules, &overrides, &team(9, T, 2)),
            Verdict::LimitReached { limit: 2 }
        );
    }

    #[test]
    fn zero_disables_even_when_other_half_is_loose() {
        let overrides = LiveOverrideStore::new();
        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::quota(0.0).with_limit(10));
        assert_eq!(verdict(&rules, &overrides, &team(10, T, 0)), Verdict::Disabled);
        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::quota(1.0).with_limit(0));
        assert_eq!(verdict(&rules, &overrides, &team(10, T, 0)), Verdict::Disabled);
    }

    #[test]
    fn truncated_quota_is_a_zero_cap_not_disabled() {
        let overrides = LiveOverrideStore::new();
        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::quota(0.2).with_limit(1));
        assert_eq!(
            verdict(&rules, &overrides, &team(4, T, 0)),
            Verdict::LimitReached { limit: 0 }
        );
    }

    #[test]
    fn team_check_filters_other_side() {
        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::limit(1));
        let restricted = RestrictedSet::from_rule_sets([&rules]);
        let overrides = LiveOverrideStore::new();
        let mut players = team(5, T, 0);
        players.extend(team(5, CT, 1));
        let actor = players[0].clone();
        let evaluator = RestrictionEvaluator::new(&restricted, &rules, &overrides);

        let with_team_check = evaluator.evaluate(&awp(), &actor, &players, RosterOptions::default());
        assert_eq!(with_team_check, Verdict::NotRestricted);

        let without = evaluator.evaluate(
            &awp(),
            &actor,
            &players,
            RosterOptions {
                team_check: false,
                vip_exemption: true,
            },
        );
        assert_eq!(without, Verdict::LimitReached { limit: 1 });
    }

    #[test]
    fn dead_disconnected_and_vip_holders_are_not_tallied() {
        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::limit(1));
        let overrides = LiveOverrideStore::new();
        let players = vec![
            ActorSnapshot::new(1, T).holding("weapon_awp").dead(),
            ActorSnapshot::new(2, T).holding("weapon_awp").disconnected(),
            ActorSnapshot::new(3, T).holding("weapon_awp").exempt(),
            ActorSnapshot::new(4, T),
        ];
        assert_eq!(verdict(&rules, &overrides, &players), Verdict::NotRestricted);
    }

    #[test]
    fn roster_denominator_counts_dead_and_exempt_players() {
        let players = vec![
            ActorSnapshot::new(1, T).dead(),
            ActorSnapshot::new(2, T).exempt(),
            ActorSnapshot::new(3, T).disconnected(),
            ActorSnapshot::new(4, T),
            ActorSnapshot::new(5, CT),
        ];
        let actor = ActorSnapshot::new(4, T);
        let roster = Roster::for_actor(&actor, &players, RosterOptions::default());
        assert_eq!(roster.eligible_count(), 3);
    }

    #[test]
    fn vip_tally_can_be_switched_off() {
        let players = vec![ActorSnapshot::new(1, T).holding("weapon_awp").exempt()];
        let actor = ActorSnapshot::new(2, T);
        let options = RosterOptions {
            team_check: true,
            vip_exemption: false,
        };
        let roster = Roster::for_actor(&actor, &players, options);
        assert_eq!(roster.count_held(&awp()), 1);
    }

    #[test]
    fn override_changes_verdict_immediately() {
        let rules = RuleSet::new().with_rule("weapon_awp", WeaponRule::limit(1));
        let mut overrides = LiveOverrideStore::new();
        let players = team(10, T, 1);
        assert_eq!(
            verdict(&rules, &overrides, &players),
            Verdict::LimitReached { limit: 1 }
        );
        overrides.set_limit(awp(), 2);
        assert_eq!(verdict(&rules, &overrides, &players), Verdict::NotRestricted);
        overrides.clear(awp());
        assert_eq!(verdict(&rules, &overrides, &team(10, T, 10)), Verdict::NotRestricted);
    }

    #[test]
    fn restricted_elsewhere_but_not_on_this_map() {
        let default = RuleSet::new().with_rule("weapon_awp", WeaponRule::limit(0));
        let active = RuleSet::new();
        let restricted = RestrictedSet::from_rule_sets([&default, &active]);
        let overrides = LiveOverrideStore::new();
        let evaluator = RestrictionEvaluator::new(&restricted, &active, &overrides);
        let actor = ActorSnapshot::new(1, T);
        assert!(evaluator.is_restricted_weapon(&awp()));
        assert_eq!(
            evaluator.evaluate(&awp(), &actor, &[], RosterOptions::default()),
            Verdict::NotRestricted
        );
    }

    #[test]
    fn verdict_reports_effective_limit() {
        assert_eq!(Verdict::Disabled.effective_limit(), Some(0));
        assert_eq!(Verdict::LimitReached { limit: 3 }.effective_limit(), Some(3));
        assert_eq!(Verdict::NotRestricted.effective_limit(), None);
        assert_eq!(Verdict::LimitReached { limit: 3 }.to_string(), "limit_reached(3)");
    }
}
