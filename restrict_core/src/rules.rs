use std::collections::{BTreeMap, HashSet};
use std::fmt;

use restrict_runtime::WeaponId;

/// Quota and limit configured for one weapon. Either half may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeaponRule {
    /// Fraction of eligible teammates allowed to hold the weapon.
    pub quota: Option<f64>,
    /// Absolute number of copies allowed per team.
    pub limit: Option<u32>,
}

impl WeaponRule {
    pub fn quota(quota: f64) -> Self {
        Self {
            quota: Some(quota),
            limit: None,
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            quota: None,
            limit: Some(limit),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// A literal zero in either half disables the weapon outright.
    pub fn is_disabled(&self) -> bool {
        self.quota == Some(0.0) || self.limit == Some(0)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.quota.is_none() && self.limit.is_none()
    }

    /// Copies allowed for a roster of `eligible` players; `None` means no cap.
    ///
    /// The quota cap truncates toward zero, so 9 players at 0.25 yield 2.
    pub fn effective_limit(&self, eligible: usize) -> Option<u32> {
        let quota_cap = self.quota.map(|quota| {
            if quota > 0.0 {
                (eligible as f64 * quota) as u32
            } else {
                0
            }
        });
        match (quota_cap, self.limit) {
            (Some(cap), Some(limit)) => Some(cap.min(limit)),
            (Some(cap), None) => Some(cap),
            (None, limit) => limit,
        }
    }
}

impl fmt::Display for WeaponRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.quota, self.limit) {
            (Some(quota), Some(limit)) => write!(f, "quota={quota} limit={limit}"),
            (Some(quota), None) => write!(f, "quota={quota}"),
            (None, Some(limit)) => write!(f, "limit={limit}"),
            (None, None) => f.write_str("unrestricted"),
        }
    }
}

/// Weapon rules that apply to one map (or to every map without its own entry).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    entries: BTreeMap<WeaponId, WeaponRule>,
}

impl RuleSet {
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Merge separate quota and limit tables into per-weapon rules.
    pub fn from_tables<'a, Q, L>(quotas: Q, limits: L) -> Self
    where
        Q: IntoIterator<Item = (&'a String, &'a f64)>,
        L: IntoIterator<Item = (&'a String, &'a u32)>,
    {
        let mut rules = Self::new();
        for (weapon, quota) in quotas {
            rules
                .entries
                .entry(WeaponId::new(weapon.as_str()))
                .or_default()
                .quota = Some(*quota);
        }
        for (weapon, limit) in limits {
            rules
                .entries
                .entry(WeaponId::new(weapon.as_str()))
                .or_default()
                .limit = Some(*limit);
        }
        rules
    }

    pub fn insert(&mut self, weapon: WeaponId, rule: WeaponRule) {
        self.entries.insert(weapon, rule);
    }

    pub fn with_rule(mut self, weapon: &str, rule: WeaponRule) -> Self {
        self.insert(WeaponId::new(weapon), rule);
        self
    }

    pub fn get(&self, weapon: &str) -> Option<&WeaponRule> {
        self.entries.get(weapon)
    }

    pub fn weapons(&self) -> impl Iterator<Item = &WeaponId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{")?;
        for (index, (weapon, rule)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{weapon}: {rule}")?;
        }
        f.write_str("}")
    }
}

/// Every weapon named by any configured rule set.
///
/// A weapon outside this set is never restricted, whatever map is active, so
/// callers can skip roster work for it.
#[derive(Debug, Clone, Default)]
pub struct RestrictedSet {
    weapons: HashSet<WeaponId>,
}

impl RestrictedSet {
    pub fn from_rule_sets<'a, I>(rule_sets: I) -> Self
    where
        I: IntoIterator<Item = &'a RuleSet>,
    {
        let weapons = rule_sets
            .into_iter()
            .flat_map(|rules| rules.weapons().cloned())
            .collect();
        Self { weapons }
    }

    pub fn contains(&self, weapon: &str) -> bool {
        self.weapons.contains(weapon)
    }

    /// Admit a weapon restricted at runtime by an administrator.
    pub fn insert(&mut self, weapon: WeaponId) -> bool {
        self.weapons.insert(weapon)
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}
