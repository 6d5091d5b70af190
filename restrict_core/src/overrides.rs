use std::collections::HashMap;

use restrict_runtime::{RuleKind, WeaponId};

use crate::rules::WeaponRule;

/// State of one half of a weapon rule after administrative changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverrideValue<T> {
    Set(T),
    /// Masks whatever the configuration says for this half.
    Removed,
}

impl<T: Copy> OverrideValue<T> {
    fn value(self) -> Option<T> {
        match self {
            OverrideValue::Set(value) => Some(value),
            OverrideValue::Removed => None,
        }
    }
}

/// Overrides for a single weapon; `None` halves inherit from the map config.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeaponOverride {
    pub quota: Option<OverrideValue<f64>>,
    pub limit: Option<OverrideValue<u32>>,
}

impl WeaponOverride {
    /// Layer this override on top of the configured rule.
    pub fn apply(&self, configured: Option<&WeaponRule>) -> WeaponRule {
        let base = configured.copied().unwrap_or_default();
        WeaponRule {
            quota: self.quota.map_or(base.quota, OverrideValue::value),
            limit: self.limit.map_or(base.limit, OverrideValue::value),
        }
    }
}

/// Runtime quota/limit changes made by administrators.
///
/// Nothing here survives a map load; the engine empties the store whenever it
/// re-resolves the map config.
#[derive(Debug, Clone, Default)]
pub struct LiveOverrideStore {
    entries: HashMap<WeaponId, WeaponOverride>,
}

impl LiveOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_quota(&mut self, weapon: WeaponId, quota: f64) {
        self.entries.entry(weapon).or_default().quota = Some(OverrideValue::Set(quota));
    }

    pub fn set_limit(&mut self, weapon: WeaponId, limit: u32) {
        self.entries.entry(weapon).or_default().limit = Some(OverrideValue::Set(limit));
    }

    /// Drop one half of the rule for this weapon, masking the config.
    pub fn remove(&mut self, weapon: WeaponId, kind: RuleKind) {
        let entry = self.entries.entry(weapon).or_default();
        match kind {
            RuleKind::Quota => entry.quota = Some(OverrideValue::Removed),
            RuleKind::Limit => entry.limit = Some(OverrideValue::Removed),
        }
    }

    /// Fully unrestrict the weapon until the next map load.
    pub fn clear(&mut self, weapon: WeaponId) {
        self.entries.insert(
            weapon,
            WeaponOverride {
                quota: Some(OverrideValue::Removed),
                limit: Some(OverrideValue::Removed),
            },
        );
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Weapons with at least one override in place.
    pub fn weapons(&self) -> impl Iterator<Item = &WeaponId> {
        self.entries.keys()
    }

    pub fn contains(&self, weapon: &str) -> bool {
        self.entries.contains_key(weapon)
    }

    /// Rule in force for `weapon`, or `None` when it is unrestricted.
    pub fn effective_rule(
        &self,
        weapon: &str,
        configured: Option<&WeaponRule>,
    ) -> Option<WeaponRule> {
        let rule = match self.entries.get(weapon) {
            Some(entry) => entry.apply(configured),
            None => configured.copied()?,
        };
        (!rule.is_unconstrained()).then_some(rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
