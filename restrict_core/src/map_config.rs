//! Selection of the rule set that applies to the current map.
//!
//! Keys are tried as exact map names first, then as anchored regular
//! expressions in the order the configuration declares them. When several
//! patterns match, the first one wins and the overlap is logged.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::rules::RuleSet;

/// Where the resolved rule set came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSetSource {
    Exact(String),
    Wildcard { key: String, ambiguous: bool },
    Default,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub rules: Arc<RuleSet>,
    pub source: RuleSetSource,
}

impl Resolution {
    pub fn is_default(&self) -> bool {
        matches!(self.source, RuleSetSource::Default)
    }
}

#[derive(Debug)]
struct MapRuleSetEntry {
    key: String,
    pattern: Option<Regex>,
    rules: Arc<RuleSet>,
}

#[derive(Debug, Default)]
pub struct MapConfigResolver {
    default: Arc<RuleSet>,
    entries: Vec<MapRuleSetEntry>,
    exact: HashMap<String, usize>,
}

impl MapConfigResolver {
    /// `map_rules` must be in declared order; pattern ties are broken by it.
    pub fn new<I>(default: RuleSet, map_rules: I) -> Self
    where
        I: IntoIterator<Item = (String, RuleSet)>,
    {
        let mut resolver = Self {
            default: Arc::new(default),
            entries: Vec::new(),
            exact: HashMap::new(),
        };
        for (key, rules) in map_rules {
            resolver.push(key, rules);
        }
        resolver
    }

    fn push(&mut self, key: String, rules: RuleSet) {
        let pattern = match Regex::new(&format!("^(?:{key})$")) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                tracing::warn!(
                    target: "weapon_restrict::config",
                    key = %key,
                    error = %err,
                    "map_config.invalid_pattern"
                );
                None
            }
        };
        let index = self.entries.len();
        // First declaration wins for duplicate keys.
        self.exact.entry(key.clone()).or_insert(index);
        self.entries.push(MapRuleSetEntry {
            key,
            pattern,
            rules: Arc::new(rules),
        });
    }

    pub fn default_rules(&self) -> &Arc<RuleSet> {
        &self.default
    }

    /// Every configured rule set, the default first.
    pub fn rule_sets(&self) -> impl Iterator<Item = &RuleSet> {
        std::iter::once(self.default.as_ref())
            .chain(self.entries.iter().map(|entry| entry.rules.as_ref()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// Returns `None` when the map name is not known yet; callers keep
    /// whatever rules they already had.
    pub fn resolve(&self, map_name: Option<&str>) -> Option<Resolution> {
        let map_name = map_name.filter(|name| !name.is_empty())?;

        if let Some(&index) = self.exact.get(map_name) {
            let entry = &self.entries[index];
            return Some(Resolution {
                rules: Arc::clone(&entry.rules),
                source: RuleSetSource::Exact(entry.key.clone()),
            });
        }

        let mut matches = self.entries.iter().filter(|entry| {
            entry
                .pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(map_name))
        });

        let Some(first) = matches.next() else {
            return Some(Resolution {
                rules: Arc::clone(&self.default),
                source: RuleSetSource::Default,
            });
        };

        let others: Vec<&str> = matches.map(|entry| entry.key.as_str()).collect();
        let ambiguous = !others.is_empty();
        if ambiguous {
            tracing::warn!(
                target: "weapon_restrict::config",
                map = %map_name,
                chosen = %first.key,
                ignored = ?others,
                "map_config.ambiguous_wildcard"
            );
        }

        Some(Resolution {
            rules: Arc::clone(&first.rules),
            source: RuleSetSource::Wildcard {
                key: first.key.clone(),
                ambiguous,
            },
        })
    }
}
