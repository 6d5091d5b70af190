//! Configuration for weapon restrictions.
//!
//! Loaded from `weapon_restrict_config.json` with support for an environment
//! variable override.

use std::{
    collections::BTreeMap,
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::map_config::MapConfigResolver;
use crate::messages::MessageTemplates;
use crate::rules::RuleSet;

pub const BUILTIN_RESTRICT_CONFIG: &str = include_str!("data/weapon_restrict_config.json");

/// Configs older than this still load, with a notice.
pub const CONFIG_VERSION: u32 = 3;

/// Root configuration for the restriction engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RestrictConfig {
    pub config_version: u32,
    pub message_prefix: String,
    pub restrict_message: String,
    pub disabled_message: String,
    pub default_quotas: BTreeMap<String, f64>,
    pub default_limits: BTreeMap<String, u32>,
    /// Only count teammates of the acquiring actor.
    pub do_team_check: bool,
    /// Let anyone pick restricted weapons up once buy time is over.
    pub allow_pickup: bool,
    pub restrict_warmup: bool,
    /// Permission that exempts a player. Empty disables the exemption.
    pub vip_flag: String,
    pub message_cooldown_seconds: f64,
    /// Literal map names or anchored patterns, in declared order.
    pub map_configs: IndexMap<String, MapRuleConfig>,
}

impl Default for RestrictConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            message_prefix: "[WeaponRestrict] ".to_string(),
            restrict_message: "{weapon} is currently restricted to {limit} per team.".to_string(),
            disabled_message: "{weapon} is currently disabled.".to_string(),
            default_quotas: BTreeMap::from([("weapon_awp".to_string(), 0.2)]),
            default_limits: BTreeMap::from([("weapon_awp".to_string(), 1)]),
            do_team_check: true,
            allow_pickup: false,
            restrict_warmup: true,
            vip_flag: "@css/vip".to_string(),
            message_cooldown_seconds: 2.0,
            map_configs: IndexMap::new(),
        }
    }
}

/// Rule tables for one map key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MapRuleConfig {
    pub quotas: BTreeMap<String, f64>,
    pub limits: BTreeMap<String, u32>,
}

impl MapRuleConfig {
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::from_tables(&self.quotas, &self.limits)
    }
}

impl RestrictConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            Self::from_json_str(BUILTIN_RESTRICT_CONFIG)
                .expect("builtin restrict config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, RestrictConfigError> {
        let config: RestrictConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, RestrictConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| RestrictConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<(), RestrictConfigError> {
        let tables = std::iter::once(("default", &self.default_quotas)).chain(
            self.map_configs
                .iter()
                .map(|(key, map)| (key.as_str(), &map.quotas)),
        );
        for (scope, quotas) in tables {
            for (weapon, quota) in quotas {
                if !quota.is_finite() || *quota < 0.0 {
                    return Err(RestrictConfigError::InvalidQuota {
                        scope: scope.to_string(),
                        weapon: weapon.clone(),
                        quota: *quota,
                    });
                }
            }
        }
        if !self.message_cooldown_seconds.is_finite() {
            return Err(RestrictConfigError::InvalidCooldown(
                self.message_cooldown_seconds,
            ));
        }
        if self.config_version < CONFIG_VERSION {
            tracing::info!(
                target: "weapon_restrict::config",
                found = self.config_version,
                expected = CONFIG_VERSION,
                "restrict_config.outdated_version"
            );
        }
        Ok(())
    }

    pub fn default_rule_set(&self) -> RuleSet {
        RuleSet::from_tables(&self.default_quotas, &self.default_limits)
    }

    pub fn build_resolver(&self) -> MapConfigResolver {
        MapConfigResolver::new(
            self.default_rule_set(),
            self.map_configs
                .iter()
                .map(|(key, map)| (key.clone(), map.rule_set())),
        )
    }

    pub fn message_templates(&self) -> MessageTemplates {
        MessageTemplates::new(
            &self.message_prefix,
            &self.restrict_message,
            &self.disabled_message,
        )
    }

    pub fn vip_exemption_enabled(&self) -> bool {
        !self.vip_flag.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum RestrictConfigError {
    #[error("failed to parse restrict config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read restrict config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("quota {quota} for {weapon} in {scope} must be a non-negative number")]
    InvalidQuota {
        scope: String,
        weapon: String,
        quota: f64,
    },
    #[error("message cooldown {0} is not a finite number")]
    InvalidCooldown(f64),
}

/// Metadata about the restrict configuration source.
#[derive(Debug, Clone, Default)]
pub struct RestrictConfigMetadata {
    path: Option<PathBuf>,
}

impl RestrictConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Re-read the configuration from wherever it originally came from.
    pub fn reload(&self) -> Result<Arc<RestrictConfig>, RestrictConfigError> {
        match &self.path {
            Some(path) => RestrictConfig::from_file(path).map(Arc::new),
            None => Ok(RestrictConfig::builtin()),
        }
    }
}

/// Load restrict configuration from environment or default path.
pub fn load_restrict_config_from_env() -> (Arc<RestrictConfig>, RestrictConfigMetadata) {
    let override_path = env::var("WEAPON_RESTRICT_CONFIG_PATH")
        .ok()
        .map(PathBuf::from);
    let default_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/data/weapon_restrict_config.json");

    let path = override_path.unwrap_or(default_path);
    match RestrictConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "weapon_restrict::config",
                path = %path.display(),
                "restrict_config.loaded=file"
            );
            return (Arc::new(config), RestrictConfigMetadata::new(Some(path)));
        }
        Err(err) => {
            tracing::warn!(
                target: "weapon_restrict::config",
                path = %path.display(),
                error = %err,
                "restrict_config.load_failed"
            );
        }
    }

    let config = RestrictConfig::builtin();
    tracing::info!(
        target: "weapon_restrict::config",
        "restrict_config.loaded=builtin"
    );
    (config, RestrictConfigMetadata::new(None))
}
