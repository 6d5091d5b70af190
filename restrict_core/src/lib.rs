//! Weapon restriction engine.
//!
//! Decides, for every weapon purchase or pickup, whether the acquiring player
//! may hold the weapon under the per-map quotas and limits currently in force.
//! The host feeds snapshots in through [`RestrictEngine::handle_acquire`] and
//! lifecycle calls; see `restrict_runtime` for the event and command types.

pub mod config;
mod cooldown;
mod engine;
mod evaluator;
mod map_config;
mod messages;
pub mod metrics;
mod overrides;
mod rules;
mod shared;

pub use config::{
    load_restrict_config_from_env, MapRuleConfig, RestrictConfig, RestrictConfigError,
    RestrictConfigMetadata, CONFIG_VERSION,
};
pub use cooldown::CooldownTracker;
pub use engine::{ActiveMap, CommandReply, EngineError, RestrictEngine};
pub use evaluator::{RestrictionEvaluator, Roster, RosterOptions, Verdict};
pub use map_config::{MapConfigResolver, Resolution, RuleSetSource};
pub use messages::MessageTemplates;
pub use metrics::{Exemption, RestrictMetrics};
pub use overrides::{LiveOverrideStore, OverrideValue, WeaponOverride};
pub use rules::{RestrictedSet, RuleSet, WeaponRule};
pub use shared::SharedEngine;
