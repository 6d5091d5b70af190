//! The restriction engine context.
//!
//! All mutable state (active rules, overrides, cooldowns, warmup flag) lives
//! in [`RestrictEngine`]. The host calls the lifecycle methods from its
//! map-start and round-start hooks and [`RestrictEngine::handle_acquire`]
//! from its acquisition hook, one event at a time.

use std::sync::Arc;

use restrict_runtime::{
    AcquireEvent, AcquireMethod, AcquireOutcome, AcquireResponse, ActorId, ActorSnapshot,
    AdminCommand, CommandPayload, RestrictDirective, WeaponId,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{RestrictConfig, RestrictConfigError, RestrictConfigMetadata};
use crate::cooldown::CooldownTracker;
use crate::evaluator::{RestrictionEvaluator, RosterOptions, Verdict};
use crate::map_config::{MapConfigResolver, Resolution, RuleSetSource};
use crate::messages::MessageTemplates;
use crate::metrics::{Exemption, RestrictMetrics};
use crate::overrides::LiveOverrideStore;
use crate::rules::{RestrictedSet, RuleSet};

static NO_RULES: RuleSet = RuleSet::new();

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("weapon metadata missing for acquisition by actor {actor}")]
    UnresolvedWeapon { actor: ActorId },
    #[error("configuration reload failed: {0}")]
    Reload(#[from] RestrictConfigError),
}

/// Rule set chosen for the map currently being played.
#[derive(Debug, Clone)]
pub struct ActiveMap {
    pub name: String,
    pub resolution: Resolution,
}

/// What the engine answers to one command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandReply {
    Acquire(AcquireResponse),
    Text { message: String },
}

impl CommandReply {
    fn text(message: impl Into<String>) -> Self {
        CommandReply::Text {
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct RestrictEngine {
    config: Arc<RestrictConfig>,
    metadata: RestrictConfigMetadata,
    resolver: MapConfigResolver,
    restricted: RestrictedSet,
    templates: MessageTemplates,
    active: Option<ActiveMap>,
    overrides: LiveOverrideStore,
    cooldowns: CooldownTracker,
    in_warmup: bool,
    metrics: RestrictMetrics,
}

impl RestrictEngine {
    pub fn new(config: Arc<RestrictConfig>) -> Self {
        Self::with_metadata(config, RestrictConfigMetadata::default())
    }

    /// `metadata` tells [`CommandPayload::ReloadConfig`] where to re-read from.
    pub fn with_metadata(config: Arc<RestrictConfig>, metadata: RestrictConfigMetadata) -> Self {
        let resolver = config.build_resolver();
        let restricted = RestrictedSet::from_rule_sets(resolver.rule_sets());
        let templates = config.message_templates();
        Self {
            config,
            metadata,
            resolver,
            restricted,
            templates,
            active: None,
            overrides: LiveOverrideStore::new(),
            cooldowns: CooldownTracker::new(),
            in_warmup: false,
            metrics: RestrictMetrics::default(),
        }
    }

    pub fn config(&self) -> &Arc<RestrictConfig> {
        &self.config
    }

    /// Permission the host should look up to fill `has_exempt_permission`.
    pub fn vip_flag(&self) -> &str {
        &self.config.vip_flag
    }

    pub fn active_map(&self) -> Option<&ActiveMap> {
        self.active.as_ref()
    }

    /// Rules for the current map; empty until a map name is known.
    pub fn active_rules(&self) -> &RuleSet {
        self.active
            .as_ref()
            .map(|active| active.resolution.rules.as_ref())
            .unwrap_or(&NO_RULES)
    }

    pub fn restricted(&self) -> &RestrictedSet {
        &self.restricted
    }

    pub fn overrides(&self) -> &LiveOverrideStore {
        &self.overrides
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    pub fn metrics(&self) -> &RestrictMetrics {
        &self.metrics
    }

    pub fn in_warmup(&self) -> bool {
        self.in_warmup
    }

    pub fn on_map_start(&mut self, map_name: Option<&str>) {
        self.cooldowns.clear();
        if !self.load_map_config(map_name, false) {
            debug!(
                target: "weapon_restrict::engine",
                "map_config.skipped=no_map_name"
            );
        }
    }

    pub fn on_round_start(&mut self) {
        self.cooldowns.clear();
    }

    pub fn on_warmup_start(&mut self) {
        self.in_warmup = true;
    }

    pub fn on_match_start(&mut self) {
        self.in_warmup = false;
    }

    /// Swap in a new configuration and re-resolve the current map.
    pub fn replace_config(&mut self, config: Arc<RestrictConfig>) {
        self.resolver = config.build_resolver();
        self.templates = config.message_templates();
        self.config = config;
        self.reset_to_config();
        info!(
            target: "weapon_restrict::config",
            maps = self.resolver.keys().count(),
            restricted = self.restricted.len(),
            "restrict_config.replaced"
        );
    }

    pub fn reload_config(&mut self) -> Result<(), EngineError> {
        let config = self.metadata.reload()?;
        self.replace_config(config);
        Ok(())
    }

    /// Drop every override and cooldown and resolve the current map again.
    pub fn reset_to_config(&mut self) {
        let current = self.active.as_ref().map(|active| active.name.clone());
        self.cooldowns.clear();
        if !self.load_map_config(current.as_deref(), false) {
            self.overrides.reset();
            self.restricted = RestrictedSet::from_rule_sets(self.resolver.rule_sets());
        }
    }

    /// Resolve `map_name` and make it active. `keep_overrides` is set only
    /// when no map was active yet, so earlier admin commands survive.
    fn load_map_config(&mut self, map_name: Option<&str>, keep_overrides: bool) -> bool {
        let Some(resolution) = self.resolver.resolve(map_name) else {
            return false;
        };
        let name = map_name.unwrap_or_default().to_string();

        if !keep_overrides {
            self.overrides.reset();
        }
        self.restricted = RestrictedSet::from_rule_sets(self.resolver.rule_sets());
        for weapon in self.overrides.weapons() {
            self.restricted.insert(weapon.clone());
        }
        self.metrics.map_loads += 1;

        let source = match &resolution.source {
            RuleSetSource::Exact(key) => format!("exact:{key}"),
            RuleSetSource::Wildcard { key, .. } => format!("wildcard:{key}"),
            RuleSetSource::Default => "default".to_string(),
        };
        info!(
            target: "weapon_restrict::engine",
            map = %name,
            source = %source,
            rules = %resolution.rules,
            "map_config.resolved"
        );

        self.active = Some(ActiveMap { name, resolution });
        true
    }

    fn roster_options(&self) -> RosterOptions {
        RosterOptions {
            team_check: self.config.do_team_check,
            vip_exemption: self.config.vip_exemption_enabled(),
        }
    }

    fn evaluator(&self) -> RestrictionEvaluator<'_> {
        RestrictionEvaluator::new(&self.restricted, self.active_rules(), &self.overrides)
    }

    /// Verdict for `weapon` ignoring every exemption.
    pub fn evaluate(
        &self,
        weapon: &WeaponId,
        actor: &ActorSnapshot,
        players: &[ActorSnapshot],
    ) -> Verdict {
        self.evaluator()
            .evaluate(weapon, actor, players, self.roster_options())
    }

    fn exemption_for(&self, event: &AcquireEvent) -> Option<Exemption> {
        if self.in_warmup && !self.config.restrict_warmup {
            return Some(Exemption::Warmup);
        }
        if self.config.allow_pickup
            && event.buy_time_ended
            && event.method == AcquireMethod::PickUp
        {
            return Some(Exemption::PickupAfterBuyTime);
        }
        if !event.actor.is_alive || !event.actor.is_connected {
            return Some(Exemption::InactiveActor);
        }
        if self.config.vip_exemption_enabled() && event.actor.has_exempt_permission {
            return Some(Exemption::Vip);
        }
        None
    }

    pub fn handle_acquire(&mut self, event: &AcquireEvent) -> Result<AcquireResponse, EngineError> {
        self.metrics.attempts += 1;
        if event.weapon.is_empty() {
            return Err(EngineError::UnresolvedWeapon {
                actor: event.actor.id,
            });
        }

        // Early in boot the host may report acquisitions before map start.
        if self.active.is_none() && event.map_name.is_some() {
            self.load_map_config(event.map_name.as_deref(), true);
        }

        if !self.restricted.contains(event.weapon.as_str()) {
            self.metrics.fast_path += 1;
            return Ok(AcquireResponse::allow());
        }

        if let Some(exemption) = self.exemption_for(event) {
            self.metrics.record_exemption(exemption);
            debug!(
                target: "weapon_restrict::engine",
                actor = %event.actor.id,
                weapon = %event.weapon,
                exemption = ?exemption,
                "acquire.exempt"
            );
            return Ok(AcquireResponse::allow());
        }

        let verdict = self.evaluate(&event.weapon, &event.actor, &event.roster);
        self.metrics.record_verdict(verdict);
        debug!(
            target: "weapon_restrict::engine",
            actor = %event.actor.id,
            weapon = %event.weapon,
            method = %event.method,
            verdict = %verdict,
            "acquire.evaluated"
        );
        if !verdict.is_restricted() {
            return Ok(AcquireResponse::allow());
        }

        let message = self.templates.render(&event.weapon, verdict);
        let response = match event.method {
            AcquireMethod::Buy => {
                if message.is_some() {
                    self.metrics.messages_sent += 1;
                }
                AcquireResponse::deny(AcquireOutcome::DenyAsAlreadyOwned, message)
            }
            AcquireMethod::PickUp => {
                let message = message.and_then(|message| {
                    if self.cooldowns.should_suppress(
                        event.actor.id,
                        event.current_time,
                        self.config.message_cooldown_seconds,
                    ) {
                        self.metrics.messages_suppressed += 1;
                        None
                    } else {
                        self.cooldowns
                            .record_message(event.actor.id, event.current_time);
                        self.metrics.messages_sent += 1;
                        Some(message)
                    }
                });
                AcquireResponse::deny(AcquireOutcome::DenyAsInvalid, message)
            }
        };
        Ok(response)
    }

    /// Apply an administrative `restrict` command and describe the result.
    pub fn apply_admin(&mut self, command: &AdminCommand) -> String {
        let weapon = command.weapon.clone();
        let reply = match command.directive {
            RestrictDirective::SetQuota(quota) => {
                self.overrides.set_quota(weapon.clone(), quota);
                self.restricted.insert(weapon.clone());
                format!("restricted \"{weapon}\" to a quota of {quota} per player on team")
            }
            RestrictDirective::SetLimit(limit) => {
                self.overrides.set_limit(weapon.clone(), limit);
                self.restricted.insert(weapon.clone());
                format!("restricted \"{weapon}\" to {limit} per team")
            }
            RestrictDirective::Remove(kind) => {
                self.overrides.remove(weapon.clone(), kind);
                format!("removed {kind} for \"{weapon}\"")
            }
            RestrictDirective::Unrestrict => {
                self.overrides.clear(weapon.clone());
                format!("\"{weapon}\" is now unrestricted")
            }
            RestrictDirective::Reset => {
                self.reset_to_config();
                "reset to default weapon restrictions".to_string()
            }
        };
        info!(
            target: "weapon_restrict::engine",
            weapon = %weapon,
            directive = ?command.directive,
            "override.applied"
        );
        reply
    }

    /// Dispatch one parsed command line.
    pub fn apply_command(&mut self, payload: CommandPayload) -> Result<CommandReply, EngineError> {
        let reply = match payload {
            CommandPayload::Restrict(command) => CommandReply::text(self.apply_admin(&command)),
            CommandPayload::MapStart { map_name } => {
                self.on_map_start(map_name.as_deref());
                match (&map_name, self.active.as_ref()) {
                    (Some(_), Some(active)) if active.resolution.is_default() => {
                        CommandReply::text(format!("loaded default config for {}", active.name))
                    }
                    (Some(_), Some(active)) => {
                        CommandReply::text(format!("loaded config for {}", active.name))
                    }
                    _ => CommandReply::text("map name unknown; keeping current rules"),
                }
            }
            CommandPayload::RoundStart => {
                self.on_round_start();
                CommandReply::text("round started")
            }
            CommandPayload::WarmupStart => {
                self.on_warmup_start();
                CommandReply::text("warmup started")
            }
            CommandPayload::MatchStart => {
                self.on_match_start();
                CommandReply::text("match started")
            }
            CommandPayload::ReloadConfig => {
                self.reload_config()?;
                CommandReply::text("configuration reloaded")
            }
            CommandPayload::Acquire(event) => CommandReply::Acquire(self.handle_acquire(&event)?),
        };
        Ok(reply)
    }
}
