//! Snapshots supplied by the host on every acquisition attempt.
//!
//! The host owns the live player and weapon entities; the engine only ever
//! sees these read-only copies and never keeps them past a single call.

use std::borrow::Borrow;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Weapon designer name, e.g. `weapon_awp`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct WeaponId(String);

impl WeaponId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Administrative input is case-insensitive; everything else matches exactly.
    pub fn from_admin_input(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for WeaponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for WeaponId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WeaponId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Stable host-side identifier for a connected player.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side an actor plays on. The engine only compares teams for equality.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct TeamId(pub u8);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub team: TeamId,
    #[serde(default = "default_true")]
    pub is_alive: bool,
    #[serde(default = "default_true")]
    pub is_connected: bool,
    /// Whether the host found the configured VIP permission on this actor.
    #[serde(default)]
    pub has_exempt_permission: bool,
    /// Every weapon currently in the actor's inventory, duplicates included.
    #[serde(default)]
    pub weapons: Vec<WeaponId>,
}

impl ActorSnapshot {
    pub fn new(id: u64, team: u8) -> Self {
        Self {
            id: ActorId(id),
            team: TeamId(team),
            is_alive: true,
            is_connected: true,
            has_exempt_permission: false,
            weapons: Vec::new(),
        }
    }

    pub fn holding(mut self, weapon: impl Into<WeaponId>) -> Self {
        self.weapons.push(weapon.into());
        self
    }

    pub fn exempt(mut self) -> Self {
        self.has_exempt_permission = true;
        self
    }

    pub fn dead(mut self) -> Self {
        self.is_alive = false;
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.is_connected = false;
        self
    }

    pub fn copies_of(&self, weapon: &WeaponId) -> usize {
        self.weapons.iter().filter(|held| *held == weapon).count()
    }
}

const fn default_true() -> bool {
    true
}

/// How the actor is trying to obtain the weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AcquireMethod {
    PickUp,
    Buy,
}

impl fmt::Display for AcquireMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireMethod::PickUp => f.write_str("pick_up"),
            AcquireMethod::Buy => f.write_str("buy"),
        }
    }
}

/// One acquisition attempt as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AcquireEvent {
    pub weapon: WeaponId,
    pub actor: ActorSnapshot,
    pub method: AcquireMethod,
    /// Host clock in seconds.
    pub current_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_name: Option<String>,
    #[serde(default)]
    pub buy_time_ended: bool,
    /// Every player the host currently knows about, the acquiring actor included.
    #[serde(default)]
    pub roster: Vec<ActorSnapshot>,
}

/// Result handed back to the host's acquisition hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AcquireOutcome {
    Allow,
    /// Used for blocked pickups so the host silently ignores the item.
    DenyAsInvalid,
    /// Used for blocked purchases so the buy menu reports a failure.
    DenyAsAlreadyOwned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AcquireResponse {
    pub outcome: AcquireOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AcquireResponse {
    pub fn allow() -> Self {
        Self {
            outcome: AcquireOutcome::Allow,
            message: None,
        }
    }

    pub fn deny(outcome: AcquireOutcome, message: Option<String>) -> Self {
        Self { outcome, message }
    }

    pub fn is_allowed(&self) -> bool {
        self.outcome == AcquireOutcome::Allow
    }
}

pub fn acquire_event_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(AcquireEvent)
}
