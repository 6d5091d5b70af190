use std::fmt;

use crate::{AcquireEvent, WeaponId};

/// Inputs the engine accepts from its host, one per command line.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, PartialEq)]
pub enum CommandPayload {
    Restrict(AdminCommand),
    MapStart { map_name: Option<String> },
    RoundStart,
    WarmupStart,
    MatchStart,
    ReloadConfig,
    Acquire(AcquireEvent),
}

/// `restrict <weapon> <directive> [value]` after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminCommand {
    pub weapon: WeaponId,
    pub directive: RestrictDirective,
}

impl AdminCommand {
    pub fn new(weapon: impl Into<WeaponId>, directive: RestrictDirective) -> Self {
        Self {
            weapon: weapon.into(),
            directive,
        }
    }
}

/// Which half of a weapon rule an override touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Quota,
    Limit,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Quota => f.write_str("quota"),
            RuleKind::Limit => f.write_str("limit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestrictDirective {
    SetQuota(f64),
    SetLimit(u32),
    /// A negative value on the command line drops a single kind.
    Remove(RuleKind),
    /// `none`: unrestricted until the next map load.
    Unrestrict,
    /// `default`: discard every override and re-resolve the map config.
    Reset,
}
