//! Host-facing contracts for the weapon restriction engine.
//!
//! This crate holds the snapshot types the host hands over on each
//! acquisition attempt and the text command surface (administrative
//! `restrict` commands and lifecycle notifications), without depending on the
//! decision engine in `restrict_core`.

pub mod command_text;
mod commands;
mod event;

pub use command_text::{parse_command_line, parse_restrict_arguments, CommandParseError};
pub use commands::{AdminCommand, CommandPayload, RestrictDirective, RuleKind};
pub use event::{
    acquire_event_schema, AcquireEvent, AcquireMethod, AcquireOutcome, AcquireResponse,
    ActorId, ActorSnapshot, TeamId, WeaponId,
};
