use std::num::ParseFloatError;

use thiserror::Error;

use crate::{AcquireEvent, AdminCommand, CommandPayload, RestrictDirective, RuleKind, WeaponId};

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("please specify a weapon name")]
    EmptyWeapon,
    #[error("invalid number '{value}' for {context}: {source}")]
    InvalidFloat {
        value: String,
        context: &'static str,
        source: ParseFloatError,
    },
    #[error("value '{value}' for {context} is not a finite number")]
    NonFinite {
        value: String,
        context: &'static str,
    },
    #[error(
        "unknown restrict method '{0}'; use \"quota\", \"limit\", \"default\", or \"none\""
    )]
    UnknownRestrictMethod(String),
    #[error("invalid acquire event: {0}")]
    InvalidEvent(#[from] serde_json::Error),
}

pub fn parse_command_line(input: &str) -> Result<CommandPayload, CommandParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CommandParseError::Empty);
    }

    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "restrict" | "css_restrictweapon" => {
            parse_restrict_arguments(rest).map(CommandPayload::Restrict)
        }
        "map_start" | "map" => {
            let map_name = rest.split_whitespace().next().map(str::to_string);
            Ok(CommandPayload::MapStart { map_name })
        }
        "round_start" | "round" => Ok(CommandPayload::RoundStart),
        "warmup" | "warmup_start" => Ok(CommandPayload::WarmupStart),
        "match_start" | "live" => Ok(CommandPayload::MatchStart),
        "reload" => Ok(CommandPayload::ReloadConfig),
        "acquire" => {
            if rest.is_empty() {
                return Err(CommandParseError::MissingArgument("event"));
            }
            let event: AcquireEvent = serde_json::from_str(rest)?;
            Ok(CommandPayload::Acquire(event))
        }
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Parses everything after the `restrict` verb.
pub fn parse_restrict_arguments(input: &str) -> Result<AdminCommand, CommandParseError> {
    let mut parts = input.split_whitespace();
    let weapon = parts
        .next()
        .map(WeaponId::from_admin_input)
        .ok_or(CommandParseError::EmptyWeapon)?;
    if weapon.is_empty() {
        return Err(CommandParseError::EmptyWeapon);
    }

    let method = parts
        .next()
        .ok_or(CommandParseError::MissingArgument("restrict method"))?
        .to_ascii_lowercase();

    let directive = match method.as_str() {
        "none" => RestrictDirective::Unrestrict,
        "default" => RestrictDirective::Reset,
        "quota" => {
            let value_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("quota value"))?;
            let value = parse_f64(value_str, "quota value")?;
            if value >= 0.0 {
                RestrictDirective::SetQuota(value)
            } else {
                RestrictDirective::Remove(RuleKind::Quota)
            }
        }
        "limit" => {
            let value_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("limit value"))?;
            let value = parse_f64(value_str, "limit value")?;
            if value >= 0.0 {
                RestrictDirective::SetLimit(value.round().min(u32::MAX as f64) as u32)
            } else {
                RestrictDirective::Remove(RuleKind::Limit)
            }
        }
        other => return Err(CommandParseError::UnknownRestrictMethod(other.to_string())),
    };

    Ok(AdminCommand { weapon, directive })
}

fn parse_f64(value: &str, context: &'static str) -> Result<f64, CommandParseError> {
    let parsed = value
        .parse::<f64>()
        .map_err(|source| CommandParseError::InvalidFloat {
            value: value.to_string(),
            context,
            source,
        })?;
    if !parsed.is_finite() {
        return Err(CommandParseError::NonFinite {
            value: value.to_string(),
            context,
        });
    }
    Ok(parsed)
}
