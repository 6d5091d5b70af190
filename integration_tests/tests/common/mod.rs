#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use restrict_core::{RestrictConfig, RestrictConfigMetadata, RestrictEngine};
use restrict_runtime::{AcquireEvent, AcquireMethod, ActorSnapshot, WeaponId};

pub const T: u8 = 2;
pub const CT: u8 = 3;

pub fn fixture_config_path() -> PathBuf {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("test_restrict_config.json");

    debug_assert!(
        config_path.exists(),
        "missing test restrict config at {}",
        config_path.display()
    );
    config_path
}

pub fn fixture_config() -> Arc<RestrictConfig> {
    Arc::new(
        RestrictConfig::from_file(&fixture_config_path()).expect("fixture config should load"),
    )
}

/// Engine backed by the fixture file, with `map` already started.
pub fn engine_on(map: &str) -> RestrictEngine {
    let path = fixture_config_path();
    let mut engine = RestrictEngine::with_metadata(
        fixture_config(),
        RestrictConfigMetadata::new(Some(path)),
    );
    engine.on_map_start(Some(map));
    engine
}

/// `size` teammates on `team`; the first `holders` carry `weapon`.
pub fn team(team: u8, first_id: u64, size: u64, weapon: &str, holders: u64) -> Vec<ActorSnapshot> {
    (0..size)
        .map(|offset| {
            let actor = ActorSnapshot::new(first_id + offset, team);
            if offset < holders {
                actor.holding(weapon)
            } else {
                actor
            }
        })
        .collect()
}

pub fn attempt(
    weapon: &str,
    actor: &ActorSnapshot,
    method: AcquireMethod,
    time: f64,
    roster: &[ActorSnapshot],
) -> AcquireEvent {
    AcquireEvent {
        weapon: WeaponId::new(weapon),
        actor: actor.clone(),
        method,
        current_time: time,
        map_name: None,
        buy_time_ended: false,
        roster: roster.to_vec(),
    }
}
