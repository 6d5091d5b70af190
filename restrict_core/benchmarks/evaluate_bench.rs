use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use restrict_core::{RestrictConfig, RestrictEngine};
use restrict_runtime::{AcquireEvent, AcquireMethod, ActorSnapshot, WeaponId};

fn roster(size: u64) -> Vec<ActorSnapshot> {
    (0..size)
        .map(|id| {
            let actor = ActorSnapshot::new(id, (id % 2) as u8 + 2)
                .holding("weapon_knife")
                .holding("weapon_glock");
            if id % 7 == 0 {
                actor.holding("weapon_awp")
            } else {
                actor
            }
        })
        .collect()
}

fn event(weapon: &str, roster: Vec<ActorSnapshot>) -> AcquireEvent {
    AcquireEvent {
        weapon: WeaponId::new(weapon),
        actor: roster[roster.len() - 1].clone(),
        method: AcquireMethod::Buy,
        current_time: 0.0,
        map_name: None,
        buy_time_ended: false,
        roster,
    }
}

fn bench_acquire(c: &mut Criterion) {
    let mut group = c.benchmark_group("acquire");

    for size in [10u64, 20, 32, 64] {
        for weapon in ["weapon_awp", "weapon_ak47"] {
            group.bench_with_input(BenchmarkId::new(weapon, size), &size, |b, &size| {
                b.iter_batched(
                    || {
                        let mut engine =
                            RestrictEngine::new(Arc::new(RestrictConfig::default()));
                        engine.on_map_start(Some("de_dust2"));
                        (engine, event(weapon, roster(size)))
                    },
                    |(mut engine, event)| engine.handle_acquire(&event),
                    BatchSize::SmallInput,
                )
            });
        }
    }

    group.finish();
}

criterion_group!(acquire_benches, bench_acquire);
criterion_main!(acquire_benches);
