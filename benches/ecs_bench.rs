#![allow(dead_code)]
//! World-level benchmarks against hecs
//!
//! Run with: cargo bench --bench ecs_bench
//!
//! - Entity spawning
//! - Entity destruction
//! - Component lookup
//! - Component add/remove migration
//! - View iteration

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use hecs::World as HecsWorld;
use tessera_ecs::{ComponentRegistry, EntityId, World as TesseraWorld};

#[derive(Debug, Copy, Clone, Default)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Copy, Clone, Default)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Copy, Clone, Default)]
struct Health(u32);

#[derive(Debug, Copy, Clone, Default)]
struct Damage(f32);

fn tessera_world() -> TesseraWorld {
    let mut components = ComponentRegistry::default();
    components.register_component::<Position>("Position").unwrap();
    components.register_component::<Velocity>("Velocity").unwrap();
    components.register_component::<Health>("Health").unwrap();
    components.register_component::<Damage>("Damage").unwrap();
    TesseraWorld::new(components)
}

fn position(i: usize) -> Position {
    Position {
        x: i as f32,
        y: 0.0,
        z: 0.0,
    }
}

// Bench: Spawning entities with different component counts
fn bench_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("tessera_spawn_1k_single_component", |b| {
        b.iter(|| {
            let mut world = tessera_world();
            for i in 0..1_000 {
                let _ = world.create_entity((position(i),));
            }
            world
        });
    });
    group.bench_function("hecs_spawn_1k_single_component", |b| {
        b.iter(|| {
            let mut world = HecsWorld::new();
            for i in 0..1_000 {
                world.spawn((position(i),));
            }
            world
        });
    });

    group.bench_function("tessera_spawn_1k_four_components", |b| {
        b.iter(|| {
            let mut world = tessera_world();
            for i in 0..1_000 {
                let _ = world.create_entity((
                    position(i),
                    Velocity::default(),
                    Health(100),
                    Damage(1.0),
                ));
            }
            world
        });
    });
    group.bench_function("hecs_spawn_1k_four_components", |b| {
        b.iter(|| {
            let mut world = HecsWorld::new();
            for i in 0..1_000 {
                world.spawn((position(i), Velocity::default(), Health(100), Damage(1.0)));
            }
            world
        });
    });

    group.finish();
}

// Bench: Component lookup by entity
fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for count in [1_000usize, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("tessera_lookup_entities", count),
            count,
            |b, &count| {
                let mut world = tessera_world();
                let entities: Vec<EntityId> = (0..count)
                    .map(|i| world.create_entity((position(i), Health(100))).unwrap().0)
                    .collect();

                b.iter(|| {
                    for &entity in &entities {
                        black_box(world.get_component::<Position>(entity).ok());
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("hecs_lookup_entities", count),
            count,
            |b, &count| {
                let mut world = HecsWorld::new();
                let entities: Vec<_> = (0..count)
                    .map(|i| world.spawn((position(i), Health(100))))
                    .collect();

                b.iter(|| {
                    for &entity in &entities {
                        black_box(world.get::<&Position>(entity).ok());
                    }
                });
            },
        );
    }

    group.finish();
}

// Bench: Destroy performance
fn bench_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("destroy");

    group.bench_function("tessera_destroy_1k_entities", |b| {
        b.iter_batched(
            || {
                let mut world = tessera_world();
                let entities: Vec<EntityId> = (0..1_000)
                    .map(|i| world.create_entity((position(i), Health(100))).unwrap().0)
                    .collect();
                (world, entities)
            },
            |(mut world, entities)| {
                for entity in entities {
                    let _ = world.destroy_entity(entity);
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("hecs_destroy_1k_entities", |b| {
        b.iter_batched(
            || {
                let mut world = HecsWorld::new();
                let entities: Vec<_> = (0..1_000)
                    .map(|i| world.spawn((position(i), Health(100))))
                    .collect();
                (world, entities)
            },
            |(mut world, entities)| {
                for entity in entities {
                    let _ = world.despawn(entity);
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// Bench: Adding then removing a component moves every row twice
fn bench_migration(c: &mut Criterion) {
    let mut group = c.benchmark_group("migration");

    group.bench_function("tessera_add_remove_1k", |b| {
        b.iter_batched(
            || {
                let mut world = tessera_world();
                let entities: Vec<EntityId> = (0..1_000)
                    .map(|i| world.create_entity((position(i), Health(100))).unwrap().0)
                    .collect();
                (world, entities)
            },
            |(mut world, entities)| {
                for &entity in &entities {
                    let _ = world.add_components::<(Velocity,)>(entity);
                }
                for &entity in &entities {
                    let _ = world.remove_components::<(Velocity,)>(entity);
                }
                world
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("hecs_add_remove_1k", |b| {
        b.iter_batched(
            || {
                let mut world = HecsWorld::new();
                let entities: Vec<_> = (0..1_000)
                    .map(|i| world.spawn((position(i), Health(100))))
                    .collect();
                (world, entities)
            },
            |(mut world, entities)| {
                for &entity in &entities {
                    let _ = world.insert_one(entity, Velocity::default());
                }
                for &entity in &entities {
                    let _ = world.remove_one::<Velocity>(entity);
                }
                world
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// Bench: Iterating a view spread over several archetypes
fn bench_view_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("view");

    group.bench_function("tessera_view_subset_10k", |b| {
        let mut world = tessera_world();
        for i in 0..10_000 {
            match i % 3 {
                0 => world.create_entity((position(i), Velocity::default())),
                1 => world.create_entity((position(i), Velocity::default(), Health(1))),
                _ => world.create_entity((position(i), Velocity::default(), Damage(1.0))),
            }
            .unwrap();
        }

        b.iter(|| {
            if let Ok(Some(mut view)) = world.view_subset::<(Position, Velocity)>() {
                let _ = view.for_each(|_, _, (pos, vel)| {
                    pos.x += vel.x;
                    pos.y += vel.y;
                    pos.z += vel.z;
                });
            }
        });
    });

    group.bench_function("hecs_query_10k", |b| {
        let mut world = HecsWorld::new();
        for i in 0..10_000 {
            match i % 3 {
                0 => world.spawn((position(i), Velocity::default())),
                1 => world.spawn((position(i), Velocity::default(), Health(1))),
                _ => world.spawn((position(i), Velocity::default(), Damage(1.0))),
            };
        }

        b.iter(|| {
            for (pos, vel) in world.query_mut::<(&mut Position, &Velocity)>() {
                pos.x += vel.x;
                pos.y += vel.y;
                pos.z += vel.z;
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_spawn,
    bench_lookup,
    bench_destroy,
    bench_migration,
    bench_view_iteration
);
criterion_main!(benches);
