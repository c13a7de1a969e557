#![cfg(feature = "profiling")]

use tessera_ecs::{ComponentRegistry, World};
use tracing::info_span;

#[derive(Debug, Clone, Copy, Default)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone, Copy, Default)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone, Copy, Default)]
struct Health(u32);

#[tracing::instrument(skip_all, name = "spawn_workload")]
fn run_spawn_workload(world: &mut World, count: usize) {
    let batch_size = 1000;

    for i in (0..count).step_by(batch_size) {
        let _span = info_span!("spawn_batch", start_index = i, batch_size = batch_size).entered();

        for _ in 0..batch_size {
            world
                .create_entity((
                    Position(1.0, 2.0, 3.0),
                    Velocity(1.0, 0.0, 0.0),
                    Health(100),
                ))
                .unwrap();
        }
    }
}

#[test]
fn spawn_workload_emits_spans() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut components = ComponentRegistry::default();
        components.register_component::<Position>("Position").unwrap();
        components.register_component::<Velocity>("Velocity").unwrap();
        components.register_component::<Health>("Health").unwrap();
        let mut world = World::new(components);

        {
            let _warmup = info_span!("warmup").entered();
            for _ in 0..1000 {
                world
                    .create_entity((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0)))
                    .unwrap();
            }
        }

        run_spawn_workload(&mut world, 10_000);
        assert_eq!(world.entity_count(), 11_000);
        assert_eq!(world.archetype_count(), 2);
    });
}
