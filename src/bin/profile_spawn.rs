#![allow(dead_code, unused_imports)]

use std::time::Instant;
use tessera_ecs::{ComponentRegistry, EntityId, Result, World};

#[derive(Debug, Clone, Copy, Default)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone, Copy, Default)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone, Copy, Default)]
struct Health(u32);

fn build_world() -> Result<World> {
    let mut components = ComponentRegistry::default();
    components.register_component::<Position>("Position")?;
    components.register_component::<Velocity>("Velocity")?;
    components.register_component::<Health>("Health")?;
    Ok(World::new(components))
}

#[cfg(feature = "profiling")]
#[tracing::instrument(skip(world))]
fn profile_spawns(world: &mut World, count: usize) -> Result<Vec<EntityId>> {
    let mut spawned = Vec::with_capacity(count);
    for i in 0..count {
        if i % 1_000 == 0 {
            tracing::info!("Spawning entity {}/{}", i, count);
        }
        let (entity, _) = world.create_entity((
            Position(1.0, 2.0, 3.0),
            Velocity(1.0, 0.0, 0.0),
            Health(100),
        ))?;
        spawned.push(entity);
    }
    Ok(spawned)
}

#[cfg(feature = "profiling")]
#[tracing::instrument(skip_all, name = "migrate_workload")]
fn profile_migrations(world: &mut World, entities: &[EntityId]) -> Result<()> {
    for &entity in entities.iter().step_by(2) {
        world.remove_components::<(Velocity,)>(entity)?;
    }
    for &entity in entities.iter().step_by(4) {
        world.add_components::<(Velocity,)>(entity)?;
    }
    Ok(())
}

#[cfg(feature = "profiling")]
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let _guard = tessera_ecs::profiling::init_json_trace("trace.json")?;

    let mut world = build_world()?;

    println!("Warming up...");
    {
        let _span = tracing::info_span!("warmup").entered();
        for _ in 0..1000 {
            world.create_entity((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0)))?;
        }
    }

    println!("Profiling spawn with 3 components...");
    let start = Instant::now();
    let spawned = profile_spawns(&mut world, 10_000)?;
    println!("Spawn 10k entities complete in: {:?}", start.elapsed());

    let start = Instant::now();
    profile_migrations(&mut world, &spawned)?;
    println!("Migrations complete in: {:?}", start.elapsed());

    let start = Instant::now();
    world.destroy_entities(&spawned)?;
    println!("Destroy 10k entities complete in: {:?}", start.elapsed());

    println!("Profiling complete. Output written to trace.json");
    Ok(())
}

#[cfg(not(feature = "profiling"))]
fn main() {
    println!("profile_spawn binary requires --features profiling");
}
