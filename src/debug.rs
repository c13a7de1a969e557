use crate::archetype::ArchetypeId;
use crate::entity::EntityId;
use crate::world::World;

/// World inspector for debugging
pub struct WorldInspector;

impl WorldInspector {
    /// Get total entity count
    pub fn entity_count(world: &World) -> usize {
        world.entity_count()
    }

    /// Get archetype summary, with component names resolved through the
    /// world's registry
    pub fn archetype_summary(world: &World) -> Vec<ArchetypeInfo> {
        let mut infos = Vec::with_capacity(world.archetype_count());

        for archetype in world.archetypes() {
            let signature: Vec<String> = archetype
                .signature()
                .ids()
                .iter()
                .map(|&id| match world.components().info(id) {
                    Ok(info) => info.name.clone(),
                    Err(_) => format!("#{id}"),
                })
                .collect();

            infos.push(ArchetypeInfo {
                id: archetype.id(),
                signature,
                entity_count: archetype.len(),
                component_count: archetype.signature().len(),
                memory_bytes: archetype.memory_usage_in_bytes(),
            });
        }

        infos
    }

    pub fn memory_stats(world: &World) -> MemoryStats {
        let archetype_bytes = world
            .archetypes()
            .iter()
            .map(|archetype| archetype.memory_usage_in_bytes())
            .sum();
        MemoryStats {
            entity_count: world.entity_count(),
            archetype_count: world.archetype_count(),
            archetype_bytes,
            total_bytes: world.memory_usage_in_bytes(),
        }
    }

    /// Print world summary to console
    pub fn print_summary(world: &World) {
        println!("=== World Summary ===");
        println!("Entities: {}", Self::entity_count(world));
        println!("Archetypes: {}", world.archetype_count());
        println!("Memory: {} bytes", world.memory_usage_in_bytes());

        println!("\n=== Archetypes ===");
        for info in Self::archetype_summary(world) {
            println!(
                "Archetype {}: {} entities, [{}]",
                info.id,
                info.entity_count,
                info.signature.join(", ")
            );
        }
    }

    /// Print entity details
    pub fn print_entity(world: &World, entity: EntityId) {
        if let Some(meta) = world.entity_meta(entity) {
            println!("=== Entity {entity} ===");
            println!("Archetype: {}", meta.archetype_id);
            println!("Row: {}", meta.row);

            if let Some(archetype) = world.archetype(meta.archetype_id) {
                println!("Components: {} types", archetype.signature().len());
            }
        } else {
            println!("Entity {entity} not found");
        }
    }
}

/// Archetype information for debugging
#[derive(Clone, Debug)]
pub struct ArchetypeInfo {
    pub id: ArchetypeId,
    pub signature: Vec<String>,
    pub entity_count: usize,
    pub component_count: usize,
    pub memory_bytes: usize,
}

/// Memory footprint of a world
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub entity_count: usize,
    pub archetype_count: usize,
    /// Columns plus per-archetype row indices
    pub archetype_bytes: usize,
    /// Archetypes plus the world's entity index
    pub total_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Default)]
    struct Mass(f32);

    #[derive(Clone, Copy, Default)]
    struct Charge(i8);

    #[test]
    fn test_world_inspector() {
        let world = World::default();
        assert_eq!(WorldInspector::entity_count(&world), 0);
        assert_eq!(WorldInspector::memory_stats(&world).archetype_bytes, 0);
    }

    #[test]
    fn test_archetype_summary_uses_names() {
        let mut world = World::default();
        world.register_component::<Mass>("Mass").unwrap();
        world.register_component::<Charge>("Charge").unwrap();
        world.create_entity((Charge(1), Mass(2.0))).unwrap();
        world.create_entity((Mass(1.0),)).unwrap();

        let summary = WorldInspector::archetype_summary(&world);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].signature, vec!["Mass", "Charge"]);
        assert_eq!(summary[0].entity_count, 1);
        assert_eq!(summary[1].signature, vec!["Mass"]);

        let stats = WorldInspector::memory_stats(&world);
        assert_eq!(stats.entity_count, 2);
        assert!(stats.total_bytes >= stats.archetype_bytes);
        assert!(stats.archetype_bytes > 0);
    }
}
