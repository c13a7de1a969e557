// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! World: central entity and archetype storage

use ahash::AHashMap;
use smallvec::SmallVec;
use std::ptr;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::archetype::{Archetype, ArchetypeId, Signature};
use crate::bitset::BitSet;
use crate::component::{
    Component, ComponentId, ComponentRegistry, ComponentSet, MAX_SET_COMPONENTS,
};
use crate::config::WorldConfig;
use crate::entity::{EntityAllocator, EntityId, EntityMeta};
use crate::error::{EcsError, Result};
use crate::query::View;
use crate::sparse_set::PagedSparseSet;

type ColumnPayload = SmallVec<[(ComponentId, *const u8); MAX_SET_COMPONENTS]>;

/// Central ECS world
///
/// Owns entity ids, every archetype, and the component registry used to lay
/// them out. All structural changes go through here so that entity metadata
/// and archetype rows never disagree.
pub struct World {
    /// Registered component types
    components: ComponentRegistry,

    config: WorldConfig,

    /// Entity -> (archetype, row)
    entities: PagedSparseSet<EntityId, EntityMeta>,

    allocator: EntityAllocator,

    /// All archetypes, indexed by ArchetypeId, in creation order
    archetypes: Vec<Archetype>,

    /// Maps component signatures to archetype ids
    archetype_index: AHashMap<Signature, ArchetypeId>,
}

impl World {
    /// Create a world over `components` with default settings.
    pub fn new(components: ComponentRegistry) -> Self {
        Self::from_parts(components, WorldConfig::default())
    }

    pub fn with_config(components: ComponentRegistry, config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(components, config))
    }

    fn from_parts(components: ComponentRegistry, config: WorldConfig) -> Self {
        let mut entities = PagedSparseSet::with_page_size(config.sparse_page_size)
            .reclaim_empty_pages(config.reclaim_empty_pages);
        if config.entity_capacity_hint > 0 {
            entities.reserve(config.entity_capacity_hint, config.entity_capacity_hint);
        }
        Self {
            components,
            config,
            entities,
            allocator: EntityAllocator::new(),
            archetypes: Vec::with_capacity(64),
            archetype_index: AHashMap::with_capacity(64),
        }
    }

    /// Create a world with an empty registry sized from `config`.
    pub fn from_config(config: WorldConfig) -> Result<Self> {
        let components = ComponentRegistry::new(config.component_capacity);
        Self::with_config(components, config)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Register `T` with this world's component registry
    pub fn register_component<T: Component>(&mut self, name: &str) -> Result<ComponentId> {
        self.components.register_component::<T>(name)
    }

    fn get_or_create_archetype(&mut self, signature: Signature) -> Result<ArchetypeId> {
        if let Some(&id) = self.archetype_index.get(&signature) {
            return Ok(id);
        }

        #[cfg(feature = "profiling")]
        let span = info_span!(
            "world.create_archetype",
            components = signature.len(),
            archetype_count = self.archetypes.len()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let id = ArchetypeId(self.archetypes.len());
        let archetype = Archetype::new(id, signature.clone(), &self.components, &self.config)?;
        self.archetypes.push(archetype);
        self.archetype_index.insert(signature, id);
        Ok(id)
    }

    /// Spawn an entity with the given component values.
    pub fn create_entity<S: ComponentSet>(&mut self, values: S) -> Result<(EntityId, EntityMeta)> {
        let ids = S::component_ids(&self.components)?;

        #[cfg(feature = "profiling")]
        let span = info_span!(
            "world.create_entity",
            components = ids.len(),
            archetype_count = self.archetypes.len()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let archetype_id = self.get_or_create_archetype(Signature::from_ids(&ids))?;
        let entity = self.allocator.allocate()?;

        let payload: ColumnPayload = ids.iter().copied().zip(values.value_ptrs()).collect();
        // SAFETY: every pointer refers to a live field of `values` of the
        // matching component type.
        let row = unsafe { self.archetypes[archetype_id.0].insert_entity_raw(entity, &payload)? };

        let meta = EntityMeta { archetype_id, row };
        self.entities.insert(entity, meta);
        Ok((entity, meta))
    }

    /// Spawn an entity whose components are default-initialised.
    pub fn create_entity_default<S: ComponentSet + Default>(
        &mut self,
    ) -> Result<(EntityId, EntityMeta)> {
        self.create_entity(S::default())
    }

    /// Spawn an entity with no components.
    pub fn create_empty_entity(&mut self) -> Result<(EntityId, EntityMeta)> {
        let archetype_id = self.get_or_create_archetype(Signature::new())?;
        let entity = self.allocator.allocate()?;
        // SAFETY: the empty archetype has no columns to read into.
        let row = unsafe { self.archetypes[archetype_id.0].insert_entity_raw(entity, &[])? };
        let meta = EntityMeta { archetype_id, row };
        self.entities.insert(entity, meta);
        Ok((entity, meta))
    }

    /// Destroy an entity.
    ///
    /// Unknown or already destroyed ids are ignored; returns whether anything
    /// was removed.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<bool> {
        let Some(&meta) = self.entities.get(entity) else {
            return Ok(false);
        };

        #[cfg(feature = "profiling")]
        let span = info_span!("world.destroy_entity", entity = entity.raw());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        // Meta is dropped only once the row is gone.
        let archetype = &mut self.archetypes[meta.archetype_id.0];
        if let Some(moved) = archetype.remove_entity(entity)? {
            if let Some(moved_meta) = self.entities.get_mut(moved.entity) {
                moved_meta.row = moved.row;
            }
        }
        self.entities.remove(entity);
        Ok(true)
    }

    /// Destroy several entities, returning how many existed.
    pub fn destroy_entities(&mut self, entities: &[EntityId]) -> Result<usize> {
        let mut destroyed = 0;
        for &entity in entities {
            if self.destroy_entity(entity)? {
                destroyed += 1;
            }
        }
        Ok(destroyed)
    }

    /// Add default-initialised components to an entity.
    ///
    /// Components the entity already has keep their values. Returns false if
    /// the entity is unknown or already has every component.
    pub fn add_components<S: ComponentSet + Default>(&mut self, entity: EntityId) -> Result<bool> {
        let ids = S::component_ids(&self.components)?;
        let Some(&meta) = self.entities.get(entity) else {
            return Ok(false);
        };

        #[cfg(feature = "profiling")]
        let span = info_span!(
            "world.add_components",
            entity = entity.raw(),
            components = ids.len()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let old_signature = self.archetypes[meta.archetype_id.0].signature().clone();
        let new_signature = old_signature.with(&ids);
        if new_signature == old_signature {
            return Ok(false);
        }

        let defaults = S::default();
        let fill: ColumnPayload = ids
            .iter()
            .copied()
            .zip(defaults.value_ptrs())
            .filter(|(id, _)| !old_signature.contains(*id))
            .collect();

        let destination = self.get_or_create_archetype(new_signature)?;
        // SAFETY: fill points into `defaults`, which outlives the move.
        unsafe { self.relocate(entity, meta, destination, &fill)? };
        Ok(true)
    }

    /// Set component values on an entity, adding any it lacks.
    ///
    /// Unlike [`World::add_components`] the values are written even when the
    /// entity already has the component. Fails with `EntityNotFound` for an
    /// unknown entity, since the values would otherwise be silently lost.
    pub fn insert_components<S: ComponentSet>(
        &mut self,
        entity: EntityId,
        values: S,
    ) -> Result<()> {
        let ids = S::component_ids(&self.components)?;
        let meta = *self
            .entities
            .get(entity)
            .ok_or(EcsError::EntityNotFound(entity))?;

        let fill: ColumnPayload = ids.iter().copied().zip(values.value_ptrs()).collect();
        let old_signature = self.archetypes[meta.archetype_id.0].signature().clone();
        let new_signature = old_signature.with(&ids);

        if new_signature == old_signature {
            let archetype = &self.archetypes[meta.archetype_id.0];
            for &(component, src) in &fill {
                let column = archetype.column(component).ok_or(EcsError::ComponentNotFound)?;
                let dst = column.ptr(meta.row)?;
                // SAFETY: src is a live value of this column's type; dst is in bounds.
                unsafe { ptr::copy_nonoverlapping(src, dst.as_ptr(), column.stride()) };
            }
            return Ok(());
        }

        let destination = self.get_or_create_archetype(new_signature)?;
        // SAFETY: fill points into `values`, which outlives the move.
        unsafe { self.relocate(entity, meta, destination, &fill) }?;
        Ok(())
    }

    /// Remove components from an entity.
    ///
    /// Components the entity does not have are ignored; returns whether the
    /// entity's signature changed.
    pub fn remove_components<S: ComponentSet>(&mut self, entity: EntityId) -> Result<bool> {
        let ids = S::component_ids(&self.components)?;
        let Some(&meta) = self.entities.get(entity) else {
            return Ok(false);
        };

        #[cfg(feature = "profiling")]
        let span = info_span!(
            "world.remove_components",
            entity = entity.raw(),
            components = ids.len()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let old_signature = self.archetypes[meta.archetype_id.0].signature();
        let new_signature = old_signature.without(&ids);
        if &new_signature == old_signature {
            return Ok(false);
        }

        let destination = self.get_or_create_archetype(new_signature)?;
        // SAFETY: no fill pointers; every destination column exists in the source.
        unsafe { self.relocate(entity, meta, destination, &[])? };
        Ok(true)
    }

    /// Move `entity` from its archetype into `destination`.
    ///
    /// Destination columns are filled from `fill` when listed there and from
    /// the entity's current row otherwise. The source row is then
    /// swap-removed and whichever entity took its place is repointed.
    ///
    /// # Safety
    /// Every pointer in `fill` must reference a valid value of its component.
    unsafe fn relocate(
        &mut self,
        entity: EntityId,
        meta: EntityMeta,
        destination: ArchetypeId,
        fill: &[(ComponentId, *const u8)],
    ) -> Result<EntityMeta> {
        if meta.archetype_id == destination {
            return Ok(meta);
        }

        let (source, target) =
            archetype_pair(&mut self.archetypes, meta.archetype_id.0, destination.0);

        let mut payload = ColumnPayload::new();
        for &component in target.signature().ids() {
            let src = match fill.iter().find(|(id, _)| *id == component) {
                Some(&(_, src)) => src,
                None => {
                    let column = source.column(component).ok_or_else(|| {
                        EcsError::InvalidSignature(format!(
                            "component {component} has no source during migration"
                        ))
                    })?;
                    column.ptr(meta.row)?.as_ptr() as *const u8
                }
            };
            payload.push((component, src));
        }

        let new_row = target.insert_entity_raw(entity, &payload)?;
        if let Some(moved) = source.remove_entity(entity)? {
            if let Some(moved_meta) = self.entities.get_mut(moved.entity) {
                moved_meta.row = moved.row;
            }
        }

        let new_meta = EntityMeta {
            archetype_id: destination,
            row: new_row,
        };
        self.entities.insert(entity, new_meta);
        Ok(new_meta)
    }

    /// Shared references to several components of one entity.
    ///
    /// `Ok(None)` when the entity is unknown or lacks any of them.
    pub fn get_components<S: ComponentSet>(&self, entity: EntityId) -> Result<Option<S::Refs<'_>>> {
        let ids = S::component_ids(&self.components)?;
        let Some(archetype) = self.archetype_for_entity(entity) else {
            return Ok(None);
        };
        let Ok(ptrs) = archetype.component_ptrs(entity, &ids) else {
            return Ok(None);
        };
        // SAFETY: ptrs match S's types in order and borrow from &self.
        let refs: S::Refs<'_> = unsafe { S::fetch(&ptrs) };
        Ok(Some(refs))
    }

    /// Exclusive references to several components of one entity.
    pub fn get_components_mut<S: ComponentSet>(
        &mut self,
        entity: EntityId,
    ) -> Result<Option<S::RefsMut<'_>>> {
        let ids = S::component_ids(&self.components)?;
        let Some(archetype) = self.archetype_for_entity(entity) else {
            return Ok(None);
        };
        let Ok(ptrs) = archetype.component_ptrs(entity, &ids) else {
            return Ok(None);
        };
        // SAFETY: ids are distinct, so the references never alias, and the
        // world is borrowed mutably for their lifetime.
        let refs: S::RefsMut<'_> = unsafe { S::fetch_mut(&ptrs) };
        Ok(Some(refs))
    }

    /// Get immutable reference to a component on an entity
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Result<Option<&T>> {
        Ok(self.get_components::<(T,)>(entity)?.map(|(component,)| component))
    }

    /// Get mutable reference to a component on an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Result<Option<&mut T>> {
        Ok(self
            .get_components_mut::<(T,)>(entity)?
            .map(|(component,)| component))
    }

    /// Check if entity has a specific component
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        match (self.components.id_of::<T>(), self.archetype_for_entity(entity)) {
            (Ok(id), Some(archetype)) => archetype.has_column(id),
            _ => false,
        }
    }

    /// View over the single archetype whose signature is exactly `S`.
    ///
    /// `Ok(None)` when that archetype does not exist or holds no rows.
    pub fn view_set<S: ComponentSet>(&mut self) -> Result<Option<View<'_, S>>> {
        let ids = S::component_ids(&self.components)?;
        let Some(&id) = self.archetype_index.get(&Signature::from_ids(&ids)) else {
            return Ok(None);
        };
        let archetype = &mut self.archetypes[id.0];
        if archetype.is_empty() {
            return Ok(None);
        }
        Ok(Some(View::new(vec![archetype], ids)))
    }

    /// View over every archetype containing at least the components of `S`,
    /// in archetype creation order.
    ///
    /// `Ok(None)` when no non-empty archetype matches.
    pub fn view_subset<S: ComponentSet>(&mut self) -> Result<Option<View<'_, S>>> {
        let ids = S::component_ids(&self.components)?;

        #[cfg(feature = "profiling")]
        let span = info_span!("world.view_subset", components = ids.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let mask = BitSet::from_ids(&ids);
        let matched: Vec<&mut Archetype> = self
            .archetypes
            .iter_mut()
            .filter(|archetype| !archetype.is_empty() && archetype.mask().is_superset_of(&mask))
            .collect();
        if matched.is_empty() {
            return Ok(None);
        }
        Ok(Some(View::new(matched, ids)))
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(entity)
    }

    /// Get entity location
    pub fn entity_meta(&self, entity: EntityId) -> Option<EntityMeta> {
        self.entities.get(entity).copied()
    }

    pub fn archetype_for_entity(&self, entity: EntityId) -> Option<&Archetype> {
        let meta = self.entities.get(entity)?;
        self.archetypes.get(meta.archetype_id.0)
    }

    /// Get archetype by ID
    pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id.0)
    }

    /// Get all archetypes
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Remove every entity.
    ///
    /// Registered components and archetypes (now empty) are kept, and entity
    /// ids keep counting up from where they were.
    pub fn clear(&mut self) {
        #[cfg(feature = "profiling")]
        let span = info_span!("world.clear", entities = self.entities.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        for archetype in &mut self.archetypes {
            archetype.clear();
        }
        self.entities.clear();
    }

    pub fn memory_usage_in_bytes(&self) -> usize {
        self.archetypes
            .iter()
            .map(Archetype::memory_usage_in_bytes)
            .sum::<usize>()
            + self.entities.memory_usage_in_bytes()
    }

    /// Check that every entity's metadata points at the row holding it, and
    /// that every archetype is internally consistent.
    pub fn is_consistent(&self) -> bool {
        let rows: usize = self.archetypes.iter().map(Archetype::len).sum();
        rows == self.entities.len()
            && self.archetypes.iter().all(Archetype::is_consistent)
            && self.entities.iter().all(|(entity, meta)| {
                self.archetypes
                    .get(meta.archetype_id.0)
                    .and_then(|archetype| archetype.entities().get(meta.row))
                    == Some(&entity)
            })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(ComponentRegistry::default())
    }
}

/// Two distinct archetypes borrowed mutably at once
fn archetype_pair(
    archetypes: &mut [Archetype],
    first: usize,
    second: usize,
) -> (&mut Archetype, &mut Archetype) {
    debug_assert_ne!(first, second);
    if first < second {
        let (left, right) = archetypes.split_at_mut(second);
        (&mut left[first], &mut right[0])
    } else {
        let (left, right) = archetypes.split_at_mut(first);
        (&mut right[0], &mut left[second])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Health(i32);

    fn world() -> World {
        let mut world = World::default();
        world.register_component::<Position>("Position").unwrap();
        world.register_component::<Velocity>("Velocity").unwrap();
        world.register_component::<Health>("Health").unwrap();
        world
    }

    #[test]
    fn test_create_records_meta() {
        let mut world = world();
        let (a, meta_a) = world.create_entity((Position { x: 1.0, y: 2.0 },)).unwrap();
        let (b, meta_b) = world.create_entity((Position::default(),)).unwrap();

        assert_ne!(a, b);
        assert_eq!(meta_a.row, 0);
        assert_eq!(meta_b.row, 1);
        assert_eq!(meta_a.archetype_id, meta_b.archetype_id);
        assert_eq!(world.entity_meta(a), Some(meta_a));
        assert!(world.is_consistent());
    }

    #[test]
    fn test_create_with_unregistered_fails_before_allocating() {
        #[derive(Clone, Copy)]
        struct Unknown;

        let mut world = world();
        assert!(matches!(
            world.create_entity((Unknown,)),
            Err(EcsError::Unregistered { .. })
        ));
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.archetype_count(), 0);
    }

    #[test]
    fn test_destroy_repoints_swapped_entity() {
        let mut world = world();
        let (a, _) = world.create_entity((Health(1),)).unwrap();
        let (_, _) = world.create_entity((Health(2),)).unwrap();
        let (c, _) = world.create_entity((Health(3),)).unwrap();

        assert!(world.destroy_entity(a).unwrap());
        assert_eq!(world.entity_meta(c).unwrap().row, 0);
        assert_eq!(world.get_component::<Health>(c).unwrap(), Some(&Health(3)));
        assert!(world.is_consistent());

        assert!(!world.destroy_entity(a).unwrap());
        assert!(!world.destroy_entity(EntityId::from_raw(99_999)).unwrap());
    }

    #[test]
    fn test_failed_row_removal_keeps_meta() {
        let mut world = world();
        let (e, meta) = world.create_entity((Health(1),)).unwrap();
        world.archetypes[meta.archetype_id.0].remove_entity(e).unwrap();

        assert_eq!(world.destroy_entity(e), Err(EcsError::EntityNotFound(e)));
        assert_eq!(world.entity_meta(e), Some(meta));
    }

    #[test]
    fn test_create_destroy_churn_keeps_memory_flat() {
        let mut world = world();
        let mut samples = Vec::new();
        for _ in 0..4 {
            for _ in 0..20_000 {
                let (e, _) = world.create_entity((Health(0),)).unwrap();
                world.destroy_entity(e).unwrap();
            }
            assert_eq!(world.entity_count(), 0);
            samples.push(world.memory_usage_in_bytes());
        }
        assert!(samples.windows(2).all(|pair| pair[0] == pair[1]), "{samples:?}");
    }

    #[test]
    fn test_churn_without_reclaim_retains_pages() {
        let config = WorldConfig {
            reclaim_empty_pages: false,
            ..WorldConfig::default()
        };
        let mut world = World::with_config(ComponentRegistry::default(), config).unwrap();
        world.register_component::<Health>("Health").unwrap();
        let (first, _) = world.create_entity((Health(0),)).unwrap();
        world.destroy_entity(first).unwrap();
        let baseline = world.memory_usage_in_bytes();
        for _ in 0..1_000 {
            let (e, _) = world.create_entity((Health(0),)).unwrap();
            world.destroy_entity(e).unwrap();
        }
        assert!(world.memory_usage_in_bytes() > baseline);
    }

    #[test]
    fn test_add_components_keeps_existing_values() {
        let mut world = world();
        let (e, _) = world.create_entity((Position { x: 5.0, y: 6.0 },)).unwrap();

        assert!(world.add_components::<(Position, Velocity)>(e).unwrap());
        assert_eq!(
            world.get_component::<Position>(e).unwrap(),
            Some(&Position { x: 5.0, y: 6.0 })
        );
        assert_eq!(
            world.get_component::<Velocity>(e).unwrap(),
            Some(&Velocity::default())
        );
        assert!(!world.add_components::<(Velocity,)>(e).unwrap());
        assert!(world.is_consistent());
    }

    #[test]
    fn test_insert_components_overwrites_and_migrates() {
        let mut world = world();
        let (e, _) = world.create_entity((Health(10),)).unwrap();

        world.insert_components(e, (Health(20),)).unwrap();
        assert_eq!(world.get_component::<Health>(e).unwrap(), Some(&Health(20)));
        assert_eq!(world.archetype_count(), 1);

        world
            .insert_components(e, (Health(30), Velocity { dx: 1.0, dy: 1.0 }))
            .unwrap();
        assert_eq!(world.get_component::<Health>(e).unwrap(), Some(&Health(30)));
        assert_eq!(
            world.get_component::<Velocity>(e).unwrap(),
            Some(&Velocity { dx: 1.0, dy: 1.0 })
        );
        assert_eq!(world.archetype_count(), 2);

        assert_eq!(
            world.insert_components(EntityId::from_raw(77), (Health(1),)),
            Err(EcsError::EntityNotFound(EntityId::from_raw(77)))
        );
    }

    #[test]
    fn test_remove_components_is_idempotent() {
        let mut world = world();
        let (e, _) = world
            .create_entity((Position::default(), Velocity::default()))
            .unwrap();

        assert!(world.remove_components::<(Velocity,)>(e).unwrap());
        assert!(!world.remove_components::<(Velocity,)>(e).unwrap());
        assert!(!world.remove_components::<(Health,)>(e).unwrap());
        assert!(world.has_component::<Position>(e));
        assert!(!world.has_component::<Velocity>(e));
        assert!(world.is_consistent());
    }

    #[test]
    fn test_remove_all_components_lands_in_empty_archetype() {
        let mut world = world();
        let (e, _) = world.create_entity((Health(4),)).unwrap();
        world.remove_components::<(Health,)>(e).unwrap();

        let archetype = world.archetype_for_entity(e).unwrap();
        assert!(archetype.signature().is_empty());
        assert!(world.contains(e));
    }

    #[test]
    fn test_get_components_mut_writes_through() {
        let mut world = world();
        let (e, _) = world
            .create_entity((Position::default(), Health(1)))
            .unwrap();

        if let Some((pos, health)) = world.get_components_mut::<(Position, Health)>(e).unwrap() {
            pos.x = 9.0;
            health.0 = 50;
        }
        assert_eq!(
            world.get_components::<(Health, Position)>(e).unwrap(),
            Some((&Health(50), &Position { x: 9.0, y: 0.0 }))
        );
        assert!(world.get_components::<(Velocity,)>(e).unwrap().is_none());
    }

    #[test]
    fn test_clear_keeps_archetypes_and_registrations() {
        let mut world = world();
        for _ in 0..5 {
            world.create_entity((Health(0),)).unwrap();
        }
        let (last, _) = world.create_entity((Position::default(),)).unwrap();
        world.clear();

        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.archetype_count(), 2);
        assert!(world.components().is_registered::<Health>());
        assert!(world.view_subset::<(Health,)>().unwrap().is_none());

        let (fresh, _) = world.create_entity((Health(1),)).unwrap();
        assert!(fresh > last);
        assert!(world.is_consistent());
    }

    #[test]
    fn test_from_config_sizes_registry() {
        let config = WorldConfig {
            component_capacity: 1,
            sparse_page_size: 8,
            ..WorldConfig::default()
        };
        let mut world = World::from_config(config).unwrap();
        world.register_component::<Health>("Health").unwrap();
        assert_eq!(
            world.register_component::<Position>("Position"),
            Err(EcsError::ComponentCapacityExceeded { capacity: 1 })
        );
    }
}
