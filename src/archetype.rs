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

//! Archetype storage with row allocation and removal

use std::fmt;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::bitset::BitSet;
use crate::component::{ComponentId, ComponentRegistry, MAX_SET_COMPONENTS};
use crate::config::WorldConfig;
use crate::entity::{EntityId, EntityMeta};
use crate::error::{EcsError, Result};
use crate::sparse_set::PagedSparseSet;
use crate::storage::ComponentStore;

/// Row pointers for one entity, one per requested column
pub type RowPtrs = SmallVec<[NonNull<u8>; MAX_SET_COMPONENTS]>;

/// Index of an archetype in its world, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchetypeId(pub(crate) usize);

impl ArchetypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Component signature: sorted, duplicate-free component ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature(SmallVec<[ComponentId; 8]>);

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a signature from ids in any order; duplicates collapse.
    pub fn from_ids(ids: &[ComponentId]) -> Self {
        let mut sorted: SmallVec<[ComponentId; 8]> = SmallVec::from_slice(ids);
        sorted.sort_unstable();
        sorted.dedup();
        Self(sorted)
    }

    pub fn ids(&self) -> &[ComponentId] {
        &self.0
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This signature plus `ids`
    pub fn with(&self, ids: &[ComponentId]) -> Self {
        let mut all: SmallVec<[ComponentId; 8]> = self.0.clone();
        all.extend_from_slice(ids);
        Self::from_ids(&all)
    }

    /// This signature minus `ids`
    pub fn without(&self, ids: &[ComponentId]) -> Self {
        Self(self.0.iter().copied().filter(|id| !ids.contains(id)).collect())
    }

    pub fn is_superset_of(&self, other: &Signature) -> bool {
        other.0.iter().all(|id| self.contains(*id))
    }
}

/// Entity that changed row during a swap-removal, and the row it now occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMove {
    pub entity: EntityId,
    pub row: usize,
}

/// Archetype: Structure of Arrays storage
///
/// One [`ComponentStore`] per component in the signature, a parallel entity
/// column, and a sparse index from entity to row. For every row `r`,
/// `entities[r]` owns that row in every column.
pub struct Archetype {
    id: ArchetypeId,
    signature: Signature,
    mask: BitSet,
    columns: Vec<ComponentStore>,
    column_indices: FxHashMap<ComponentId, usize>,
    entities: Vec<EntityId>,
    rows: PagedSparseSet<EntityId, usize>,
}

impl Archetype {
    /// Create an archetype whose columns are laid out from `registry`.
    ///
    /// Row capacity and the row index's paging come from `config`.
    pub fn new(
        id: ArchetypeId,
        signature: Signature,
        registry: &ComponentRegistry,
        config: &WorldConfig,
    ) -> Result<Self> {
        let row_capacity = config.archetype_row_capacity;
        let mut columns = Vec::with_capacity(signature.len());
        let mut column_indices = FxHashMap::default();
        for (index, &component) in signature.ids().iter().enumerate() {
            let layout = registry.layout_of(component)?;
            columns.push(ComponentStore::new(layout, row_capacity));
            column_indices.insert(component, index);
        }

        Ok(Self {
            id,
            mask: BitSet::from_ids(signature.ids()),
            signature,
            columns,
            column_indices,
            entities: Vec::with_capacity(row_capacity),
            rows: PagedSparseSet::with_page_size(config.sparse_page_size)
                .reclaim_empty_pages(config.reclaim_empty_pages),
        })
    }

    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    /// Get signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn mask(&self) -> &BitSet {
        &self.mask
    }

    /// Insert a row for `entity`, copying one payload per column.
    ///
    /// `columns` must name every column of this archetype exactly once, in
    /// any order; otherwise `InvalidSignature` is returned and nothing changes.
    ///
    /// # Safety
    /// Each pointer must be valid for reads of its column's stride and point
    /// at a valid value of that component type.
    pub unsafe fn insert_entity_raw(
        &mut self,
        entity: EntityId,
        columns: &[(ComponentId, *const u8)],
    ) -> Result<usize> {
        self.check_payload(entity, columns.iter().map(|(id, _)| *id))?;

        let row = self.entities.len();
        for &(component, src) in columns {
            let index = self.column_indices[&component];
            self.columns[index].push_raw(src);
        }
        self.entities.push(entity);
        self.rows.insert(entity, row);
        Ok(row)
    }

    /// Safe variant of [`Archetype::insert_entity_raw`] taking byte payloads.
    pub fn insert_entity(
        &mut self,
        entity: EntityId,
        columns: &[(ComponentId, &[u8])],
    ) -> Result<usize> {
        self.check_payload(entity, columns.iter().map(|(id, _)| *id))?;
        for (component, bytes) in columns {
            let stride = self.columns[self.column_indices[component]].stride();
            if bytes.len() != stride {
                return Err(EcsError::StrideMismatch {
                    expected: stride,
                    actual: bytes.len(),
                });
            }
        }

        let raw: SmallVec<[(ComponentId, *const u8); MAX_SET_COMPONENTS]> = columns
            .iter()
            .map(|(component, bytes)| (*component, bytes.as_ptr()))
            .collect();
        // SAFETY: each slice holds exactly one stride of readable bytes.
        unsafe { self.insert_entity_raw(entity, &raw) }
    }

    fn check_payload(
        &self,
        entity: EntityId,
        components: impl ExactSizeIterator<Item = ComponentId>,
    ) -> Result<()> {
        if self.rows.contains(entity) {
            return Err(EcsError::InvalidSignature(format!(
                "entity {entity} already stored in archetype {}",
                self.id
            )));
        }
        if components.len() != self.columns.len() {
            return Err(EcsError::InvalidSignature(format!(
                "expected {} columns, got {}",
                self.columns.len(),
                components.len()
            )));
        }
        let mut seen = BitSet::default();
        for component in components {
            if !self.column_indices.contains_key(&component) || seen.contains(component as usize)
            {
                return Err(EcsError::InvalidSignature(format!(
                    "component {component} does not match archetype {}",
                    self.id
                )));
            }
            seen.set(component as usize);
        }
        Ok(())
    }

    /// Remove `entity`'s row by swap-removal.
    ///
    /// Returns the entity that was moved into the freed row, if any, so the
    /// caller can repoint its metadata.
    pub fn remove_entity(&mut self, entity: EntityId) -> Result<Option<RowMove>> {
        let row = *self
            .rows
            .get(entity)
            .ok_or(EcsError::EntityNotFound(entity))?;
        let last = self.entities.len() - 1;

        // Owner of the last row must be captured before the columns shift.
        let moved_entity = (row != last).then(|| self.entities[last]);

        for column in &mut self.columns {
            column.swap_remove(row)?;
        }
        self.entities.swap_remove(row);

        if let Some(moved) = moved_entity {
            self.rows.insert(moved, row);
        }
        self.rows.remove(entity);

        Ok(moved_entity.map(|entity| RowMove { entity, row }))
    }

    pub fn row_of(&self, entity: EntityId) -> Option<usize> {
        self.rows.get(entity).copied()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.rows.contains(entity)
    }

    /// Resolve `entity`'s row once and return one pointer per requested column.
    pub fn component_ptrs(&self, entity: EntityId, components: &[ComponentId]) -> Result<RowPtrs> {
        let row = self.row_of(entity).ok_or(EcsError::EntityNotFound(entity))?;
        self.row_ptrs(row, components)
    }

    /// Pointers into `row` for each requested column
    pub fn row_ptrs(&self, row: usize, components: &[ComponentId]) -> Result<RowPtrs> {
        components
            .iter()
            .map(|component| {
                let column = self.column(*component).ok_or(EcsError::ComponentNotFound)?;
                column.ptr(row)
            })
            .collect()
    }

    /// Sequential scan over every row, handing the visitor one pointer per
    /// requested column.
    ///
    /// The archetype is mutably borrowed for the whole scan, so rows cannot
    /// be added or removed while it runs.
    pub fn for_each_row<F>(&mut self, components: &[ComponentId], mut visitor: F) -> Result<()>
    where
        F: FnMut(EntityId, EntityMeta, &[NonNull<u8>]),
    {
        let mut bases: SmallVec<[(NonNull<u8>, usize); MAX_SET_COMPONENTS]> = SmallVec::new();
        for component in components {
            let column = self.column(*component).ok_or(EcsError::ComponentNotFound)?;
            // SAFETY: index 0 is at most one past the end, never dereferenced when empty.
            bases.push((unsafe { column.ptr_unchecked(0) }, column.stride()));
        }

        let mut ptrs: RowPtrs = SmallVec::with_capacity(bases.len());
        for (row, &entity) in self.entities.iter().enumerate() {
            ptrs.clear();
            for &(base, stride) in &bases {
                // SAFETY: row < len for every column (columns match the entity column).
                ptrs.push(unsafe { NonNull::new_unchecked(base.as_ptr().add(row * stride)) });
            }
            let meta = EntityMeta {
                archetype_id: self.id,
                row,
            };
            visitor(entity, meta, &ptrs);
        }
        Ok(())
    }

    /// Get column immutably
    pub fn column(&self, component: ComponentId) -> Option<&ComponentStore> {
        let index = *self.column_indices.get(&component)?;
        self.columns.get(index)
    }

    pub fn has_column(&self, component: ComponentId) -> bool {
        self.column_indices.contains_key(&component)
    }

    /// Get all entities
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if archetype is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drop every row, keeping the columns and their capacity.
    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
        self.entities.clear();
        self.rows.clear();
    }

    /// Row/column invariants: equal column lengths and an index that agrees
    /// with the entity column.
    pub fn is_consistent(&self) -> bool {
        self.columns
            .iter()
            .all(|column| column.len() == self.entities.len())
            && self.rows.len() == self.entities.len()
            && self
                .entities
                .iter()
                .enumerate()
                .all(|(row, entity)| self.row_of(*entity) == Some(row))
    }

    pub fn memory_usage_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .columns
                .iter()
                .map(ComponentStore::memory_usage_in_bytes)
                .sum::<usize>()
            + self.entities.capacity() * std::mem::size_of::<EntityId>()
            + self.rows.memory_usage_in_bytes()
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("len", &self.entities.len())
            .finish()
    }
}
