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

//! Views over one or many archetypes
//!
//! A [`View`] is produced by [`World::view_set`](crate::World::view_set) or
//! [`World::view_subset`](crate::World::view_subset). It holds the world's
//! archetypes mutably for its whole lifetime, which is what rules out
//! structural changes (spawn, destroy, add/remove components) mid-iteration.

use std::marker::PhantomData;
use std::ptr::NonNull;

use smallvec::SmallVec;

use crate::archetype::{Archetype, ArchetypeId, RowPtrs};
use crate::component::{ComponentId, ComponentIds, ComponentSet, MAX_SET_COMPONENTS};
use crate::entity::{EntityId, EntityMeta};
use crate::error::Result;

/// Mutable iteration handle over every archetype matching a query.
///
/// Archetypes are visited in creation order, rows from 0 upward.
pub struct View<'w, S: ComponentSet> {
    archetypes: Vec<&'w mut Archetype>,
    components: ComponentIds,
    _phantom: PhantomData<S>,
}

impl<'w, S: ComponentSet> View<'w, S> {
    /// Every archetype passed in must hold a column for each of `components`.
    pub(crate) fn new(archetypes: Vec<&'w mut Archetype>, components: ComponentIds) -> Self {
        Self {
            archetypes,
            components,
            _phantom: PhantomData,
        }
    }

    /// Call `visitor` once per matching row.
    pub fn for_each<'v, F>(&'v mut self, mut visitor: F) -> Result<()>
    where
        F: FnMut(EntityId, EntityMeta, S::RefsMut<'v>),
    {
        let components = &self.components;
        for archetype in self.archetypes.iter_mut() {
            archetype.for_each_row(components, |entity, meta, ptrs| {
                // SAFETY: the pointers address distinct rows of columns whose
                // types match S, and `self` is borrowed mutably for 'v.
                let refs: S::RefsMut<'v> = unsafe { S::fetch_mut(ptrs) };
                visitor(entity, meta, refs);
            })?;
        }
        Ok(())
    }

    /// Borrowing iterator yielding `(entity, meta, components)`
    pub fn iter_mut(&mut self) -> ViewIter<'_, S> {
        let tables: Vec<Table<'_>> = self
            .archetypes
            .iter()
            .filter_map(|archetype| Table::new(archetype, &self.components))
            .collect();
        let remaining = tables.iter().map(|table| table.entities.len()).sum();
        ViewIter {
            tables,
            table: 0,
            row: 0,
            remaining,
            _phantom: PhantomData,
        }
    }

    /// Number of rows the view will visit
    pub fn len(&self) -> usize {
        self.archetypes.iter().map(|archetype| archetype.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of archetypes backing the view
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }
}

struct Table<'v> {
    id: ArchetypeId,
    entities: &'v [EntityId],
    bases: SmallVec<[(NonNull<u8>, usize); MAX_SET_COMPONENTS]>,
}

impl<'v> Table<'v> {
    fn new(archetype: &'v Archetype, components: &[ComponentId]) -> Option<Self> {
        let mut bases = SmallVec::new();
        for component in components {
            let column = archetype.column(*component)?;
            // SAFETY: index 0 is at most one past the end and only read when rows exist.
            bases.push((unsafe { column.ptr_unchecked(0) }, column.stride()));
        }
        Some(Self {
            id: archetype.id(),
            entities: archetype.entities(),
            bases,
        })
    }
}

/// Iterator over the rows of a [`View`]
pub struct ViewIter<'v, S: ComponentSet> {
    tables: Vec<Table<'v>>,
    table: usize,
    row: usize,
    remaining: usize,
    _phantom: PhantomData<S>,
}

impl<'v, S: ComponentSet> Iterator for ViewIter<'v, S> {
    type Item = (EntityId, EntityMeta, S::RefsMut<'v>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let table = self.tables.get(self.table)?;
            if self.row < table.entities.len() {
                let row = self.row;
                self.row += 1;
                self.remaining -= 1;

                let ptrs: RowPtrs = table
                    .bases
                    .iter()
                    // SAFETY: row < len of every column in this archetype.
                    .map(|&(base, stride)| unsafe {
                        NonNull::new_unchecked(base.as_ptr().add(row * stride))
                    })
                    .collect();
                // SAFETY: each row is yielded once, and the view is borrowed
                // mutably for 'v, so the references never alias.
                let refs: S::RefsMut<'v> = unsafe { S::fetch_mut(&ptrs) };
                let meta = EntityMeta {
                    archetype_id: table.id,
                    row,
                };
                return Some((table.entities[row], meta, refs));
            }

            self.table += 1;
            self.row = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'v, S: ComponentSet> ExactSizeIterator for ViewIter<'v, S> {}
