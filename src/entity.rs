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

//! Entity identifiers and location metadata.

use std::fmt;

use crate::archetype::ArchetypeId;
use crate::error::{EcsError, Result};
use crate::sparse_set::SparseKey;

/// Opaque entity identifier.
///
/// Ids are handed out in increasing order and are not recycled, so there is
/// no generation field. A handle kept after `destroy_entity` simply stops
/// resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Build an id from its raw index. Mostly useful in tests and tooling.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SparseKey for EntityId {
    #[inline]
    fn to_index(self) -> usize {
        self.0 as usize
    }
}

/// Entity location in archetype (archetype_id, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMeta {
    pub archetype_id: ArchetypeId,
    pub row: usize,
}

/// Monotonic id source owned by the world.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id, failing once the `u32` space is used up.
    pub fn allocate(&mut self) -> Result<EntityId> {
        let id = self.next;
        self.next = self
            .next
            .checked_add(1)
            .ok_or(EcsError::EntityCapacityExhausted)?;
        Ok(EntityId(id))
    }

    /// Number of ids issued so far
    pub fn issued(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate().unwrap();
        let b = alloc.allocate().unwrap();
        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);
        assert_eq!(alloc.issued(), 2);
    }

    #[test]
    fn test_allocator_exhaustion() {
        let mut alloc = EntityAllocator { next: u32::MAX };
        assert_eq!(alloc.allocate(), Err(EcsError::EntityCapacityExhausted));
    }
}
