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

//! Components, the component registry and component sets
//!
//! Components are plain data attached to entities. The registry hands each
//! component type a small stable [`ComponentId`] and remembers its layout.
//! Component sets (tuples of components) drive spawning, structural changes
//! and queries.

use std::alloc::Layout;
use std::any::{type_name, TypeId};
use std::ptr::NonNull;

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::error::{EcsError, Result};

/// Maximum number of components in one [`ComponentSet`] tuple
pub const MAX_SET_COMPONENTS: usize = 8;

/// Default registry capacity
pub const DEFAULT_COMPONENT_CAPACITY: usize = 64;

/// Small integer identifying a registered component type
pub type ComponentId = u32;

/// Ids of a component set, in declaration order
pub type ComponentIds = SmallVec<[ComponentId; MAX_SET_COMPONENTS]>;

/// Marker trait for components
///
/// Rows are relocated between archetypes as raw bytes and never dropped in
/// place, so components must be `Copy`.
pub trait Component: Copy + Send + Sync + 'static {}

impl<T: Copy + Send + Sync + 'static> Component for T {}

/// Registration record for one component type
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    pub id: ComponentId,
    pub name: String,
    pub type_id: TypeId,
    pub layout: Layout,
}

impl ComponentInfo {
    /// Bytes reserved per row, padded to alignment
    pub fn stride(&self) -> usize {
        self.layout.pad_to_align().size()
    }

    pub fn align(&self) -> usize {
        self.layout.align()
    }
}

/// Assigns stable ids to component types.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    capacity: usize,
    type_to_id: FxHashMap<TypeId, ComponentId>,
    infos: Vec<ComponentInfo>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_COMPONENT_CAPACITY)
    }
}

impl ComponentRegistry {
    /// Create a registry accepting at most `capacity` component types.
    pub fn new(capacity: usize) -> Self {
        let mut type_to_id = FxHashMap::default();
        type_to_id.reserve(capacity);
        Self {
            capacity,
            type_to_id,
            infos: Vec::with_capacity(capacity),
        }
    }

    /// Register `T` under a diagnostic `name`.
    ///
    /// Registering the same type again returns its existing id.
    pub fn register_component<T: Component>(&mut self, name: &str) -> Result<ComponentId> {
        if let Some(&id) = self.type_to_id.get(&TypeId::of::<T>()) {
            return Ok(id);
        }
        if self.infos.len() >= self.capacity {
            return Err(EcsError::ComponentCapacityExceeded {
                capacity: self.capacity,
            });
        }

        let id = self.infos.len() as ComponentId;
        self.type_to_id.insert(TypeId::of::<T>(), id);
        self.infos.push(ComponentInfo {
            id,
            name: name.to_owned(),
            type_id: TypeId::of::<T>(),
            layout: Layout::new::<T>(),
        });
        Ok(id)
    }

    /// Register `T` using its Rust type name
    pub fn register<T: Component>(&mut self) -> Result<ComponentId> {
        self.register_component::<T>(type_name::<T>())
    }

    /// Id of `T`, or [`EcsError::Unregistered`]
    pub fn id_of<T: Component>(&self) -> Result<ComponentId> {
        self.type_to_id
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(EcsError::Unregistered {
                type_name: type_name::<T>(),
            })
    }

    pub fn is_registered<T: Component>(&self) -> bool {
        self.type_to_id.contains_key(&TypeId::of::<T>())
    }

    pub fn info(&self, id: ComponentId) -> Result<&ComponentInfo> {
        self.infos
            .get(id as usize)
            .ok_or(EcsError::IndexOutOfRange {
                index: id as usize,
                len: self.infos.len(),
            })
    }

    /// Row stride reserved for component `id`
    pub fn stride_of(&self, id: ComponentId) -> Result<usize> {
        self.info(id).map(ComponentInfo::stride)
    }

    pub fn layout_of(&self, id: ComponentId) -> Result<Layout> {
        self.info(id).map(|info| info.layout)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.infos.iter()
    }
}

/// Tuple of distinct component types.
///
/// Used to spawn entities, to add or remove components, and to describe
/// which columns a view or lookup should return.
///
/// # Safety
/// `component_ids`, `value_ptrs` and the fetch functions must all describe
/// the same component types in the same order.
pub unsafe trait ComponentSet: Sized + 'static {
    /// Shared references, one per component
    type Refs<'a>;
    /// Exclusive references, one per component
    type RefsMut<'a>;

    /// Number of components in the set
    const LEN: usize;

    /// Registered ids in declaration order.
    ///
    /// Fails with `Unregistered` if any type is unknown and with
    /// `DuplicateComponent` if a type repeats.
    fn component_ids(registry: &ComponentRegistry) -> Result<ComponentIds>;

    /// Pointers to each component value of `self`, in declaration order
    fn value_ptrs(&self) -> SmallVec<[*const u8; MAX_SET_COMPONENTS]>;

    /// # Safety
    /// `ptrs` must hold one valid, aligned pointer per component, in
    /// declaration order, live for `'a`.
    unsafe fn fetch<'a>(ptrs: &[NonNull<u8>]) -> Self::Refs<'a>;

    /// # Safety
    /// As [`ComponentSet::fetch`], plus no other reference to those rows may
    /// exist for `'a`.
    unsafe fn fetch_mut<'a>(ptrs: &[NonNull<u8>]) -> Self::RefsMut<'a>;
}

fn ensure_distinct(ids: &[ComponentId], names: &[&'static str]) -> Result<()> {
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Err(EcsError::DuplicateComponent {
                type_name: names[i],
            });
        }
    }
    Ok(())
}

macro_rules! impl_component_set {
    ($($T:ident => $idx:tt),*) => {
        unsafe impl<$($T: Component),*> ComponentSet for ($($T,)*) {
            type Refs<'a> = ($(&'a $T,)*);
            type RefsMut<'a> = ($(&'a mut $T,)*);

            const LEN: usize = [$(stringify!($T)),*].len();

            fn component_ids(registry: &ComponentRegistry) -> Result<ComponentIds> {
                let ids: ComponentIds = smallvec![$(registry.id_of::<$T>()?),*];
                ensure_distinct(&ids, &[$(type_name::<$T>()),*])?;
                Ok(ids)
            }

            fn value_ptrs(&self) -> SmallVec<[*const u8; MAX_SET_COMPONENTS]> {
                smallvec![$(&self.$idx as *const $T as *const u8),*]
            }

            unsafe fn fetch<'a>(ptrs: &[NonNull<u8>]) -> Self::Refs<'a> {
                ($(&*(ptrs[$idx].as_ptr() as *const $T),)*)
            }

            unsafe fn fetch_mut<'a>(ptrs: &[NonNull<u8>]) -> Self::RefsMut<'a> {
                ($(&mut *(ptrs[$idx].as_ptr() as *mut $T),)*)
            }
        }
    };
}

// Implement for tuples of 1-8 components
impl_component_set!(A => 0);
impl_component_set!(A => 0, B => 1);
impl_component_set!(A => 0, B => 1, C => 2);
impl_component_set!(A => 0, B => 1, C => 2, D => 3);
impl_component_set!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_component_set!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_component_set!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_component_set!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);
