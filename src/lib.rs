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

//! Tessera ECS - Archetype entity/component storage
//!
//! Entities are grouped by the exact set of components they carry. Each
//! group (an [`Archetype`]) stores its components column by column in
//! type-erased [`ComponentStore`]s, and every id-to-row lookup goes through a
//! [`PagedSparseSet`].

pub mod archetype;
pub mod bitset;
pub mod component;
pub mod config;
pub mod debug;
pub mod entity;
pub mod error;
pub mod prelude;
pub mod profiling;
pub mod query;
pub mod sparse_set;
pub mod storage;
pub mod world;


pub use archetype::*;
pub use component::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use query::*;
pub use sparse_set::*;
pub use storage::*;
pub use world::*;
