//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use tessera_ecs::prelude::*;
//! ```

pub use crate::archetype::{Archetype, ArchetypeId, Signature};
pub use crate::component::{Component, ComponentId, ComponentRegistry, ComponentSet};
pub use crate::config::WorldConfig;
pub use crate::debug::{MemoryStats, WorldInspector};
pub use crate::entity::{EntityId, EntityMeta};
pub use crate::error::{EcsError, Result};
pub use crate::query::View;
pub use crate::world::World;
