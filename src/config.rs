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

//! World construction settings

use serde::{Deserialize, Serialize};

use crate::component::DEFAULT_COMPONENT_CAPACITY;
use crate::error::{EcsError, Result};
use crate::sparse_set::DEFAULT_PAGE_SIZE;

/// Tunables for a [`World`](crate::World). All fields are optional in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum number of component types the registry accepts
    pub component_capacity: usize,
    /// Keys per page in every paged sparse set the world creates
    pub sparse_page_size: usize,
    /// Rows reserved up front in each new archetype
    pub archetype_row_capacity: usize,
    /// Expected entity count, used to pre-size the entity index
    pub entity_capacity_hint: usize,
    /// Free sparse index pages once their last entity is removed
    pub reclaim_empty_pages: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            component_capacity: DEFAULT_COMPONENT_CAPACITY,
            sparse_page_size: DEFAULT_PAGE_SIZE,
            archetype_row_capacity: 64,
            entity_capacity_hint: 0,
            reclaim_empty_pages: true,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sparse_page_size == 0 {
            return Err(EcsError::Config("sparse_page_size must be non-zero".into()));
        }
        if self.component_capacity == 0 {
            return Err(EcsError::Config("component_capacity must be non-zero".into()));
        }
        Ok(())
    }
}
