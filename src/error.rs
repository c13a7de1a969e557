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

//! Error types

use std::fmt;

use crate::entity::EntityId;

/// ECS error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Component shape was never passed to `register_component`
    Unregistered { type_name: &'static str },

    /// Entity not found
    EntityNotFound(EntityId),

    /// Component not found
    ComponentNotFound,

    /// Bounds violation inside a store or sparse set
    IndexOutOfRange { index: usize, len: usize },

    /// Row payload does not match the archetype's columns
    InvalidSignature(String),

    /// The same component shape appears twice in one set
    DuplicateComponent { type_name: &'static str },

    /// Component registry is full
    ComponentCapacityExceeded { capacity: usize },

    /// Entity id space exhausted
    EntityCapacityExhausted,

    /// Payload length differs from the store stride
    StrideMismatch { expected: usize, actual: usize },

    /// Invalid configuration
    Config(String),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::Unregistered { type_name } => {
                write!(f, "Component not registered: {type_name}")
            }
            EcsError::EntityNotFound(entity) => write!(f, "Entity not found: {entity}"),
            EcsError::ComponentNotFound => write!(f, "Component not found"),
            EcsError::IndexOutOfRange { index, len } => {
                write!(f, "Index {index} out of range (len {len})")
            }
            EcsError::InvalidSignature(msg) => write!(f, "Invalid signature: {msg}"),
            EcsError::DuplicateComponent { type_name } => {
                write!(f, "Component listed more than once: {type_name}")
            }
            EcsError::ComponentCapacityExceeded { capacity } => {
                write!(f, "Exceeded maximum number of components ({capacity})")
            }
            EcsError::EntityCapacityExhausted => write!(f, "Entity id space exhausted"),
            EcsError::StrideMismatch { expected, actual } => {
                write!(f, "Stride mismatch: expected {expected} bytes, got {actual}")
            }
            EcsError::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<serde_json::Error> for EcsError {
    fn from(err: serde_json::Error) -> Self {
        EcsError::Config(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
