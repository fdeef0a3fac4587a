//! Flight

use serde::{Deserialize, Serialize};

use super::block::Block;
use crate::query::{EntitySchema, FieldDescriptor, ValueKind};

/// A stored flight. `blocks` is filled only when a single flight is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub name: String,
    /// Unix seconds
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

/// Creation payload for `POST /flights`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightCreate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl EntitySchema for Flight {
    const ENTITY: &'static str = "flight";
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::new("id", ValueKind::Integer),
        FieldDescriptor::new("name", ValueKind::String),
        FieldDescriptor::new("created_at", ValueKind::Integer),
    ];
}
