//! Read-only view over the host application's reactive data tree.
//!
//! The fetch cascade resolves the entity backing a form by name and reads
//! already-evaluated values out of its configuration subtree. Lookups go
//! through [`lookup_path`], which walks a dotted path and returns an explicit
//! `Option` instead of a missing-value sentinel.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Entity state resolved from the data tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityState {
    pub name: String,
    /// The entity's stored-configuration shape with evaluated values.
    pub evaluated_values: Value,
}

impl EntityState {
    pub fn new(name: impl Into<String>, evaluated_values: Value) -> Self {
        EntityState {
            name: name.into(),
            evaluated_values,
        }
    }
}

/// The shared reactive data tree (external collaborator).
pub trait DataTree: Send + Sync {
    /// Resolve an entity by name.
    fn lookup(&self, entity_name: &str) -> Option<EntityState>;
}

/// RwLock-backed in-memory data tree for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryDataTree {
    entities: RwLock<HashMap<String, EntityState>>,
}

impl InMemoryDataTree {
    pub fn new() -> Self {
        InMemoryDataTree::default()
    }

    pub fn insert(&self, entity: EntityState) {
        self.entities.write().insert(entity.name.clone(), entity);
    }

    pub fn remove(&self, entity_name: &str) {
        self.entities.write().remove(entity_name);
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}

impl DataTree for InMemoryDataTree {
    fn lookup(&self, entity_name: &str) -> Option<EntityState> {
        self.entities.read().get(entity_name).cloned()
    }
}

/// Walk `root` along a dot-separated path.
///
/// Object segments index by key; array segments index by parsed position.
/// Any shape mismatch or missing segment yields `None`.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}
