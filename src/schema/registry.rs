//! Schema registry
//!
//! Maps an entity type to the schema all its instances share. A schema is
//! built at most once per type and is immutable once installed; instances
//! that need local changes fork a private copy (see [`Model::schema_mutate`]).
//!
//! [`Model::schema_mutate`]: crate::model::Model::schema_mutate

use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::types::Schema;
use crate::model::EntityType;
use crate::observability::{Event, Logger};

static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();

/// Entity type → shared schema
///
/// Clones are handles onto the same table.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Arc<RwLock<HashMap<TypeId, Arc<Schema>>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by [`Model::make`](crate::model::Model::make)
    pub fn global() -> &'static SchemaRegistry {
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    /// Returns the shared schema for `entity`, building it on first use.
    ///
    /// The declaration callback runs outside the lock. When two callers
    /// race on the same type, the first install wins and the loser's build
    /// is dropped, so every caller ends up with the same `Arc`.
    pub fn resolve(&self, entity: EntityType) -> Arc<Schema> {
        if let Some(schema) = self.get(entity) {
            return schema;
        }

        let built = Arc::new(entity.build_schema());

        let (schema, installed) = {
            let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
            match schemas.entry(entity.id()) {
                Entry::Occupied(existing) => (Arc::clone(existing.get()), false),
                Entry::Vacant(slot) => (Arc::clone(slot.insert(built)), true),
            }
        };

        let attributes = schema.len().to_string();
        if installed {
            Logger::event(
                Event::SchemaBuilt,
                &[("entity", entity.name()), ("attributes", attributes.as_str())],
            );
        } else {
            Logger::event(Event::SchemaBuildDiscarded, &[("entity", entity.name())]);
        }

        schema
    }

    /// The installed schema for `entity`, without building it
    pub fn get(&self, entity: EntityType) -> Option<Arc<Schema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity.id())
            .cloned()
    }

    pub fn contains(&self, entity: EntityType) -> bool {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&entity.id())
    }

    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every installed schema. Live instances keep the schema they
    /// already hold; the next resolution rebuilds.
    pub fn clear(&self) {
        let dropped = {
            let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
            let dropped = schemas.len();
            schemas.clear();
            dropped
        };

        let dropped = dropped.to_string();
        Logger::event(Event::RegistryCleared, &[("dropped", dropped.as_str())]);
    }
}
