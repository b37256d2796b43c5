//! schemata - declarative schemas for semi-structured data
//!
//! Entity types declare an ordered attribute schema once. Raw maps are
//! validated and cast into [`Model`] instances, and models are serialized
//! back into plain maps or JSON.

pub mod config;
pub mod model;
pub mod observability;
pub mod schema;
pub mod util;
pub mod value;

pub use config::EngineConfig;
pub use model::{Entity, EntityType, Model};
pub use schema::{
    Cardinality, ModelError, ModelErrorCode, ModelResult, Mutator, MutatorContext, Schema,
    SchemaAttribute, SchemaRegistry,
};
pub use value::{Map, Value};
