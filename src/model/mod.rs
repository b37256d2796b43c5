//! Entity runtime
//!
//! [`Entity`] is implemented by user types to declare their schema;
//! [`Model`] is the runtime instance that stores validated values.

mod entity;
mod instance;
mod serialize;

pub use entity::{Entity, EntityType};
pub use instance::Model;
