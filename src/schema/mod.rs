//! Declarative schema subsystem
//!
//! A [`Schema`] is the ordered attribute table of one entity type. Each
//! [`SchemaAttribute`] validates and casts incoming values (`parse`) and
//! converts stored values back out (`serialize`).
//!
//! # Design Principles
//!
//! - Declaration order is significant and preserved
//! - Every stored value has passed its attribute's `parse`
//! - Data errors are values ([`ModelError`]); declaration bugs panic
//! - One shared schema per entity type, forked only on local mutation

mod attribute;
mod errors;
mod kinds;
mod mutator;
mod registry;
mod requirement;
mod types;

pub use attribute::{HiddenPredicate, SchemaAttribute};
pub use errors::{ModelError, ModelErrorCode, ModelResult, Severity};
pub use kinds::{
    ArrayRule, AttributeKind, BoolRule, Cardinality, DateRule, EnumRule, NumberBounds,
    RelationRule, StringRule,
};
pub use mutator::{Getter, Mutator, MutatorContext, Setter};
pub use registry::SchemaRegistry;
pub use requirement::{Requirement, RequirementPredicate};
pub use types::Schema;
