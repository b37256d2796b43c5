//! Conditional requirement rules evaluated at the end of a fill pass

use std::fmt;
use std::sync::Arc;

use crate::model::Model;
use crate::value::Value;

/// Predicate over the entity as filled so far
pub type RequirementPredicate = Arc<dyn Fn(&Model) -> bool + Send + Sync>;

/// When an attribute must be present in the fill input
#[derive(Clone)]
pub enum Requirement {
    /// Always required
    Always,
    /// Required when `field` (a dotted path) loosely equals `value`
    EqualsField { field: String, value: Value },
    /// Required when the predicate holds for the entity
    Predicate(RequirementPredicate),
}

impl Requirement {
    /// Evaluates the rule against the entity's current state
    pub fn applies(&self, model: &Model) -> bool {
        match self {
            Requirement::Always => true,
            Requirement::EqualsField { field, value } => model.get_path(field).loose_eq(value),
            Requirement::Predicate(predicate) => predicate(model),
        }
    }

    pub fn is_unconditional(&self) -> bool {
        matches!(self, Requirement::Always)
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Always => write!(f, "Always"),
            Requirement::EqualsField { field, value } => f
                .debug_struct("EqualsField")
                .field("field", field)
                .field("value", value)
                .finish(),
            Requirement::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}
