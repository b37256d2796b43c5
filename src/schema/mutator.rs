//! Mutators: user hooks around attribute storage
//!
//! A setter runs before schema parsing on `set`; a getter runs after the
//! stored value is read on `get`. Mutators are declared on the schema next
//! to the attributes they transform.

use std::fmt;
use std::sync::Arc;

use super::attribute::SchemaAttribute;
use super::errors::{ModelError, ModelResult};
use crate::model::Model;
use crate::value::Value;

pub type Setter = Arc<dyn Fn(Value, &MutatorContext<'_>) -> ModelResult<Value> + Send + Sync>;
pub type Getter = Arc<dyn Fn(Value, &MutatorContext<'_>) -> Value + Send + Sync>;

/// Optional setter/getter pair for one attribute
#[derive(Clone, Default)]
pub struct Mutator {
    setter: Option<Setter>,
    getter: Option<Getter>,
}

impl Mutator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(Value, &MutatorContext<'_>) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    pub fn getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(Value, &MutatorContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    /// Runs the setter, or passes the value through
    pub fn apply_setter(&self, value: Value, context: &MutatorContext<'_>) -> ModelResult<Value> {
        match &self.setter {
            Some(setter) => setter(value, context),
            None => Ok(value),
        }
    }

    /// Runs the getter, or passes the value through
    pub fn apply_getter(&self, value: Value, context: &MutatorContext<'_>) -> Value {
        match &self.getter {
            Some(getter) => getter(value, context),
            None => value,
        }
    }
}

impl fmt::Debug for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutator")
            .field("setter", &self.has_setter())
            .field("getter", &self.has_getter())
            .finish()
    }
}

/// What a mutator hook sees: the entity, the attribute name and its schema
pub struct MutatorContext<'a> {
    target: &'a Model,
    attribute: &'a str,
    attribute_schema: Option<&'a SchemaAttribute>,
}

impl<'a> MutatorContext<'a> {
    pub fn new(
        target: &'a Model,
        attribute: &'a str,
        attribute_schema: Option<&'a SchemaAttribute>,
    ) -> Self {
        Self {
            target,
            attribute,
            attribute_schema,
        }
    }

    /// The entity being written or read
    pub fn target(&self) -> &'a Model {
        self.target
    }

    pub fn attribute(&self) -> &'a str {
        self.attribute
    }

    pub fn attribute_schema(&self) -> Option<&'a SchemaAttribute> {
        self.attribute_schema
    }

    /// `ModelName.attribute`, for attributes without a schema entry
    pub fn relative_name(&self) -> String {
        format!("{}.{}", self.target.model_name(), self.attribute)
    }

    /// The schema's qualified name, or the relative name when schema-less
    pub fn absolute_name(&self) -> String {
        match self.attribute_schema {
            Some(schema) => schema.qualified_name(),
            None => self.relative_name(),
        }
    }

    /// Builds a mutator error for this attribute; return it with `Err`
    pub fn raise(&self, message: &str) -> ModelError {
        ModelError::mutator(self.absolute_name(), Some(message))
    }

    /// Fails with `message` unless `condition` holds
    pub fn assert(&self, condition: bool, message: &str) -> ModelResult<()> {
        if condition {
            Ok(())
        } else {
            Err(self.raise(message))
        }
    }
}
