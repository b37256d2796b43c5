//! Type-specific rules for each attribute variant
//!
//! Every rule receives the owning [`SchemaAttribute`] so errors carry the
//! attribute's qualified name. Null handling for nullable attributes happens
//! before any rule runs.

use super::attribute::SchemaAttribute;
use super::errors::{ModelError, ModelResult};
use super::registry::SchemaRegistry;
use crate::model::{EntityType, Model};
use crate::util::date::{self, DateFormat};
use crate::value::Value;

/// Variant tag plus the variant's own constraints
#[derive(Debug, Clone)]
pub enum AttributeKind {
    Any,
    Int(NumberBounds),
    Float(NumberBounds),
    String(StringRule),
    Bool(BoolRule),
    Date(DateRule),
    Enum(EnumRule),
    Array(ArrayRule),
    Relation(RelationRule),
}

impl AttributeKind {
    /// Type label used in messages (`String`, `array<Int>`, `list<Review>`)
    pub fn type_name(&self) -> String {
        match self {
            AttributeKind::Any => "Any".to_string(),
            AttributeKind::Int(_) => "Int".to_string(),
            AttributeKind::Float(_) => "Float".to_string(),
            AttributeKind::String(_) => "String".to_string(),
            AttributeKind::Bool(_) => "Bool".to_string(),
            AttributeKind::Date(_) => "Date".to_string(),
            AttributeKind::Enum(_) => "Enum".to_string(),
            AttributeKind::Array(rule) => format!(
                "array<{}>",
                rule.element
                    .as_ref()
                    .map(|element| element.type_name())
                    .unwrap_or_else(|| "*".to_string())
            ),
            AttributeKind::Relation(rule) => rule.type_name(),
        }
    }

    /// `registry` resolves the schemas of nested relation targets
    pub(crate) fn parse(
        &self,
        attr: &SchemaAttribute,
        value: Value,
        registry: &SchemaRegistry,
    ) -> ModelResult<Value> {
        match self {
            AttributeKind::Any => Ok(value),
            AttributeKind::Int(bounds) => match value {
                Value::Int(i) => {
                    bounds.check(attr, i as f64, &Value::Int(i))?;
                    Ok(Value::Int(i))
                }
                other => Err(invalid(attr, &other, "is not an integer")),
            },
            AttributeKind::Float(bounds) => match value.numeric() {
                Some(f) if f.is_finite() => {
                    bounds.check(attr, f, &value)?;
                    Ok(Value::Float(f))
                }
                _ => Err(invalid(attr, &value, "is not a float")),
            },
            AttributeKind::String(rule) => rule.parse(attr, value),
            AttributeKind::Bool(rule) => rule.parse(attr, value),
            AttributeKind::Date(rule) => rule.parse(attr, value),
            AttributeKind::Enum(rule) => rule.parse(attr, value),
            AttributeKind::Array(rule) => rule.parse(attr, value, registry),
            AttributeKind::Relation(rule) => rule.parse(attr, value, registry),
        }
    }

    pub(crate) fn serialize(&self, attr: &SchemaAttribute, value: Value) -> ModelResult<Value> {
        match self {
            AttributeKind::Date(rule) => rule.serialize(attr, value),
            AttributeKind::Array(rule) => rule.serialize(attr, value),
            AttributeKind::Relation(rule) => rule.serialize(attr, value),
            _ => Ok(value),
        }
    }
}

fn invalid(attr: &SchemaAttribute, value: &Value, reason: &str) -> ModelError {
    ModelError::parse(
        attr.qualified_name(),
        format!("Provided value '{}' {}", value, reason),
    )
}

/// Inclusive numeric bounds shared by Int and Float
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberBounds {
    fn check(&self, attr: &SchemaAttribute, n: f64, shown: &Value) -> ModelResult<()> {
        if let Some(min) = self.min {
            if n < min {
                return Err(invalid(
                    attr,
                    shown,
                    &format!("is less than the minimum value of {}", min),
                ));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                return Err(invalid(
                    attr,
                    shown,
                    &format!("is greater than the maximum value of {}", max),
                ));
            }
        }
        Ok(())
    }
}

/// Length constraints, counted in characters.
///
/// `truncate` dominates: when set, overlong input is cut and neither
/// `limit` nor `max` raises. `min` is always enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRule {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub limit: Option<usize>,
    pub truncate: Option<usize>,
}

impl StringRule {
    fn parse(&self, attr: &SchemaAttribute, value: Value) -> ModelResult<Value> {
        let text = match value {
            Value::String(text) => text,
            other => return Err(invalid(attr, &other, "is not a string")),
        };
        let len = text.chars().count();

        if let Some(min) = self.min {
            if len < min {
                return Err(ModelError::parse(
                    attr.qualified_name(),
                    format!(
                        "Provided value '{}' is shorter than the minimum of {} characters",
                        text, min
                    ),
                ));
            }
        }

        if let Some(truncate) = self.truncate {
            if len > truncate {
                return Ok(Value::String(text.chars().take(truncate).collect()));
            }
            return Ok(Value::String(text));
        }

        if let Some(limit) = self.limit {
            if len > limit {
                return Err(ModelError::parse(
                    attr.qualified_name(),
                    format!(
                        "Provided value '{}' is exceeding the limit of {} character(s)",
                        text, limit
                    ),
                ));
            }
        }

        if let Some(max) = self.max {
            if len > max {
                return Err(ModelError::parse(
                    attr.qualified_name(),
                    format!(
                        "Provided value '{}' is longer than the maximum of {} characters",
                        text, max
                    ),
                ));
            }
        }

        Ok(Value::String(text))
    }
}

/// Loose matchers for non-native boolean input.
///
/// Precedence: integer, native bool, negative match, positive match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolRule {
    pub positives: Vec<Value>,
    pub negatives: Vec<Value>,
}

impl BoolRule {
    fn parse(&self, attr: &SchemaAttribute, value: Value) -> ModelResult<Value> {
        match value {
            Value::Int(i) => Ok(Value::Bool(i != 0)),
            Value::Bool(b) => Ok(Value::Bool(b)),
            other if self.negatives.iter().any(|m| m.loose_eq(&other)) => Ok(Value::Bool(false)),
            other if self.positives.iter().any(|m| m.loose_eq(&other)) => Ok(Value::Bool(true)),
            other => Err(invalid(attr, &other, "is not a boolean")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRule {
    pub format: DateFormat,
}

impl DateRule {
    fn parse(&self, attr: &SchemaAttribute, value: Value) -> ModelResult<Value> {
        if let Value::Date(_) = value {
            return Ok(value);
        }

        let parsed = match &value {
            Value::String(text) => date::try_parse_date(text, &self.format),
            _ => None,
        };

        parsed.map(Value::Date).ok_or_else(|| {
            ModelError::parse(attr.qualified_name(), "Provided value is not a valid date")
        })
    }

    fn serialize(&self, attr: &SchemaAttribute, value: Value) -> ModelResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Date(d) => Ok(Value::String(date::format_date(&d, &self.format))),
            _ => Err(ModelError::serialize(
                attr.qualified_name(),
                "Provided value is not a valid date to be serialized",
            )),
        }
    }
}

/// Allowed values; the first loosely-equal declared value is stored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumRule {
    pub values: Vec<Value>,
}

impl EnumRule {
    fn parse(&self, attr: &SchemaAttribute, value: Value) -> ModelResult<Value> {
        if let Some(found) = self.values.iter().find(|allowed| allowed.loose_eq(&value)) {
            return Ok(found.clone());
        }

        let allowed: Vec<String> = self.values.iter().map(ToString::to_string).collect();
        Err(ModelError::parse(
            attr.qualified_name(),
            format!("Provided value is not one of {}", allowed.join(", ")),
        ))
    }
}

/// List attribute; `element` may itself be any variant
#[derive(Debug, Clone, Default)]
pub struct ArrayRule {
    pub element: Option<Box<SchemaAttribute>>,
}

impl ArrayRule {
    fn parse(
        &self,
        attr: &SchemaAttribute,
        value: Value,
        registry: &SchemaRegistry,
    ) -> ModelResult<Value> {
        let items = match value {
            Value::List(items) => items,
            _ => {
                return Err(ModelError::parse(
                    attr.qualified_name(),
                    format!("Provided value is not a valid {}", attr.type_name()),
                ))
            }
        };

        match &self.element {
            Some(element) => items
                .into_iter()
                .map(|item| element.parse_in(registry, item))
                .collect::<ModelResult<Vec<_>>>()
                .map(Value::List),
            None => Ok(Value::List(items)),
        }
    }

    fn serialize(&self, attr: &SchemaAttribute, value: Value) -> ModelResult<Value> {
        let items = match value {
            Value::Null => return Ok(Value::Null),
            Value::List(items) => items,
            _ => {
                return Err(ModelError::serialize(
                    attr.qualified_name(),
                    "Provided value is not a valid array to be serialized",
                ))
            }
        };

        match &self.element {
            Some(element) => items
                .into_iter()
                .map(|item| element.serialize(item))
                .collect::<ModelResult<Vec<_>>>()
                .map(Value::List),
            None => Ok(Value::List(items)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// Nested entity (or list of entities) of another declared type
#[derive(Debug, Clone)]
pub struct RelationRule {
    pub target: EntityType,
    pub cardinality: Cardinality,
}

impl RelationRule {
    fn type_name(&self) -> String {
        match self.cardinality {
            Cardinality::One => self.target.name().to_string(),
            Cardinality::Many => format!("list<{}>", self.target.name()),
        }
    }

    fn parse(
        &self,
        attr: &SchemaAttribute,
        value: Value,
        registry: &SchemaRegistry,
    ) -> ModelResult<Value> {
        match self.cardinality {
            Cardinality::One => self.parse_one(attr, value, registry),
            Cardinality::Many => match value {
                Value::List(items) => items
                    .into_iter()
                    .map(|item| self.parse_one(attr, item, registry))
                    .collect::<ModelResult<Vec<_>>>()
                    .map(Value::List),
                _ => Err(ModelError::not_a_list(attr.qualified_name(), &self.type_name())),
            },
        }
    }

    fn parse_one(
        &self,
        attr: &SchemaAttribute,
        value: Value,
        registry: &SchemaRegistry,
    ) -> ModelResult<Value> {
        match value {
            Value::Map(data) => Model::parse_in(registry, self.target, data).map(Value::from),
            Value::Entity(model) if model.entity_type() == self.target => Ok(Value::Entity(model)),
            _ => Err(ModelError::parse(
                attr.qualified_name(),
                format!("Provided value is not a valid {}", self.target.name()),
            )),
        }
    }

    fn serialize(&self, attr: &SchemaAttribute, value: Value) -> ModelResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Entity(model) => model.serialize_attributes().map(Value::Map),
            Value::List(items) if self.cardinality == Cardinality::Many => items
                .into_iter()
                .map(|item| self.serialize(attr, item))
                .collect::<ModelResult<Vec<_>>>()
                .map(Value::List),
            _ => Err(ModelError::serialize(
                attr.qualified_name(),
                format!("Provided value is not a valid {} to be serialized", self.type_name()),
            )),
        }
    }
}
