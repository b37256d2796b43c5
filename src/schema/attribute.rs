//! Schema attributes: one named, typed, constrained field
//!
//! Declaration methods take `&mut self` and return `&mut Self` so they chain
//! off [`Schema`](super::Schema) declarations:
//!
//! ```ignore
//! schema.string("name").between(5, 50).required();
//! schema.string("matrix").list().list().nullable();
//! ```
//!
//! Variant-specific constraints (`between`, `min`, `positives`, ...) apply to
//! the matching variant, looking through array element schemas. Applying one
//! to an attribute of another variant is a declaration bug and panics.

use std::fmt;
use std::sync::Arc;

use super::errors::ModelResult;
use super::kinds::{
    ArrayRule, AttributeKind, BoolRule, DateRule, EnumRule, NumberBounds, StringRule,
};
use super::registry::SchemaRegistry;
use super::requirement::{Requirement, RequirementPredicate};
use crate::model::Model;
use crate::util::date::DateFormat;
use crate::value::Value;

/// Visibility predicate over (serialized value, owning entity)
pub type HiddenPredicate = Arc<dyn Fn(&Value, &Model) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct SchemaAttribute {
    name: String,
    schema_name: String,
    visible_name: Option<String>,
    nullable: bool,
    hidden: bool,
    hidden_if: Option<HiddenPredicate>,
    default: Option<Value>,
    requirements: Vec<Requirement>,
    kind: AttributeKind,
}

impl SchemaAttribute {
    pub fn new(schema_name: impl Into<String>, name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            schema_name: schema_name.into(),
            visible_name: None,
            nullable: false,
            hidden: false,
            hidden_if: None,
            default: None,
            requirements: Vec::new(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name; defaults to the attribute name
    pub fn visible_name(&self) -> &str {
        self.visible_name.as_deref().unwrap_or(&self.name)
    }

    /// `Schema.visibleName`, used in every error message
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.visible_name())
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn type_name(&self) -> String {
        self.kind.type_name()
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, AttributeKind::Relation(_))
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_hidden_if(&self, value: &Value, model: &Model) -> bool {
        self.hidden_if
            .as_ref()
            .is_some_and(|predicate| predicate(value, model))
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Unconditionally required
    pub fn is_required(&self) -> bool {
        self.requirements.iter().any(Requirement::is_unconditional)
    }

    /// Whether any requirement rule holds for the entity's current state
    pub fn is_required_for(&self, model: &Model) -> bool {
        self.requirements.iter().any(|rule| rule.applies(model))
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Validates and casts `value`.
    ///
    /// Null on a nullable attribute short-circuits every variant check.
    pub fn parse(&self, value: Value) -> ModelResult<Value> {
        self.parse_in(SchemaRegistry::global(), value)
    }

    /// Like [`SchemaAttribute::parse`], resolving nested relation schemas
    /// against `registry`
    pub fn parse_in(&self, registry: &SchemaRegistry, value: Value) -> ModelResult<Value> {
        if value.is_null() && self.nullable {
            return Ok(Value::Null);
        }
        self.kind.parse(self, value, registry)
    }

    pub fn try_parse(&self, value: Value) -> Option<Value> {
        self.parse(value).ok()
    }

    pub fn serialize(&self, value: Value) -> ModelResult<Value> {
        self.kind.serialize(self, value)
    }

    pub(crate) fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub(crate) fn rename_schema(&mut self, schema_name: &str) {
        self.schema_name = schema_name.to_string();
        if let AttributeKind::Array(ArrayRule {
            element: Some(element),
        }) = &mut self.kind
        {
            element.rename_schema(schema_name);
        }
    }

    // Declaration

    pub fn visible_as(&mut self, name: impl Into<String>) -> &mut Self {
        self.visible_name = Some(name.into());
        self
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    pub fn hidden(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    pub fn hidden_if<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Value, &Model) -> bool + Send + Sync + 'static,
    {
        self.hidden_if = Some(Arc::new(predicate));
        self
    }

    pub fn hidden_if_null(&mut self) -> &mut Self {
        self.hidden_if(|value, _| value.is_null())
    }

    pub fn default(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(&mut self) -> &mut Self {
        if !self.is_required() {
            self.requirements.push(Requirement::Always);
        }
        self
    }

    /// Required when `field` (dotted path) loosely equals `value`
    pub fn required_if(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.requirements.push(Requirement::EqualsField {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn required_when<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Model) -> bool + Send + Sync + 'static,
    {
        let predicate: RequirementPredicate = Arc::new(predicate);
        self.requirements.push(Requirement::Predicate(predicate));
        self
    }

    /// Turns this attribute into a list whose elements follow the
    /// constraints declared so far
    pub fn list(&mut self) -> &mut Self {
        let element = self.clone();
        let mut wrapper = SchemaAttribute::new(
            self.schema_name.clone(),
            self.name.clone(),
            AttributeKind::Array(ArrayRule {
                element: Some(Box::new(element)),
            }),
        );
        wrapper.visible_name = self.visible_name.clone();
        *self = wrapper;
        self
    }

    pub fn array(&mut self) -> &mut Self {
        self.list()
    }

    pub fn min(&mut self, min: f64) -> &mut Self {
        self.rule_mut("min", pick_bounds).min = Some(min);
        self
    }

    pub fn max(&mut self, max: f64) -> &mut Self {
        self.rule_mut("max", pick_bounds).max = Some(max);
        self
    }

    /// Character length range; the lower bound is always enforced
    pub fn between(&mut self, min: usize, max: usize) -> &mut Self {
        let rule = self.rule_mut("between", pick_string);
        rule.min = Some(min);
        rule.max = Some(max);
        self
    }

    /// Hard length limit; overlong input is rejected
    pub fn limit(&mut self, limit: usize) -> &mut Self {
        self.rule_mut("limit", pick_string).limit = Some(limit);
        self
    }

    /// Soft length limit; overlong input is cut
    pub fn truncate(&mut self, length: usize) -> &mut Self {
        self.rule_mut("truncate", pick_string).truncate = Some(length);
        self
    }

    pub fn positives<I, V>(&mut self, matches: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rule_mut("positives", pick_bool).positives = matches.into_iter().map(Into::into).collect();
        self
    }

    pub fn negatives<I, V>(&mut self, matches: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rule_mut("negatives", pick_bool).negatives = matches.into_iter().map(Into::into).collect();
        self
    }

    pub fn format(&mut self, format: impl Into<DateFormat>) -> &mut Self {
        self.rule_mut("format", pick_date).format = format.into();
        self
    }

    pub fn values<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rule_mut("values", pick_enum).values = values.into_iter().map(Into::into).collect();
        self
    }

    fn rule_mut<T>(
        &mut self,
        constraint: &str,
        pick: fn(&mut AttributeKind) -> Option<&mut T>,
    ) -> &mut T {
        let label = self.qualified_name();
        let type_name = self.type_name();
        match find_rule(&mut self.kind, pick) {
            Some(rule) => rule,
            None => panic!(
                "constraint `{}` does not apply to '{}' of type {}",
                constraint, label, type_name
            ),
        }
    }
}

fn find_rule<T>(
    kind: &mut AttributeKind,
    pick: fn(&mut AttributeKind) -> Option<&mut T>,
) -> Option<&mut T> {
    match kind {
        AttributeKind::Array(ArrayRule {
            element: Some(element),
        }) => find_rule(&mut element.kind, pick),
        other => pick(other),
    }
}

fn pick_bounds(kind: &mut AttributeKind) -> Option<&mut NumberBounds> {
    match kind {
        AttributeKind::Int(bounds) | AttributeKind::Float(bounds) => Some(bounds),
        _ => None,
    }
}

fn pick_string(kind: &mut AttributeKind) -> Option<&mut StringRule> {
    match kind {
        AttributeKind::String(rule) => Some(rule),
        _ => None,
    }
}

fn pick_bool(kind: &mut AttributeKind) -> Option<&mut BoolRule> {
    match kind {
        AttributeKind::Bool(rule) => Some(rule),
        _ => None,
    }
}

fn pick_date(kind: &mut AttributeKind) -> Option<&mut DateRule> {
    match kind {
        AttributeKind::Date(rule) => Some(rule),
        _ => None,
    }
}

fn pick_enum(kind: &mut AttributeKind) -> Option<&mut EnumRule> {
    match kind {
        AttributeKind::Enum(rule) => Some(rule),
        _ => None,
    }
}

impl fmt::Debug for SchemaAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaAttribute")
            .field("name", &self.name)
            .field("schema_name", &self.schema_name)
            .field("visible_name", &self.visible_name)
            .field("nullable", &self.nullable)
            .field("hidden", &self.hidden)
            .field("hidden_if", &self.hidden_if.is_some())
            .field("default", &self.default)
            .field("requirements", &self.requirements)
            .field("kind", &self.kind)
            .finish()
    }
}
