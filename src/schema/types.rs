//! Schema: the ordered attribute table of one entity type

use indexmap::IndexMap;

use super::attribute::SchemaAttribute;
use super::kinds::{
    ArrayRule, AttributeKind, BoolRule, Cardinality, DateRule, EnumRule, NumberBounds,
    RelationRule, StringRule,
};
use super::mutator::Mutator;
use crate::config::EngineConfig;
use crate::model::EntityType;
use crate::util::date::DateFormat;
use crate::value::Value;

/// Ordered mapping of attribute name to [`SchemaAttribute`], plus the
/// mutators declared for the same entity type.
///
/// Declaration order is preserved and drives default application,
/// requirement checks and serialization order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    name: String,
    attributes: IndexMap<String, SchemaAttribute>,
    mutators: IndexMap<String, Mutator>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            mutators: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the schema and the qualified names of all its attributes
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        for attribute in self.attributes.values_mut() {
            attribute.rename_schema(&self.name);
        }
    }

    /// Records `attribute`, replacing any attribute of the same name in place
    pub fn declare(&mut self, mut attribute: SchemaAttribute) -> &mut SchemaAttribute {
        attribute.rename_schema(&self.name);
        let (index, _) = self
            .attributes
            .insert_full(attribute.name().to_string(), attribute);
        &mut self.attributes[index]
    }

    fn declare_kind(&mut self, name: &str, kind: AttributeKind) -> &mut SchemaAttribute {
        let attribute = SchemaAttribute::new(self.name.clone(), name, kind);
        self.declare(attribute)
    }

    pub fn any(&mut self, name: &str) -> &mut SchemaAttribute {
        self.declare_kind(name, AttributeKind::Any)
    }

    pub fn int(&mut self, name: &str) -> &mut SchemaAttribute {
        self.declare_kind(name, AttributeKind::Int(NumberBounds::default()))
    }

    pub fn float(&mut self, name: &str) -> &mut SchemaAttribute {
        self.declare_kind(name, AttributeKind::Float(NumberBounds::default()))
    }

    pub fn string(&mut self, name: &str) -> &mut SchemaAttribute {
        self.declare_kind(name, AttributeKind::String(StringRule::default()))
    }

    pub fn bool(&mut self, name: &str) -> &mut SchemaAttribute {
        self.declare_kind(name, AttributeKind::Bool(BoolRule::default()))
    }

    /// Date in the configured default format (RFC 3339 unless overridden)
    pub fn date(&mut self, name: &str) -> &mut SchemaAttribute {
        let format = EngineConfig::current().default_date_format();
        self.date_with_format(name, format)
    }

    pub fn date_with_format(
        &mut self,
        name: &str,
        format: impl Into<DateFormat>,
    ) -> &mut SchemaAttribute {
        self.declare_kind(
            name,
            AttributeKind::Date(DateRule {
                format: format.into(),
            }),
        )
    }

    pub fn enumeration<I, V>(&mut self, name: &str, values: I) -> &mut SchemaAttribute
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.declare_kind(
            name,
            AttributeKind::Enum(EnumRule {
                values: values.into_iter().map(Into::into).collect(),
            }),
        )
    }

    /// List attribute; `element` (renamed to `name`) validates each item
    pub fn array(&mut self, name: &str, element: Option<SchemaAttribute>) -> &mut SchemaAttribute {
        let element = element.map(|mut element| {
            element.rename(name);
            Box::new(element)
        });
        self.declare_kind(name, AttributeKind::Array(ArrayRule { element }))
    }

    /// One related entity
    pub fn has(&mut self, name: &str, target: EntityType) -> &mut SchemaAttribute {
        self.declare_kind(
            name,
            AttributeKind::Relation(RelationRule {
                target,
                cardinality: Cardinality::One,
            }),
        )
    }

    /// A list of related entities
    pub fn has_many(&mut self, name: &str, target: EntityType) -> &mut SchemaAttribute {
        self.declare_kind(
            name,
            AttributeKind::Relation(RelationRule {
                target,
                cardinality: Cardinality::Many,
            }),
        )
    }

    /// Attaches a mutator to `name`, replacing any previous one
    pub fn mutator(&mut self, name: &str, mutator: Mutator) -> &mut Self {
        self.mutators.insert(name.to_string(), mutator);
        self
    }

    /// The attribute named `name`, if it has a validation contract
    pub fn query(&self, name: &str) -> Option<&SchemaAttribute> {
        self.attributes.get(name)
    }

    pub fn query_mut(&mut self, name: &str) -> Option<&mut SchemaAttribute> {
        self.attributes.get_mut(name)
    }

    pub fn mutator_for(&self, name: &str) -> Option<&Mutator> {
        self.mutators.get(name)
    }

    /// Removes an attribute, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<SchemaAttribute> {
        self.attributes.shift_remove(name)
    }

    /// Attributes in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = &SchemaAttribute> {
        self.attributes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
