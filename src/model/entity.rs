//! Entity types and their runtime descriptor

use std::any::{type_name, TypeId};
use std::fmt;

use super::instance::Model;
use crate::schema::{ModelResult, Schema};
use crate::value::Map;

/// A declared entity type.
///
/// Implementors describe their attributes once in [`Entity::schema`]; the
/// registry calls it the first time an instance of the type is built.
///
/// ```ignore
/// struct User;
///
/// impl Entity for User {
///     fn schema(schema: &mut Schema) {
///         schema.int("id").required();
///         schema.string("name").between(3, 10);
///     }
/// }
///
/// let user = User::parse_json(&json!({"id": 1, "name": "Ana Lu"}))?;
/// ```
pub trait Entity: 'static {
    /// Entity name used as the schema name; defaults to the type's own name
    fn name() -> &'static str {
        short_type_name(type_name::<Self>())
    }

    /// Declares attributes and mutators
    fn schema(schema: &mut Schema);

    fn entity_type() -> EntityType
    where
        Self: Sized,
    {
        EntityType::of::<Self>()
    }

    /// Empty instance with schema defaults applied
    fn make() -> Model
    where
        Self: Sized,
    {
        Model::make(Self::entity_type())
    }

    fn parse(data: Map) -> ModelResult<Model>
    where
        Self: Sized,
    {
        Model::parse(Self::entity_type(), data)
    }

    fn try_parse(data: Map) -> Option<Model>
    where
        Self: Sized,
    {
        Model::try_parse(Self::entity_type(), data)
    }

    fn parse_json(data: &serde_json::Value) -> ModelResult<Model>
    where
        Self: Sized,
    {
        Model::parse_json(Self::entity_type(), data)
    }

    fn try_parse_json(data: &serde_json::Value) -> Option<Model>
    where
        Self: Sized,
    {
        Model::try_parse_json(Self::entity_type(), data)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// Copyable handle on an [`Entity`] implementor.
///
/// Relations and the registry refer to entity types through this descriptor
/// so they stay free of generic parameters.
#[derive(Clone, Copy)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
    declare: fn(&mut Schema),
}

impl EntityType {
    pub fn of<E: Entity>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: E::name(),
            declare: E::schema,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the type's declaration callback against a fresh schema
    pub fn build_schema(&self) -> Schema {
        let mut schema = Schema::new(self.name);
        (self.declare)(&mut schema);
        schema
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityType {}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self.name)
    }
}
