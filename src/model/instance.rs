//! Runtime entity instances
//!
//! A [`Model`] holds validated attribute values for one entity type. Writes
//! go through the attribute's mutator setter and then its `parse`; reads go
//! through the mutator getter. Relation values are stored apart from plain
//! data and are never passed through getters.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::entity::EntityType;
use crate::observability::{Event, Logger, Severity};
use crate::schema::{ModelError, ModelResult, MutatorContext, Schema, SchemaRegistry};
use crate::util::path;
use crate::value::{Map, Value};

#[derive(Clone)]
pub struct Model {
    entity: EntityType,
    name: String,
    schema: Arc<Schema>,
    owns_schema: bool,
    data: Map,
    relations: Map,
    registry: SchemaRegistry,
}

impl Model {
    /// Empty instance resolved against the global registry, defaults applied
    pub fn make(entity: EntityType) -> Self {
        Self::make_in(SchemaRegistry::global(), entity)
    }

    /// Empty instance resolved against `registry`, defaults applied.
    ///
    /// # Panics
    ///
    /// Panics if a declared default fails its own attribute's validation.
    pub fn make_in(registry: &SchemaRegistry, entity: EntityType) -> Self {
        let mut model = Self {
            entity,
            name: entity.name().to_string(),
            schema: registry.resolve(entity),
            owns_schema: false,
            data: Map::new(),
            relations: Map::new(),
            registry: registry.clone(),
        };
        model.apply_defaults();
        model
    }

    fn apply_defaults(&mut self) {
        let schema = Arc::clone(&self.schema);
        for attribute in schema.attributes() {
            if let Some(default) = attribute.default_value() {
                if let Err(err) = self.set(attribute.name(), default.clone()) {
                    panic!(
                        "invalid default for '{}': {}",
                        attribute.qualified_name(),
                        err
                    );
                }
            }
        }
    }

    /// Builds and fills a new instance of `entity`
    pub fn parse(entity: EntityType, data: Map) -> ModelResult<Self> {
        Self::parse_in(SchemaRegistry::global(), entity, data)
    }

    /// Like [`Model::parse`], resolving schemas against `registry`
    pub fn parse_in(registry: &SchemaRegistry, entity: EntityType, data: Map) -> ModelResult<Self> {
        let mut model = Self::make_in(registry, entity);
        model.fill(data)?;
        Ok(model)
    }

    /// Like [`Model::parse`], but rejected input yields `None`
    pub fn try_parse(entity: EntityType, data: Map) -> Option<Self> {
        recover(entity, Self::parse(entity, data))
    }

    /// Builds and fills a new instance of `entity` from a JSON object
    pub fn parse_json(entity: EntityType, data: &serde_json::Value) -> ModelResult<Self> {
        let mut model = Self::make(entity);
        model.fill_json(data)?;
        Ok(model)
    }

    /// Like [`Model::parse_json`], but rejected input yields `None`
    pub fn try_parse_json(entity: EntityType, data: &serde_json::Value) -> Option<Self> {
        recover(entity, Self::parse_json(entity, data))
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity
    }

    pub fn model_name(&self) -> &str {
        &self.name
    }

    pub fn set_model_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Whether this instance has forked a private schema
    pub fn owns_schema(&self) -> bool {
        self.owns_schema
    }

    /// Applies `mutate` to this instance's schema only.
    ///
    /// The first call forks the shared schema; other instances of the type
    /// keep seeing the registry's copy.
    pub fn schema_mutate<F, R>(&mut self, mutate: F) -> R
    where
        F: FnOnce(&mut Schema) -> R,
    {
        if !self.owns_schema {
            self.schema = Arc::new(Schema::clone(&self.schema));
            self.owns_schema = true;
            Logger::event(Event::SchemaForked, &[("entity", self.entity.name())]);
        }
        mutate(Arc::make_mut(&mut self.schema))
    }

    /// Renames this instance's schema, which prefixes its error messages
    pub fn set_schema_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.schema_mutate(|schema| schema.set_name(name));
    }

    /// Writes one attribute.
    ///
    /// Attributes without a schema entry are stored as given.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let schema = Arc::clone(&self.schema);
        let attribute = schema.query(name);

        let mut value = value.into();
        if let Some(mutator) = schema.mutator_for(name) {
            let context = MutatorContext::new(self, name, attribute);
            value = mutator.apply_setter(value, &context)?;
        }

        match attribute {
            Some(attribute) if attribute.is_relation() => {
                let parsed = attribute.parse_in(&self.registry, value)?;
                self.relations.insert(name.to_string(), parsed);
            }
            Some(attribute) => {
                let parsed = attribute.parse_in(&self.registry, value)?;
                self.data.insert(name.to_string(), parsed);
            }
            None => {
                self.data.insert(name.to_string(), value);
            }
        }

        Ok(())
    }

    /// Reads one attribute; `Null` when unset
    pub fn get(&self, name: &str) -> Value {
        let attribute = self.schema.query(name);

        if attribute.is_some_and(|attribute| attribute.is_relation()) {
            return self.relations.get(name).cloned().unwrap_or_default();
        }

        let stored = self.data.get(name).cloned().unwrap_or_default();
        match self.schema.mutator_for(name) {
            Some(mutator) => mutator.apply_getter(stored, &MutatorContext::new(self, name, attribute)),
            None => stored,
        }
    }

    /// Reads a dotted path (`address.city`, `reviews.0.rating`)
    pub fn get_path(&self, path: &str) -> Value {
        match path.split_once(path::SEPARATOR) {
            Some((head, rest)) => path::get(rest, &self.get(head), Value::Null),
            None => self.get(path),
        }
    }

    /// Writes every input key in order, then checks required attributes.
    ///
    /// Runs against a working copy: on error this instance is unchanged.
    pub fn fill(&mut self, input: Map) -> ModelResult<()> {
        let mut working = self.clone();

        match working.apply(input) {
            Ok(()) => {
                *self = working;
                let stored = (self.data.len() + self.relations.len()).to_string();
                Logger::event(
                    Event::FillCommitted,
                    &[("entity", self.name.as_str()), ("stored", stored.as_str())],
                );
                Ok(())
            }
            Err(err) => {
                Logger::event(
                    Event::FillRolledBack,
                    &[
                        ("entity", self.name.as_str()),
                        ("attribute", err.attribute()),
                        ("code", err.code().code()),
                    ],
                );
                Err(err)
            }
        }
    }

    fn apply(&mut self, input: Map) -> ModelResult<()> {
        let provided: HashSet<String> = input.keys().cloned().collect();

        for (name, value) in input {
            self.set(&name, value)?;
        }

        let schema = Arc::clone(&self.schema);
        for attribute in schema.attributes() {
            if !provided.contains(attribute.name()) && attribute.is_required_for(self) {
                return Err(ModelError::missing_required(attribute.qualified_name()));
            }
        }

        Ok(())
    }

    /// [`Model::fill`] from a JSON object
    pub fn fill_json(&mut self, input: &serde_json::Value) -> ModelResult<()> {
        match Value::from(input) {
            Value::Map(map) => self.fill(map),
            other => Err(ModelError::not_an_object(&self.name, other)),
        }
    }

    /// Stored plain values, without getters applied
    pub fn attributes(&self) -> &Map {
        &self.data
    }

    /// Stored relation values
    pub fn relations(&self) -> &Map {
        &self.relations
    }

    pub fn relation(&self, name: &str) -> Option<&Value> {
        self.relations.get(name)
    }

    /// Plain values followed by relations
    pub fn all_attributes(&self) -> Map {
        self.data
            .iter()
            .chain(self.relations.iter())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// Turns a recoverable rejection into `None`.
///
/// Anything else is not an input problem and is logged at ERROR before it is
/// dropped.
fn recover(entity: EntityType, result: ModelResult<Model>) -> Option<Model> {
    let err = match result {
        Ok(model) => return Some(model),
        Err(err) => err,
    };

    let fields = [
        ("entity", entity.name()),
        ("attribute", err.attribute()),
        ("code", err.code().code()),
    ];
    if err.is_recoverable() {
        Logger::event(Event::ParseRejected, &fields);
    } else {
        Logger::log(Severity::Error, Event::ParseRejected.as_str(), &fields);
    }
    None
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity && self.data == other.data && self.relations == other.relations
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("owns_schema", &self.owns_schema)
            .field("data", &self.data)
            .field("relations", &self.relations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use crate::schema::{Mutator, ModelErrorCode};
    use serde_json::json;

    struct User;

    impl Entity for User {
        fn schema(schema: &mut Schema) {
            schema.int("id").required();
            schema.string("name").between(3, 10).required();
            schema.bool("active").default(true);
            schema.string("nickname").nullable();
        }
    }

    struct Tagged;

    impl Entity for Tagged {
        fn schema(schema: &mut Schema) {
            schema.string("tag").nullable();
            schema.mutator(
                "tag",
                Mutator::new()
                    .setter(|value, context| {
                        let text = value.as_str().unwrap_or_default().trim().to_lowercase();
                        context.assert(!text.contains(' '), "Tags cannot contain spaces")?;
                        Ok(Value::from(text))
                    })
                    .getter(|value, _| match value {
                        Value::String(text) => Value::from(format!("#{}", text)),
                        other => other,
                    }),
            );
        }
    }

    fn map(value: serde_json::Value) -> Map {
        match Value::from(value) {
            Value::Map(map) => map,
            other => panic!("not an object: {:?}", other),
        }
    }

    #[test]
    fn test_make_applies_defaults() {
        let user = User::make();
        assert_eq!(user.get("active"), Value::Bool(true));
        assert_eq!(user.get("id"), Value::Null);
        assert_eq!(user.model_name(), "User");
    }

    #[test]
    fn test_fill_then_get() {
        let mut user = User::make();
        user.fill(map(json!({"id": 7, "name": "Marta"}))).unwrap();

        assert_eq!(user.get("id"), Value::Int(7));
        assert_eq!(user.get("name"), Value::from("Marta"));
    }

    #[test]
    fn test_failed_fill_leaves_instance_untouched() {
        let mut user = User::make();
        user.fill(map(json!({"id": 1, "name": "ValidName"}))).unwrap();

        let err = user.fill(map(json!({"id": 2}))).unwrap_err();
        assert_eq!(err.attribute(), "User.name");
        assert_eq!(err.message(), "Missing required attribute");

        assert_eq!(user.get("id"), Value::Int(1));
        assert_eq!(user.get("name"), Value::from("ValidName"));
    }

    #[test]
    fn test_parse_error_mid_fill_rolls_back() {
        let mut user = User::make();
        user.fill(map(json!({"id": 1, "name": "ValidName"}))).unwrap();

        let err = user
            .fill(map(json!({"id": 5, "name": "X"})))
            .unwrap_err();
        assert_eq!(err.code(), ModelErrorCode::ModelAttributeParseFailed);
        assert_eq!(user.get("id"), Value::Int(1));
    }

    #[test]
    fn test_schemaless_attribute_is_stored_raw() {
        let mut user = User::make();
        user.set("extra", json!({"a": [1, 2]})).unwrap();
        assert_eq!(user.get_path("extra.a.1"), Value::Int(2));
    }

    #[test]
    fn test_mutator_setter_and_getter() {
        let mut tagged = Tagged::make();
        tagged.set("tag", "  Rust ").unwrap();

        assert_eq!(tagged.attributes().get("tag"), Some(&Value::from("rust")));
        assert_eq!(tagged.get("tag"), Value::from("#rust"));

        let err = tagged.set("tag", "two words").unwrap_err();
        assert_eq!(err.code(), ModelErrorCode::ModelMutatorRejected);
        assert_eq!(err.to_string(), "'Tagged.tag' Tags cannot contain spaces");
    }

    #[test]
    fn test_try_parse_swallows_rejection() {
        assert!(Model::try_parse(User::entity_type(), map(json!({"id": "one"}))).is_none());
        assert!(User::try_parse(map(json!({"id": 1, "name": "Lia"}))).is_some());
    }

    #[test]
    fn test_schema_mutate_is_copy_on_write() {
        let mut first = User::make();
        let second = User::make();
        assert!(!first.owns_schema());

        first.schema_mutate(|schema| {
            schema.remove("nickname");
        });

        assert!(first.owns_schema());
        assert!(first.schema().query("nickname").is_none());
        assert!(second.schema().query("nickname").is_some());
        assert!(User::make().schema().query("nickname").is_some());
    }

    #[test]
    fn test_set_schema_name_changes_error_prefix() {
        let mut user = User::make();
        user.set_schema_name("Account");

        let err = user.set("id", "x").unwrap_err();
        assert_eq!(err.attribute(), "Account.id");
    }

    #[test]
    fn test_fill_json_rejects_non_object() {
        let mut user = User::make();
        let err = user.fill_json(&json!([1, 2])).unwrap_err();
        assert_eq!(err.attribute(), "User");
        assert!(err.message().ends_with("is not a valid User"));
    }

    #[test]
    fn test_try_parse_json_swallows_mutator_rejection() {
        let input = json!({"tag": "two words"});
        assert!(Model::try_parse_json(Tagged::entity_type(), &input).is_none());

        let parsed = Tagged::try_parse_json(&json!({"tag": "Rust"})).unwrap();
        assert_eq!(parsed.get("tag"), Value::from("#rust"));
        assert!(Tagged::try_parse_json(&json!("tag")).is_none());
    }

    #[test]
    fn test_recover_drops_every_error_kind() {
        let serialize = ModelError::serialize("User.name", "cannot serialize");
        assert!(!serialize.is_recoverable());
        assert!(recover(User::entity_type(), Err(serialize)).is_none());

        let parse = ModelError::parse("User.id", "bad");
        assert!(recover(User::entity_type(), Err(parse)).is_none());

        let user = User::make();
        assert_eq!(recover(User::entity_type(), Ok(user.clone())), Some(user));
    }

    #[test]
    fn test_nested_relations_resolve_in_the_parent_registry() {
        struct Leaf;

        impl Entity for Leaf {
            fn schema(schema: &mut Schema) {
                schema.string("label").required();
            }
        }

        struct Branch;

        impl Entity for Branch {
            fn schema(schema: &mut Schema) {
                schema.has("leaf", Leaf::entity_type());
            }
        }

        let registry = SchemaRegistry::new();
        let mut branch = Model::make_in(&registry, Branch::entity_type());
        branch.set("leaf", json!({"label": "green"})).unwrap();

        assert!(registry.contains(Leaf::entity_type()));
        assert!(!SchemaRegistry::global().contains(Leaf::entity_type()));
        assert_eq!(branch.get_path("leaf.label"), Value::from("green"));

        let input = map(json!({"leaf": {"label": "red"}}));
        let parsed = Model::parse_in(&registry, Branch::entity_type(), input).unwrap();
        assert_eq!(parsed.get_path("leaf.label"), Value::from("red"));
        assert!(!SchemaRegistry::global().contains(Branch::entity_type()));
    }

    #[test]
    #[should_panic(expected = "invalid default")]
    fn test_invalid_default_panics() {
        struct Broken;

        impl Entity for Broken {
            fn schema(schema: &mut Schema) {
                schema.int("count").default("many");
            }
        }

        Broken::make();
    }
}
