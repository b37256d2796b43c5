//! Outbound views of a model
//!
//! - [`Model::json_serialize`]: external view, visible names, hidden
//!   attributes omitted
//! - [`Model::to_array`]: internal dump, every stored value, relations
//!   expanded recursively

use serde::ser::{self, Serialize, Serializer};

use super::instance::Model;
use crate::schema::ModelResult;
use crate::value::{Map, Value};

impl Model {
    /// Serialized schema attributes in declaration order, keyed by visible
    /// name. `hidden` attributes and those whose `hidden_if` predicate holds
    /// for the serialized value are left out.
    pub fn serialize_attributes(&self) -> ModelResult<Map> {
        let mut output = Map::new();

        for attribute in self.schema().attributes() {
            if attribute.is_hidden() {
                continue;
            }

            let value = attribute.serialize(self.get(attribute.name()))?;
            if attribute.is_hidden_if(&value, self) {
                continue;
            }

            output.insert(attribute.visible_name().to_string(), value);
        }

        Ok(output)
    }

    /// JSON rendering of [`Model::serialize_attributes`]
    pub fn json_serialize(&self) -> ModelResult<serde_json::Value> {
        Ok(Value::Map(self.serialize_attributes()?).to_json())
    }

    /// Every stored value, plain data first, relations flattened to their
    /// own dumps. No visibility filtering and no getters.
    pub fn to_array(&self) -> Map {
        self.attributes()
            .iter()
            .chain(self.relations().iter())
            .map(|(name, value)| (name.clone(), value.flatten()))
            .collect()
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.json_serialize()
            .map_err(<S::Error as ser::Error>::custom)?
            .serialize(serializer)
    }
}
