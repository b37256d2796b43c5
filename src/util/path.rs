//! Dotted-path access into nested values (`address.city`, `items.0.sku`)

use crate::value::{Map, Value};

/// Path segment separator
pub const SEPARATOR: char = '.';

/// Reads the value at `path`, or `default` when any segment is missing.
///
/// Maps are indexed by key, lists by zero-based position, entities by
/// attribute name (through their getters).
pub fn get(path: &str, value: &Value, default: Value) -> Value {
    match lookup(path, value) {
        Some(Value::Null) | None => default,
        Some(found) => found,
    }
}

fn lookup(path: &str, value: &Value) -> Option<Value> {
    let mut current = value.clone();

    for segment in path.split(SEPARATOR) {
        if segment.is_empty() {
            return None;
        }

        current = match current {
            Value::Map(mut map) => map.swap_remove(segment)?,
            Value::List(mut items) => {
                let index: usize = segment.parse().ok()?;
                if index >= items.len() {
                    return None;
                }
                items.swap_remove(index)
            }
            Value::Entity(model) => model.get(segment),
            _ => return None,
        };
    }

    Some(current)
}

/// Writes `value` at `path`, creating intermediate maps.
///
/// A non-map value found along the way is replaced by an empty map.
pub fn set(path: &str, map: &mut Map, value: Value) {
    let mut segments = path.split(SEPARATOR).filter(|s| !s.is_empty()).peekable();
    let mut current = map;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }

        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Map(Map::new()));
        if !matches!(slot, Value::Map(_)) {
            *slot = Value::Map(Map::new());
        }

        current = match slot {
            Value::Map(inner) => inner,
            _ => return,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        Value::from(json!({
            "address": { "city": "Recife", "zip": null },
            "tags": ["a", "b"]
        }))
    }

    #[test]
    fn test_get_nested() {
        let value = sample();
        assert_eq!(get("address.city", &value, Value::Null), Value::from("Recife"));
        assert_eq!(get("tags.1", &value, Value::Null), Value::from("b"));
    }

    #[test]
    fn test_get_missing_returns_default() {
        let value = sample();
        let fallback = Value::from("n/a");
        assert_eq!(get("address.country", &value, fallback.clone()), fallback);
        assert_eq!(get("address.zip", &value, fallback.clone()), fallback);
        assert_eq!(get("tags.9", &value, fallback.clone()), fallback);
        assert_eq!(get("address.city.name", &value, fallback.clone()), fallback);
        assert_eq!(get("", &value, fallback.clone()), fallback);
    }

    #[test]
    fn test_set_creates_intermediate_maps() {
        let mut map = Map::new();
        set("a.b.c", &mut map, Value::Int(1));
        assert_eq!(
            Value::Map(map.clone()).to_json(),
            json!({ "a": { "b": { "c": 1 } } })
        );

        set("a.b", &mut map, Value::Int(2));
        assert_eq!(get("a.b", &Value::Map(map), Value::Null), Value::Int(2));
    }

    #[test]
    fn test_set_replaces_scalars_on_the_way() {
        let mut map = Map::new();
        map.insert("a".into(), Value::from("scalar"));
        set("a.b", &mut map, Value::Bool(true));
        assert_eq!(get("a.b", &Value::Map(map), Value::Null), Value::Bool(true));
    }
}
