use std::io::Read;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Provider, join_entries, join_items};
use crate::error::Error;

/// Reads values from a JSON document by walking dotted keys through nested
/// objects.
///
/// Strings are returned verbatim, numbers and booleans in their JSON
/// spelling. Arrays are joined with `,` and objects rendered as `k=v`
/// entries so that they bind to `Vec` and map fields. `null` counts as
/// absent.
#[derive(Debug, Clone, Default)]
pub struct JsonProvider {
    document: Map<String, Value>,
}

impl JsonProvider {
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(document) => Ok(Self { document }),
            other => Err(Error::MalformedDocument {
                key: String::new(),
                reason: format!("expected a JSON object at the top level, found {other}"),
            }),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    /// A fixed in-memory configuration, serialized to JSON first.
    pub fn from_serialize<S: Serialize>(value: &S) -> Result<Self, Error> {
        Self::from_value(serde_json::to_value(value)?)
    }
}

impl std::str::FromStr for JsonProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_value(serde_json::from_str(s)?)
    }
}

impl Provider for JsonProvider {
    fn namespace(&self) -> &str {
        "json"
    }

    fn provide(&self, key: &str) -> Result<Option<String>, Error> {
        let mut current = &self.document;
        let mut segments = key.split('.').peekable();
        while let Some(segment) = segments.next() {
            let value = match current.get(segment) {
                None | Some(Value::Null) => return Ok(None),
                Some(value) => value,
            };
            if segments.peek().is_none() {
                return Ok(Some(render(value)));
            }
            current = value.as_object().ok_or_else(|| Error::MalformedDocument {
                key: key.to_string(),
                reason: format!("{segment:?} is not an object"),
            })?;
        }
        Ok(None)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => join_items(items.iter().map(render)),
        Value::Object(entries) => join_entries(entries.iter().map(|(k, v)| (k.clone(), render(v)))),
        other => other.to_string(),
    }
}
