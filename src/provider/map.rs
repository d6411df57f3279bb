use std::collections::HashMap;

use super::Provider;
use crate::error::Error;

/// Flat key/value pairs under an arbitrary namespace.
#[derive(Debug, Clone, Default)]
pub struct MapProvider {
    namespace: String,
    values: HashMap<String, String>,
}

impl MapProvider {
    pub fn new<I, K, V>(namespace: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            namespace: namespace.to_string(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl Provider for MapProvider {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn provide(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.values.get(key).cloned())
    }
}
