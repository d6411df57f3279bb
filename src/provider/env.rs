use std::collections::HashMap;

use super::Provider;
use crate::error::Error;

/// Reads environment variables.
///
/// The key `database.url` with prefix `MYAPP` maps to `MYAPP_DATABASE_URL`:
/// dots become underscores and the result is uppercased. Empty variables
/// count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvProvider {
    prefix: Option<String>,
    vars: Option<HashMap<String, String>>,
}

impl EnvProvider {
    /// Process environment, no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
            vars: None,
        }
    }

    /// A fixed set of variables instead of the process environment.
    ///
    /// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
    pub fn from_vars(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
            vars: Some(vars.into_iter().collect()),
        }
    }

    /// The variable name consulted for `key`.
    pub fn variable_name(&self, key: &str) -> String {
        let name = key.replace('.', "_").to_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{name}"),
            None => name,
        }
    }
}

fn normalize_prefix(prefix: &str) -> Option<String> {
    let prefix = prefix.trim_end_matches('_');
    (!prefix.is_empty()).then(|| prefix.to_uppercase())
}

impl Provider for EnvProvider {
    fn namespace(&self) -> &str {
        "env"
    }

    fn provide(&self, key: &str) -> Result<Option<String>, Error> {
        let name = self.variable_name(key);
        let value = match &self.vars {
            Some(vars) => vars.get(&name).cloned(),
            None => std::env::var(&name).ok(),
        };
        Ok(value.filter(|v| !v.is_empty()))
    }

    fn format_key(&self, key: &str) -> Option<String> {
        Some(self.variable_name(key))
    }
}
