//! Value sources.
//!
//! A provider answers one question: what raw string, if any, does it hold
//! for a dotted key. Providers are consulted in order and the last one that
//! has a value wins.

use crate::error::Error;

pub mod env;
pub mod file;
pub mod flags;
pub mod json;
pub mod map;

pub use env::EnvProvider;
pub use file::{Boundary, SearchMode, SearchPath, TomlProvider};
pub use flags::FlagProvider;
pub use json::JsonProvider;
pub use map::MapProvider;

pub trait Provider: Send + Sync {
    /// Annotation namespace this provider reads keys from, e.g. `env`.
    fn namespace(&self) -> &str;

    /// The raw value for `key`, `None` when absent.
    fn provide(&self, key: &str) -> Result<Option<String>, Error>;

    /// How `key` looks to a user of this source, for help output.
    fn format_key(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Join list items so that the composite parsers split them back apart.
pub(crate) fn join_items<I>(items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    items
        .into_iter()
        .map(|item| quote_item(&item))
        .collect::<Vec<_>>()
        .join(",")
}

/// Join `key=value` entries for the map parser. Only values are quoted; a
/// quote opening mid-entry keeps `,` and `=` inside the value together.
pub(crate) fn join_entries<I>(entries: I) -> String
where
    I: IntoIterator<Item = (String, String)>,
{
    entries
        .into_iter()
        .map(|(key, value)| format!("{key}={}", quote_item(&value)))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_item(item: &str) -> String {
    if !item.contains([',', '=', '"', '\'']) {
        return item.to_string();
    }
    if item.contains('"') {
        format!("'{item}'")
    } else {
        format!("\"{item}\"")
    }
}
