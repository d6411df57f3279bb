use std::collections::HashMap;

use super::Provider;
use crate::error::Error;

/// Reads command-line flags.
///
/// `-k v`, `--k v` and `--k=v` set a value; a flag with no value sets
/// `true`; `--no-k` sets `k` to `false`. Anything that is not a flag and
/// does not follow one is ignored.
#[derive(Debug, Clone, Default)]
pub struct FlagProvider {
    values: HashMap<String, String>,
}

impl FlagProvider {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            values: parse_flags(args),
        }
    }

    /// The process arguments, program name excluded.
    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1))
    }

    #[cfg_attr(not(feature = "clap"), allow(dead_code))]
    pub(crate) fn from_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

enum Arg<'a> {
    Flag(&'a str),
    Value(&'a str),
    Skip,
}

fn classify(arg: &str) -> Arg<'_> {
    if arg.len() < 2 || !arg.starts_with('-') {
        return if arg.is_empty() { Arg::Skip } else { Arg::Value(arg) };
    }
    let name = arg.strip_prefix("--").unwrap_or(&arg[1..]);
    if name.is_empty() {
        Arg::Skip
    } else {
        Arg::Flag(name)
    }
}

fn parse_flags<I, S>(args: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut values = HashMap::new();
    let mut pending: Option<String> = None;

    for arg in args {
        match classify(arg.as_ref()) {
            Arg::Flag(name) => {
                if let Some((name, value)) = name.split_once('=') {
                    values.insert(name.to_string(), value.to_string());
                    pending = None;
                    continue;
                }
                let (name, value) = match name.strip_prefix("no-") {
                    Some(negated) if !negated.is_empty() => (negated, "false"),
                    _ => (name, "true"),
                };
                values.insert(name.to_string(), value.to_string());
                pending = Some(name.to_string());
            }
            Arg::Value(value) => {
                if let Some(name) = pending.take() {
                    values.insert(name, value.to_string());
                }
            }
            Arg::Skip => pending = None,
        }
    }

    values
}

impl Provider for FlagProvider {
    fn namespace(&self) -> &str {
        "flag"
    }

    fn provide(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.values.get(key).cloned())
    }

    fn format_key(&self, key: &str) -> Option<String> {
        if key.chars().count() == 1 {
            Some(format!("-{key}"))
        } else {
            Some(format!("--{key}"))
        }
    }
}
