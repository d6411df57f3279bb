//! Clap adapter.
//!
//! Compiled only with the `clap` Cargo feature (on by default). It builds a
//! [`clap::Command`] from the same struct the configurator binds, so clap
//! takes care of usage text, validation of flag names and shell-style
//! parsing, and turns the parsed matches back into a [`FlagProvider`].
//!
//! ```ignore
//! let mut config = AppConfig::default();
//! let matches = bindfig::command_for("myapp", &mut config)?.get_matches();
//! Configurator::builder()
//!     .provider(FlagProvider::from_matches(&matches))
//!     .build()?
//!     .populate(&mut config)?;
//! ```
//!
//! Clap keeps its own `-h`/`--help`, so a struct that claims `h` as a flag
//! key clashes with it.

use std::collections::{HashMap, HashSet};

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::error::Error;
use crate::factory::Factory;
use crate::keys;
use crate::provider::FlagProvider;
use crate::types::{Bind, Kind};
use crate::walker::{self, Visit};

const NAMESPACE: &str = "flag";

/// One argument per settable field, named after its `flag` keys.
///
/// Single-character keys become short flags, longer ones long flags; the
/// first of each kind is primary and the rest are aliases. Boolean fields
/// accept `--name` alone or `--name=value`.
pub fn command_for<T: Bind>(name: impl Into<String>, target: &mut T) -> Result<Command, Error> {
    let factory = Factory::default();
    let mut command = Command::new(name.into());
    let mut taken = HashSet::new();

    walker::walk(target, |node| {
        let next = if node.slot.type_descriptor().is_self_parsing() {
            Visit::SkipStruct
        } else {
            Visit::Continue
        };
        let Some(setter) = factory.setter_for(&*node.slot) else {
            return Ok(next);
        };

        let names: Vec<String> = keys::build_keys(NAMESPACE, node, false)
            .into_iter()
            .filter(|key| {
                let fresh = taken.insert(key.clone());
                if !fresh {
                    log::debug!("flag {key:?} already claimed, skipping it for {}", node.dotted_name());
                }
                fresh
            })
            .collect();
        let Some(id) = names.first().cloned() else {
            return Ok(next);
        };

        let mut arg = Arg::new(id)
            .action(ArgAction::Set)
            .value_parser(clap::value_parser!(String))
            .value_name(setter.description().to_string());

        let (shorts, longs): (Vec<&String>, Vec<&String>) = names.iter().partition(|key| key.chars().count() == 1);
        for (index, short) in shorts.iter().filter_map(|key| key.chars().next()).enumerate() {
            arg = if index == 0 { arg.short(short) } else { arg.short_alias(short) };
        }
        for (index, long) in longs.into_iter().enumerate() {
            arg = if index == 0 {
                arg.long(long.clone())
            } else {
                arg.alias(long.clone())
            };
        }

        if let Some(help) = node.field.help() {
            arg = arg.help(help);
        }
        if matches!(node.slot.type_descriptor().kind, Kind::Bool) {
            arg = arg
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true");
        }

        command = std::mem::take(&mut command).arg(arg);
        Ok(next)
    })?;

    Ok(command)
}

impl FlagProvider {
    /// Values the user actually passed on the command line.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let values: HashMap<String, String> = matches
            .ids()
            .filter(|id| matches.value_source(id.as_str()) == Some(ValueSource::CommandLine))
            .filter_map(|id| {
                let value = matches.get_one::<String>(id.as_str())?;
                Some((id.as_str().to_string(), value.clone()))
            })
            .collect();
        Self::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::builder::Configurator;
    use crate::fixtures::test::{HelpConfig, SelfParsingConfig, TestConfig};
    use crate::provider::Provider;

    fn bind(args: &[&str]) -> TestConfig {
        let mut config = TestConfig::default();
        let matches = command_for("app", &mut config)
            .unwrap()
            .try_get_matches_from(args)
            .unwrap();
        let flags: Arc<dyn Provider> = Arc::new(FlagProvider::from_matches(&matches));
        Configurator::new(vec![flags]).populate(&mut config).unwrap();
        config
    }

    #[test]
    fn command_lists_every_field() {
        let command = command_for("app", &mut TestConfig::default()).unwrap();
        let ids: Vec<&str> = command.get_arguments().map(|arg| arg.get_id().as_str()).collect();
        for id in ["host", "p", "debug", "database.url", "database.pool_size"] {
            assert!(ids.contains(&id), "missing {id}: {ids:?}");
        }
    }

    #[test]
    fn short_and_long_keys() {
        let command = command_for("app", &mut TestConfig::default()).unwrap();
        let port = command
            .get_arguments()
            .find(|arg| arg.get_id() == "p")
            .unwrap();
        assert_eq!(port.get_short(), Some('p'));
        assert_eq!(port.get_long(), Some("port"));
    }

    #[test]
    fn parsed_flags_bind() {
        let config = bind(&["app", "--port", "8080", "--host", "example.com", "--database.url", "pg://x"]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "example.com");
        assert_eq!(config.database.url.as_deref(), Some("pg://x"));
        assert_eq!(config.database.pool_size, 0);
    }

    #[test]
    fn bool_flags_without_value() {
        assert!(bind(&["app", "--debug"]).debug);
        assert!(!bind(&["app", "--debug=false"]).debug);
        assert!(!bind(&["app"]).debug);
    }

    #[test]
    fn help_and_value_names() {
        let command = command_for("app", &mut HelpConfig::default()).unwrap();
        let yolo = command
            .get_arguments()
            .find(|arg| arg.get_id() == "yolo")
            .unwrap();
        assert_eq!(yolo.get_short(), Some('y'));
        assert_eq!(yolo.get_help().map(ToString::to_string).as_deref(), Some("this is the help message"));
        let names: Vec<String> = yolo
            .get_value_names()
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, ["string"]);
    }

    #[test]
    fn self_parsing_fields_are_one_flag() {
        let command = command_for("app", &mut SelfParsingConfig::default()).unwrap();
        let ids: Vec<&str> = command.get_arguments().map(|arg| arg.get_id().as_str()).collect();
        assert!(ids.contains(&"endpoint"));
        assert!(!ids.contains(&"endpoint.host"));
    }

    #[test]
    fn root_must_be_a_struct() {
        assert!(matches!(command_for("app", &mut 1u8), Err(Error::NotAStructPointer)));
    }
}
