//! Usage text listing every settable field and where it can be set from.

use std::io::Write;
use std::sync::Arc;

use crate::error::Error;
use crate::factory::Factory;
use crate::keys;
use crate::provider::Provider;
use crate::types::Bind;
use crate::walker::{self, FieldNode, Visit};

pub const HEADER: &str = "Arguments:\n";

/// Renders one line per field:
///
/// ```text
/// \t- <name>: <type>[ <help>][ (default: <value>)] (<namespace>: <key>, ...)
/// ```
///
/// Fields no provider can address are left out.
pub struct HelpWriter<'c> {
    providers: &'c [Arc<dyn Provider>],
    factory: &'c Factory,
    ignore_missing_tag: bool,
}

impl<'c> HelpWriter<'c> {
    pub fn new(providers: &'c [Arc<dyn Provider>], factory: &'c Factory, ignore_missing_tag: bool) -> Self {
        Self {
            providers,
            factory,
            ignore_missing_tag,
        }
    }

    pub fn write<T, W>(&self, out: &mut W, target: &mut T) -> Result<(), Error>
    where
        T: Bind,
        W: Write + ?Sized,
    {
        out.write_all(HEADER.as_bytes()).map_err(Error::HelpOutput)?;
        walker::walk(target, |node| self.write_field(out, node))?;
        out.flush().map_err(Error::HelpOutput)
    }

    fn write_field<W>(&self, out: &mut W, node: &mut FieldNode<'_, '_>) -> Result<Visit, Error>
    where
        W: Write + ?Sized,
    {
        let next = if node.slot.type_descriptor().is_self_parsing() {
            Visit::SkipStruct
        } else {
            Visit::Continue
        };
        let Some(setter) = self.factory.setter_for(&*node.slot) else {
            return Ok(next);
        };
        let Some(name) = keys::build_keys("", node, self.ignore_missing_tag).into_iter().next() else {
            return Ok(next);
        };

        let sources = self.sources(node);
        if sources.is_empty() {
            return Ok(next);
        }

        let mut line = format!("\t- {name}: {}", setter.description());
        if let Some(help) = node.field.help() {
            line.push(' ');
            line.push_str(help);
        }
        if let Some(default) = node.slot.current_default() {
            line.push_str(&format!(" (default: {default})"));
        }
        line.push_str(&format!(" ({})\n", sources.join(", ")));

        out.write_all(line.as_bytes()).map_err(Error::HelpOutput)?;
        Ok(next)
    }

    /// `namespace: key, key` for every provider that can address the field.
    fn sources(&self, node: &FieldNode<'_, '_>) -> Vec<String> {
        self.providers
            .iter()
            .filter_map(|provider| {
                let namespace = provider.namespace();
                let formatted: Vec<String> = keys::build_keys(namespace, node, self.ignore_missing_tag)
                    .iter()
                    .filter_map(|key| provider.format_key(key))
                    .collect();
                (!formatted.is_empty()).then(|| format!("{namespace}: {}", formatted.join(", ")))
            })
            .collect()
    }
}
