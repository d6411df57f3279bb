//! Builds and memoizes [`Setter`]s per field type.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::parser::{
    BoolParser, DurationParser, FloatParser, IntParser, MapParser, Parser, SelfParser, Setter,
    SliceParser, StringParser, TimeParser, TypedParser, UintParser,
};
use crate::types::{Kind, Slot, TypeDescriptor};

/// Layout used for time fields unless overridden.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone)]
pub struct FactoryOptions {
    /// `chrono` format string for time fields.
    pub date_format: String,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Resolves a setter for each field type, caching every answer, including
/// "no setter".
#[derive(Debug, Default)]
pub struct Factory {
    options: FactoryOptions,
    cache: RwLock<HashMap<TypeId, Option<Arc<Setter>>>>,
}

impl Factory {
    pub fn new(options: FactoryOptions) -> Self {
        Self {
            options,
            cache: RwLock::default(),
        }
    }

    pub fn options(&self) -> &FactoryOptions {
        &self.options
    }

    /// Setter for the type behind `slot`.
    pub fn setter_for(&self, slot: &dyn Slot) -> Option<Arc<Setter>> {
        let type_id = slot.bound_type_id();
        if let Some(hit) = self.cached(type_id) {
            return hit;
        }
        self.build(&slot.type_descriptor())
    }

    /// Setter for `descriptor`, `None` when the type cannot be set from text.
    pub fn build(&self, descriptor: &TypeDescriptor) -> Option<Arc<Setter>> {
        if let Some(hit) = self.cached(descriptor.type_id) {
            return hit;
        }

        let setter = self
            .build_typed(descriptor)
            .map(|parser| Arc::new(Setter::new(parser, descriptor.is_self_parsing())));
        log::trace!(
            "setter for {}: {}",
            descriptor.type_name,
            setter
                .as_ref()
                .map_or_else(|| "none".to_string(), |s| s.description())
        );

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(descriptor.type_id, setter.clone());
        }
        setter
    }

    fn cached(&self, type_id: TypeId) -> Option<Option<Arc<Setter>>> {
        self.cache.read().ok()?.get(&type_id).cloned()
    }

    fn build_typed(&self, descriptor: &TypeDescriptor) -> Option<TypedParser> {
        if let Kind::Pointer(indirection) = &descriptor.kind
            && matches!(indirection.pointee.kind, Kind::Slice(_) | Kind::Map(_))
        {
            return self
                .build_composite(&indirection.pointee)
                .map(|parser| parser.wrapped(indirection.wrap, descriptor.type_name));
        }
        match &descriptor.kind {
            Kind::Slice(_) | Kind::Map(_) => self.build_composite(descriptor),
            _ => self.build_basic(descriptor),
        }
    }

    fn build_composite(&self, descriptor: &TypeDescriptor) -> Option<TypedParser> {
        let parser: Arc<dyn Parser> = match &descriptor.kind {
            Kind::Slice(sequence) => Arc::new(SliceParser {
                element: self.build_basic(&sequence.element)?,
                collect: sequence.collect,
                type_name: descriptor.type_name,
            }),
            Kind::Map(mapping) => Arc::new(MapParser {
                key: self.build_basic(&mapping.key)?,
                value: self.build_typed(&mapping.value)?,
                collect: mapping.collect,
                type_name: descriptor.type_name,
            }),
            _ => return None,
        };
        Some(TypedParser::new(parser, descriptor.type_name))
    }

    /// Scalars, presets and self-parsing types, optionally behind one
    /// `Option`/`Box`.
    fn build_basic(&self, descriptor: &TypeDescriptor) -> Option<TypedParser> {
        let (target, wrap) = match &descriptor.kind {
            Kind::Pointer(indirection) => (&*indirection.pointee, Some(indirection.wrap)),
            _ => (descriptor, None),
        };

        let parser: Arc<dyn Parser> = match &target.kind {
            Kind::SelfParsing(capabilities) => {
                let (capability, parse) = capabilities.resolve()?;
                Arc::new(SelfParser {
                    type_name: target.short_name(),
                    capability,
                    parse,
                })
            }
            Kind::Duration => Arc::new(DurationParser),
            Kind::Time(flavor) => Arc::new(TimeParser {
                layout: self.options.date_format.clone(),
                flavor: *flavor,
            }),
            Kind::String => Arc::new(StringParser),
            Kind::Bool => Arc::new(BoolParser),
            Kind::Int(width) => Arc::new(IntParser { width: *width }),
            Kind::Uint(width) => Arc::new(UintParser { width: *width }),
            Kind::Float(width) => Arc::new(FloatParser { width: *width }),
            Kind::Pointer(_) | Kind::Slice(_) | Kind::Map(_) | Kind::Struct | Kind::Opaque => {
                return None;
            }
        };

        let parser = TypedParser::new(parser, target.type_name);
        Some(match wrap {
            Some(wrap) => parser.wrapped(wrap, descriptor.type_name),
            None => parser,
        })
    }
}
