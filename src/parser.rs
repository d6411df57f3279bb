//! Text-to-value parsers, one per supported shape.
//!
//! Every parser returns a type-erased value of exactly the type its
//! descriptor names, so the final write into the field is a plain downcast.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::duration;
use crate::error::Error;
use crate::split::split;
use crate::types::{
    AnyValue, Capability, FloatWidth, IntWidth, ParseFn, Slot, TimeFlavor, UintWidth,
};

pub trait Parser: Send + Sync + fmt::Debug {
    /// Short human description used in help output.
    fn description(&self) -> String;

    fn parse(&self, raw: &str) -> Result<AnyValue, Error>;
}

/// A parser plus the indirection (`Option`/`Box`) its caller expects.
#[derive(Debug, Clone)]
pub struct TypedParser {
    parser: Arc<dyn Parser>,
    wrap: Option<fn(AnyValue) -> Option<AnyValue>>,
    type_name: &'static str,
}

impl TypedParser {
    pub fn new(parser: Arc<dyn Parser>, type_name: &'static str) -> Self {
        Self {
            parser,
            wrap: None,
            type_name,
        }
    }

    pub fn wrapped(mut self, wrap: fn(AnyValue) -> Option<AnyValue>, type_name: &'static str) -> Self {
        self.wrap = Some(wrap);
        self.type_name = type_name;
        self
    }

    pub fn description(&self) -> String {
        self.parser.description()
    }

    pub fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        let value = self.parser.parse(raw)?;
        match self.wrap {
            Some(wrap) => wrap(value).ok_or(Error::TypeMismatch {
                expected: self.type_name,
            }),
            None => Ok(value),
        }
    }
}

/// Parses a raw value and writes it into a field.
#[derive(Debug)]
pub struct Setter {
    parser: TypedParser,
    self_parsing: bool,
}

impl Setter {
    pub(crate) fn new(parser: TypedParser, self_parsing: bool) -> Self {
        Self {
            parser,
            self_parsing,
        }
    }

    pub fn description(&self) -> String {
        self.parser.description()
    }

    /// Whether the target type parses itself, so its fields must not be
    /// bound individually.
    pub fn is_self_parsing(&self) -> bool {
        self.self_parsing
    }

    pub fn set(&self, raw: &str, slot: &mut dyn Slot) -> Result<(), Error> {
        let value = self.parser.parse(raw)?;
        slot.assign(value)
    }
}

#[derive(Debug)]
pub struct StringParser;

impl Parser for StringParser {
    fn description(&self) -> String {
        "string".into()
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        Ok(Box::new(raw.to_string()))
    }
}

#[derive(Debug)]
pub struct BoolParser;

impl Parser for BoolParser {
    fn description(&self) -> String {
        "bool".into()
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        Ok(Box::new(parse_bool(raw)?))
    }
}

pub fn parse_bool(raw: &str) -> Result<bool, Error> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "T" | "1" | "TRUE" => Ok(true),
        "F" | "0" | "FALSE" => Ok(false),
        _ => Err(Error::NotBoolValue {
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub struct IntParser {
    pub width: IntWidth,
}

impl Parser for IntParser {
    fn description(&self) -> String {
        "integer".into()
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        let value: i64 = raw.parse().map_err(|source| Error::InvalidInt {
            value: raw.to_string(),
            source,
        })?;
        let (min, max) = self.width.bounds();
        if value < min || value > max {
            return Err(Error::InvalidRange {
                kind: self.width.name(),
                value: raw.to_string(),
            });
        }
        Ok(match self.width {
            IntWidth::I8 => Box::new(value as i8),
            IntWidth::I16 => Box::new(value as i16),
            IntWidth::I32 => Box::new(value as i32),
            IntWidth::I64 => Box::new(value),
            IntWidth::Isize => Box::new(value as isize),
        })
    }
}

#[derive(Debug)]
pub struct UintParser {
    pub width: UintWidth,
}

impl Parser for UintParser {
    fn description(&self) -> String {
        "integer".into()
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        let value: u64 = raw.parse().map_err(|source| Error::InvalidInt {
            value: raw.to_string(),
            source,
        })?;
        if value > self.width.max() {
            return Err(Error::InvalidRange {
                kind: self.width.name(),
                value: raw.to_string(),
            });
        }
        Ok(match self.width {
            UintWidth::U8 => Box::new(value as u8),
            UintWidth::U16 => Box::new(value as u16),
            UintWidth::U32 => Box::new(value as u32),
            UintWidth::U64 => Box::new(value),
            UintWidth::Usize => Box::new(value as usize),
        })
    }
}

#[derive(Debug)]
pub struct FloatParser {
    pub width: FloatWidth,
}

impl Parser for FloatParser {
    fn description(&self) -> String {
        "float".into()
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        let value: f64 = raw.parse().map_err(|source| Error::InvalidFloat {
            value: raw.to_string(),
            source,
        })?;
        match self.width {
            FloatWidth::F64 => Ok(Box::new(value)),
            FloatWidth::F32 if value.abs() > f64::from(f32::MAX) => Err(Error::InvalidRange {
                kind: self.width.name(),
                value: raw.to_string(),
            }),
            FloatWidth::F32 => Ok(Box::new(value as f32)),
        }
    }
}

#[derive(Debug)]
pub struct DurationParser;

impl Parser for DurationParser {
    fn description(&self) -> String {
        "duration".into()
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        let value: Duration = duration::parse(raw)?;
        Ok(Box::new(value))
    }
}

#[derive(Debug)]
pub struct TimeParser {
    pub layout: String,
    pub flavor: TimeFlavor,
}

impl Parser for TimeParser {
    fn description(&self) -> String {
        "time".into()
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        let naive = NaiveDateTime::parse_from_str(raw, &self.layout).map_err(|source| {
            Error::InvalidTime {
                value: raw.to_string(),
                layout: self.layout.clone(),
                source,
            }
        })?;
        Ok(match self.flavor {
            TimeFlavor::Utc => Box::new(naive.and_utc()),
            TimeFlavor::Naive => Box::new(naive),
        })
    }
}

/// Delegates to a type's own parsing capability.
pub struct SelfParser {
    pub type_name: &'static str,
    pub capability: Capability,
    pub parse: ParseFn,
}

impl fmt::Debug for SelfParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelfParser")
            .field("type_name", &self.type_name)
            .field("capability", &self.capability)
            .finish()
    }
}

impl Parser for SelfParser {
    fn description(&self) -> String {
        self.type_name.to_string()
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        (self.parse)(raw).map_err(|source| Error::Unmarshal {
            type_name: self.type_name,
            value: raw.to_string(),
            source,
        })
    }
}

/// Comma separated list of elements.
#[derive(Debug)]
pub struct SliceParser {
    pub element: TypedParser,
    pub collect: fn(Vec<AnyValue>) -> Option<AnyValue>,
    pub type_name: &'static str,
}

impl Parser for SliceParser {
    fn description(&self) -> String {
        format!("[]{}", self.element.description())
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        let composite = |source: Error| Error::InvalidComposite {
            value: raw.to_string(),
            shape: "slice",
            source: Box::new(source),
        };
        let items = split(raw, ',')
            .map_err(composite)?
            .iter()
            .map(|item| self.element.parse(item))
            .collect::<Result<Vec<_>, _>>()
            .map_err(composite)?;
        (self.collect)(items).ok_or(Error::TypeMismatch {
            expected: self.type_name,
        })
    }
}

/// Comma separated `key=value` entries. Entries that do not split into
/// exactly one key and one value are dropped.
#[derive(Debug)]
pub struct MapParser {
    pub key: TypedParser,
    pub value: TypedParser,
    pub collect: fn(Vec<(AnyValue, AnyValue)>) -> Option<AnyValue>,
    pub type_name: &'static str,
}

impl Parser for MapParser {
    fn description(&self) -> String {
        format!(
            "map[{}]{}",
            self.key.description(),
            self.value.description()
        )
    }

    fn parse(&self, raw: &str) -> Result<AnyValue, Error> {
        let composite = |source: Error| Error::InvalidComposite {
            value: raw.to_string(),
            shape: "map",
            source: Box::new(source),
        };
        let mut entries = Vec::new();
        for entry in split(raw, ',').map_err(composite)? {
            let parts = split(&entry, '=').map_err(composite)?;
            let [key, value] = parts.as_slice() else {
                log::debug!("dropping malformed map entry {entry:?}");
                continue;
            };
            let key = self.key.parse(key).map_err(composite)?;
            let value = self.value.parse(value).map_err(composite)?;
            entries.push((key, value));
        }
        (self.collect)(entries).ok_or(Error::TypeMismatch {
            expected: self.type_name,
        })
    }
}
