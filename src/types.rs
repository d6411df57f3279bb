//! Type descriptors: the closed set of value shapes the binder understands.
//!
//! Rust has no runtime reflection, so every bindable type describes itself
//! through [`Bind::descriptor`]. Composite descriptors carry monomorphised
//! constructor functions so that the parser tree can assemble a typed
//! `Vec<T>` or `HashMap<K, V>` out of type-erased parts.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;

use crate::configurable::Configurable;
use crate::duration;
use crate::error::{BoxError, Error};

/// A parsed value before it is written into its field.
pub type AnyValue = Box<dyn Any>;

/// Signature shared by every self-parsing capability.
pub type ParseFn = fn(&str) -> Result<AnyValue, BoxError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    Isize,
}

impl IntWidth {
    pub fn name(self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
            IntWidth::Isize => "isize",
        }
    }

    /// Inclusive bounds of the width, widened to `i64`.
    pub fn bounds(self) -> (i64, i64) {
        match self {
            IntWidth::I8 => (i8::MIN.into(), i8::MAX.into()),
            IntWidth::I16 => (i16::MIN.into(), i16::MAX.into()),
            IntWidth::I32 => (i32::MIN.into(), i32::MAX.into()),
            IntWidth::I64 => (i64::MIN, i64::MAX),
            IntWidth::Isize => (isize::MIN as i64, isize::MAX as i64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UintWidth {
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl UintWidth {
    pub fn name(self) -> &'static str {
        match self {
            UintWidth::U8 => "u8",
            UintWidth::U16 => "u16",
            UintWidth::U32 => "u32",
            UintWidth::U64 => "u64",
            UintWidth::Usize => "usize",
        }
    }

    pub fn max(self) -> u64 {
        match self {
            UintWidth::U8 => u8::MAX.into(),
            UintWidth::U16 => u16::MAX.into(),
            UintWidth::U32 => u32::MAX.into(),
            UintWidth::U64 => u64::MAX,
            UintWidth::Usize => usize::MAX as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

impl FloatWidth {
    pub fn name(self) -> &'static str {
        match self {
            FloatWidth::F32 => "f32",
            FloatWidth::F64 => "f64",
        }
    }
}

/// Which timestamp type a time field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFlavor {
    Utc,
    Naive,
}

/// The three ways a type can turn text into itself, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// [`Value::parse`] on a default instance.
    Value,
    /// [`FromStr`].
    Text,
    /// `serde` deserialization from JSON.
    Json,
}

/// Parse-in-place capability, the highest priority self-parsing contract.
pub trait Value {
    fn parse(&mut self, raw: &str) -> Result<(), BoxError>;
}

/// The self-parsing capabilities a type declares.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    value: Option<ParseFn>,
    text: Option<ParseFn>,
    json: Option<ParseFn>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value<T>(mut self) -> Self
    where
        T: Value + Default + 'static,
    {
        self.value = Some(parse_value::<T>);
        self
    }

    pub fn text<T>(mut self) -> Self
    where
        T: FromStr + 'static,
        T::Err: Into<BoxError>,
    {
        self.text = Some(parse_text::<T>);
        self
    }

    pub fn json<T>(mut self) -> Self
    where
        T: DeserializeOwned + 'static,
    {
        self.json = Some(parse_json::<T>);
        self
    }

    /// Pick the highest-priority capability: value, then text, then JSON.
    pub fn resolve(&self) -> Option<(Capability, ParseFn)> {
        self.value
            .map(|f| (Capability::Value, f))
            .or_else(|| self.text.map(|f| (Capability::Text, f)))
            .or_else(|| self.json.map(|f| (Capability::Json, f)))
    }
}

fn parse_value<T: Value + Default + 'static>(raw: &str) -> Result<AnyValue, BoxError> {
    let mut value = T::default();
    value.parse(raw)?;
    Ok(Box::new(value))
}

fn parse_text<T>(raw: &str) -> Result<AnyValue, BoxError>
where
    T: FromStr + 'static,
    T::Err: Into<BoxError>,
{
    let value = raw.parse::<T>().map_err(|err| -> BoxError { err.into() })?;
    Ok(Box::new(value))
}

fn parse_json<T: DeserializeOwned + 'static>(raw: &str) -> Result<AnyValue, BoxError> {
    let value: T = if should_quote(raw) {
        serde_json::from_str(&quote_json(raw)?)?
    } else {
        serde_json::from_str(raw)?
    };
    Ok(Box::new(value))
}

/// Bare tokens are quoted so that `123.45` reaches the deserializer as a JSON
/// string; arrays and objects are passed through untouched.
pub(crate) fn should_quote(raw: &str) -> bool {
    if raw.len() < 2 {
        return true;
    }
    let array = raw.starts_with('[') && raw.ends_with(']');
    let object = raw.starts_with('{') && raw.ends_with('}');
    !(array || object)
}

fn quote_json(raw: &str) -> Result<String, serde_json::Error> {
    let unquoted = serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.to_string());
    serde_json::to_string(&unquoted)
}

/// `Option<T>` or `Box<T>`: one level of indirection over another descriptor.
#[derive(Debug, Clone)]
pub struct Indirection {
    pub pointee: Box<TypeDescriptor>,
    pub wrap: fn(AnyValue) -> Option<AnyValue>,
}

#[derive(Debug, Clone)]
pub struct Sequence {
    pub element: Box<TypeDescriptor>,
    pub collect: fn(Vec<AnyValue>) -> Option<AnyValue>,
}

#[derive(Debug, Clone)]
pub struct Mapping {
    pub key: Box<TypeDescriptor>,
    pub value: Box<TypeDescriptor>,
    pub collect: fn(Vec<(AnyValue, AnyValue)>) -> Option<AnyValue>,
}

#[derive(Debug, Clone)]
pub enum Kind {
    String,
    Bool,
    Int(IntWidth),
    Uint(UintWidth),
    Float(FloatWidth),
    Duration,
    Time(TimeFlavor),
    Pointer(Indirection),
    Slice(Sequence),
    Map(Mapping),
    SelfParsing(Capabilities),
    Struct,
    Opaque,
}

#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub kind: Kind,
}

impl TypeDescriptor {
    pub fn new<T: Any>(kind: Kind) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind,
        }
    }

    pub fn structure<T: Any>() -> Self {
        Self::new::<T>(Kind::Struct)
    }

    pub fn self_parsing<T: Any>(capabilities: Capabilities) -> Self {
        Self::new::<T>(Kind::SelfParsing(capabilities))
    }

    pub fn opaque<T: Any>() -> Self {
        Self::new::<T>(Kind::Opaque)
    }

    /// The pointee for `Option`/`Box` descriptors, `self` otherwise.
    pub fn indirected(&self) -> &TypeDescriptor {
        match &self.kind {
            Kind::Pointer(indirection) => &indirection.pointee,
            _ => self,
        }
    }

    pub fn is_self_parsing(&self) -> bool {
        matches!(self.indirected().kind, Kind::SelfParsing(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.indirected().kind, Kind::Struct)
    }

    /// Type name without its module path, e.g. `IpAddr`.
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.type_name)
    }
}

fn short_type_name(name: &'static str) -> &'static str {
    let head = name.split('<').next().unwrap_or(name);
    let start = head.rfind("::").map_or(0, |i| i + 2);
    &name[start..]
}

/// A type that can be the target of a binding.
///
/// Scalars, time types, `Option`, `Box`, `Vec`, maps and a handful of
/// self-parsing std types are covered here. Structs get an implementation
/// from [`configurable!`](crate::configurable); other self-parsing types from
/// [`bind_from_str!`](crate::bind_from_str), [`bind_value!`](crate::bind_value)
/// or [`bind_json!`](crate::bind_json).
pub trait Bind: Sized + 'static {
    fn descriptor() -> TypeDescriptor;

    /// The struct behind this value, without allocating.
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }

    /// The struct behind this value, allocating an empty `Option` first.
    fn alloc_configurable(&mut self) -> Option<&mut dyn Configurable> {
        self.as_configurable()
    }

    /// A zero value used when an empty `Option` has to be allocated.
    fn zero() -> Option<Self> {
        None
    }

    fn is_zero(&self) -> bool {
        false
    }

    /// Human rendering used for help defaults.
    fn display(&self) -> Option<String> {
        None
    }
}

/// Object-safe view of a live field, used by the walker and setters.
pub trait Slot {
    fn bound_type_id(&self) -> TypeId;

    fn type_descriptor(&self) -> TypeDescriptor;

    /// Overwrite the field with a parsed value of exactly its type.
    fn assign(&mut self, value: AnyValue) -> Result<(), Error>;

    fn nested(&mut self) -> Option<&mut dyn Configurable>;

    fn nested_or_alloc(&mut self) -> Option<&mut dyn Configurable>;

    /// The rendered current value, `None` when it is the zero value.
    fn current_default(&self) -> Option<String>;
}

impl<T: Bind> Slot for T {
    fn bound_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_descriptor(&self) -> TypeDescriptor {
        T::descriptor()
    }

    fn assign(&mut self, value: AnyValue) -> Result<(), Error> {
        let value = downcast::<T>(value).ok_or(Error::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })?;
        *self = value;
        Ok(())
    }

    fn nested(&mut self) -> Option<&mut dyn Configurable> {
        Bind::as_configurable(self)
    }

    fn nested_or_alloc(&mut self) -> Option<&mut dyn Configurable> {
        Bind::alloc_configurable(self)
    }

    fn current_default(&self) -> Option<String> {
        if Bind::is_zero(self) {
            None
        } else {
            Bind::display(self)
        }
    }
}

fn downcast<T: 'static>(value: AnyValue) -> Option<T> {
    value.downcast::<T>().ok().map(|boxed| *boxed)
}

fn wrap_option<T: 'static>(value: AnyValue) -> Option<AnyValue> {
    downcast::<T>(value).map(|v| Box::new(Some(v)) as AnyValue)
}

fn wrap_box<T: 'static>(value: AnyValue) -> Option<AnyValue> {
    downcast::<T>(value).map(|v| Box::new(Box::new(v)) as AnyValue)
}

fn collect_vec<T: 'static>(items: Vec<AnyValue>) -> Option<AnyValue> {
    items
        .into_iter()
        .map(downcast::<T>)
        .collect::<Option<Vec<T>>>()
        .map(|v| Box::new(v) as AnyValue)
}

fn collect_hash_map<K, V>(entries: Vec<(AnyValue, AnyValue)>) -> Option<AnyValue>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    entries
        .into_iter()
        .map(|(k, v)| Some((downcast::<K>(k)?, downcast::<V>(v)?)))
        .collect::<Option<HashMap<K, V>>>()
        .map(|m| Box::new(m) as AnyValue)
}

fn collect_btree_map<K, V>(entries: Vec<(AnyValue, AnyValue)>) -> Option<AnyValue>
where
    K: Ord + 'static,
    V: 'static,
{
    entries
        .into_iter()
        .map(|(k, v)| Some((downcast::<K>(k)?, downcast::<V>(v)?)))
        .collect::<Option<BTreeMap<K, V>>>()
        .map(|m| Box::new(m) as AnyValue)
}

// --- scalars ---

macro_rules! bind_numeric {
    ($($ty:ty => $kind:expr, $zero:expr;)*) => {
        $(
            impl Bind for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::new::<$ty>($kind)
                }

                fn is_zero(&self) -> bool {
                    *self == $zero
                }

                fn display(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

bind_numeric! {
    i8 => Kind::Int(IntWidth::I8), 0;
    i16 => Kind::Int(IntWidth::I16), 0;
    i32 => Kind::Int(IntWidth::I32), 0;
    i64 => Kind::Int(IntWidth::I64), 0;
    isize => Kind::Int(IntWidth::Isize), 0;
    u8 => Kind::Uint(UintWidth::U8), 0;
    u16 => Kind::Uint(UintWidth::U16), 0;
    u32 => Kind::Uint(UintWidth::U32), 0;
    u64 => Kind::Uint(UintWidth::U64), 0;
    usize => Kind::Uint(UintWidth::Usize), 0;
    f32 => Kind::Float(FloatWidth::F32), 0.0;
    f64 => Kind::Float(FloatWidth::F64), 0.0;
    bool => Kind::Bool, false;
}

impl Bind for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<String>(Kind::String)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn display(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl Bind for Duration {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Duration>(Kind::Duration)
    }

    fn is_zero(&self) -> bool {
        self.is_zero()
    }

    fn display(&self) -> Option<String> {
        Some(duration::format(*self))
    }
}

impl Bind for DateTime<Utc> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<DateTime<Utc>>(Kind::Time(TimeFlavor::Utc))
    }

    fn is_zero(&self) -> bool {
        *self == DateTime::<Utc>::default()
    }

    fn display(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl Bind for NaiveDateTime {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<NaiveDateTime>(Kind::Time(TimeFlavor::Naive))
    }

    fn is_zero(&self) -> bool {
        *self == NaiveDateTime::default()
    }

    fn display(&self) -> Option<String> {
        Some(self.to_string())
    }
}

// --- self-parsing std types ---

macro_rules! bind_display_text {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Bind for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::self_parsing::<$ty>(Capabilities::new().text::<$ty>())
                }

                fn display(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

bind_display_text!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

impl Bind for PathBuf {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::self_parsing::<PathBuf>(Capabilities::new().text::<PathBuf>())
    }

    fn is_zero(&self) -> bool {
        self.as_os_str().is_empty()
    }

    fn display(&self) -> Option<String> {
        Some(self.as_path().display().to_string())
    }
}

impl Bind for serde_json::Value {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::self_parsing::<serde_json::Value>(
            Capabilities::new().json::<serde_json::Value>(),
        )
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }

    fn display(&self) -> Option<String> {
        Some(self.to_string())
    }
}

// --- indirection and containers ---

impl<T: Bind> Bind for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Kind::Pointer(Indirection {
            pointee: Box::new(T::descriptor()),
            wrap: wrap_option::<T>,
        }))
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        self.as_mut().and_then(|inner| inner.as_configurable())
    }

    fn alloc_configurable(&mut self) -> Option<&mut dyn Configurable> {
        if self.is_none() {
            *self = T::zero();
        }
        self.as_mut().and_then(|inner| inner.alloc_configurable())
    }

    fn is_zero(&self) -> bool {
        self.as_ref().is_none_or(|inner| inner.is_zero())
    }

    fn display(&self) -> Option<String> {
        self.as_ref().and_then(|inner| inner.display())
    }
}

impl<T: Bind> Bind for Box<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Kind::Pointer(Indirection {
            pointee: Box::new(T::descriptor()),
            wrap: wrap_box::<T>,
        }))
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        (**self).as_configurable()
    }

    fn alloc_configurable(&mut self) -> Option<&mut dyn Configurable> {
        (**self).alloc_configurable()
    }

    fn zero() -> Option<Self> {
        T::zero().map(Box::new)
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn display(&self) -> Option<String> {
        (**self).display()
    }
}

impl<T: Bind> Bind for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Kind::Slice(Sequence {
            element: Box::new(T::descriptor()),
            collect: collect_vec::<T>,
        }))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn display(&self) -> Option<String> {
        let items: Vec<String> = self.iter().map(render_item).collect();
        Some(format!("[{}]", items.join(" ")))
    }
}

impl<K, V> Bind for HashMap<K, V>
where
    K: Bind + Eq + Hash,
    V: Bind,
{
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Kind::Map(Mapping {
            key: Box::new(K::descriptor()),
            value: Box::new(V::descriptor()),
            collect: collect_hash_map::<K, V>,
        }))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn display(&self) -> Option<String> {
        Some(render_map(self.iter()))
    }
}

impl<K, V> Bind for BTreeMap<K, V>
where
    K: Bind + Ord,
    V: Bind,
{
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Kind::Map(Mapping {
            key: Box::new(K::descriptor()),
            value: Box::new(V::descriptor()),
            collect: collect_btree_map::<K, V>,
        }))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn display(&self) -> Option<String> {
        Some(render_map(self.iter()))
    }
}

fn render_item<T: Bind>(item: &T) -> String {
    item.display().unwrap_or_else(|| "?".to_string())
}

/// `map[k1:v1 k2:v2]`, sorted by rendered key so output is stable.
fn render_map<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> String
where
    K: Bind,
    V: Bind,
{
    let mut pairs: Vec<(String, String)> = entries
        .map(|(k, v)| (render_item(k), render_item(v)))
        .collect();
    pairs.sort();
    let body: Vec<String> = pairs.into_iter().map(|(k, v)| format!("{k}:{v}")).collect();
    format!("map[{}]", body.join(" "))
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Value => "value",
            Capability::Text => "text",
            Capability::Json => "json",
        };
        f.write_str(name)
    }
}
