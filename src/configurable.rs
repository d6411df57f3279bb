//! Struct-level reflection: which fields a struct has, their annotations and
//! a mutable handle on each one.

use crate::types::Slot;

/// One `key` or `key = "value"` entry from a field's `#[bind(...)]` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr {
    pub key: &'static str,
    pub value: &'static str,
}

impl Attr {
    pub const fn new(key: &'static str, value: &'static str) -> Self {
        Self { key, value }
    }
}

/// Static metadata of a struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub attrs: &'static [Attr],
}

impl FieldDescriptor {
    pub const fn new(name: &'static str) -> Self {
        Self { name, attrs: &[] }
    }

    pub const fn with_attrs(name: &'static str, attrs: &'static [Attr]) -> Self {
        Self { name, attrs }
    }

    /// The annotation for `namespace`, `Some("")` for a bare key.
    pub fn tag(&self, namespace: &str) -> Option<&'static str> {
        self.attrs
            .iter()
            .find(|attr| attr.key == namespace)
            .map(|attr| attr.value)
    }

    pub fn help(&self) -> Option<&'static str> {
        self.tag("help").filter(|text| !text.is_empty())
    }

    /// Embedded fields contribute no key segment of their own.
    pub fn is_embedded(&self) -> bool {
        self.tag("embed").is_some()
    }
}

/// A field together with a live mutable handle on its value.
pub struct Field<'a> {
    pub descriptor: FieldDescriptor,
    pub slot: &'a mut dyn Slot,
}

impl<'a> Field<'a> {
    pub fn new(descriptor: FieldDescriptor, slot: &'a mut dyn Slot) -> Self {
        Self { descriptor, slot }
    }
}

/// A struct whose fields can be enumerated in declaration order.
///
/// Usually implemented through [`configurable!`](crate::configurable).
/// A hand-written implementation looks like:
///
/// ```
/// use bindfig::{Attr, Bind, Configurable, Field, FieldDescriptor, TypeDescriptor};
///
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// const HOST: FieldDescriptor =
///     FieldDescriptor::with_attrs("host", &[Attr::new("env", "SERVER_HOST")]);
///
/// impl Configurable for Server {
///     fn fields(&mut self) -> Vec<Field<'_>> {
///         vec![
///             Field::new(HOST, &mut self.host),
///             Field::new(FieldDescriptor::new("port"), &mut self.port),
///         ]
///     }
/// }
///
/// impl Bind for Server {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::structure::<Self>()
///     }
///
///     fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
///         Some(self)
///     }
///
///     fn zero() -> Option<Self> {
///         Some(Self::default())
///     }
/// }
/// ```
pub trait Configurable {
    fn fields(&mut self) -> Vec<Field<'_>>;
}
