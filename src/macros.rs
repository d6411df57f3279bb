/// Declare a struct and make it bindable.
///
/// Each field may carry one `#[bind(...)]` list of namespace annotations.
/// A `key = "value"` entry sets the key(s) used for that namespace; a bare
/// key such as `embed` is a marker. The struct must implement `Default`,
/// which is used to allocate it behind an empty `Option`.
///
/// ```
/// bindfig::configurable! {
///     #[derive(Debug, Default)]
///     pub struct Database {
///         /// Connection string.
///         #[bind(env = "DATABASE_URL", flag = "db-url", help = "postgres connection string")]
///         pub url: String,
///         #[bind(flag = "p,pool")]
///         pub pool_size: u32,
///         pub replicas: Vec<String>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! configurable {
    (
        $(#[$outer:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $(#[bind($($key:ident $(= $value:literal)?),* $(,)?)])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Configurable for $name {
            fn fields(&mut self) -> ::std::vec::Vec<$crate::Field<'_>> {
                ::std::vec![
                    $(
                        $crate::Field::new(
                            $crate::FieldDescriptor::with_attrs(
                                ::std::stringify!($field),
                                &[$($(
                                    $crate::Attr {
                                        key: ::std::stringify!($key),
                                        value: $crate::__bind_attr_value!($($value)?),
                                    },
                                )*)?],
                            ),
                            &mut self.$field,
                        ),
                    )*
                ]
            }
        }

        impl $crate::Bind for $name {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::structure::<Self>()
            }

            fn as_configurable(
                &mut self,
            ) -> ::std::option::Option<&mut dyn $crate::Configurable> {
                ::std::option::Option::Some(self)
            }

            fn zero() -> ::std::option::Option<Self> {
                ::std::option::Option::Some(<Self as ::std::default::Default>::default())
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __bind_attr_value {
    () => {
        ""
    };
    ($value:literal) => {
        $value
    };
}

/// Bind types that parse themselves through [`FromStr`](std::str::FromStr).
#[macro_export]
macro_rules! bind_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Bind for $ty {
                fn descriptor() -> $crate::TypeDescriptor {
                    $crate::TypeDescriptor::self_parsing::<$ty>(
                        $crate::Capabilities::new().text::<$ty>(),
                    )
                }
            }
        )+
    };
}

/// Bind types that parse themselves in place through [`Value`](crate::Value).
#[macro_export]
macro_rules! bind_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Bind for $ty {
                fn descriptor() -> $crate::TypeDescriptor {
                    $crate::TypeDescriptor::self_parsing::<$ty>(
                        $crate::Capabilities::new().value::<$ty>(),
                    )
                }
            }
        )+
    };
}

/// Bind types that deserialize from JSON text.
///
/// Raw values that do not look like a JSON array or object are quoted
/// before decoding, so `123.45` reaches the deserializer as `"123.45"`.
#[macro_export]
macro_rules! bind_json {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Bind for $ty {
                fn descriptor() -> $crate::TypeDescriptor {
                    $crate::TypeDescriptor::self_parsing::<$ty>(
                        $crate::Capabilities::new().json::<$ty>(),
                    )
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use crate::{Bind, Configurable, Kind};

    crate::configurable! {
        #[derive(Debug, Default)]
        struct Annotated {
            /// Documented field.
            #[bind(env = "NAME", flag = "n,name", embed)]
            name: String,
            plain: i64,
        }
    }

    #[test]
    fn fields_follow_declaration_order() {
        let mut target = Annotated::default();
        let fields = target.fields();
        let names: Vec<_> = fields.iter().map(|f| f.descriptor.name).collect();
        assert_eq!(names, vec!["name", "plain"]);
    }

    #[test]
    fn attributes_are_recorded() {
        let mut target = Annotated::default();
        let fields = target.fields();
        let name = &fields[0].descriptor;
        assert_eq!(name.tag("env"), Some("NAME"));
        assert_eq!(name.tag("flag"), Some("n,name"));
        assert!(name.is_embedded());
        assert!(fields[1].descriptor.attrs.is_empty());
    }

    #[test]
    fn struct_descriptor_and_allocation() {
        assert!(matches!(Annotated::descriptor().kind, Kind::Struct));
        assert!(Annotated::zero().is_some());
        let mut nested: Option<Annotated> = None;
        assert!(nested.alloc_configurable().is_some());
        assert!(nested.is_some());
    }

    #[test]
    fn slots_write_through() {
        let mut target = Annotated::default();
        {
            let mut fields = target.fields();
            fields[1].slot.assign(Box::new(7i64)).unwrap();
        }
        assert_eq!(target.plain, 7);
    }
}
