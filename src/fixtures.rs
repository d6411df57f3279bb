#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::time::Duration;

    use serde::Deserialize;

    use crate::error::BoxError;
    use crate::{Bind, Capabilities, Configurable, Field, FieldDescriptor, TypeDescriptor, Value};

    crate::configurable! {
        #[derive(Debug, Default, PartialEq)]
        pub struct TestConfig {
            /// The application host.
            #[bind(env = "HOST", help = "the application host")]
            pub host: String,

            #[bind(flag = "p,port")]
            pub port: u16,

            pub debug: bool,

            pub database: TestDbConfig,
        }
    }

    crate::configurable! {
        #[derive(Debug, Default, PartialEq)]
        pub struct TestDbConfig {
            /// Connection string URL.
            pub url: Option<String>,

            pub pool_size: usize,
        }
    }

    // -- Fixtures for traversal tests ------------------------------------------

    crate::configurable! {
        #[derive(Debug, Default, PartialEq)]
        pub struct Inner {
            pub level: i64,
            pub tags: Vec<String>,
        }
    }

    crate::configurable! {
        #[derive(Debug, Default)]
        pub struct Outer {
            pub name: String,
            pub inner: Inner,
            pub boxed: Box<Inner>,
            pub maybe: Option<Inner>,
        }
    }

    // -- Fixtures for self-parsing types ---------------------------------------

    /// Parses itself from `host:port`, but also exposes its fields.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Endpoint {
        pub host: String,
        pub port: u16,
    }

    impl FromStr for Endpoint {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let (host, port) = s
                .rsplit_once(':')
                .ok_or_else(|| format!("missing port in {s:?}"))?;
            let port = port.parse().map_err(|e| format!("bad port: {e}"))?;
            Ok(Self {
                host: host.to_string(),
                port,
            })
        }
    }

    impl Configurable for Endpoint {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::new(FieldDescriptor::new("host"), &mut self.host),
                Field::new(FieldDescriptor::new("port"), &mut self.port),
            ]
        }
    }

    impl Bind for Endpoint {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::self_parsing::<Self>(Capabilities::new().text::<Self>())
        }

        fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
            Some(self)
        }

        fn zero() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        #[default]
        Low,
        High,
    }

    impl Value for Level {
        fn parse(&mut self, raw: &str) -> Result<(), BoxError> {
            *self = match raw {
                "low" => Level::Low,
                "high" => Level::High,
                other => return Err(format!("unknown level {other:?}").into()),
            };
            Ok(())
        }
    }

    crate::bind_value!(Level);

    #[derive(Debug, Default, Clone, PartialEq, Deserialize)]
    pub struct Limits {
        pub cpu: u32,
        pub memory: Option<String>,
    }

    crate::bind_json!(Limits);

    #[derive(Debug, Default, Clone, PartialEq, Deserialize)]
    #[serde(transparent)]
    pub struct Version(pub String);

    crate::bind_json!(Version);

    crate::configurable! {
        #[derive(Debug, Default)]
        pub struct SelfParsingConfig {
            pub endpoint: Endpoint,
            pub backup: Option<Endpoint>,
            pub level: Level,
            pub limits: Limits,
            pub version: Version,
        }
    }

    // -- Fixture for help output -----------------------------------------------

    crate::configurable! {
        #[derive(Debug, Default)]
        pub struct HelpConfig {
            pub map: HashMap<String, i64>,

            #[bind(flag = "d")]
            pub d: Duration,

            #[bind(flag = "yolo,y", help = "this is the help message")]
            pub yolo: String,
        }
    }

    impl HelpConfig {
        pub fn with_defaults() -> Self {
            Self {
                map: [("fiz".to_string(), 42)].into(),
                d: Duration::from_secs(5 * 3600),
                yolo: String::new(),
            }
        }
    }

    #[test]
    fn endpoint_parses() {
        let endpoint: Endpoint = "db:5432".parse().unwrap();
        assert_eq!(endpoint.port, 5432);
        assert!("db".parse::<Endpoint>().is_err());
    }
}
