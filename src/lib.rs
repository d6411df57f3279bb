//! Bind configuration values onto annotated Rust structs from any number of
//! sources. Declare a struct, list your providers, and populate it.
//!
//! Bindfig walks every field of a struct (nested structs included), builds
//! the keys each source would know that field by, asks the sources for a raw
//! string and parses it into the field's type. Environment variables,
//! command-line flags, JSON documents and TOML files ship in the box; a
//! source of your own is one small [`Provider`] impl.
//!
//! ```ignore
//! bindfig::configurable! {
//!     #[derive(Default)]
//!     struct AppConfig {
//!         #[bind(env = "APP_HOST", flag = "host,H", help = "address to bind")]
//!         host: String,
//!         port: u16,
//!         database: Database,
//!     }
//! }
//!
//! let mut config = AppConfig::default();
//! Configurator::builder()
//!     .app_name("myapp")
//!     .file_name("myapp.toml")
//!     .env_prefix("MYAPP")
//!     .args(std::env::args().skip(1))
//!     .build()?
//!     .populate(&mut config)?;
//! ```
//!
//! # Design: the struct is the schema
//!
//! There is no key registry. The struct's fields decide which keys exist,
//! their types decide how raw strings are parsed, and the `#[bind(...)]`
//! attributes decide what each source calls them:
//!
//! - **`#[bind(env = "A,B")]`** gives a field explicit keys in one
//!   namespace. Comma-separated alternatives are tried in order.
//! - **`#[bind(flag = "-")]`** hides a field from that namespace entirely.
//! - **`#[bind(embed)]`** flattens a nested struct so its fields are keyed
//!   as if they sat on the parent.
//! - **`#[bind(help = "...")]`** documents the field in the help listing.
//!
//! Untagged fields fall back to their field name, and nested fields join
//! their parent's keys with `.` (`database.url`), so most structs need no
//! attributes at all. Turn the fallback off with
//! [`ignore_missing_tag()`](ConfiguratorBuilder::ignore_missing_tag).
//!
//! Fields keep whatever value they had when no source knows them: the
//! struct's `Default` impl is the lowest layer.
//!
//! # Layer precedence
//!
//! Providers are consulted in order and **the last one with a value wins**.
//! The builder stacks its layers like this:
//!
//! ```text
//! Struct defaults       whatever the target held before populate()
//!        ↑ overridden by
//! Config files          search paths in order, later paths win
//!        ↑ overridden by
//! Explicit providers    .provider(...), in call order
//!        ↑ overridden by
//! Environment vars      PREFIX_KEY
//!        ↑ overridden by
//! Flags                 --key value
//! ```
//!
//! # Types
//!
//! Strings, booleans, every integer and float width, [`Duration`]
//! (`1h30m`), `chrono` date-times, IP and socket addresses, paths,
//! `Option<T>`, `Box<T>`, `Vec<T>` (`a,b,c`) and maps (`k=v,k2=v2`) all
//! parse out of the box. Composite values honour quoting, so
//! `"a,b",c` is two items.
//!
//! A type can also take over its own parsing: implement [`Value`] and use
//! [`bind_value!`], or reuse an existing `FromStr` impl with
//! [`bind_from_str!`], or serde with [`bind_json!`]. Such fields are set as
//! a whole and never descended into.
//!
//! [`Duration`]: std::time::Duration
//!
//! # File discovery
//!
//! [`search_paths()`](ConfiguratorBuilder::search_paths) accepts a list of
//! [`SearchPath`] variants in **priority-ascending** order (last = highest):
//!
//! - **`Platform`** is the OS config directory.
//! - **`Home(".myapp")`** is a dotfile directory under `$HOME`.
//! - **`Cwd`** is the working directory.
//! - **`Path(path)`** is an explicit directory.
//! - **`Ancestors(boundary)`** walks up from the working directory, stopping
//!   at the filesystem root or at a [`Boundary::Marker`] such as `.git`.
//!
//! With [`SearchMode::Merge`] every file found is deep-merged; with
//! [`SearchMode::FirstMatch`] only the highest-priority file is read.
//! Missing files are skipped.
//!
//! # Help
//!
//! When the help switch (`-h`, `--help` or a truthy `HELP` variable) is
//! set, [`Configurator::populate`] writes a listing of every field, its
//! type, default and keys, then returns [`Error::HelpRequested`]:
//!
//! ```text
//! Arguments:
//!     - port: integer (default: 8080) (env: PORT, flag: --port)
//! ```
//!
//! # Multi-stage loading
//!
//! [`MultiStage`] binds a small bootstrap struct first and derives more
//! providers from it, e.g. a `--config` flag naming the file to load next.
//!
//! # Clap adapter
//!
//! With the `clap` feature (on by default), [`command_for`] builds a
//! [`clap::Command`] from the struct and [`FlagProvider::from_matches`]
//! feeds the parsed matches back in.
//!
//! # Error handling
//!
//! All fallible operations return [`Error`]. Binding errors name the field,
//! the key and the namespace that failed; [`Error::root_cause`] digs out
//! the underlying parse error. Enable `rich-errors` for `miette`
//! diagnostics.

#[macro_use]
mod macros;

pub mod duration;
pub mod error;
pub mod keys;
pub mod parser;
pub mod provider;
pub mod types;
pub mod walker;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod configurable;
mod factory;
mod help;
mod multistage;
mod split;

#[cfg(test)]
mod fixtures;

pub use builder::{Configurator, ConfiguratorBuilder};
#[cfg(feature = "clap")]
pub use cli::command_for;
pub use configurable::{Attr, Configurable, Field, FieldDescriptor};
pub use error::{BoxError, Error};
pub use factory::{DEFAULT_DATE_FORMAT, Factory, FactoryOptions};
pub use help::HelpWriter;
pub use keys::{ROOT_KEY, build_keys};
pub use multistage::{ConfigurationStage, MultiStage, ProviderMode, Stage};
pub use parser::Setter;
pub use provider::{
    Boundary, EnvProvider, FlagProvider, JsonProvider, MapProvider, Provider, SearchMode, SearchPath, TomlProvider,
};
pub use split::split;
pub use types::{Bind, Capabilities, Capability, Kind, Slot, TypeDescriptor, Value};
pub use walker::{FieldNode, Visit, walk};
