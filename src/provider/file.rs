//! TOML config files, found through a list of search paths.
//!
//! # Discovery
//!
//! Each [`SearchPath`] variant is resolved to one or more concrete directories:
//!
//! - `Platform`, `Home`, `Cwd`, `Path` resolve to a single directory.
//! - `Ancestors(boundary)` expands into every directory from the current
//!   working directory up toward the filesystem root, **shallowest first**,
//!   so that the directories closest to the CWD have the highest priority.
//!
//! # Resolution
//!
//! Each directory is checked for `{dir}/{file_name}`. With
//! [`SearchMode::Merge`] every file found is deep-merged, later files
//! overriding earlier ones key by key; with [`SearchMode::FirstMatch`] only
//! the highest-priority file is used. Missing files are skipped; other I/O
//! errors are propagated.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::{Provider, join_entries, join_items};
use crate::error::Error;

/// A place to look for the config file, listed lowest priority first.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// The OS config directory for the application, via `directories`.
    Platform,
    /// A directory under `$HOME`, such as `Home(".myapp")`.
    Home(&'static str),
    Cwd,
    Path(PathBuf),
    /// The working directory and every parent up to the boundary.
    Ancestors(Boundary),
}

/// How far an [`Ancestors`](SearchPath::Ancestors) walk goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    /// Up to the filesystem root.
    Root,
    /// Up to and including the first directory containing this entry.
    Marker(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Deep-merge every file found.
    #[default]
    Merge,
    /// Use only the highest-priority file found.
    FirstMatch,
}

/// Reads values from a TOML table by walking dotted keys.
///
/// Strings are returned verbatim and other scalars in their TOML spelling.
/// Arrays are joined with `,` and tables rendered as `k=v` entries so that
/// they bind to `Vec` and map fields.
#[derive(Debug, Clone, Default)]
pub struct TomlProvider {
    table: Table,
    sources: Vec<PathBuf>,
}

impl TomlProvider {
    pub fn from_table(table: Table) -> Self {
        Self {
            table,
            sources: Vec::new(),
        }
    }

    /// Parse `content`; `origin` names it in error messages.
    pub fn parse(content: &str, origin: impl Into<PathBuf>) -> Result<Self, Error> {
        let origin = origin.into();
        let table = content.parse::<Table>().map_err(|source| Error::Toml {
            path: origin.clone(),
            source,
        })?;
        Ok(Self {
            table,
            sources: vec![origin],
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Look for `file_name` in each search path and combine what is found.
    ///
    /// `app_name` is used by `SearchPath::Platform` to construct the
    /// platform-specific config directory. Finding nothing is not an error.
    pub fn discover(
        app_name: &str,
        file_name: &str,
        search_paths: &[SearchPath],
        mode: SearchMode,
    ) -> Result<Self, Error> {
        let dirs = expand_search_paths(search_paths, app_name, None);
        let files = match mode {
            SearchMode::Merge => load_all(&dirs, file_name)?,
            SearchMode::FirstMatch => load_first_match(&dirs, file_name)?,
        };

        let mut merged = Self::default();
        for (path, content) in files {
            log::debug!("loading config file {}", path.display());
            let layer = Self::parse(&content, path)?;
            merged.table = deep_merge(merged.table, layer.table);
            merged.sources.extend(layer.sources);
        }
        Ok(merged)
    }

    /// Files that contributed to this provider, in merge order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

impl Provider for TomlProvider {
    fn namespace(&self) -> &str {
        "toml"
    }

    fn provide(&self, key: &str) -> Result<Option<String>, Error> {
        let mut current = &self.table;
        let mut segments = key.split('.').peekable();
        while let Some(segment) = segments.next() {
            let Some(value) = current.get(segment) else {
                return Ok(None);
            };
            if segments.peek().is_none() {
                return Ok(Some(render(value)));
            }
            current = value.as_table().ok_or_else(|| Error::MalformedDocument {
                key: key.to_string(),
                reason: format!("{segment:?} is not a table"),
            })?;
        }
        Ok(None)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => join_items(items.iter().map(render)),
        Value::Table(table) => join_entries(table.iter().map(|(k, v)| (k.clone(), render(v)))),
        other => other.to_string(),
    }
}

/// Layer `overlay` onto `base`. Tables present on both sides merge
/// recursively; any other collision takes the overlay's value.
pub fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, value) in overlay {
        let merged = match (base.remove(&key), value) {
            (Some(Value::Table(lower)), Value::Table(upper)) => Value::Table(deep_merge(lower, upper)),
            (_, value) => value,
        };
        base.insert(key, merged);
    }
    base
}

fn search_dir(path: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match path {
        SearchPath::Platform => directories::ProjectDirs::from("", "", app_name)
            .map(|dirs| dirs.config_dir().to_path_buf()),
        SearchPath::Home(subdir) => directories::UserDirs::new().map(|dirs| dirs.home_dir().join(subdir)),
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(dir) => Some(dir.clone()),
        SearchPath::Ancestors(_) => None,
    }
}

/// Directories from `start` up to `boundary`, shallowest first.
pub fn expand_ancestors_from(start: &Path, boundary: &Boundary) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut current = start;

    loop {
        dirs.push(current.to_path_buf());

        if let Boundary::Marker(name) = boundary
            && current.join(name).exists()
        {
            break;
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    dirs.reverse();
    dirs
}

/// Concrete directories for `search_paths`, lowest priority first.
/// `ancestors_start` replaces the working directory as the start of
/// `Ancestors` walks.
pub fn expand_search_paths(
    search_paths: &[SearchPath],
    app_name: &str,
    ancestors_start: Option<&Path>,
) -> Vec<PathBuf> {
    search_paths
        .iter()
        .flat_map(|path| match path {
            SearchPath::Ancestors(boundary) => ancestors_start
                .map(Path::to_path_buf)
                .or_else(|| std::env::current_dir().ok())
                .map(|start| expand_ancestors_from(&start, boundary))
                .unwrap_or_default(),
            other => search_dir(other, app_name).into_iter().collect(),
        })
        .collect()
}

fn read_candidate(dir: &Path, file_name: &str) -> Result<Option<(PathBuf, String)>, Error> {
    let path = dir.join(file_name);
    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(Some((path, content))),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            log::trace!("no config file at {}", path.display());
            Ok(None)
        }
        Err(source) => Err(Error::Io { path, source }),
    }
}

fn load_all(dirs: &[PathBuf], file_name: &str) -> Result<Vec<(PathBuf, String)>, Error> {
    dirs.iter()
        .filter_map(|dir| read_candidate(dir, file_name).transpose())
        .collect()
}

/// The highest-priority file only, scanning from the end of `dirs`.
fn load_first_match(dirs: &[PathBuf], file_name: &str) -> Result<Vec<(PathBuf, String)>, Error> {
    for dir in dirs.iter().rev() {
        if let Some(found) = read_candidate(dir, file_name)? {
            return Ok(vec![found]);
        }
    }
    Ok(Vec::new())
}
