use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::factory::{Factory, FactoryOptions};
use crate::help::HelpWriter;
use crate::keys;
use crate::provider::{EnvProvider, FlagProvider, Provider, SearchMode, SearchPath, TomlProvider};
use crate::types::Bind;
use crate::walker::{self, FieldNode, Visit};

type HelpOutput = Arc<Mutex<Box<dyn Write + Send>>>;

fn stderr_output() -> HelpOutput {
    let output: Box<dyn Write + Send> = Box::new(std::io::stderr());
    Arc::new(Mutex::new(output))
}

crate::configurable! {
    #[derive(Debug, Default)]
    struct HelpRequest {
        #[bind(flag = "h,help", env = "HELP")]
        help: bool,
    }
}

/// Binds values from an ordered list of providers onto structs.
///
/// Providers are consulted in order for every field; when several hold a
/// value, the last one wins. Cloning is cheap: providers and the setter
/// cache are shared.
#[derive(Clone)]
pub struct Configurator {
    providers: Vec<Arc<dyn Provider>>,
    factory: Arc<Factory>,
    ignore_missing_tag: bool,
    help: Option<HelpOutput>,
}

impl Configurator {
    pub fn builder() -> ConfiguratorBuilder {
        ConfiguratorBuilder::new()
    }

    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self {
            providers,
            factory: Arc::new(Factory::default()),
            ignore_missing_tag: false,
            help: None,
        }
    }

    /// `providers`, then the process environment, then the process
    /// arguments, with `-h`/`--help`/`HELP` printing usage to stderr.
    pub fn default_with(providers: Vec<Arc<dyn Provider>>) -> Self {
        let mut all = providers;
        all.push(Arc::new(EnvProvider::new()));
        all.push(Arc::new(FlagProvider::from_env()));
        Self {
            help: Some(stderr_output()),
            ..Self::new(all)
        }
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn ignores_missing_tag(&self) -> bool {
        self.ignore_missing_tag
    }

    /// A copy with `providers` consulted after the current ones.
    pub fn with_appended(&self, providers: Vec<Arc<dyn Provider>>) -> Self {
        let mut next = self.clone();
        next.providers.extend(providers);
        next
    }

    /// A copy with `providers` instead of the current ones.
    pub fn with_replaced(&self, providers: Vec<Arc<dyn Provider>>) -> Self {
        Self {
            providers,
            ..self.clone()
        }
    }

    /// Fill `target` from every provider.
    ///
    /// Fields no provider knows keep their current value, and so do fields
    /// whose value fails to parse. When help is enabled and requested, usage
    /// is written and [`Error::HelpRequested`] returned without binding any
    /// value; the help walk still allocates empty `Option` structs, as
    /// every walk does.
    pub fn populate<T: Bind>(&self, target: &mut T) -> Result<(), Error> {
        if let Some(output) = &self.help {
            let mut request = HelpRequest::default();
            walker::walk(&mut request, |node| self.bind_field(node, true))?;
            if request.help {
                let mut out = output.lock().map_err(|_| {
                    Error::HelpOutput(std::io::Error::other("help output lock poisoned"))
                })?;
                self.write_help(&mut *out, target)?;
                return Err(Error::HelpRequested);
            }
        }
        walker::walk(target, |node| self.bind_field(node, self.ignore_missing_tag))
    }

    /// Write usage for every settable field of `target`.
    pub fn write_help<T, W>(&self, out: &mut W, target: &mut T) -> Result<(), Error>
    where
        T: Bind,
        W: Write + ?Sized,
    {
        HelpWriter::new(&self.providers, &self.factory, self.ignore_missing_tag).write(out, target)
    }

    fn bind_field(&self, node: &mut FieldNode<'_, '_>, ignore_missing_tag: bool) -> Result<Visit, Error> {
        let Some(setter) = self.factory.setter_for(&*node.slot) else {
            return Ok(if node.slot.type_descriptor().is_self_parsing() {
                Visit::SkipStruct
            } else {
                Visit::Continue
            });
        };

        for provider in &self.providers {
            let namespace = provider.namespace();
            for key in keys::build_keys(namespace, node, ignore_missing_tag) {
                let value = provider
                    .provide(&key)
                    .map_err(|source| Error::Providing {
                        field: node.field.name,
                        key: key.clone(),
                        namespace: namespace.to_string(),
                        source: Box::new(source),
                    })?;
                let Some(value) = value else {
                    continue;
                };
                log::debug!("{} <- {namespace}:{key}", node.dotted_name());
                setter
                    .set(&value, &mut *node.slot)
                    .map_err(|source| Error::Setting {
                        field: node.field.name,
                        key: key.clone(),
                        namespace: namespace.to_string(),
                        value: value.clone(),
                        source: Box::new(source),
                    })?;
                break;
            }
        }

        Ok(if setter.is_self_parsing() {
            Visit::SkipStruct
        } else {
            Visit::Continue
        })
    }
}

/// Builder for a [`Configurator`].
///
/// Besides explicit providers, the builder can assemble the usual layers
/// for an application: TOML files found through search paths, environment
/// variables and command-line flags, in that order of priority
/// (last = highest).
pub struct ConfiguratorBuilder {
    providers: Vec<Arc<dyn Provider>>,
    options: FactoryOptions,
    ignore_missing_tag: bool,
    help: Option<HelpOutput>,
    app_name: Option<String>,
    file_name: Option<String>,
    search_paths: Option<Vec<SearchPath>>,
    search_mode: SearchMode,
    env_prefix: Option<String>,
    env_enabled: bool,
    args: Option<Vec<String>>,
}

impl ConfiguratorBuilder {
    fn new() -> Self {
        Self {
            providers: Vec::new(),
            options: FactoryOptions::default(),
            ignore_missing_tag: false,
            help: None,
            app_name: None,
            file_name: None,
            search_paths: None,
            search_mode: SearchMode::default(),
            env_prefix: None,
            env_enabled: true,
            args: None,
        }
    }

    pub fn provider<P: Provider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn shared_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn providers(mut self, providers: impl IntoIterator<Item = Arc<dyn Provider>>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Only look fields up under keys they are explicitly annotated with.
    pub fn ignore_missing_tag(mut self, ignore: bool) -> Self {
        self.ignore_missing_tag = ignore;
        self
    }

    /// `chrono` format string for time fields (default: `%Y-%m-%dT%H:%M:%S`).
    pub fn date_format(mut self, format: &str) -> Self {
        self.options.date_format = format.to_string();
        self
    }

    /// Answer `-h`/`--help`/`HELP=1` by printing usage to stderr.
    pub fn help(mut self, enabled: bool) -> Self {
        self.help = enabled.then(stderr_output);
        self
    }

    /// Like [`help`](Self::help), writing usage to `output`.
    pub fn help_output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.help = Some(Arc::new(Mutex::new(Box::new(output) as Box<dyn Write + Send>)));
        self
    }

    /// Name used for the platform config directory. Unless set explicitly,
    /// the file name becomes `{name}.toml` and the environment prefix the
    /// uppercased name.
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// File looked up in every search path. Without one, and without an
    /// app name, no file layer is added.
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Directories to look in, lowest priority first. Defaults to
    /// `[SearchPath::Platform]`.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = Some(paths);
        self
    }

    /// Add a highest-priority search path on top of the current list.
    pub fn add_search_path(mut self, path: SearchPath) -> Self {
        self.search_paths
            .get_or_insert_with(|| vec![SearchPath::Platform])
            .push(path);
        self
    }

    /// Merge every file found, or read only the highest-priority one.
    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Adds an environment layer reading `{PREFIX}_{KEY}` variables.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// No environment layer, even with an app name.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Read flags from `args` (program name excluded).
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    fn effective_file_name(&self) -> Option<String> {
        if let Some(name) = &self.file_name {
            return Some(name.clone());
        }
        self.app_name.as_ref().map(|app| format!("{app}.toml"))
    }

    fn effective_search_paths(&self) -> Vec<SearchPath> {
        if let Some(paths) = &self.search_paths {
            return paths.clone();
        }
        vec![SearchPath::Platform]
    }

    /// `None` when no environment layer is configured.
    fn effective_env_prefix(&self) -> Option<String> {
        if !self.env_enabled {
            return None;
        }
        if let Some(prefix) = &self.env_prefix {
            return Some(prefix.clone());
        }
        self.app_name.as_ref().map(|app| app.to_uppercase())
    }

    /// Assemble the provider list: discovered files, explicit providers,
    /// environment, flags.
    pub fn build(self) -> Result<Configurator, Error> {
        let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

        if let Some(file_name) = self.effective_file_name() {
            let app_name = self.app_name.as_deref().unwrap_or_default();
            let files = TomlProvider::discover(
                app_name,
                &file_name,
                &self.effective_search_paths(),
                self.search_mode,
            )?;
            providers.push(Arc::new(files));
        }

        let env_prefix = self.effective_env_prefix();
        providers.extend(self.providers);

        if let Some(prefix) = env_prefix {
            providers.push(Arc::new(EnvProvider::with_prefix(&prefix)));
        }
        if let Some(args) = self.args {
            providers.push(Arc::new(FlagProvider::new(args)));
        }

        Ok(Configurator {
            providers,
            factory: Arc::new(Factory::new(self.options)),
            ignore_missing_tag: self.ignore_missing_tag,
            help: self.help,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::TempDir;

    use super::*;
    use crate::fixtures::test::{
        Endpoint, HelpConfig, Inner, Level, Limits, Outer, SelfParsingConfig, TestConfig, Version,
    };
    use crate::provider::{JsonProvider, MapProvider};

    fn mock(pairs: &[(&str, &str)]) -> Arc<dyn Provider> {
        Arc::new(MapProvider::new("mock", pairs.iter().copied()))
    }

    /// Buffer shared with the configurator so tests can read help output.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    /// Counts lookups and fails on a chosen key.
    struct Recording {
        lookups: AtomicUsize,
        fail_on: &'static str,
    }

    impl Provider for Recording {
        fn namespace(&self) -> &str {
            "mock"
        }

        fn provide(&self, key: &str) -> Result<Option<String>, Error> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if key == self.fail_on {
                return Err(Error::provider("backend down"));
            }
            Ok(None)
        }
    }

    #[test]
    fn binds_nested_fields_by_structural_name() {
        let configurator = Configurator::new(vec![mock(&[
            ("host", "0.0.0.0"),
            ("port", "3000"),
            ("debug", "true"),
            ("database.url", "pg://"),
            ("database.pool_size", "20"),
        ])]);
        let mut config = TestConfig::default();
        configurator.populate(&mut config).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert!(config.debug);
        assert_eq!(config.database.url.as_deref(), Some("pg://"));
        assert_eq!(config.database.pool_size, 20);
    }

    #[test]
    fn last_source_wins() {
        let configurator = Configurator::new(vec![
            mock(&[("host", "first"), ("port", "1")]),
            mock(&[("host", "second")]),
        ]);
        let mut config = TestConfig::default();
        configurator.populate(&mut config).unwrap();
        assert_eq!(config.host, "second");
        assert_eq!(config.port, 1);
    }

    #[test]
    fn unknown_fields_keep_their_value() {
        let configurator = Configurator::new(vec![mock(&[])]);
        let mut config = TestConfig {
            host: "keep".into(),
            ..TestConfig::default()
        };
        configurator.populate(&mut config).unwrap();
        assert_eq!(config.host, "keep");
    }

    #[test]
    fn annotated_keys_replace_names() {
        let env = EnvProvider::from_vars(
            "",
            [
                ("HOST".to_string(), "from-env".to_string()),
                ("DATABASE_POOL_SIZE".to_string(), "7".to_string()),
            ],
        );
        let flags = FlagProvider::new(["-p", "8080"]);
        let configurator = Configurator::builder()
            .provider(env)
            .provider(flags)
            .build()
            .unwrap();
        let mut config = TestConfig::default();
        configurator.populate(&mut config).unwrap();
        assert_eq!(config.host, "from-env");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database.pool_size, 7);
    }

    #[test]
    fn first_matching_alternative_wins_within_a_source() {
        let flags = FlagProvider::new(["--port", "2", "-p", "1"]);
        let configurator = Configurator::new(vec![Arc::new(flags)]);
        let mut config = TestConfig::default();
        configurator.populate(&mut config).unwrap();
        assert_eq!(config.port, 1);
    }

    #[test]
    fn ignore_missing_tag_skips_untagged_fields() {
        let configurator = Configurator::builder()
            .provider(EnvProvider::from_vars(
                "",
                [
                    ("HOST".to_string(), "h".to_string()),
                    ("DEBUG".to_string(), "true".to_string()),
                ],
            ))
            .ignore_missing_tag(true)
            .build()
            .unwrap();
        let mut config = TestConfig::default();
        configurator.populate(&mut config).unwrap();
        assert_eq!(config.host, "h");
        assert!(!config.debug);
    }

    #[test]
    fn opted_out_fields_are_never_queried() {
        crate::configurable! {
            #[derive(Debug, Default)]
            struct Secret {
                #[bind(mock = "-")]
                token: String,
            }
        }
        let recording = Arc::new(Recording {
            lookups: AtomicUsize::new(0),
            fail_on: "token",
        });
        let configurator = Configurator::new(vec![recording.clone()]);
        let mut secret = Secret::default();
        configurator.populate(&mut secret).unwrap();
        assert_eq!(recording.lookups.load(Ordering::SeqCst), 0);
        assert!(secret.token.is_empty());
    }

    #[test]
    fn embedded_fields_are_flattened() {
        crate::configurable! {
            #[derive(Debug, Default)]
            struct Base {
                fiz: String,
            }
        }
        crate::configurable! {
            #[derive(Debug, Default)]
            struct Wrapper {
                #[bind(embed)]
                base: Base,
                other: i64,
            }
        }
        let configurator = Configurator::new(vec![mock(&[("fiz", "flat"), ("other", "3")])]);
        let mut wrapper = Wrapper::default();
        configurator.populate(&mut wrapper).unwrap();
        assert_eq!(wrapper.base.fiz, "flat");
        assert_eq!(wrapper.other, 3);
    }

    #[test]
    fn provider_errors_carry_context() {
        let recording = Arc::new(Recording {
            lookups: AtomicUsize::new(0),
            fail_on: "database.url",
        });
        let configurator = Configurator::new(vec![recording]);
        let err = configurator.populate(&mut TestConfig::default()).unwrap_err();
        match err {
            Error::Providing {
                field,
                key,
                namespace,
                ..
            } => {
                assert_eq!(field, "url");
                assert_eq!(key, "database.url");
                assert_eq!(namespace, "mock");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn parse_errors_carry_context() {
        let configurator = Configurator::new(vec![mock(&[("port", "abc")])]);
        let mut config = TestConfig::default();
        let err = configurator.populate(&mut config).unwrap_err();
        assert!(matches!(
            err,
            Error::Setting { field: "port", ref value, .. } if value == "abc"
        ));
        assert!(matches!(err.root_cause(), Error::InvalidInt { .. }));
        assert_eq!(config.port, 0);
    }

    #[test]
    fn failed_parse_keeps_previous_value() {
        let mut config = TestConfig {
            port: 8080,
            ..TestConfig::default()
        };
        let err = Configurator::new(vec![mock(&[("port", "70000")])])
            .populate(&mut config)
            .unwrap_err();
        assert!(matches!(err.root_cause(), Error::InvalidRange { .. }));
        assert_eq!(config.port, 8080);

        let err = Configurator::new(vec![mock(&[("port", "abc")])])
            .populate(&mut config)
            .unwrap_err();
        assert!(matches!(err.root_cause(), Error::InvalidInt { .. }));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn root_must_be_a_struct() {
        let configurator = Configurator::new(vec![]);
        assert!(matches!(
            configurator.populate(&mut 3i64),
            Err(Error::NotAStructPointer)
        ));
        assert!(matches!(
            configurator.populate(&mut None::<TestConfig>),
            Err(Error::NotAStructPointer)
        ));
    }

    #[test]
    fn self_parsing_fields_are_not_descended() {
        let configurator = Configurator::new(vec![mock(&[
            ("endpoint", "db:5432"),
            ("endpoint.host", "ignored"),
            ("backup.port", "1"),
            ("level", "high"),
            ("limits", "{\"cpu\": 2}"),
            ("version", "1.2.3"),
        ])]);
        let mut config = SelfParsingConfig::default();
        configurator.populate(&mut config).unwrap();
        assert_eq!(
            config.endpoint,
            Endpoint {
                host: "db".into(),
                port: 5432
            }
        );
        assert_eq!(config.backup, None);
        assert_eq!(config.level, Level::High);
        assert_eq!(
            config.limits,
            Limits {
                cpu: 2,
                memory: None
            }
        );
        assert_eq!(config.version, Version("1.2.3".into()));
    }

    #[test]
    fn self_parsing_errors_are_reported() {
        let configurator = Configurator::new(vec![mock(&[("level", "medium")])]);
        let err = configurator
            .populate(&mut SelfParsingConfig::default())
            .unwrap_err();
        assert!(matches!(err.root_cause(), Error::Unmarshal { .. }));
    }

    #[test]
    fn json_documents_bind() {
        let json: JsonProvider = r#"{"host": "j", "database": {"url": "pg://j", "pool_size": 3}}"#
            .parse()
            .unwrap();
        let configurator = Configurator::new(vec![Arc::new(json)]);
        let mut config = TestConfig::default();
        configurator.populate(&mut config).unwrap();
        assert_eq!(config.host, "j");
        assert_eq!(config.database.url.as_deref(), Some("pg://j"));
        assert_eq!(config.database.pool_size, 3);
    }

    #[test]
    fn json_objects_bind_to_map_fields() {
        crate::configurable! {
            #[derive(Debug, Default)]
            struct Quotas {
                caps: std::collections::BTreeMap<String, u32>,
            }
        }
        let json: JsonProvider = r#"{"caps": {"cpu": 4, "mem": 8}}"#.parse().unwrap();
        let configurator = Configurator::new(vec![mock(&[("caps", "cpu=2")]), Arc::new(json)]);
        let mut quotas = Quotas::default();
        configurator.populate(&mut quotas).unwrap();
        assert_eq!(quotas.caps.len(), 2);
        assert_eq!(quotas.caps["cpu"], 4);
        assert_eq!(quotas.caps["mem"], 8);
    }

    #[test]
    fn app_layers_from_files_env_and_flags() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test.toml"), "port = 3000\nhost = \"file\"\n").unwrap();

        let configurator = Configurator::builder()
            .app_name("test")
            .search_paths(vec![SearchPath::Path(dir.path().to_path_buf())])
            .no_env()
            .args(["--port", "9999"])
            .build()
            .unwrap();
        assert_eq!(configurator.providers().len(), 2);

        let mut config = TestConfig::default();
        configurator.populate(&mut config).unwrap();
        assert_eq!(config.host, "file");
        assert_eq!(config.port, 9999);
    }

    #[test]
    fn app_name_sets_defaults() {
        let builder = Configurator::builder().app_name("myapp");
        assert_eq!(builder.effective_file_name().as_deref(), Some("myapp.toml"));
        assert_eq!(builder.effective_search_paths(), vec![SearchPath::Platform]);
        assert_eq!(builder.effective_env_prefix().as_deref(), Some("MYAPP"));
    }

    #[test]
    fn no_app_name_means_no_file_or_env_layer() {
        let builder = Configurator::builder();
        assert_eq!(builder.effective_file_name(), None);
        assert_eq!(builder.effective_env_prefix(), None);
        assert!(builder.build().unwrap().providers().is_empty());
    }

    #[test]
    fn override_env_prefix_and_disable() {
        let builder = Configurator::builder().app_name("myapp").env_prefix("OTHER");
        assert_eq!(builder.effective_env_prefix().as_deref(), Some("OTHER"));
        let builder = Configurator::builder().app_name("myapp").no_env();
        assert_eq!(builder.effective_env_prefix(), None);
    }

    #[test]
    fn add_search_path_appends_to_defaults() {
        let builder = Configurator::builder().add_search_path(SearchPath::Cwd);
        assert_eq!(
            builder.effective_search_paths(),
            vec![SearchPath::Platform, SearchPath::Cwd]
        );
    }

    #[test]
    fn date_format_reaches_time_fields() {
        crate::configurable! {
            #[derive(Debug, Default)]
            struct When {
                at: chrono::NaiveDateTime,
            }
        }
        let configurator = Configurator::builder()
            .provider(MapProvider::new("mock", [("at", "2020-03-02 10:30")]))
            .date_format("%Y-%m-%d %H:%M")
            .build()
            .unwrap();
        let mut when = When::default();
        configurator.populate(&mut when).unwrap();
        assert_eq!(when.at.to_string(), "2020-03-02 10:30:00");
    }

    #[test]
    fn help_flag_writes_usage_and_stops() {
        let captured = Captured::default();
        let configurator = Configurator::builder()
            .provider(FlagProvider::new(["--help", "-d", "1s"]))
            .help_output(captured.clone())
            .build()
            .unwrap();
        let mut config = HelpConfig::with_defaults();
        let err = configurator.populate(&mut config).unwrap_err();
        assert!(matches!(err, Error::HelpRequested));
        assert_eq!(config.d, std::time::Duration::from_secs(5 * 3600));
        assert!(captured.text().starts_with("Arguments:\n"));
        assert!(captured.text().contains("\t- d: duration (default: 5h0m0s) (flag: -d)\n"));
    }

    #[test]
    fn help_binds_nothing_but_allocates_empty_structs() {
        let configurator = Configurator::builder()
            .provider(FlagProvider::new(["--help", "--name", "x", "--maybe.level", "3"]))
            .help_output(Captured::default())
            .build()
            .unwrap();
        let mut outer = Outer::default();
        let err = configurator.populate(&mut outer).unwrap_err();
        assert!(matches!(err, Error::HelpRequested));
        assert_eq!(outer.name, "");
        assert_eq!(outer.maybe, Some(Inner::default()));
    }

    #[test]
    fn help_env_variable_is_honoured() {
        let captured = Captured::default();
        let configurator = Configurator::builder()
            .provider(EnvProvider::from_vars("", [("HELP".to_string(), "1".to_string())]))
            .help_output(captured.clone())
            .build()
            .unwrap();
        let err = configurator.populate(&mut TestConfig::default()).unwrap_err();
        assert!(matches!(err, Error::HelpRequested));
        assert!(!captured.text().is_empty());
    }

    #[test]
    fn help_is_only_read_from_explicit_keys() {
        let configurator = Configurator::builder()
            .provider(MapProvider::new("mock", [("help", "true")]))
            .help_output(Captured::default())
            .build()
            .unwrap();
        assert!(configurator.populate(&mut TestConfig::default()).is_ok());
    }

    #[test]
    fn appended_and_replaced_providers() {
        let base = Configurator::new(vec![mock(&[("host", "a")])]);
        let appended = base.with_appended(vec![mock(&[("host", "b")])]);
        let replaced = base.with_replaced(vec![mock(&[("port", "5")])]);
        assert_eq!(base.providers().len(), 1);

        let mut config = TestConfig::default();
        appended.populate(&mut config).unwrap();
        assert_eq!(config.host, "b");

        let mut config = TestConfig::default();
        replaced.populate(&mut config).unwrap();
        assert_eq!(config.host, "");
        assert_eq!(config.port, 5);
    }
}
