//! Bootstrapping the provider list in stages.
//!
//! A stage binds a small bootstrap struct with the providers known so far
//! and derives further providers from the result, for example reading the
//! path of a config file from a `--config` flag before loading that file.

use std::sync::Arc;

use crate::builder::Configurator;
use crate::error::Error;
use crate::provider::Provider;
use crate::types::Bind;

/// How the providers a stage returns combine with the current ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderMode {
    /// Consulted after the current providers, so they take precedence.
    #[default]
    Append,
    /// Used instead of the current providers.
    Replace,
}

pub trait Stage {
    fn next(&self, configurator: &Configurator) -> Result<(Vec<Arc<dyn Provider>>, ProviderMode), Error>;
}

/// A stage that binds a fresh copy of `initial` and hands it to `providers`.
pub struct ConfigurationStage<T, F> {
    initial: T,
    mode: ProviderMode,
    providers: F,
}

impl<T, F> ConfigurationStage<T, F>
where
    T: Bind + Clone,
    F: Fn(&T) -> Result<Vec<Arc<dyn Provider>>, Error>,
{
    pub fn new(initial: T, mode: ProviderMode, providers: F) -> Self {
        Self {
            initial,
            mode,
            providers,
        }
    }
}

impl<T, F> Stage for ConfigurationStage<T, F>
where
    T: Bind + Clone,
    F: Fn(&T) -> Result<Vec<Arc<dyn Provider>>, Error>,
{
    fn next(&self, configurator: &Configurator) -> Result<(Vec<Arc<dyn Provider>>, ProviderMode), Error> {
        let mut bootstrap = self.initial.clone();
        configurator.populate(&mut bootstrap)?;
        let providers = (self.providers)(&bootstrap)?;
        Ok((providers, self.mode))
    }
}

/// Runs stages in order, then binds the final target.
pub struct MultiStage {
    initial: Configurator,
    stages: Vec<Box<dyn Stage>>,
}

impl MultiStage {
    pub fn new(initial: Configurator) -> Self {
        Self {
            initial,
            stages: Vec::new(),
        }
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// The configurator produced by running every stage.
    pub fn resolve(&self) -> Result<Configurator, Error> {
        let mut current = self.initial.clone();
        for (index, stage) in self.stages.iter().enumerate() {
            let (providers, mode) = stage.next(&current)?;
            log::debug!(
                "stage {index}: {} provider(s), {mode:?}",
                providers.len()
            );
            current = match mode {
                ProviderMode::Append => current.with_appended(providers),
                ProviderMode::Replace => current.with_replaced(providers),
            };
        }
        Ok(current)
    }

    pub fn populate<T: Bind>(&self, target: &mut T) -> Result<(), Error> {
        self.resolve()?.populate(target)
    }
}
